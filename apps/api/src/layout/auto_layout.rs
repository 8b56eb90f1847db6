//! Automatic page filling: packs unplaced photos onto new pages by orientation.
//!
//! # Algorithm
//! 1. Classify every pool photo by aspect ratio `w / h`: landscape above 1.2,
//!    portrait below 0.8, square otherwise (unknown dimensions count as square).
//! 2. Walk the buckets in configured order (landscape, portrait, square by default).
//! 3. Cut each bucket into batches of at most `batch_max` photos, front to back.
//!    Each batch gets the template keyed by `(orientation, batch size)` and one new
//!    page, filled in photo order.
//! 4. A batch with no matching template is skipped and its photos stay in the pool.
//!
//! The heuristic only consumes the pool, so a second run with no edits in between
//! creates nothing.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::catalog::{
    TemplateId, FEATURE_LEFT, FEATURE_TOP, FULL_BLEED, GRID_2X2, GRID_3X2, HERO_LEFT, HERO_TOP,
    SPLIT_SIDE, SPLIT_STACKED,
};
use crate::layout::editor::PhotobookEditor;
use crate::layout::model::{Page, PhotoItem, Placement};

const LANDSCAPE_MIN_RATIO: f64 = 1.2;
const PORTRAIT_MAX_RATIO: f64 = 0.8;

pub const DEFAULT_BATCH_MAX: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Orientation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

impl Orientation {
    pub const ALL: [Orientation; 3] = [
        Orientation::Landscape,
        Orientation::Portrait,
        Orientation::Square,
    ];

    pub fn of(photo: &PhotoItem) -> Self {
        let ratio = photo.aspect_ratio();
        if ratio > LANDSCAPE_MIN_RATIO {
            Orientation::Landscape
        } else if ratio < PORTRAIT_MAX_RATIO {
            Orientation::Portrait
        } else {
            Orientation::Square
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "landscape" => Some(Orientation::Landscape),
            "portrait" => Some(Orientation::Portrait),
            "square" => Some(Orientation::Square),
            _ => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Square => "square",
        };
        f.write_str(s)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lookup table
// ────────────────────────────────────────────────────────────────────────────

/// Typed `(orientation, photo count) → template` map. Missing keys mean "no layout".
#[derive(Debug, Clone)]
pub struct TemplateTable {
    entries: HashMap<(Orientation, usize), TemplateId>,
}

impl TemplateTable {
    pub fn builtin() -> Self {
        use Orientation::*;

        let rows: [(usize, [&str; 3]); 6] = [
            // count   landscape      portrait       square
            (1, [FULL_BLEED, FULL_BLEED, FULL_BLEED]),
            (2, [SPLIT_STACKED, SPLIT_SIDE, SPLIT_SIDE]),
            (3, [FEATURE_TOP, FEATURE_LEFT, FEATURE_LEFT]),
            (4, [GRID_2X2, GRID_2X2, GRID_2X2]),
            (5, [HERO_TOP, HERO_LEFT, HERO_TOP]),
            (6, [GRID_3X2, GRID_3X2, GRID_3X2]),
        ];

        let mut entries = HashMap::new();
        for (count, ids) in rows {
            for (orientation, id) in [Landscape, Portrait, Square].into_iter().zip(ids) {
                entries.insert((orientation, count), TemplateId::from(id));
            }
        }
        TemplateTable { entries }
    }

    pub fn lookup(&self, orientation: Orientation, count: usize) -> Option<&TemplateId> {
        self.entries.get(&(orientation, count))
    }
}

impl Default for TemplateTable {
    fn default() -> Self {
        Self::builtin()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Config and report
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoLayoutConfig {
    /// Largest batch placed on one page.
    pub batch_max: usize,
    /// Bucket processing order. Orientations not listed are left in the pool.
    pub order: Vec<Orientation>,
}

impl Default for AutoLayoutConfig {
    fn default() -> Self {
        AutoLayoutConfig {
            batch_max: DEFAULT_BATCH_MAX,
            order: Orientation::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoLayoutReport {
    pub pages_created: usize,
    pub photos_placed: usize,
    /// Photos left in the pool because their batch had no template.
    pub photos_skipped: usize,
    /// Indices of the new pages, in creation order.
    pub new_pages: Vec<usize>,
}

// ────────────────────────────────────────────────────────────────────────────
// Run
// ────────────────────────────────────────────────────────────────────────────

/// Places every pool photo onto newly appended pages.
pub fn auto_layout(
    editor: &mut PhotobookEditor,
    table: &TemplateTable,
    config: &AutoLayoutConfig,
) -> AutoLayoutReport {
    let batch_max = config.batch_max.max(1);
    let mut report = AutoLayoutReport::default();

    let mut buckets: HashMap<Orientation, Vec<PhotoItem>> = HashMap::new();
    for photo in editor.pool() {
        buckets
            .entry(Orientation::of(photo))
            .or_default()
            .push(photo.clone());
    }

    for orientation in &config.order {
        let Some(bucket) = buckets.remove(orientation) else {
            continue;
        };

        for batch in bucket.chunks(batch_max) {
            let Some(page) = build_page(editor, table, *orientation, batch) else {
                warn!(
                    "auto-layout: no template for {} x{}, leaving photos in pool",
                    orientation,
                    batch.len()
                );
                report.photos_skipped += batch.len();
                continue;
            };

            let ids: HashSet<String> = batch.iter().map(|p| p.id.clone()).collect();
            editor.remove_from_pool(&ids);
            editor.push_page(page);

            report.pages_created += 1;
            report.photos_placed += batch.len();
            report.new_pages.push(editor.page_count() - 1);
        }
    }

    report
}

/// A page for `batch`, or `None` if the table or catalog has no template that the
/// batch fills exactly.
fn build_page(
    editor: &PhotobookEditor,
    table: &TemplateTable,
    orientation: Orientation,
    batch: &[PhotoItem],
) -> Option<Page> {
    let id = table.lookup(orientation, batch.len())?;
    let template = editor.catalog().get(id.as_str()).ok()?;
    if template.capacity() != batch.len() {
        return None;
    }

    let mut page = Page::with_template(template);
    for (slot, photo) in page.slots.iter_mut().zip(batch) {
        slot.placement = Some(Placement::new(photo.clone()));
    }
    debug_assert!(page.is_full());
    Some(page)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
