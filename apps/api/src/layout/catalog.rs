//! Page templates: grid layouts a page can take, and the registry they are looked up in.
//!
//! Templates are built once at startup and never change afterwards. The catalog is
//! shared read-only (`Arc<TemplateCatalog>` in `AppState`) and looked up by id.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layout::error::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Built-in template ids
// ────────────────────────────────────────────────────────────────────────────

pub const FULL_BLEED: &str = "full-bleed";
pub const SPLIT_STACKED: &str = "split-stacked";
pub const SPLIT_SIDE: &str = "split-side";
pub const FEATURE_TOP: &str = "feature-top";
pub const FEATURE_LEFT: &str = "feature-left";
pub const TRIPTYCH: &str = "triptych";
pub const GRID_2X2: &str = "grid-2x2";
pub const HERO_TOP: &str = "hero-top";
pub const HERO_LEFT: &str = "hero-left";
pub const GRID_3X2: &str = "grid-3x2";
pub const GRID_3X3: &str = "grid-3x3";

/// Template a new page gets when the caller does not name one.
pub const DEFAULT_TEMPLATE: &str = FULL_BLEED;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Identifier of a registered template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(id: &str) -> Self {
        TemplateId(id.to_string())
    }
}

impl Default for TemplateId {
    fn default() -> Self {
        TemplateId::from(DEFAULT_TEMPLATE)
    }
}

/// How a photo fills its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// Scale to cover the whole slot, cropping the overflow.
    #[default]
    Cover,
    /// Scale to fit inside the slot, letterboxing the remainder.
    Contain,
}

/// Fixed grid cell for a slot's top-left corner (0-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub column: u8,
    pub row: u8,
}

/// One photo-holding region of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDescriptor {
    pub id: String,
    pub col_span: u8,
    pub row_span: u8,
    pub fit: FitMode,
    /// Absent means the slot flows into the next free cell.
    pub position: Option<GridPosition>,
}

/// A named grid layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub columns: u8,
    pub rows: u8,
    pub slots: Vec<SlotDescriptor>,
}

impl Template {
    /// Number of photos a page using this template can hold.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Grid cells covered by all slot spans together.
    pub fn cells_required(&self) -> u32 {
        self.slots
            .iter()
            .map(|s| s.col_span as u32 * s.row_span as u32)
            .sum()
    }

    /// True when the slot spans cover the declared grid without needing extra cells.
    pub fn tiles_grid(&self) -> bool {
        self.cells_required() <= self.columns as u32 * self.rows as u32
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog
// ────────────────────────────────────────────────────────────────────────────

/// Read-only registry of templates, in registration order.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
    index: HashMap<TemplateId, usize>,
}

impl TemplateCatalog {
    /// Builds a catalog from an ordered template list. Later duplicates of an id are
    /// ignored, as are templates whose slot spans need more cells than the grid has.
    pub fn from_templates(templates: Vec<Template>) -> Self {
        let mut kept = Vec::with_capacity(templates.len());
        let mut index = HashMap::with_capacity(templates.len());
        for template in templates {
            if index.contains_key(&template.id) {
                continue;
            }
            if !template.tiles_grid() {
                warn!(
                    "Skipping template {}: slots cover {} cells on a {}x{} grid",
                    template.id,
                    template.cells_required(),
                    template.columns,
                    template.rows
                );
                continue;
            }
            index.insert(template.id.clone(), kept.len());
            kept.push(template);
        }
        TemplateCatalog {
            templates: kept,
            index,
        }
    }

    /// The hard-coded template table seeded at process start.
    pub fn builtin() -> Self {
        Self::from_templates(vec![
            grid_template(FULL_BLEED, "Full bleed", 1, 1, &[(1, 1)]),
            grid_template(SPLIT_STACKED, "Two stacked", 1, 2, &[(1, 1), (1, 1)]),
            grid_template(SPLIT_SIDE, "Two side by side", 2, 1, &[(1, 1), (1, 1)]),
            anchored(grid_template(
                FEATURE_TOP,
                "Feature top + two",
                2,
                2,
                &[(2, 1), (1, 1), (1, 1)],
            )),
            anchored(grid_template(
                FEATURE_LEFT,
                "Feature left + two",
                2,
                2,
                &[(1, 2), (1, 1), (1, 1)],
            )),
            grid_template(TRIPTYCH, "Triptych", 3, 1, &[(1, 1); 3]),
            grid_template(GRID_2X2, "Grid 2×2", 2, 2, &[(1, 1); 4]),
            anchored(grid_template(
                HERO_TOP,
                "Hero top + four",
                4,
                2,
                &[(4, 1), (1, 1), (1, 1), (1, 1), (1, 1)],
            )),
            anchored(grid_template(
                HERO_LEFT,
                "Hero left + four",
                3,
                2,
                &[(1, 2), (1, 1), (1, 1), (1, 1), (1, 1)],
            )),
            grid_template(GRID_3X2, "Grid 3×2", 3, 2, &[(1, 1); 6]),
            grid_template(GRID_3X3, "Grid 3×3", 3, 3, &[(1, 1); 9]),
        ])
    }

    /// All templates, same order on every call.
    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: &str) -> Result<&Template, LayoutError> {
        self.index
            .get(&TemplateId::from(id))
            .map(|&i| &self.templates[i])
            .ok_or_else(|| LayoutError::TemplateNotFound(id.to_string()))
    }
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn grid_template(id: &str, name: &str, columns: u8, rows: u8, spans: &[(u8, u8)]) -> Template {
    let slots = spans
        .iter()
        .enumerate()
        .map(|(i, &(col_span, row_span))| SlotDescriptor {
            id: format!("{id}/{}", i + 1),
            col_span,
            row_span,
            fit: FitMode::Cover,
            position: None,
        })
        .collect();

    Template {
        id: TemplateId::from(id),
        name: name.to_string(),
        columns,
        rows,
        slots,
    }
}

/// Pins the first (emphasis) slot to the top-left cell.
fn anchored(mut template: Template) -> Template {
    if let Some(first) = template.slots.first_mut() {
        first.position = Some(GridPosition { column: 0, row: 0 });
    }
    template
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
