use serde::{Deserialize, Serialize};

use crate::chainage::GeoPoint;

/// One material needed per unit of an intervention's measurement category.
/// `name` joins the price table by exact match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleKind {
    PerItem,
    PerMeter,
    PerCubicMeter,
    PerSquareMeter20mm,
}

impl ScheduleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleKind::PerItem => "per_item",
            ScheduleKind::PerMeter => "per_meter",
            ScheduleKind::PerCubicMeter => "per_cubic_meter",
            ScheduleKind::PerSquareMeter20mm => "per_sqm_20mm",
        }
    }

    pub fn default_unit(self) -> &'static str {
        match self {
            ScheduleKind::PerItem => "item",
            ScheduleKind::PerMeter => "meter",
            ScheduleKind::PerCubicMeter => "m^3",
            ScheduleKind::PerSquareMeter20mm => "sqm",
        }
    }
}

/// Material bill of quantities, tagged with its measurement category.
/// Exactly one category exists per intervention; the variant is chosen once
/// at table-load time.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSchedule {
    PerItem(Vec<MaterialRequirement>),
    PerMeter(Vec<MaterialRequirement>),
    PerCubicMeter(Vec<MaterialRequirement>),
    PerSquareMeter20mm(Vec<MaterialRequirement>),
}

impl MaterialSchedule {
    pub fn kind(&self) -> ScheduleKind {
        match self {
            MaterialSchedule::PerItem(_) => ScheduleKind::PerItem,
            MaterialSchedule::PerMeter(_) => ScheduleKind::PerMeter,
            MaterialSchedule::PerCubicMeter(_) => ScheduleKind::PerCubicMeter,
            MaterialSchedule::PerSquareMeter20mm(_) => ScheduleKind::PerSquareMeter20mm,
        }
    }

    pub fn materials(&self) -> &[MaterialRequirement] {
        match self {
            MaterialSchedule::PerItem(materials)
            | MaterialSchedule::PerMeter(materials)
            | MaterialSchedule::PerCubicMeter(materials)
            | MaterialSchedule::PerSquareMeter20mm(materials) => materials,
        }
    }
}

/// A validated specification-table row: one intervention type, its citation
/// clause, and its material schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct InterventionSpec {
    pub key: String,
    pub source_clause: String,
    pub schedule: MaterialSchedule,
}

/// Raw specification-table row as persisted in `database.json`. The schema is
/// fixed: `source_clause` plus exactly one of the four material-list keys.
/// Validation into [`InterventionSpec`] happens in `tables`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSpecEntry {
    pub source_clause: String,
    #[serde(default)]
    pub materials_per_item: Option<Vec<MaterialRequirement>>,
    #[serde(default)]
    pub materials_per_meter: Option<Vec<MaterialRequirement>>,
    #[serde(default)]
    pub materials_per_cubic_meter: Option<Vec<MaterialRequirement>>,
    #[serde(default)]
    pub materials_per_sqm_20mm: Option<Vec<MaterialRequirement>>,
}

/// Per-material breakdown row. `unit_price`/`line_cost` are `None` when the
/// material is absent from the price table, which is distinct from zero cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialLine {
    pub name: String,
    pub qty_needed: f64,
    pub unit: String,
    pub unit_price: Option<f64>,
    pub line_cost: Option<f64>,
}

impl MaterialLine {
    pub fn price_found(&self) -> bool {
        self.unit_price.is_some()
    }
}

/// Output of one intervention's evaluation. Immutable once created; the list
/// is discarded at the end of each run.
#[derive(Debug, Clone, Serialize)]
pub struct ResultItem {
    pub key: String,
    pub quantity: f64,
    pub unit: String,
    pub source_clause: String,
    pub material_cost: f64,
    pub lines: Vec<MaterialLine>,
    pub chainage_label: Option<String>,
    pub position: Option<GeoPoint>,
}

/// One plotted intervention location along the reference line.
#[derive(Debug, Clone, Serialize)]
pub struct MapPoint {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

/// Run summary manifest written next to the report outputs.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateSummary {
    pub generated_at: String,
    pub mode: String,
    pub input_path: Option<String>,
    pub input_sha256: Option<String>,
    pub intervention_count: usize,
    pub grand_total: f64,
    pub items: Vec<ResultItem>,
    pub map_points: Vec<MapPoint>,
}
