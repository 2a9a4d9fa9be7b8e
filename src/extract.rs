use anyhow::{Context, Result};
use regex::{Captures, Regex};

use crate::chainage::ChainageRange;
use crate::model::{InterventionSpec, MaterialSchedule, ScheduleKind};

/// Stretch assumed for streetlights when the report says "entire stretch"
/// without a length. A tuned default, not a measurement.
pub const STREETLIGHT_ASSUMED_STRETCH_M: f64 = 1000.0;

/// Stud spacing along one road edge; studs are placed on both edges.
pub const ROAD_STUD_SPACING_M: f64 = 9.0;

const KEY_LONGITUDINAL_MARKINGS: &str = "longitudinal markings";
const KEY_STREETLIGHTS: &str = "streetlights";
const KEY_ROAD_STUDS: &str = "road studs";
const KEY_POTHOLE: &str = "pothole";

/// Quantity derived from the report text, with its display unit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedQuantity {
    pub quantity: f64,
    pub unit: String,
}

impl ExtractedQuantity {
    fn new(quantity: f64, unit: &str) -> Self {
        Self {
            quantity,
            unit: unit.to_string(),
        }
    }
}

/// Compiled pattern set for quantity derivation. The patterns are tuned to
/// one report format: case-insensitive, first match wins, decimal numbers for
/// area/depth and integers for lengths and chainage parts.
#[derive(Debug)]
pub struct QuantityExtractor {
    marking_length: Regex,
    chainage_range: Regex,
    area_sqm: Regex,
    depth_mm: Regex,
}

impl QuantityExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            marking_length: Regex::new(r"(?i)(\d+)\s*m")
                .context("failed to compile marking length regex")?,
            chainage_range: Regex::new(r"(?i)(\d+)\+(\d+)\s+to\s+(\d+)\+(\d+)")
                .context("failed to compile chainage range regex")?,
            area_sqm: Regex::new(r"(?i)area\s*([\d\.]+)\s*sqm")
                .context("failed to compile pothole area regex")?,
            depth_mm: Regex::new(r"(?i)([\d\.]+)\s*mm\s*depth")
                .context("failed to compile pothole depth regex")?,
        })
    }

    /// Derives `(quantity, unit)` for one intervention from the report text.
    /// Absent or malformed numeric text never fails; each branch falls back
    /// to its documented default.
    pub fn extract(&self, spec: &InterventionSpec, text: &str) -> ExtractedQuantity {
        match spec.schedule.kind() {
            ScheduleKind::PerMeter => self.extract_per_meter(&spec.key, text),
            ScheduleKind::PerItem => self.extract_per_item(&spec.key, text),
            ScheduleKind::PerCubicMeter => self.extract_per_cubic_meter(&spec.key, text),
            ScheduleKind::PerSquareMeter20mm => self.extract_per_sqm_20mm(&spec.key, text),
        }
    }

    fn extract_per_meter(&self, key: &str, text: &str) -> ExtractedQuantity {
        if key.eq_ignore_ascii_case(KEY_ROAD_STUDS) {
            // Road studs are counted, not measured: a chainage range fixes the
            // stretch, spacing fixes the stud count on both edges.
            let quantity = self
                .chainage_range
                .captures(text)
                .and_then(|caps| stud_count_for_range(&caps))
                .unwrap_or(1.0);
            return ExtractedQuantity::new(quantity, "item");
        }

        let quantity = if key.eq_ignore_ascii_case(KEY_LONGITUDINAL_MARKINGS) {
            first_number(&self.marking_length, text).unwrap_or(1.0)
        } else if key.eq_ignore_ascii_case(KEY_STREETLIGHTS) {
            STREETLIGHT_ASSUMED_STRETCH_M
        } else {
            1.0
        };
        ExtractedQuantity::new(quantity, "meter")
    }

    fn extract_per_item(&self, key: &str, text: &str) -> ExtractedQuantity {
        let count = count_occurrences(text, key).max(1);
        ExtractedQuantity::new(count as f64, "item")
    }

    fn extract_per_cubic_meter(&self, key: &str, text: &str) -> ExtractedQuantity {
        let mut quantity = 0.0;
        if key.eq_ignore_ascii_case(KEY_POTHOLE) {
            if let (Some(area_sqm), Some(depth_mm)) = (
                first_number(&self.area_sqm, text),
                first_number(&self.depth_mm, text),
            ) {
                quantity = area_sqm * (depth_mm / 1000.0);
            }
        }
        ExtractedQuantity::new(quantity, "m^3")
    }

    fn extract_per_sqm_20mm(&self, key: &str, text: &str) -> ExtractedQuantity {
        let mut quantity = 1.0;
        if key.eq_ignore_ascii_case(KEY_POTHOLE) {
            if let Some(area_sqm) = first_number(&self.area_sqm, text) {
                quantity = area_sqm;
            }
        }
        ExtractedQuantity::new(quantity, "sqm")
    }
}

/// Road studs are priced per stud once the count is known. Returns a per-item
/// copy of a per-meter road-studs spec with the first requirement pinned to
/// one unit per stud; `None` when no normalization applies. The input spec is
/// never mutated.
pub fn normalize_for_costing(spec: &InterventionSpec) -> Option<InterventionSpec> {
    if !spec.key.eq_ignore_ascii_case(KEY_ROAD_STUDS) {
        return None;
    }
    let MaterialSchedule::PerMeter(materials) = &spec.schedule else {
        return None;
    };

    let mut materials = materials.clone();
    if let Some(first) = materials.first_mut() {
        first.quantity = 1.0;
    }
    Some(InterventionSpec {
        key: spec.key.clone(),
        source_clause: spec.source_clause.clone(),
        schedule: MaterialSchedule::PerItem(materials),
    })
}

fn stud_count_for_range(caps: &Captures<'_>) -> Option<f64> {
    let start = caps[1].parse::<i64>().ok()? * 1000 + caps[2].parse::<i64>().ok()?;
    let end = caps[3].parse::<i64>().ok()? * 1000 + caps[4].parse::<i64>().ok()?;
    let range = ChainageRange {
        start_m: start,
        end_m: end,
    };

    let studs_per_edge = (range.length_m() as f64 / ROAD_STUD_SPACING_M).ceil();
    Some(studs_per_edge * 2.0)
}

fn first_number(pattern: &Regex, text: &str) -> Option<f64> {
    let caps = pattern.captures(text)?;
    caps[1].parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Non-overlapping, case-insensitive occurrence count of `key` in `text`.
fn count_occurrences(text: &str, key: &str) -> usize {
    let haystack = text.to_lowercase();
    let needle = key.to_lowercase();
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle.as_str()).count()
}

#[cfg(test)]
mod tests {
    use super::{normalize_for_costing, ExtractedQuantity, QuantityExtractor};
    use crate::model::{InterventionSpec, MaterialRequirement, MaterialSchedule, ScheduleKind};

    fn spec(key: &str, schedule: MaterialSchedule) -> InterventionSpec {
        InterventionSpec {
            key: key.to_string(),
            source_clause: "clause".to_string(),
            schedule,
        }
    }

    fn requirement(name: &str, quantity: f64) -> MaterialRequirement {
        MaterialRequirement {
            name: name.to_string(),
            quantity,
            unit: "kg".to_string(),
        }
    }

    fn extractor() -> QuantityExtractor {
        QuantityExtractor::new().expect("patterns should compile")
    }

    #[test]
    fn road_studs_quantity_follows_chainage_range() {
        let spec = spec(
            "Road Studs",
            MaterialSchedule::PerMeter(vec![requirement("Reflective Road Stud", 0.25)]),
        );
        let text = "install road studs from 4+100 to 4+200 on both edges";

        let extracted = extractor().extract(&spec, text);
        // 100 m stretch, ceil(100 / 9) = 12 per edge, both edges.
        assert_eq!(extracted, ExtractedQuantity::new(24.0, "item"));
    }

    #[test]
    fn road_studs_without_chainage_default_to_one_item() {
        let spec = spec(
            "Road Studs",
            MaterialSchedule::PerMeter(vec![requirement("Reflective Road Stud", 0.25)]),
        );

        let extracted = extractor().extract(&spec, "replace the missing road studs");
        assert_eq!(extracted, ExtractedQuantity::new(1.0, "item"));
    }

    #[test]
    fn longitudinal_markings_read_length_in_meters() {
        let spec = spec(
            "Longitudinal Markings",
            MaterialSchedule::PerMeter(vec![requirement("Thermoplastic Paint", 0.6)]),
        );

        let extracted = extractor().extract(&spec, "repaint longitudinal markings over 250 m");
        assert_eq!(extracted, ExtractedQuantity::new(250.0, "meter"));
    }

    #[test]
    fn longitudinal_markings_without_length_default_to_one_meter() {
        let spec = spec(
            "Longitudinal Markings",
            MaterialSchedule::PerMeter(vec![requirement("Thermoplastic Paint", 0.6)]),
        );

        let extracted = extractor().extract(&spec, "faded longitudinal markings observed");
        assert_eq!(extracted, ExtractedQuantity::new(1.0, "meter"));
    }

    #[test]
    fn streetlights_use_the_assumed_stretch() {
        let spec = spec(
            "Streetlights",
            MaterialSchedule::PerMeter(vec![requirement("LED Street Light Fitting", 0.033)]),
        );

        let extracted = extractor().extract(&spec, "streetlights missing for the entire stretch");
        assert_eq!(extracted, ExtractedQuantity::new(1000.0, "meter"));
    }

    #[test]
    fn generic_per_meter_interventions_default_to_one_meter() {
        let spec = spec(
            "Guardrail",
            MaterialSchedule::PerMeter(vec![requirement("W-Beam Section", 1.0)]),
        );

        let extracted = extractor().extract(&spec, "damaged guardrail near the bridge");
        assert_eq!(extracted, ExtractedQuantity::new(1.0, "meter"));
    }

    #[test]
    fn per_item_interventions_count_occurrences() {
        let spec = spec(
            "Signage",
            MaterialSchedule::PerItem(vec![requirement("Sign Board", 1.0)]),
        );
        let text = "SIGNAGE missing at km 4; additional signage required near the school";

        let extracted = extractor().extract(&spec, text);
        assert_eq!(extracted, ExtractedQuantity::new(2.0, "item"));
    }

    #[test]
    fn per_item_count_floors_at_one() {
        let spec = spec(
            "Signage",
            MaterialSchedule::PerItem(vec![requirement("Sign Board", 1.0)]),
        );

        let extracted = extractor().extract(&spec, "no matching keyword in this text");
        assert_eq!(extracted, ExtractedQuantity::new(1.0, "item"));
    }

    #[test]
    fn pothole_volume_needs_area_and_depth() {
        let spec = spec(
            "Pothole",
            MaterialSchedule::PerCubicMeter(vec![requirement("Bituminous Cold Mix", 1.0)]),
        );
        let text = "pothole of area 12.5 sqm and 50 mm depth on the carriageway";

        let extracted = extractor().extract(&spec, text);
        assert_eq!(extracted.unit, "m^3");
        assert!((extracted.quantity - 0.625).abs() < 1e-12);
    }

    #[test]
    fn pothole_volume_is_zero_when_a_dimension_is_missing() {
        let spec = spec(
            "Pothole",
            MaterialSchedule::PerCubicMeter(vec![requirement("Bituminous Cold Mix", 1.0)]),
        );

        let extracted = extractor().extract(&spec, "pothole of area 12.5 sqm");
        assert_eq!(extracted, ExtractedQuantity::new(0.0, "m^3"));
    }

    #[test]
    fn pothole_surface_area_reads_the_area_pattern() {
        let spec = spec(
            "Pothole",
            MaterialSchedule::PerSquareMeter20mm(vec![requirement("Micro Surfacing Mix", 3.2)]),
        );

        let extracted = extractor().extract(&spec, "pothole patch, area 8.4 sqm");
        assert_eq!(extracted.unit, "sqm");
        assert!((extracted.quantity - 8.4).abs() < 1e-12);
    }

    #[test]
    fn pothole_surface_area_defaults_to_one_sqm() {
        let spec = spec(
            "Pothole",
            MaterialSchedule::PerSquareMeter20mm(vec![requirement("Micro Surfacing Mix", 3.2)]),
        );

        let extracted = extractor().extract(&spec, "pothole reported near the junction");
        assert_eq!(extracted, ExtractedQuantity::new(1.0, "sqm"));
    }

    #[test]
    fn road_studs_normalization_yields_per_item_schedule() {
        let original = spec(
            "Road Studs",
            MaterialSchedule::PerMeter(vec![
                requirement("Reflective Road Stud", 0.25),
                requirement("Epoxy Adhesive", 0.05),
            ]),
        );

        let normalized =
            normalize_for_costing(&original).expect("per-meter road studs should normalize");
        assert_eq!(normalized.schedule.kind(), ScheduleKind::PerItem);
        assert_eq!(normalized.schedule.materials()[0].quantity, 1.0);
        // Remaining requirements keep their stated quantities.
        assert_eq!(normalized.schedule.materials()[1].quantity, 0.05);
        // The input spec is untouched.
        assert_eq!(original.schedule.materials()[0].quantity, 0.25);
    }

    #[test]
    fn normalization_leaves_other_interventions_alone() {
        let signage = spec(
            "Signage",
            MaterialSchedule::PerItem(vec![requirement("Sign Board", 1.0)]),
        );
        assert!(normalize_for_costing(&signage).is_none());
    }
}
