use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::chainage::{parse_chainage, ReferenceLine};
use crate::cost::{compute_cost, CostBreakdown};
use crate::extract::{normalize_for_costing, ExtractedQuantity, QuantityExtractor};
use crate::model::{MapPoint, ResultItem};
use crate::session::ManualEntry;
use crate::tables::{PriceTable, SpecTable};
use crate::util::escape_csv_cell;

/// How far back from a keyword occurrence to look for a chainage label.
/// Tuned to the source report layout.
pub const CHAINAGE_SEARCH_WINDOW: usize = 150;

/// Uniform output of both estimation modes.
#[derive(Debug, Clone)]
pub struct Estimate {
    pub grand_total: f64,
    pub items: Vec<ResultItem>,
    pub map_points: Vec<MapPoint>,
    pub report: String,
}

/// Drives the extractor and aggregator over a document or a manual entry
/// list. Holds the compiled patterns and the map reference line.
#[derive(Debug)]
pub struct Estimator {
    extractor: QuantityExtractor,
    chainage_label: Regex,
    reference_line: ReferenceLine,
}

impl Estimator {
    pub fn new() -> Result<Self> {
        Self::with_reference_line(ReferenceLine::default())
    }

    pub fn with_reference_line(reference_line: ReferenceLine) -> Result<Self> {
        Ok(Self {
            extractor: QuantityExtractor::new()?,
            chainage_label: Regex::new(r"(\d+\+\d+)")
                .context("failed to compile chainage label regex")?,
            reference_line,
        })
    }

    /// Batch mode: every spec-table intervention whose key appears in the
    /// document (case-insensitive) is extracted, priced, and reported.
    pub fn estimate_document(
        &self,
        spec_table: &SpecTable,
        prices: &PriceTable,
        document: &str,
    ) -> Estimate {
        let text = document.to_lowercase();
        let mut report = ReportBuilder::new();
        let mut items = Vec::new();
        let mut map_points = Vec::new();
        let mut grand_total = 0.0;

        for spec in spec_table.interventions() {
            let needle = spec.key.to_lowercase();
            if !text.contains(needle.as_str()) {
                continue;
            }

            let extracted = self.extractor.extract(spec, &text);
            debug!(
                key = %spec.key,
                schedule = spec.schedule.kind().as_str(),
                quantity = extracted.quantity,
                unit = %extracted.unit,
                "intervention matched"
            );

            let normalized = normalize_for_costing(spec);
            let costing_spec = normalized.as_ref().unwrap_or(spec);
            let breakdown = compute_cost(costing_spec, extracted.quantity, prices);

            let chainage_label = self.find_chainage_label(&text, &needle);
            let position = chainage_label
                .as_deref()
                .and_then(parse_chainage)
                .map(|offset_m| self.reference_line.locate(offset_m));
            if let (Some(label), Some(point)) = (chainage_label.as_deref(), position) {
                map_points.push(MapPoint {
                    label: format!("{} (at {})", spec.key, label),
                    lat: point.lat,
                    lon: point.lon,
                });
            }

            report.push_item(&spec.key, &extracted, &spec.source_clause, &breakdown);
            grand_total += breakdown.item_total;
            items.push(ResultItem {
                key: spec.key.clone(),
                quantity: extracted.quantity,
                unit: extracted.unit,
                source_clause: spec.source_clause.clone(),
                material_cost: breakdown.item_total,
                lines: breakdown.lines,
                chainage_label,
                position,
            });
        }

        report.push_summary(grand_total);
        Estimate {
            grand_total,
            items,
            map_points,
            report: report.finish(),
        }
    }

    /// Manual mode: aggregates caller-entered quantities directly; no
    /// extraction, no chainage search, no road-studs normalization.
    pub fn estimate_manual(
        &self,
        spec_table: &SpecTable,
        prices: &PriceTable,
        entries: &[ManualEntry],
    ) -> Result<Estimate> {
        let mut report = ReportBuilder::new();
        let mut items = Vec::new();
        let mut grand_total = 0.0;

        for entry in entries {
            let spec = spec_table
                .get(&entry.key)
                .with_context(|| format!("unknown intervention '{}'", entry.key))?;

            let quantity = ExtractedQuantity {
                quantity: entry.quantity,
                unit: entry.unit.clone(),
            };
            let breakdown = compute_cost(spec, entry.quantity, prices);

            report.push_item(&spec.key, &quantity, &spec.source_clause, &breakdown);
            grand_total += breakdown.item_total;
            items.push(ResultItem {
                key: spec.key.clone(),
                quantity: entry.quantity,
                unit: entry.unit.clone(),
                source_clause: spec.source_clause.clone(),
                material_cost: breakdown.item_total,
                lines: breakdown.lines,
                chainage_label: None,
                position: None,
            });
        }

        report.push_summary(grand_total);
        Ok(Estimate {
            grand_total,
            items,
            map_points: Vec::new(),
            report: report.finish(),
        })
    }

    /// Scans each occurrence of the key and returns the first chainage label
    /// found in the fixed-size window of preceding characters.
    fn find_chainage_label(&self, text: &str, needle: &str) -> Option<String> {
        for (start, _) in text.match_indices(needle) {
            let mut window_start = start.saturating_sub(CHAINAGE_SEARCH_WINDOW);
            while !text.is_char_boundary(window_start) {
                window_start += 1;
            }
            let window = &text[window_start..start];
            if let Some(caps) = self.chainage_label.captures(window) {
                return Some(caps[1].to_string());
            }
        }
        None
    }
}

/// Delimited-text export of the result list, one row per intervention.
pub fn summary_csv(items: &[ResultItem]) -> String {
    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push("Intervention,Quantity,Unit,Source Clause,Material Cost (INR)".to_string());
    for item in items {
        rows.push(
            [
                escape_csv_cell(&item.key),
                format!("{:.2}", item.quantity),
                escape_csv_cell(&item.unit),
                escape_csv_cell(&item.source_clause),
                format!("{:.2}", item.material_cost),
            ]
            .join(","),
        );
    }
    rows.join("\n")
}

/// Sequential plain-text report mirroring every computed quantity, price, and
/// subtotal. Header lines (input name, timestamp) are prepended by the
/// command layer so this stays deterministic.
#[derive(Debug)]
struct ReportBuilder {
    lines: Vec<String>,
}

impl ReportBuilder {
    fn new() -> Self {
        Self {
            lines: vec![
                "ITEMIZED COST BREAKDOWN".to_string(),
                "-".repeat(40),
                String::new(),
            ],
        }
    }

    fn push_item(
        &mut self,
        key: &str,
        quantity: &ExtractedQuantity,
        source_clause: &str,
        breakdown: &CostBreakdown,
    ) {
        self.lines.push(format!("Intervention: {}", key.to_uppercase()));
        self.lines.push(format!(
            "  Quantity Found: {:.2} {}(s)",
            quantity.quantity, quantity.unit
        ));
        self.lines.push(format!("  Source Clause: {}", source_clause));
        self.lines.push("  Cost Breakdown:".to_string());

        for line in &breakdown.lines {
            match (line.unit_price, line.line_cost) {
                (Some(price), Some(cost)) => self.lines.push(format!(
                    "    - {}: {:.2} units @ ₹{:.2}/unit = ₹{:.2}",
                    line.name, line.qty_needed, price, cost
                )),
                _ => self.lines.push(format!(
                    "    - {}: {:.2} units @ PRICE NOT FOUND",
                    line.name, line.qty_needed
                )),
            }
        }

        self.lines
            .push(format!("  TOTAL for {}: ₹{:.2}", key, breakdown.item_total));
        self.lines.push(String::new());
    }

    fn push_summary(&mut self, grand_total: f64) {
        self.lines.push("SUMMARY".to_string());
        self.lines.push("-".repeat(40));
        self.lines.push(format!(
            "TOTAL ESTIMATED MATERIAL COST: ₹{:.2}",
            grand_total
        ));
        self.lines
            .push("(Note: material costs only; excludes labor, installation, taxes.)".to_string());
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}
