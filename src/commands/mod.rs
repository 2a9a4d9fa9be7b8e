pub mod estimate;
pub mod explain;
pub mod manual;

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::estimate::Estimate;
use crate::tables::{parse_price_override, PriceTable, SpecTable};

pub(crate) fn load_tables(
    spec_path: &Path,
    prices_path: &Path,
    overrides: &[String],
) -> Result<(SpecTable, PriceTable)> {
    let spec_table = SpecTable::load(spec_path)?;
    let mut prices = PriceTable::load(prices_path)?;

    let parsed: Vec<(String, f64)> = overrides
        .iter()
        .map(|raw| parse_price_override(raw))
        .collect::<Result<_>>()?;
    prices.apply_overrides(&parsed)?;

    if prices.is_empty() {
        warn!("price table is empty; every material line will be priced as not found");
    }
    info!(
        interventions = spec_table.len(),
        materials = prices.len(),
        overrides = parsed.len(),
        "tables loaded"
    );
    Ok((spec_table, prices))
}

pub(crate) fn warn_missing_prices(estimate: &Estimate) {
    for item in &estimate.items {
        for line in &item.lines {
            if !line.price_found() {
                warn!(material = %line.name, intervention = %item.key, "price not found");
            }
        }
    }
}

pub(crate) fn log_kpis(estimate: &Estimate) {
    info!(
        grand_total = estimate.grand_total,
        interventions = estimate.items.len(),
        "estimation complete"
    );

    if let Some(most_expensive) = estimate
        .items
        .iter()
        .max_by(|a, b| a.material_cost.total_cmp(&b.material_cost))
    {
        info!(
            key = %most_expensive.key,
            material_cost = most_expensive.material_cost,
            "most expensive intervention"
        );
    }
}
