use crate::model::{InterventionSpec, MaterialLine};
use crate::tables::PriceTable;

/// Priced material expansion for one intervention at a given quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CostBreakdown {
    pub item_total: f64,
    pub lines: Vec<MaterialLine>,
}

/// Expands the spec's material schedule at `quantity` and prices each line.
/// Materials missing from the price table are reported with no price and
/// contribute nothing to `item_total`. Deterministic: same inputs, same
/// breakdown.
pub fn compute_cost(spec: &InterventionSpec, quantity: f64, prices: &PriceTable) -> CostBreakdown {
    let materials = spec.schedule.materials();
    let mut lines = Vec::with_capacity(materials.len());
    let mut item_total = 0.0;

    for requirement in materials {
        let qty_needed = requirement.quantity * quantity;
        let unit_price = prices.price_of(&requirement.name);
        let line_cost = unit_price.map(|price| qty_needed * price);
        if let Some(cost) = line_cost {
            item_total += cost;
        }

        lines.push(MaterialLine {
            name: requirement.name.clone(),
            qty_needed,
            unit: requirement.unit.clone(),
            unit_price,
            line_cost,
        });
    }

    CostBreakdown { item_total, lines }
}
