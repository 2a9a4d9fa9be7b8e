use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::model::{InterventionSpec, MaterialSchedule, RawSpecEntry};

/// Validated specification table. Interventions are kept in lexicographic key
/// order so every run visits them deterministically.
#[derive(Debug, Clone, Default)]
pub struct SpecTable {
    interventions: Vec<InterventionSpec>,
}

impl SpecTable {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .with_context(|| format!("failed to read specification table: {}", path.display()))?;
        let entries: BTreeMap<String, RawSpecEntry> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse specification table: {}", path.display()))?;

        let mut interventions = Vec::with_capacity(entries.len());
        for (key, entry) in entries {
            interventions.push(validate_spec_entry(key, entry)?);
        }

        if interventions.is_empty() {
            bail!("specification table {} has no interventions", path.display());
        }

        Ok(Self { interventions })
    }

    pub fn new(interventions: Vec<InterventionSpec>) -> Self {
        Self { interventions }
    }

    pub fn interventions(&self) -> &[InterventionSpec] {
        &self.interventions
    }

    /// Case-insensitive lookup by intervention key.
    pub fn get(&self, key: &str) -> Option<&InterventionSpec> {
        self.interventions
            .iter()
            .find(|spec| spec.key.eq_ignore_ascii_case(key))
    }

    pub fn len(&self) -> usize {
        self.interventions.len()
    }
}

fn validate_spec_entry(key: String, entry: RawSpecEntry) -> Result<InterventionSpec> {
    let mut schedules = Vec::new();
    if let Some(materials) = entry.materials_per_item {
        schedules.push(MaterialSchedule::PerItem(materials));
    }
    if let Some(materials) = entry.materials_per_meter {
        schedules.push(MaterialSchedule::PerMeter(materials));
    }
    if let Some(materials) = entry.materials_per_cubic_meter {
        schedules.push(MaterialSchedule::PerCubicMeter(materials));
    }
    if let Some(materials) = entry.materials_per_sqm_20mm {
        schedules.push(MaterialSchedule::PerSquareMeter20mm(materials));
    }

    let schedule = match schedules.len() {
        1 => schedules.remove(0),
        0 => bail!("intervention '{}' declares no material schedule", key),
        found => bail!(
            "intervention '{}' declares {} material schedules; exactly one is allowed",
            key,
            found
        ),
    };

    if schedule.materials().is_empty() {
        bail!("intervention '{}' has an empty material list", key);
    }
    for requirement in schedule.materials() {
        if requirement.name.trim().is_empty() {
            bail!("intervention '{}' has a material with an empty name", key);
        }
        if !(requirement.quantity > 0.0) {
            bail!(
                "material '{}' in intervention '{}' must have a positive quantity, got {}",
                requirement.name,
                key,
                requirement.quantity
            );
        }
    }

    Ok(InterventionSpec {
        key,
        source_clause: entry.source_clause,
        schedule,
    })
}

/// Material unit prices, keyed by exact material name. A missing name means
/// the price is unknown, not zero.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: BTreeMap<String, f64>,
}

impl PriceTable {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path)
            .with_context(|| format!("failed to read price table: {}", path.display()))?;
        let prices: BTreeMap<String, f64> = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse price table: {}", path.display()))?;

        let mut table = Self::default();
        for (name, price) in prices {
            table
                .set(&name, price)
                .with_context(|| format!("invalid price table entry in {}", path.display()))?;
        }
        Ok(table)
    }

    pub fn set(&mut self, name: &str, price: f64) -> Result<()> {
        if name.trim().is_empty() {
            bail!("material name must not be empty");
        }
        if !price.is_finite() || price < 0.0 {
            bail!("price for '{}' must be a non-negative number, got {}", name, price);
        }
        self.prices.insert(name.to_string(), price);
        Ok(())
    }

    pub fn price_of(&self, name: &str) -> Option<f64> {
        self.prices.get(name).copied()
    }

    pub fn apply_overrides(&mut self, overrides: &[(String, f64)]) -> Result<()> {
        for (name, price) in overrides {
            self.set(name, *price)
                .context("invalid price override")?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// Parses a repeated `--price NAME=VALUE` flag.
pub fn parse_price_override(raw: &str) -> Result<(String, f64)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("expected NAME=VALUE price override, got '{}'", raw);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("price override '{}' has an empty material name", raw);
    }
    let price: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("price override '{}' has a non-numeric value", raw))?;
    if !price.is_finite() || price < 0.0 {
        bail!("price override '{}' must be non-negative", raw);
    }
    Ok((name.to_string(), price))
}
