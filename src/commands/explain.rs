use anyhow::Result;
use serde::Serialize;
use tracing::info;

use crate::cli::ExplainArgs;
use crate::model::{InterventionSpec, ScheduleKind};
use crate::tables::SpecTable;

/// One row of the specification-logic view: how an estimate for this
/// intervention is built up, material by material.
#[derive(Debug, Clone, Serialize)]
struct ExplainRow {
    intervention: String,
    source_clause: String,
    materials: String,
}

pub fn run(args: ExplainArgs) -> Result<()> {
    let spec_table = SpecTable::load(&args.spec_path)?;

    let rows: Vec<ExplainRow> = spec_table.interventions().iter().map(explain_row).collect();
    for row in &rows {
        info!(
            intervention = %row.intervention,
            source_clause = %row.source_clause,
            materials = %row.materials,
            "specification row"
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    }

    Ok(())
}

fn explain_row(spec: &InterventionSpec) -> ExplainRow {
    let per_unit = match spec.schedule.kind() {
        ScheduleKind::PerItem => "",
        ScheduleKind::PerMeter => "/meter",
        ScheduleKind::PerCubicMeter => "/m^3",
        ScheduleKind::PerSquareMeter20mm => "/sqm",
    };

    let materials = spec
        .schedule
        .materials()
        .iter()
        .map(|material| {
            format!(
                "{} {}{} of {}",
                material.quantity, material.unit, per_unit, material.name
            )
        })
        .collect::<Vec<String>>()
        .join(", ");

    ExplainRow {
        intervention: spec.key.clone(),
        source_clause: spec.source_clause.clone(),
        materials,
    }
}

#[cfg(test)]
mod tests {
    use super::explain_row;
    use crate::model::{InterventionSpec, MaterialRequirement, MaterialSchedule};

    #[test]
    fn explain_row_describes_the_schedule_category() {
        let spec = InterventionSpec {
            key: "Longitudinal Markings".to_string(),
            source_clause: "IRC:35-2015, Clause 4.1".to_string(),
            schedule: MaterialSchedule::PerMeter(vec![
                MaterialRequirement {
                    name: "Thermoplastic Paint".to_string(),
                    quantity: 0.6,
                    unit: "kg".to_string(),
                },
                MaterialRequirement {
                    name: "Glass Beads".to_string(),
                    quantity: 0.07,
                    unit: "kg".to_string(),
                },
            ]),
        };

        let row = explain_row(&spec);
        assert_eq!(row.intervention, "Longitudinal Markings");
        assert_eq!(
            row.materials,
            "0.6 kg/meter of Thermoplastic Paint, 0.07 kg/meter of Glass Beads"
        );
    }
}
