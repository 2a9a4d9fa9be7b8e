use anyhow::{bail, Context, Result};
use tracing::info;

use crate::cli::ManualArgs;
use crate::estimate::{summary_csv, Estimator};
use crate::model::EstimateSummary;
use crate::session::{ManualEntry, ManualSession};
use crate::util;

use super::{load_tables, log_kpis, warn_missing_prices};

pub fn run(args: ManualArgs) -> Result<()> {
    if args.items.is_empty() {
        bail!("no manual entries; pass at least one --item KEY=QUANTITY");
    }

    let (spec_table, prices) =
        load_tables(&args.spec_path, &args.prices_path, &args.price_overrides)?;

    let mut session = ManualSession::new();
    for raw in &args.items {
        let (key, quantity) = parse_manual_item(raw)?;
        let spec = spec_table
            .get(&key)
            .with_context(|| format!("unknown intervention '{}'", key))?;
        let unit = spec.schedule.kind().default_unit().to_string();

        info!(key = %spec.key, quantity, unit = %unit, "manual entry added");
        session.add(ManualEntry {
            key: spec.key.clone(),
            quantity,
            unit,
        });
    }

    info!(entries = session.len(), "manual session ready");
    let estimator = Estimator::new()?;
    let estimate = estimator.estimate_manual(&spec_table, &prices, session.entries())?;
    warn_missing_prices(&estimate);

    let generated_at = util::now_utc_string();
    let header = [
        "=".repeat(41),
        "   Road Safety Intervention Cost Estimate".to_string(),
        "=".repeat(41),
        String::new(),
        format!("Manual Report Generated: {}", generated_at),
        String::new(),
    ]
    .join("\n");

    util::ensure_directory(&args.out_dir)?;
    let report_path = args.out_dir.join("manual_cost_report.txt");
    util::write_text_file(&report_path, &format!("{}\n{}", header, estimate.report))?;
    let csv_path = args.out_dir.join("manual_cost_summary.csv");
    util::write_text_file(&csv_path, &summary_csv(&estimate.items))?;

    let summary = EstimateSummary {
        generated_at,
        mode: "manual".to_string(),
        input_path: None,
        input_sha256: None,
        intervention_count: estimate.items.len(),
        grand_total: estimate.grand_total,
        items: estimate.items.clone(),
        map_points: Vec::new(),
    };
    let summary_path = args.out_dir.join("manual_summary.json");
    util::write_json_pretty(&summary_path, &summary)?;

    log_kpis(&estimate);
    info!(
        report = %report_path.display(),
        csv = %csv_path.display(),
        summary = %summary_path.display(),
        "outputs written"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    Ok(())
}

fn parse_manual_item(raw: &str) -> Result<(String, f64)> {
    let Some((key, quantity)) = raw.split_once('=') else {
        bail!("expected KEY=QUANTITY manual entry, got '{}'", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("manual entry '{}' has an empty intervention key", raw);
    }

    let quantity: f64 = quantity
        .trim()
        .parse()
        .with_context(|| format!("manual entry '{}' has a non-numeric quantity", raw))?;
    if !quantity.is_finite() || quantity <= 0.0 {
        bail!("manual entry '{}' must have a positive quantity", raw);
    }

    Ok((key.to_string(), quantity))
}

#[cfg(test)]
mod tests {
    use super::parse_manual_item;

    #[test]
    fn manual_item_flag_parses_key_and_quantity() {
        let (key, quantity) = parse_manual_item("Pothole=5").expect("valid entry");
        assert_eq!(key, "Pothole");
        assert_eq!(quantity, 5.0);

        let (key, quantity) = parse_manual_item("Road Studs = 2.5").expect("valid entry");
        assert_eq!(key, "Road Studs");
        assert_eq!(quantity, 2.5);
    }

    #[test]
    fn manual_item_flag_rejects_bad_shapes() {
        assert!(parse_manual_item("Pothole").is_err());
        assert!(parse_manual_item("=5").is_err());
        assert!(parse_manual_item("Pothole=zero").is_err());
        assert!(parse_manual_item("Pothole=0").is_err());
        assert!(parse_manual_item("Pothole=-2").is_err());
    }
}
