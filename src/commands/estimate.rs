use anyhow::Result;
use tracing::info;

use crate::cli::EstimateArgs;
use crate::estimate::{summary_csv, Estimator};
use crate::model::EstimateSummary;
use crate::reader;
use crate::util;

use super::{load_tables, log_kpis, warn_missing_prices};

pub fn run(args: EstimateArgs) -> Result<()> {
    info!(report = %args.report_path.display(), "estimate requested");

    let (spec_table, prices) =
        load_tables(&args.spec_path, &args.prices_path, &args.price_overrides)?;
    let document = reader::read_report_text(&args.report_path)?;

    let estimator = Estimator::new()?;
    let estimate = estimator.estimate_document(&spec_table, &prices, &document);
    warn_missing_prices(&estimate);

    let generated_at = util::now_utc_string();
    let header = [
        "=".repeat(41),
        "   Road Safety Intervention Cost Estimate".to_string(),
        "=".repeat(41),
        String::new(),
        format!("Report Generated: {}", generated_at),
        format!("Input Report File: {}", args.report_path.display()),
        String::new(),
    ]
    .join("\n");

    util::ensure_directory(&args.out_dir)?;
    let report_path = args.out_dir.join("cost_report.txt");
    util::write_text_file(&report_path, &format!("{}\n{}", header, estimate.report))?;
    let csv_path = args.out_dir.join("cost_summary.csv");
    util::write_text_file(&csv_path, &summary_csv(&estimate.items))?;

    let summary = EstimateSummary {
        generated_at,
        mode: "document".to_string(),
        input_path: Some(args.report_path.display().to_string()),
        input_sha256: Some(util::sha256_file(&args.report_path)?),
        intervention_count: estimate.items.len(),
        grand_total: estimate.grand_total,
        items: estimate.items.clone(),
        map_points: estimate.map_points.clone(),
    };
    let summary_path = args.out_dir.join("estimate_summary.json");
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
