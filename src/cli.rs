use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "infracalc",
    version,
    about = "Road-safety intervention material cost estimation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Estimate costs from an intervention report (text or PDF)
    Estimate(EstimateArgs),
    /// Estimate costs from manually entered intervention quantities
    Manual(ManualArgs),
    /// Show the specification logic behind the estimates
    Explain(ExplainArgs),
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    /// Intervention report to estimate (.pdf via pdftotext, anything else as text)
    #[arg(long)]
    pub report_path: PathBuf,

    #[arg(long, default_value = "data/database.json")]
    pub spec_path: PathBuf,

    #[arg(long, default_value = "data/prices.json")]
    pub prices_path: PathBuf,

    /// Material price override, NAME=VALUE (repeatable)
    #[arg(long = "price")]
    pub price_overrides: Vec<String>,

    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Print the run summary as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ManualArgs {
    /// Manual entry, KEY=QUANTITY (repeatable; unit follows the spec category)
    #[arg(long = "item")]
    pub items: Vec<String>,

    #[arg(long, default_value = "data/database.json")]
    pub spec_path: PathBuf,

    #[arg(long, default_value = "data/prices.json")]
    pub prices_path: PathBuf,

    /// Material price override, NAME=VALUE (repeatable)
    #[arg(long = "price")]
    pub price_overrides: Vec<String>,

    #[arg(long, default_value = "out")]
    pub out_dir: PathBuf,

    /// Print the run summary as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ExplainArgs {
    #[arg(long, default_value = "data/database.json")]
    pub spec_path: PathBuf,

    /// Print the specification rows as JSON on stdout
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
