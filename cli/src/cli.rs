use std::path::PathBuf;

/// MRP estimation CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "stratcast", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Build the post-stratification frame from a census extract
    Frame(FrameArgs),

    /// Run the full estimation pipeline
    Estimate(EstimateArgs),
}

#[derive(clap::Args, Debug)]
pub struct FrameArgs {
    /// Census cell counts CSV
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub census: PathBuf,

    /// Output frame CSV, defaults to "./frame.csv"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct EstimateArgs {
    /// Census cell counts CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub census: PathBuf,

    /// Pre-election vote-intention panel CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub vote_survey: PathBuf,

    /// Post-election turnout survey CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub turnout_survey: PathBuf,

    /// Ground-truth constituency results CSV
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub results: PathBuf,

    /// Output directory
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub out: PathBuf,

    /// Overwrite if the directory already exists (off by default)
    #[arg(long)]
    pub force: bool,
}
