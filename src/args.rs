use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hpb-harvest")]
#[command(about = "Harvests salon listings from paginated search result pages")]
#[command(version)]
pub struct Args {
    /// Search result URL to start harvesting from
    pub url: String,

    /// Maximum number of pages to fetch
    #[arg(short, long)]
    pub max_pages: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Path to a JSON configuration file (site profile, limits, headers)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emit the harvest result as JSON on stdout
    #[arg(long)]
    pub json: bool,
}
