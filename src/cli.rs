//! Command-line interface for the batch scoring driver

use clap::Parser;

/// Score retail records against the trained VIP segmentation artifacts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config/config.toml")]
    pub config: String,

    /// Input file with one JSON record per line; reads stdin when omitted
    #[arg(short, long)]
    pub input: Option<String>,

    /// Print the valid category labels in selection order and exit
    #[arg(long)]
    pub list_categories: bool,
}
