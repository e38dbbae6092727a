//! Point d'entrée CLI pour bev-addresses

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use bev_addresses::cli::{cmd_convert, ConvertArgs};

/// Convertir un extrait du registre des adresses BEV
#[derive(Parser)]
#[command(name = "bev-addresses")]
#[command(author, version)]
#[command(about = "Convertir un extrait du registre des adresses BEV en CSV, OSM ou GeoJSON")]
#[command(
    long_about = "Convertit les cinq tables CSV d'un extrait du registre autrichien des adresses (BEV) en table dénormalisée, arborescence OSM ou GeoJSON, avec reprojection des coordonnées Gauss-Krüger."
)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(flatten)]
    convert: ConvertArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    cmd_convert(&cli.convert)
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
