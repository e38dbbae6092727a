//! Définition et implémentation de la commande de conversion

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::{
    ColumnsConfig, CompatCollapse, ConvertConfig, OsmGrouping, OutputFormat, OutputMode, SortKey,
};
use crate::output::open_sink;
use crate::pipeline;
use crate::report::ConvertReport;

/// Arguments de la conversion
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Path to the directory containing the extract tables (CSV)
    #[arg(short, long)]
    pub path: PathBuf,

    /// Output file (csv, geojson) or directory (osm)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Date of the extract (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: String,

    /// Target SRID (4326, 3857 or 31287)
    #[arg(long, default_value_t = 4326)]
    pub epsg: u32,

    /// Output mode
    #[arg(short, long, value_enum, default_value_t = OutputMode::Plain)]
    pub mode: OutputMode,

    /// Keep only rows carrying a building designation or farm name
    #[arg(long)]
    pub notes_only: bool,

    /// Keep addresses without a usable house number
    #[arg(long)]
    pub include_dubious: bool,

    /// Collapse policy for compat mode
    #[arg(long, value_enum, default_value_t = CompatCollapse::NoUnitsOnly)]
    pub compat_collapse: CompatCollapse,

    /// Sort keys for the table output, applied in order (comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub sort: Vec<SortKey>,

    /// Columns preset (standard/compat) or path to a JSON columns file
    #[arg(long, default_value = "standard")]
    pub columns: String,

    /// Grouping of the OSM file tree
    #[arg(long, value_enum, default_value_t = OsmGrouping::Street)]
    pub group_by: OsmGrouping,

    /// Write the JSON report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Exécute la conversion
pub fn cmd_convert(args: &ConvertArgs) -> Result<()> {
    validate_date_format(&args.date)?;

    let columns = load_columns(&args.columns)?;
    let config = ConvertConfig {
        mode: args.mode,
        compat_collapse: args.compat_collapse,
        notes_only_filter: args.notes_only,
        include_dubious: args.include_dubious,
        target_epsg: args.epsg,
        extract_date: args.date.clone(),
        sort: args.sort.clone(),
        columns,
        group_by: args.group_by,
    };

    info!(
        path = %args.path.display(),
        output = %args.output.display(),
        format = ?args.format,
        mode = ?args.mode,
        epsg = args.epsg,
        "Starting conversion"
    );

    let start = Instant::now();
    let mut report = ConvertReport::new(&args.date);
    let mut sink = open_sink(args.format, &args.output, &config)?;

    pipeline::run(&args.path, &config, sink.as_mut(), &mut report)?;

    report.set_duration(start.elapsed());
    report.finalize();
    report.display();

    if let Some(report_path) = &args.report {
        report
            .save_to_file(report_path)
            .context(format!("Failed to write report: {}", report_path.display()))?;
    }

    info!("{}", report.summary());
    Ok(())
}

/// Résout le preset ou le fichier de colonnes
fn load_columns(spec: &str) -> Result<ColumnsConfig> {
    match spec {
        "standard" | "compat" => ColumnsConfig::from_preset(spec),
        path => ColumnsConfig::load(Path::new(path)),
    }
}

/// Valide le format de date YYYY-MM-DD
pub fn validate_date_format(date: &str) -> Result<()> {
    let bytes = date.as_bytes();
    let valid = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !valid {
        anyhow::bail!("Invalid date format: {} (expected YYYY-MM-DD)", date);
    }

    let month: u32 = date[5..7].parse()?;
    let day: u32 = date[8..10].parse()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        anyhow::bail!("Invalid date: {}", date);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("2026-04-01").is_ok());
        assert!(validate_date_format("2026-12-31").is_ok());

        assert!(validate_date_format("2026-04").is_err());
        assert!(validate_date_format("01.04.2026").is_err());
        assert!(validate_date_format("2026-13-01").is_err());
        assert!(validate_date_format("2026-04-32").is_err());
        assert!(validate_date_format("2026-04-0a").is_err());
    }

    #[test]
    fn test_load_columns_presets() {
        assert!(load_columns("standard").is_ok());
        assert!(load_columns("compat").is_ok());
        assert!(load_columns("/nonexistent/columns.json").is_err());
    }
}
