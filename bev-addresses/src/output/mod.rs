//! Sorties de la conversion
//!
//! Les trois formats partagent le même contrat: le résolveur de politique ne
//! dépend que du trait `AddressSink`.

pub mod geojson;
pub mod osm;
pub mod table;

use std::path::Path;

use anyhow::Result;

use crate::config::{ConvertConfig, OutputFormat};
use crate::pipeline::policy::OutputRow;

/// Contrat commun des sorties
pub trait AddressSink {
    /// Ajoute une ligne résolue
    fn add(&mut self, row: &OutputRow) -> Result<()>;

    /// Termine la sortie (flush, écriture des fichiers différés)
    fn close(&mut self) -> Result<()>;
}

/// Ouvre la sortie demandée par la configuration
pub fn open_sink(
    format: OutputFormat,
    output: &Path,
    config: &ConvertConfig,
) -> Result<Box<dyn AddressSink>> {
    match format {
        OutputFormat::Csv => Ok(Box::new(table::TableSink::create(output, &config.columns)?)),
        OutputFormat::Osm => Ok(Box::new(osm::OsmSink::create(
            output,
            config.group_by,
            &config.extract_date,
            config.target_epsg,
        )?)),
        OutputFormat::Geojson => Ok(Box::new(geojson::GeoJsonSink::create(
            output,
            config.target_epsg,
        )?)),
    }
}
