//! Sortie GeoJSON avec geozero (streaming, zero-copy)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, Point};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use crate::pipeline::policy::OutputRow;

use super::AddressSink;

/// Sortie GeoJSON: une FeatureCollection de points
pub struct GeoJsonSink {
    writer: BufWriter<File>,
    count: usize,
    closed: bool,
}

impl GeoJsonSink {
    /// Crée le fichier et écrit l'en-tête FeatureCollection avec CRS
    pub fn create(path: &Path, target_epsg: u32) -> Result<Self> {
        let file = File::create(path)
            .context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        write!(
            writer,
            r#"{{"type":"FeatureCollection","crs":{{"type":"name","properties":{{"name":"urn:ogc:def:crs:EPSG::{}"}}}},"features":["#,
            target_epsg
        )?;

        Ok(Self {
            writer,
            count: 0,
            closed: false,
        })
    }
}

impl AddressSink for GeoJsonSink {
    fn add(&mut self, row: &OutputRow) -> Result<()> {
        if self.count > 0 {
            write!(self.writer, ",")?;
        }
        write_feature(&mut self.writer, row)?;
        self.count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.closed {
            write!(self.writer, "]}}")?;
            self.writer.flush()?;
            self.closed = true;
        }
        Ok(())
    }
}

/// Écrit une ligne de sortie comme Feature ponctuelle
fn write_feature<W: Write>(writer: &mut W, row: &OutputRow) -> Result<()> {
    write!(
        writer,
        r#"{{"type":"Feature","id":"{}","#,
        escape_json(&row.code)
    )?;

    // Géométrie via geozero
    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    let geometry = Geometry::Point(Point::new(row.x, row.y));
    geometry.process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":{{"#)?;
    let properties = [
        ("gemeinde", row.gemeinde.as_str()),
        ("ortschaft", row.ortschaft.as_str()),
        ("plz", row.plz.as_str()),
        ("strasse", row.strasse.as_str()),
        ("strassenzusatz", row.strassenzusatz.as_str()),
        ("hausnrtext", row.hausnrtext.as_str()),
        ("hausnummer", row.hausnummer.as_str()),
        ("subadresse", row.subadresse.as_str()),
        ("hofname", row.hofname.as_str()),
        ("bezeichnung", row.bezeichnung.as_str()),
        ("gkz", row.gkz.as_str()),
    ];
    for (i, (key, value)) in properties.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write!(writer, r#""{}":"{}""#, key, escape_json(value))?;
    }
    write!(writer, "}}}}")?;

    Ok(())
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
