//! Assemblage des adresses
//!
//! Lit ADRESSE.csv en streaming, reprojette les coordonnées, recompose le
//! numéro de maison et résout les clés étrangères vers les tables de
//! référence. Les enregistrements inexploitables sont écartés et comptés,
//! jamais fatals.

use std::path::Path;

use anyhow::Result;
use geo::Coord;
use tracing::{debug, warn};

use bev::tables::{AdresseReader, ADRESSE_CSV};
use bev::types::{AdresseRow, ReferenceTables};

use crate::config::ConvertConfig;
use crate::report::{ConvertReport, DropReason};
use crate::reproject_lite::{reprojection_failed, Reprojector};

use super::hausnummer::compose_hausnummer;
use super::streets::{normalize_street_name, AmbiguousStreets};
use super::{Address, AddressMap};

/// Assemble toutes les adresses d'un extrait
pub fn assemble_addresses(
    data_dir: &Path,
    tables: &ReferenceTables,
    ambiguous: &AmbiguousStreets,
    reprojector: &Reprojector,
    config: &ConvertConfig,
    report: &mut ConvertReport,
) -> Result<AddressMap> {
    let reader = AdresseReader::open(data_dir)?;
    let mut addresses = AddressMap::new();

    let mut rows = reader.rows();
    for row in rows.by_ref() {
        report.addresses_read += 1;

        if let Some(address) = assemble_row(&row, tables, ambiguous, reprojector, config, report) {
            if address.ambiguous {
                report.ambiguous_streets += 1;
            }
            report.addresses_kept += 1;
            addresses.insert(address);
        }
    }

    if rows.skipped() > 0 {
        warn!(count = rows.skipped(), "malformed address rows skipped");
        report.record_warning(
            ADRESSE_CSV,
            &format!("{} malformed rows skipped", rows.skipped()),
        );
    }

    Ok(addresses)
}

/// Assemble une ligne d'adresse; `None` si elle est écartée
fn assemble_row(
    row: &AdresseRow,
    tables: &ReferenceTables,
    ambiguous: &AmbiguousStreets,
    reprojector: &Reprojector,
    config: &ConvertConfig,
    report: &mut ConvertReport,
) -> Option<Address> {
    let coord = match project_coordinates(row.rw, row.hw, row.epsg, reprojector) {
        Ok(coord) => coord,
        Err(reason) => {
            report.record_drop(reason);
            return None;
        }
    };

    let hausnummer = compose_hausnummer(
        &row.hausnrzahl1,
        &row.hausnrbuchstabe1,
        &row.hausnrverbindung1,
        &row.hausnrzahl2,
        &row.hausnrbuchstabe2,
        &row.hausnrbereich,
    );
    if hausnummer.is_empty() && !config.include_dubious {
        report.record_drop(DropReason::EmptyHausnummer);
        return None;
    }

    let Some(strasse) = tables.strassen.get(&row.skz) else {
        debug!(adrcd = %row.adrcd, skz = %row.skz, "unknown street key");
        report.record_drop(DropReason::UnresolvedReference);
        return None;
    };
    let Some(gemeinde) = tables.gemeinden.get(&row.gkz) else {
        debug!(adrcd = %row.adrcd, gkz = %row.gkz, "unknown municipality key");
        report.record_drop(DropReason::UnresolvedReference);
        return None;
    };
    let Some(ortschaft) = tables.ortschaften.get(&row.okz) else {
        debug!(adrcd = %row.adrcd, okz = %row.okz, "unknown locality key");
        report.record_drop(DropReason::UnresolvedReference);
        return None;
    };

    let is_ambiguous = ambiguous.is_ambiguous(&row.gkz, &normalize_street_name(&strasse.name));

    Some(Address {
        adrcd: row.adrcd.clone(),
        gkz: row.gkz.clone(),
        gemeinde: gemeinde.clone(),
        ortschaft: ortschaft.clone(),
        plz: row.plz.clone(),
        strasse: strasse.name.clone(),
        strassenzusatz: strasse.zusatz.clone(),
        hausnrtext: row.hausnrtext.clone(),
        hausnummer,
        hofname: row.hofname.clone(),
        coord,
        ambiguous: is_ambiguous,
        buildings: Vec::new(),
    })
}

/// Reprojette une paire de coordonnées du registre.
///
/// Le registre livre des coordonnées vides ou nulles pour les adresses non
/// encore mesurées; elles sont écartées avant toute reprojection.
pub(super) fn project_coordinates(
    rw: Option<f64>,
    hw: Option<f64>,
    epsg: u32,
    reprojector: &Reprojector,
) -> Result<Coord, DropReason> {
    let (Some(x), Some(y)) = (rw, hw) else {
        return Err(DropReason::MissingCoordinates);
    };
    if x == 0.0 || y == 0.0 {
        return Err(DropReason::MissingCoordinates);
    }
    if !Reprojector::is_supported_source(epsg) {
        return Err(DropReason::UnknownCrs);
    }

    let projected = reprojector.reproject(epsg, Coord { x, y });
    if reprojection_failed(&projected) {
        return Err(DropReason::UnknownCrs);
    }
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bev::types::Strasse;

    use crate::config::{ColumnsConfig, CompatCollapse, ConvertConfig, OsmGrouping, OutputMode};

    use super::*;

    fn test_config() -> ConvertConfig {
        ConvertConfig {
            mode: OutputMode::Plain,
            compat_collapse: CompatCollapse::NoUnitsOnly,
            notes_only_filter: false,
            include_dubious: false,
            target_epsg: 4326,
            extract_date: "2026-04-01".to_string(),
            sort: Vec::new(),
            columns: ColumnsConfig::from_preset("standard").unwrap(),
            group_by: OsmGrouping::Street,
        }
    }

    fn test_tables() -> ReferenceTables {
        let mut strassen = HashMap::new();
        strassen.insert(
            "900017".to_string(),
            Strasse {
                name: "Hauptstraße".to_string(),
                zusatz: String::new(),
                gkz: "10101".to_string(),
            },
        );
        let mut gemeinden = HashMap::new();
        gemeinden.insert("10101".to_string(), "Eisenstadt".to_string());
        let mut ortschaften = HashMap::new();
        ortschaften.insert("00001".to_string(), "Eisenstadt".to_string());
        ReferenceTables {
            strassen,
            gemeinden,
            ortschaften,
        }
    }

    fn test_row() -> AdresseRow {
        AdresseRow {
            adrcd: "1000001".to_string(),
            gkz: "10101".to_string(),
            okz: "00001".to_string(),
            skz: "900017".to_string(),
            plz: "7000".to_string(),
            hausnrtext: String::new(),
            hausnrzahl1: "12".to_string(),
            hausnrbuchstabe1: String::new(),
            hausnrverbindung1: String::new(),
            hausnrzahl2: String::new(),
            hausnrbuchstabe2: String::new(),
            hausnrbereich: String::new(),
            hofname: String::new(),
            rw: Some(2950.0),
            hw: Some(341000.0),
            epsg: 31256,
        }
    }

    #[test]
    fn test_assemble_resolves_references() {
        let tables = test_tables();
        let ambiguous = AmbiguousStreets::build(&tables.strassen);
        let reprojector = Reprojector::new(4326).unwrap();
        let config = test_config();
        let mut report = ConvertReport::default();

        let address = assemble_row(
            &test_row(),
            &tables,
            &ambiguous,
            &reprojector,
            &config,
            &mut report,
        )
        .unwrap();

        assert_eq!(address.strasse, "Hauptstraße");
        assert_eq!(address.gemeinde, "Eisenstadt");
        assert_eq!(address.ortschaft, "Eisenstadt");
        assert_eq!(address.hausnummer, "12");
        assert!(!address.ambiguous);
        assert!(address.coord.x > 16.0 && address.coord.x < 17.0);
    }

    #[test]
    fn test_missing_coordinates_dropped() {
        let tables = test_tables();
        let ambiguous = AmbiguousStreets::build(&tables.strassen);
        let reprojector = Reprojector::new(4326).unwrap();
        let config = test_config();
        let mut report = ConvertReport::default();

        let mut row = test_row();
        row.rw = None;
        assert!(assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report)
            .is_none());

        let mut row = test_row();
        row.hw = Some(0.0);
        assert!(assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report)
            .is_none());

        assert_eq!(report.records_dropped, 2);
        assert_eq!(
            report.dropped_by_reason.get("missing coordinates").copied(),
            Some(2)
        );
    }

    #[test]
    fn test_unknown_crs_dropped() {
        let tables = test_tables();
        let ambiguous = AmbiguousStreets::build(&tables.strassen);
        let reprojector = Reprojector::new(4326).unwrap();
        let config = test_config();
        let mut report = ConvertReport::default();

        let mut row = test_row();
        row.epsg = 9999;
        assert!(assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report)
            .is_none());
        assert_eq!(report.dropped_by_reason.get("unknown CRS").copied(), Some(1));
    }

    #[test]
    fn test_empty_hausnummer_dropped_unless_dubious() {
        let tables = test_tables();
        let ambiguous = AmbiguousStreets::build(&tables.strassen);
        let reprojector = Reprojector::new(4326).unwrap();
        let mut report = ConvertReport::default();

        let mut row = test_row();
        row.hausnrzahl1 = String::new();

        let config = test_config();
        assert!(assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report)
            .is_none());

        let mut config = test_config();
        config.include_dubious = true;
        let address =
            assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report).unwrap();
        assert!(address.hausnummer.is_empty());
    }

    #[test]
    fn test_hausnrtext_does_not_rescue_empty_number() {
        let tables = test_tables();
        let ambiguous = AmbiguousStreets::build(&tables.strassen);
        let reprojector = Reprojector::new(4326).unwrap();
        let mut report = ConvertReport::default();

        let mut row = test_row();
        row.hausnrzahl1 = String::new();
        row.hausnrtext = "gegenüber 5".to_string();

        let config = test_config();
        assert!(assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report)
            .is_none());
        assert_eq!(
            report.dropped_by_reason.get("empty house number").copied(),
            Some(1)
        );

        let mut config = test_config();
        config.include_dubious = true;
        let address =
            assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report).unwrap();
        assert_eq!(address.hausnrtext, "gegenüber 5");
    }

    #[test]
    fn test_unknown_street_key_drops_address() {
        let tables = test_tables();
        let ambiguous = AmbiguousStreets::build(&tables.strassen);
        let reprojector = Reprojector::new(4326).unwrap();
        let config = test_config();
        let mut report = ConvertReport::default();

        let mut row = test_row();
        row.skz = "999999".to_string();

        assert!(assemble_row(&row, &tables, &ambiguous, &reprojector, &config, &mut report)
            .is_none());
        assert_eq!(
            report.dropped_by_reason.get("unresolved reference").copied(),
            Some(1)
        );
    }
}
