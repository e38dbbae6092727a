//! Rattachement des bâtiments aux adresses
//!
//! Lit GEBAEUDE.csv en streaming et accroche chaque bâtiment marqué adresse
//! principale à son adresse parente. Les bâtiments orphelins ou sans
//! coordonnées exploitables sont écartés et comptés.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use bev::tables::{GebaeudeReader, GEBAEUDE_CSV};
use bev::types::GebaeudeRow;

use crate::report::{ConvertReport, DropReason};
use crate::reproject_lite::Reprojector;

use super::assemble::project_coordinates;
use super::hausnummer::compose_subadresse;
use super::{AddressMap, BuildingAttachment};

/// Rattache les bâtiments d'un extrait aux adresses assemblées
pub fn merge_buildings(
    data_dir: &Path,
    addresses: &mut AddressMap,
    reprojector: &Reprojector,
    report: &mut ConvertReport,
) -> Result<()> {
    let reader = GebaeudeReader::open(data_dir)?;

    let mut rows = reader.rows();
    for row in rows.by_ref() {
        report.buildings_read += 1;
        merge_row(&row, addresses, reprojector, report);
    }

    if rows.skipped() > 0 {
        warn!(count = rows.skipped(), "malformed building rows skipped");
        report.record_warning(
            GEBAEUDE_CSV,
            &format!("{} malformed rows skipped", rows.skipped()),
        );
    }

    Ok(())
}

/// Rattache une ligne de bâtiment; les écarts sont comptés dans le rapport
fn merge_row(
    row: &GebaeudeRow,
    addresses: &mut AddressMap,
    reprojector: &Reprojector,
    report: &mut ConvertReport,
) {
    if !row.hauptadresse {
        report.record_drop(DropReason::NotMainAddress);
        return;
    }

    if !addresses.contains(&row.adrcd) {
        debug!(adrcd = %row.adrcd, subcd = %row.subcd, "building without parent address");
        report.record_drop(DropReason::OrphanBuilding);
        return;
    }

    let coord = match project_coordinates(row.rw, row.hw, row.epsg, reprojector) {
        Ok(coord) => coord,
        Err(_) => {
            report.record_drop(DropReason::BuildingWithoutCoordinates);
            return;
        }
    };

    let subadresse = compose_subadresse(
        &row.hausnrzahl3,
        &row.hausnrbuchstabe3,
        &row.hausnrverbindung2,
        &row.hausnrzahl4,
        &row.hausnrbuchstabe4,
        &row.hausnrverbindung3,
    );

    if let Some(address) = addresses.get_mut(&row.adrcd) {
        address.buildings.push(BuildingAttachment {
            subcd: row.subcd.clone(),
            subadresse,
            bezeichnung: row.bezeichnung.clone(),
            coord,
        });
        report.buildings_merged += 1;
    }
}

#[cfg(test)]
mod tests {
    use geo::Coord;

    use super::super::Address;
    use super::*;

    fn parent(adrcd: &str) -> Address {
        Address {
            adrcd: adrcd.to_string(),
            gkz: "10101".to_string(),
            gemeinde: "Eisenstadt".to_string(),
            ortschaft: "Eisenstadt".to_string(),
            plz: "7000".to_string(),
            strasse: "Hauptstraße".to_string(),
            strassenzusatz: String::new(),
            hausnrtext: String::new(),
            hausnummer: "12".to_string(),
            hofname: String::new(),
            coord: Coord { x: 16.37, y: 48.2 },
            ambiguous: false,
            buildings: Vec::new(),
        }
    }

    fn test_row() -> GebaeudeRow {
        GebaeudeRow {
            adrcd: "1000001".to_string(),
            subcd: "001".to_string(),
            hauptadresse: true,
            hausnrzahl3: "1".to_string(),
            hausnrbuchstabe3: String::new(),
            hausnrverbindung2: "/".to_string(),
            hausnrzahl4: String::new(),
            hausnrbuchstabe4: String::new(),
            hausnrverbindung3: String::new(),
            bezeichnung: String::new(),
            rw: Some(2950.0),
            hw: Some(341000.0),
            epsg: 31256,
        }
    }

    #[test]
    fn test_merge_attaches_building() {
        let mut addresses = AddressMap::new();
        addresses.insert(parent("1000001"));
        let reprojector = Reprojector::new(4326).unwrap();
        let mut report = ConvertReport::default();

        merge_row(&test_row(), &mut addresses, &reprojector, &mut report);

        assert_eq!(report.buildings_merged, 1);
        let address = addresses.iter_ordered().next().unwrap();
        assert_eq!(address.buildings.len(), 1);
        assert_eq!(address.buildings[0].subadresse, "1");
    }

    #[test]
    fn test_not_main_address_skipped() {
        let mut addresses = AddressMap::new();
        addresses.insert(parent("1000001"));
        let reprojector = Reprojector::new(4326).unwrap();
        let mut report = ConvertReport::default();

        let mut row = test_row();
        row.hauptadresse = false;
        merge_row(&row, &mut addresses, &reprojector, &mut report);

        assert_eq!(report.buildings_merged, 0);
        assert_eq!(
            report.dropped_by_reason.get("not main address").copied(),
            Some(1)
        );
    }

    #[test]
    fn test_orphan_building_skipped() {
        let mut addresses = AddressMap::new();
        let reprojector = Reprojector::new(4326).unwrap();
        let mut report = ConvertReport::default();

        merge_row(&test_row(), &mut addresses, &reprojector, &mut report);

        assert_eq!(
            report.dropped_by_reason.get("orphan building").copied(),
            Some(1)
        );
    }

    #[test]
    fn test_building_without_coordinates_skipped() {
        let mut addresses = AddressMap::new();
        addresses.insert(parent("1000001"));
        let reprojector = Reprojector::new(4326).unwrap();
        let mut report = ConvertReport::default();

        let mut row = test_row();
        row.rw = None;
        merge_row(&row, &mut addresses, &reprojector, &mut report);

        assert_eq!(report.buildings_merged, 0);
        assert_eq!(
            report
                .dropped_by_reason
                .get("building without coordinates")
                .copied(),
            Some(1)
        );
    }
}
