//! Pipeline de conversion
//!
//! Enchaîne les étapes: vérification de l'extrait, chargement des tables de
//! référence, assemblage des adresses, rattachement des bâtiments, résolution
//! de la politique de sortie, écriture. L'ordre d'insertion des adresses est
//! conservé pour garantir une sortie déterministe d'une exécution à l'autre.

pub mod assemble;
pub mod buildings;
pub mod hausnummer;
pub mod policy;
pub mod streets;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use geo::Coord;
use tracing::info;

use bev::tables::{check_dataset, load_reference_tables};

use crate::config::{ConvertConfig, SortKey};
use crate::output::AddressSink;
use crate::report::ConvertReport;
use crate::reproject_lite::Reprojector;

/// Adresse assemblée, prête pour la résolution de sortie
#[derive(Debug, Clone)]
pub struct Address {
    /// Code d'adresse du registre (ADRCD)
    pub adrcd: String,
    /// Code commune (GKZ)
    pub gkz: String,
    /// Nom de la commune
    pub gemeinde: String,
    /// Nom de la localité
    pub ortschaft: String,
    /// Code postal
    pub plz: String,
    /// Nom de la rue
    pub strasse: String,
    /// Complément du nom de rue
    pub strassenzusatz: String,
    /// Texte libre du numéro
    pub hausnrtext: String,
    /// Numéro de maison recomposé
    pub hausnummer: String,
    /// Nom de ferme (Hofname)
    pub hofname: String,
    /// Coordonnées reprojetées
    pub coord: Coord,
    /// Le nom de rue est porté par plusieurs rues de la commune
    pub ambiguous: bool,
    /// Bâtiments rattachés
    pub buildings: Vec<BuildingAttachment>,
}

/// Bâtiment rattaché à une adresse
#[derive(Debug, Clone)]
pub struct BuildingAttachment {
    /// Sous-code du bâtiment (SUBCD)
    pub subcd: String,
    /// Sous-adresse recomposée (unité)
    pub subadresse: String,
    /// Désignation du bâtiment
    pub bezeichnung: String,
    /// Coordonnées reprojetées du bâtiment
    pub coord: Coord,
}

/// Index d'adresses conservant l'ordre d'insertion
#[derive(Debug, Default)]
pub struct AddressMap {
    map: HashMap<String, Address>,
    order: Vec<String>,
}

impl AddressMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insère une adresse; la première insertion fixe la position
    pub fn insert(&mut self, address: Address) {
        let adrcd = address.adrcd.clone();
        if self.map.insert(adrcd.clone(), address).is_none() {
            self.order.push(adrcd);
        }
    }

    pub fn get_mut(&mut self, adrcd: &str) -> Option<&mut Address> {
        self.map.get_mut(adrcd)
    }

    pub fn contains(&self, adrcd: &str) -> bool {
        self.map.contains_key(adrcd)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Itère dans l'ordre courant
    pub fn iter_ordered(&self) -> impl Iterator<Item = &Address> {
        self.order.iter().filter_map(|adrcd| self.map.get(adrcd))
    }

    /// Trie l'ordre d'itération selon les clés demandées (tri stable)
    pub fn sort_by_keys(&mut self, keys: &[SortKey]) {
        if keys.is_empty() {
            return;
        }
        let map = &self.map;
        self.order.sort_by(|a, b| {
            let (Some(left), Some(right)) = (map.get(a), map.get(b)) else {
                return Ordering::Equal;
            };
            for key in keys {
                let ord = match key {
                    SortKey::Gkz => left.gkz.cmp(&right.gkz),
                    SortKey::Gemeinde => left.gemeinde.cmp(&right.gemeinde),
                    SortKey::Plz => left.plz.cmp(&right.plz),
                    SortKey::Strasse => left.strasse.cmp(&right.strasse),
                    SortKey::Hausnummer => left.hausnummer.cmp(&right.hausnummer),
                    SortKey::Adrcd => left.adrcd.cmp(&right.adrcd),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }
}

/// Exécute la conversion complète d'un extrait
pub fn run(
    data_dir: &Path,
    config: &ConvertConfig,
    sink: &mut dyn AddressSink,
    report: &mut ConvertReport,
) -> Result<()> {
    check_dataset(data_dir).context("dataset check failed")?;

    info!("loading reference tables");
    let tables = load_reference_tables(data_dir).context("loading reference tables")?;
    info!(
        streets = tables.strassen.len(),
        gemeinden = tables.gemeinden.len(),
        ortschaften = tables.ortschaften.len(),
        "reference tables loaded"
    );

    let ambiguous = streets::AmbiguousStreets::build(&tables.strassen);
    let reprojector = Reprojector::new(config.target_epsg)?;

    info!("assembling addresses");
    let mut addresses =
        assemble::assemble_addresses(data_dir, &tables, &ambiguous, &reprojector, config, report)?;
    info!(count = addresses.len(), "addresses assembled");

    info!("merging buildings");
    buildings::merge_buildings(data_dir, &mut addresses, &reprojector, report)?;

    addresses.sort_by_keys(&config.sort);

    let opts = policy::PolicyOptions::from_config(config);
    for address in addresses.iter_ordered() {
        for row in policy::resolve(address, &opts, report) {
            sink.add(&row)?;
            report.rows_written += 1;
        }
    }

    sink.close().context("closing output")?;
    Ok(())
}
