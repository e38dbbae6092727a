//! Résolution de la politique de sortie
//!
//! Décide, pour chaque adresse et ses bâtiments rattachés, combien de lignes
//! émettre et quelles coordonnées/sous-adresses chacune porte. La matrice de
//! décision est explicite (mode, nombre de bâtiments, mélange d'unités) pour
//! rester auditable et testable isolément.

use geo::Coord;

use crate::config::{CompatCollapse, ConvertConfig, OutputMode};
use crate::report::{ConvertReport, DropReason};

use super::{Address, BuildingAttachment};

/// Désignation par défaut du registre, traitée comme du bruit
const DEFAULT_BEZEICHNUNG: &str = "Wohngebäude";

/// Ligne de sortie aplatie: une adresse plus au plus un bâtiment
#[derive(Debug, Clone)]
pub struct OutputRow {
    pub gemeinde: String,
    pub ortschaft: String,
    pub plz: String,
    pub strasse: String,
    pub strassenzusatz: String,
    pub hausnrtext: String,
    pub hausnummer: String,
    pub hofname: String,
    pub gkz: String,
    /// Code d'enregistrement: ADRCD, suffixé en mode debug
    pub code: String,
    /// Sous-adresse (unité) du bâtiment porté par la ligne
    pub subadresse: String,
    /// Désignation du bâtiment porté par la ligne
    pub bezeichnung: String,
    /// Le nom de rue est ambigu dans la commune
    pub ambiguous: bool,
    pub x: f64,
    pub y: f64,
}

/// Mélange d'unités d'un ensemble de bâtiments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitMix {
    /// Tous les bâtiments portent une sous-adresse
    AllUnits,
    /// Aucun bâtiment ne porte de sous-adresse
    NoUnits,
    /// Mélange des deux
    Mixed,
}

impl UnitMix {
    /// Classifie un ensemble de bâtiments
    pub fn classify(buildings: &[BuildingAttachment]) -> Self {
        let with_units = buildings.iter().filter(|b| !b.subadresse.is_empty()).count();
        if with_units == 0 {
            UnitMix::NoUnits
        } else if with_units == buildings.len() {
            UnitMix::AllUnits
        } else {
            UnitMix::Mixed
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitMix::AllUnits => "all units",
            UnitMix::NoUnits => "no units",
            UnitMix::Mixed => "mixed",
        }
    }
}

/// Options extraites de la configuration
#[derive(Debug, Clone, Copy)]
pub struct PolicyOptions {
    pub mode: OutputMode,
    pub compat_collapse: CompatCollapse,
    pub notes_only_filter: bool,
    pub include_dubious: bool,
}

impl PolicyOptions {
    pub fn from_config(config: &ConvertConfig) -> Self {
        Self {
            mode: config.mode,
            compat_collapse: config.compat_collapse,
            notes_only_filter: config.notes_only_filter,
            include_dubious: config.include_dubious,
        }
    }
}

/// Résout les lignes à émettre pour une adresse
pub fn resolve(
    address: &Address,
    opts: &PolicyOptions,
    report: &mut ConvertReport,
) -> Vec<OutputRow> {
    if address.buildings.len() > 1 {
        report.record_unit_mix(UnitMix::classify(&address.buildings).label());
    }

    let rows = match opts.mode {
        OutputMode::Plain => resolve_plain(address),
        OutputMode::Compat => resolve_compat(address, opts),
        // Mode debug: trace verbatim, aucun filtrage
        OutputMode::Debug => return resolve_debug(address),
    };

    if opts.notes_only_filter {
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if row.bezeichnung.is_empty() && row.hofname.is_empty() {
                report.record_drop(DropReason::NotesOnly);
            } else {
                kept.push(row);
            }
        }
        kept
    } else {
        rows
    }
}

fn resolve_plain(address: &Address) -> Vec<OutputRow> {
    match address.buildings.as_slice() {
        [] => vec![address_row(address)],
        [building] => vec![attachment_row(address, building)],
        buildings => buildings
            .iter()
            .map(|b| attachment_row(address, b))
            .collect(),
    }
}

fn resolve_compat(address: &Address, opts: &PolicyOptions) -> Vec<OutputRow> {
    match address.buildings.as_slice() {
        [] => vec![address_row(address)],
        [building] => vec![attachment_row(address, building)],
        buildings => match (UnitMix::classify(buildings), opts.compat_collapse) {
            // Sans unité, la position d'adresse représente toutes les lignes
            (UnitMix::NoUnits, _) => vec![address_row(address)],
            (_, CompatCollapse::Always) => vec![address_row(address)],
            (_, CompatCollapse::NoUnitsOnly) if opts.include_dubious => buildings
                .iter()
                .map(|b| attachment_row(address, b))
                .collect(),
            (_, CompatCollapse::NoUnitsOnly) => vec![address_row(address)],
        },
    }
}

fn resolve_debug(address: &Address) -> Vec<OutputRow> {
    let mut rows = Vec::with_capacity(1 + address.buildings.len());

    let mut row = address_row(address);
    row.code = format!("{}*", address.adrcd);
    rows.push(row);

    for building in &address.buildings {
        let mut row = raw_attachment_row(address, building);
        row.code = format!("{}/{}", address.adrcd, building.subcd);
        rows.push(row);
    }

    rows
}

/// Ligne portée par la coordonnée d'adresse, sans bâtiment
fn address_row(address: &Address) -> OutputRow {
    row_with(address, address.coord, String::new(), String::new())
}

/// Ligne portée par un bâtiment, désignation par défaut effacée
fn attachment_row(address: &Address, building: &BuildingAttachment) -> OutputRow {
    let bezeichnung = if building.bezeichnung == DEFAULT_BEZEICHNUNG {
        String::new()
    } else {
        building.bezeichnung.clone()
    };
    row_with(
        address,
        building.coord,
        building.subadresse.clone(),
        bezeichnung,
    )
}

/// Ligne de bâtiment sans nettoyage de la désignation (mode debug)
fn raw_attachment_row(address: &Address, building: &BuildingAttachment) -> OutputRow {
    row_with(
        address,
        building.coord,
        building.subadresse.clone(),
        building.bezeichnung.clone(),
    )
}

fn row_with(address: &Address, coord: Coord, subadresse: String, bezeichnung: String) -> OutputRow {
    OutputRow {
        gemeinde: address.gemeinde.clone(),
        ortschaft: address.ortschaft.clone(),
        plz: address.plz.clone(),
        strasse: address.strasse.clone(),
        strassenzusatz: address.strassenzusatz.clone(),
        hausnrtext: address.hausnrtext.clone(),
        hausnummer: address.hausnummer.clone(),
        hofname: address.hofname.clone(),
        gkz: address.gkz.clone(),
        code: address.adrcd.clone(),
        subadresse,
        bezeichnung,
        ambiguous: address.ambiguous,
        x: coord.x,
        y: coord.y,
    }
}
