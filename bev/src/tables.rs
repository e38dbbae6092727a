//! Chargement typé des cinq tables du registre
//!
//! Les tables de référence (STRASSE, GEMEINDE, ORTSCHAFT) sont matérialisées
//! en maps clé-unique (dernier écrit gagne). ADRESSE et GEBAEUDE, volumineuses,
//! sont exposées en itérateurs de lignes typées.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::reader::{parse_coordinate, CsvFile, Row, RowIter};
use crate::types::{AdresseRow, GebaeudeRow, ReferenceTables, Strasse};
use crate::BevError;

/// Noms des fichiers du jeu de données
pub const STRASSE_CSV: &str = "STRASSE.csv";
pub const GEMEINDE_CSV: &str = "GEMEINDE.csv";
pub const ORTSCHAFT_CSV: &str = "ORTSCHAFT.csv";
pub const ADRESSE_CSV: &str = "ADRESSE.csv";
pub const GEBAEUDE_CSV: &str = "GEBAEUDE.csv";

/// Les cinq tables obligatoires
pub const REQUIRED_TABLES: [&str; 5] = [
    STRASSE_CSV,
    GEMEINDE_CSV,
    ORTSCHAFT_CSV,
    ADRESSE_CSV,
    GEBAEUDE_CSV,
];

/// Vérifie que toutes les tables obligatoires sont présentes.
///
/// Échec = abandon de la conversion avant tout traitement.
pub fn check_dataset(dir: &Path) -> Result<(), BevError> {
    for name in REQUIRED_TABLES {
        let path = dir.join(name);
        if !path.is_file() {
            return Err(BevError::MissingFile(path.display().to_string()));
        }
    }
    Ok(())
}

/// Charge STRASSE.csv en map SKZ -> rue
pub fn load_strassen(dir: &Path) -> Result<HashMap<String, Strasse>, BevError> {
    let file = CsvFile::open(dir, STRASSE_CSV)?;
    let skz = file.header().column(STRASSE_CSV, "SKZ")?;
    let name = file.header().column(STRASSE_CSV, "STRASSENNAME")?;
    let zusatz = file.header().column(STRASSE_CSV, "STRASSENNAMENZUSATZ")?;
    let gkz = file.header().column(STRASSE_CSV, "GKZ")?;

    let mut strassen = HashMap::new();
    for row in file.rows() {
        strassen.insert(
            row.get(skz).to_string(),
            Strasse {
                // Le registre remplit certains noms avec des espaces de fin
                name: row.get(name).trim_end().to_string(),
                zusatz: row.get(zusatz).to_string(),
                gkz: row.get(gkz).to_string(),
            },
        );
    }
    debug!(count = strassen.len(), "{} loaded", STRASSE_CSV);
    Ok(strassen)
}

/// Charge GEMEINDE.csv en map GKZ -> nom de commune
pub fn load_gemeinden(dir: &Path) -> Result<HashMap<String, String>, BevError> {
    load_name_table(dir, GEMEINDE_CSV, "GKZ", "GEMEINDENAME")
}

/// Charge ORTSCHAFT.csv en map OKZ -> nom de localité
pub fn load_ortschaften(dir: &Path) -> Result<HashMap<String, String>, BevError> {
    load_name_table(dir, ORTSCHAFT_CSV, "OKZ", "ORTSNAME")
}

fn load_name_table(
    dir: &Path,
    file_name: &str,
    id_col: &str,
    name_col: &str,
) -> Result<HashMap<String, String>, BevError> {
    let file = CsvFile::open(dir, file_name)?;
    let id = file.header().column(file_name, id_col)?;
    let name = file.header().column(file_name, name_col)?;

    let mut table = HashMap::new();
    for row in file.rows() {
        table.insert(row.get(id).to_string(), row.get(name).to_string());
    }
    debug!(count = table.len(), "{} loaded", file_name);
    Ok(table)
}

/// Charge les trois tables de référence d'un coup
pub fn load_reference_tables(dir: &Path) -> Result<ReferenceTables, BevError> {
    Ok(ReferenceTables {
        strassen: load_strassen(dir)?,
        gemeinden: load_gemeinden(dir)?,
        ortschaften: load_ortschaften(dir)?,
    })
}

/// Colonnes résolues de ADRESSE.csv
struct AdresseColumns {
    adrcd: usize,
    gkz: usize,
    okz: usize,
    skz: usize,
    plz: usize,
    hausnrtext: usize,
    hausnrzahl1: usize,
    hausnrbuchstabe1: usize,
    hausnrverbindung1: usize,
    hausnrzahl2: usize,
    hausnrbuchstabe2: usize,
    hausnrbereich: usize,
    hofname: usize,
    rw: usize,
    hw: usize,
    epsg: usize,
}

/// Lecteur en streaming de ADRESSE.csv
pub struct AdresseReader {
    file: CsvFile,
    cols: AdresseColumns,
}

impl AdresseReader {
    pub fn open(dir: &Path) -> Result<Self, BevError> {
        let file = CsvFile::open(dir, ADRESSE_CSV)?;
        let h = file.header();
        let cols = AdresseColumns {
            adrcd: h.column(ADRESSE_CSV, "ADRCD")?,
            gkz: h.column(ADRESSE_CSV, "GKZ")?,
            okz: h.column(ADRESSE_CSV, "OKZ")?,
            skz: h.column(ADRESSE_CSV, "SKZ")?,
            plz: h.column(ADRESSE_CSV, "PLZ")?,
            hausnrtext: h.column(ADRESSE_CSV, "HAUSNRTEXT")?,
            hausnrzahl1: h.column(ADRESSE_CSV, "HAUSNRZAHL1")?,
            hausnrbuchstabe1: h.column(ADRESSE_CSV, "HAUSNRBUCHSTABE1")?,
            hausnrverbindung1: h.column(ADRESSE_CSV, "HAUSNRVERBINDUNG1")?,
            hausnrzahl2: h.column(ADRESSE_CSV, "HAUSNRZAHL2")?,
            hausnrbuchstabe2: h.column(ADRESSE_CSV, "HAUSNRBUCHSTABE2")?,
            hausnrbereich: h.column(ADRESSE_CSV, "HAUSNRBEREICH")?,
            hofname: h.column(ADRESSE_CSV, "HOFNAME")?,
            rw: h.column(ADRESSE_CSV, "RW")?,
            hw: h.column(ADRESSE_CSV, "HW")?,
            epsg: h.column(ADRESSE_CSV, "EPSG")?,
        };
        Ok(Self { file, cols })
    }

    /// Itère sur les lignes typées, dans l'ordre du fichier
    pub fn rows(&self) -> AdresseIter<'_> {
        AdresseIter {
            rows: self.file.rows(),
            cols: &self.cols,
            required: self.file.header().len(),
            skipped: 0,
        }
    }
}

pub struct AdresseIter<'a> {
    rows: RowIter<'a>,
    cols: &'a AdresseColumns,
    required: usize,
    skipped: usize,
}

impl<'a> AdresseIter<'a> {
    /// Nombre de lignes malformées ignorées jusqu'ici
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for AdresseIter<'a> {
    type Item = AdresseRow;

    fn next(&mut self) -> Option<AdresseRow> {
        let row = loop {
            let row = self.rows.next()?;
            // Ligne tronquée par rapport à l'en-tête: ignorée, comptée
            if row.len() < self.required {
                self.skipped += 1;
                continue;
            }
            break row;
        };
        let c = self.cols;
        Some(AdresseRow {
            adrcd: row.get(c.adrcd).to_string(),
            gkz: row.get(c.gkz).to_string(),
            okz: row.get(c.okz).to_string(),
            skz: row.get(c.skz).to_string(),
            plz: row.get(c.plz).to_string(),
            hausnrtext: row.get(c.hausnrtext).to_string(),
            hausnrzahl1: row.get(c.hausnrzahl1).to_string(),
            hausnrbuchstabe1: row.get(c.hausnrbuchstabe1).to_string(),
            hausnrverbindung1: row.get(c.hausnrverbindung1).to_string(),
            hausnrzahl2: row.get(c.hausnrzahl2).to_string(),
            hausnrbuchstabe2: row.get(c.hausnrbuchstabe2).to_string(),
            hausnrbereich: row.get(c.hausnrbereich).to_string(),
            hofname: row.get(c.hofname).to_string(),
            rw: parse_coordinate(row.get(c.rw)),
            hw: parse_coordinate(row.get(c.hw)),
            epsg: parse_epsg(&row, c.epsg),
        })
    }
}

/// Colonnes résolues de GEBAEUDE.csv
struct GebaeudeColumns {
    adrcd: usize,
    subcd: usize,
    hauptadresse: usize,
    hausnrzahl3: usize,
    hausnrbuchstabe3: usize,
    hausnrverbindung2: usize,
    hausnrzahl4: usize,
    hausnrbuchstabe4: usize,
    hausnrverbindung3: usize,
    bezeichnung: usize,
    rw: usize,
    hw: usize,
    epsg: usize,
}

/// Lecteur en streaming de GEBAEUDE.csv
pub struct GebaeudeReader {
    file: CsvFile,
    cols: GebaeudeColumns,
}

impl GebaeudeReader {
    pub fn open(dir: &Path) -> Result<Self, BevError> {
        let file = CsvFile::open(dir, GEBAEUDE_CSV)?;
        let h = file.header();
        let cols = GebaeudeColumns {
            adrcd: h.column(GEBAEUDE_CSV, "ADRCD")?,
            subcd: h.column(GEBAEUDE_CSV, "SUBCD")?,
            hauptadresse: h.column(GEBAEUDE_CSV, "HAUPTADRESSE")?,
            hausnrzahl3: h.column(GEBAEUDE_CSV, "HAUSNRZAHL3")?,
            hausnrbuchstabe3: h.column(GEBAEUDE_CSV, "HAUSNRBUCHSTABE3")?,
            hausnrverbindung2: h.column(GEBAEUDE_CSV, "HAUSNRVERBINDUNG2")?,
            hausnrzahl4: h.column(GEBAEUDE_CSV, "HAUSNRZAHL4")?,
            hausnrbuchstabe4: h.column(GEBAEUDE_CSV, "HAUSNRBUCHSTABE4")?,
            hausnrverbindung3: h.column(GEBAEUDE_CSV, "HAUSNRVERBINDUNG3")?,
            bezeichnung: h.column(GEBAEUDE_CSV, "GEBAEUDEBEZEICHNUNG")?,
            rw: h.column(GEBAEUDE_CSV, "RW")?,
            hw: h.column(GEBAEUDE_CSV, "HW")?,
            epsg: h.column(GEBAEUDE_CSV, "EPSG")?,
        };
        Ok(Self { file, cols })
    }

    pub fn rows(&self) -> GebaeudeIter<'_> {
        GebaeudeIter {
            rows: self.file.rows(),
            cols: &self.cols,
            required: self.file.header().len(),
            skipped: 0,
        }
    }
}

pub struct GebaeudeIter<'a> {
    rows: RowIter<'a>,
    cols: &'a GebaeudeColumns,
    required: usize,
    skipped: usize,
}

impl<'a> GebaeudeIter<'a> {
    /// Nombre de lignes malformées ignorées jusqu'ici
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for GebaeudeIter<'a> {
    type Item = GebaeudeRow;

    fn next(&mut self) -> Option<GebaeudeRow> {
        let row = loop {
            let row = self.rows.next()?;
            if row.len() < self.required {
                self.skipped += 1;
                continue;
            }
            break row;
        };
        let c = self.cols;
        Some(GebaeudeRow {
            adrcd: row.get(c.adrcd).to_string(),
            subcd: row.get(c.subcd).to_string(),
            hauptadresse: row.get(c.hauptadresse).trim() == "1",
            hausnrzahl3: row.get(c.hausnrzahl3).to_string(),
            hausnrbuchstabe3: row.get(c.hausnrbuchstabe3).to_string(),
            hausnrverbindung2: row.get(c.hausnrverbindung2).to_string(),
            hausnrzahl4: row.get(c.hausnrzahl4).to_string(),
            hausnrbuchstabe4: row.get(c.hausnrbuchstabe4).to_string(),
            hausnrverbindung3: row.get(c.hausnrverbindung3).to_string(),
            bezeichnung: row.get(c.bezeichnung).to_string(),
            rw: parse_coordinate(row.get(c.rw)),
            hw: parse_coordinate(row.get(c.hw)),
            epsg: parse_epsg(&row, c.epsg),
        })
    }
}

/// CRS source déclaré; 0 vaut "inconnu" et sera rejeté par le reprojecteur
fn parse_epsg(row: &Row<'_>, idx: usize) -> u32 {
    row.get(idx).trim().parse().unwrap_or(0)
}
