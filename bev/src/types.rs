//! Types de données pour le crate bev

use std::collections::HashMap;

/// Une rue du registre (STRASSE.csv)
#[derive(Debug, Clone)]
pub struct Strasse {
    /// Nom de rue, sans espaces de fin (le registre en contient)
    pub name: String,

    /// Complément de nom (STRASSENNAMENZUSATZ)
    pub zusatz: String,

    /// Commune propriétaire (GKZ)
    pub gkz: String,
}

/// Les trois tables de référence, immuables après chargement
#[derive(Debug, Default)]
pub struct ReferenceTables {
    /// SKZ -> rue
    pub strassen: HashMap<String, Strasse>,

    /// GKZ -> nom de commune
    pub gemeinden: HashMap<String, String>,

    /// OKZ -> nom de localité
    pub ortschaften: HashMap<String, String>,
}

/// Une ligne brute de ADRESSE.csv
///
/// Les six sous-champs de numéro restent des chaînes: leur combinaison est
/// une affaire du pipeline, pas du format.
#[derive(Debug, Clone, Default)]
pub struct AdresseRow {
    /// Code adresse unique (ADRCD)
    pub adrcd: String,
    /// Commune (GKZ)
    pub gkz: String,
    /// Localité (OKZ)
    pub okz: String,
    /// Rue (SKZ)
    pub skz: String,
    /// Code postal
    pub plz: String,
    /// Numéro en texte libre (HAUSNRTEXT)
    pub hausnrtext: String,
    pub hausnrzahl1: String,
    pub hausnrbuchstabe1: String,
    pub hausnrverbindung1: String,
    pub hausnrzahl2: String,
    pub hausnrbuchstabe2: String,
    /// Qualificatif de plage (HAUSNRBEREICH, "keine Angabe" = absent)
    pub hausnrbereich: String,
    /// Nom de maison / de ferme (HOFNAME)
    pub hofname: String,
    /// Easting (RW), `None` si champ vide ou non numérique
    pub rw: Option<f64>,
    /// Northing (HW)
    pub hw: Option<f64>,
    /// CRS source déclaré, 0 si illisible
    pub epsg: u32,
}

/// Une ligne brute de GEBAEUDE.csv
#[derive(Debug, Clone, Default)]
pub struct GebaeudeRow {
    /// Code adresse de rattachement (ADRCD)
    pub adrcd: String,
    /// Sous-code bâtiment (SUBCD)
    pub subcd: String,
    /// Entrée principale (HAUPTADRESSE == "1")
    pub hauptadresse: bool,
    pub hausnrzahl3: String,
    pub hausnrbuchstabe3: String,
    /// Lu mais inutilisé par la composition (comportement hérité)
    pub hausnrverbindung2: String,
    pub hausnrzahl4: String,
    pub hausnrbuchstabe4: String,
    pub hausnrverbindung3: String,
    /// Désignation du bâtiment (GEBAEUDEBEZEICHNUNG)
    pub bezeichnung: String,
    pub rw: Option<f64>,
    pub hw: Option<f64>,
    pub epsg: u32,
}
