//! Détection des noms de rue ambigus
//!
//! Deux rues d'une même commune peuvent ne différer que par des variations
//! d'écriture ("Hauptstraße" / "Hauptstrasse" / "Haupt-Straße"). Pour le
//! géocodage ces variations désignent la même rue, mais deux rues réellement
//! distinctes peuvent aussi se normaliser vers la même forme. On marque ces
//! cas pour que l'aval les traite avec prudence.

use std::collections::{HashMap, HashSet};

use bev::types::Strasse;

/// Normalise un nom de rue pour la comparaison intra-commune.
///
/// Minuscules, ß -> ss, espaces et traits d'union supprimés, "strasse" et
/// "str." réduits à "str".
pub fn normalize_street_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('ß', "ss");
    let compact: String = lowered.chars().filter(|c| *c != ' ' && *c != '-').collect();
    compact.replace("strasse", "str").replace("str.", "str")
}

/// Noms de rue ambigus, indexés par commune (GKZ)
#[derive(Debug, Default)]
pub struct AmbiguousStreets {
    /// GKZ -> formes normalisées portées par plus d'une rue
    by_gkz: HashMap<String, HashSet<String>>,
}

impl AmbiguousStreets {
    /// Construit l'index depuis la table des rues
    pub fn build(strassen: &HashMap<String, Strasse>) -> Self {
        let mut seen: HashMap<String, HashSet<String>> = HashMap::new();
        let mut by_gkz: HashMap<String, HashSet<String>> = HashMap::new();

        for strasse in strassen.values() {
            let normalized = normalize_street_name(&strasse.name);
            let gkz_seen = seen.entry(strasse.gkz.clone()).or_default();
            if !gkz_seen.insert(normalized.clone()) {
                by_gkz
                    .entry(strasse.gkz.clone())
                    .or_default()
                    .insert(normalized);
            }
        }

        Self { by_gkz }
    }

    /// Vrai si la forme normalisée est portée par plusieurs rues de la commune
    pub fn is_ambiguous(&self, gkz: &str, normalized: &str) -> bool {
        self.by_gkz
            .get(gkz)
            .map(|set| set.contains(normalized))
            .unwrap_or(false)
    }
}
