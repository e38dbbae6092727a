//! Configuration de la conversion

use serde::{Deserialize, Serialize};
use std::path::Path;

use anyhow::{Context, Result};

/// Mode de sortie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Une ligne par unité, adresse repliée quand c'est possible
    #[default]
    Plain,
    /// Sortie à l'ancienne: une ligne par adresse, sous-adresses repliées
    Compat,
    /// Tout conserver, avec marqueurs de provenance sur les codes
    Debug,
}

/// Politique de repli en mode compat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CompatCollapse {
    /// Replie toujours vers la ligne d'adresse
    Always,
    /// Replie seulement quand aucun bâtiment ne porte d'unité
    #[default]
    NoUnitsOnly,
}

/// Format de sortie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table CSV dénormalisée
    #[default]
    Csv,
    /// Arborescence de fichiers OSM XML
    Osm,
    /// FeatureCollection GeoJSON
    Geojson,
}

/// Clé de tri de la sortie table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Commune (GKZ)
    Gkz,
    /// Nom de commune
    Gemeinde,
    /// Code postal
    Plz,
    /// Nom de rue
    Strasse,
    /// Numéro de maison (tri lexicographique)
    Hausnummer,
    /// Code adresse (ADRCD)
    Adrcd,
}

/// Regroupement des fichiers OSM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OsmGrouping {
    /// Un fichier par rue, dans un répertoire par code postal
    #[default]
    Street,
    /// Un fichier par code postal
    Postcode,
}

/// Colonne de la sortie table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnSpec {
    /// Intitulé écrit dans l'en-tête
    pub name: String,
    /// Champ source de la ligne de sortie
    pub source: String,
}

/// Configuration des colonnes de la sortie table
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColumnsConfig {
    pub columns: Vec<ColumnSpec>,
}

impl ColumnsConfig {
    /// Charge une configuration de colonnes depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read columns file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse columns JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "standard" => Self::load_embedded(include_str!("presets/standard.json")),
            "compat" => Self::load_embedded(include_str!("presets/compat.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: standard, compat", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded columns config")
    }
}

/// Configuration complète d'une conversion
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Mode de sortie
    pub mode: OutputMode,
    /// Politique de repli en mode compat
    pub compat_collapse: CompatCollapse,
    /// Supprime les lignes ne portant que des notes
    pub notes_only_filter: bool,
    /// Conserve les adresses sans numéro de maison
    pub include_dubious: bool,
    /// SRID cible
    pub target_epsg: u32,
    /// Date de l'extrait (YYYY-MM-DD)
    pub extract_date: String,
    /// Clés de tri de la sortie table, appliquées dans l'ordre
    pub sort: Vec<SortKey>,
    /// Colonnes de la sortie table
    pub columns: ColumnsConfig,
    /// Regroupement des fichiers OSM
    pub group_by: OsmGrouping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_preset() {
        let config = ColumnsConfig::from_preset("standard").unwrap();
        assert!(config.columns.len() > 6);
        assert!(config.columns.iter().any(|c| c.source == "hausnummer"));
        assert!(config.columns.iter().any(|c| c.source == "x"));
    }

    #[test]
    fn test_compat_preset() {
        let config = ColumnsConfig::from_preset("compat").unwrap();
        let names: Vec<_> = config.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Gemeinde", "plz", "strasse", "nummer", "x", "y"]);
    }

    #[test]
    fn test_unknown_preset() {
        assert!(ColumnsConfig::from_preset("nope").is_err());
    }
}
