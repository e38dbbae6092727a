//! Rapport de conversion avec graceful degradation
//!
//! Ce module fournit des structures pour collecter et afficher
//! les résultats de conversion avec erreurs et warnings détaillés.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;

/// Statut global de la conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConvertStatus {
    /// Conversion réussie sans enregistrement écarté
    Success,
    /// Conversion réussie mais des enregistrements ont été écartés
    PartialSuccess,
    /// Conversion échouée
    Failed,
}

/// Raison pour laquelle un enregistrement a été écarté
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DropReason {
    /// Coordonnées absentes ou nulles dans l'extrait
    MissingCoordinates,
    /// Code EPSG source inconnu
    UnknownCrs,
    /// Numéro de maison vide après composition
    EmptyHausnummer,
    /// Clé étrangère (SKZ/GKZ/OKZ) absente des tables de référence
    UnresolvedReference,
    /// Bâtiment non marqué adresse principale
    NotMainAddress,
    /// Bâtiment sans adresse parente dans l'extrait
    OrphanBuilding,
    /// Bâtiment sans coordonnées exploitables
    BuildingWithoutCoordinates,
    /// Ligne portant uniquement des notes, supprimée par le filtre
    NotesOnly,
}

impl DropReason {
    fn label(self) -> &'static str {
        match self {
            DropReason::MissingCoordinates => "missing coordinates",
            DropReason::UnknownCrs => "unknown CRS",
            DropReason::EmptyHausnummer => "empty house number",
            DropReason::UnresolvedReference => "unresolved reference",
            DropReason::NotMainAddress => "not main address",
            DropReason::OrphanBuilding => "orphan building",
            DropReason::BuildingWithoutCoordinates => "building without coordinates",
            DropReason::NotesOnly => "notes only",
        }
    }
}

/// Warning de conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConvertWarning {
    /// Identifiant de l'enregistrement (ADRCD, ou ADRCD/SUBCD)
    pub record_id: String,
    /// Message de warning
    pub message: String,
}

/// Rapport complet de conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConvertReport {
    /// Date de l'extrait (stichtag)
    pub extract_date: String,
    /// Durée de la conversion
    pub duration_secs: f64,
    /// Statut global
    pub status: ConvertStatus,

    // Compteurs globaux
    /// Nombre de lignes d'adresse lues
    pub addresses_read: usize,
    /// Nombre de lignes de bâtiment lues
    pub buildings_read: usize,
    /// Nombre d'adresses conservées
    pub addresses_kept: usize,
    /// Nombre de bâtiments rattachés
    pub buildings_merged: usize,
    /// Nombre de lignes écrites en sortie
    pub rows_written: usize,
    /// Nombre d'adresses avec nom de rue ambigu
    pub ambiguous_streets: usize,
    /// Nombre d'enregistrements écartés
    pub records_dropped: usize,

    /// Enregistrements écartés, par raison
    pub dropped_by_reason: HashMap<String, usize>,

    /// Répartition des adresses multi-bâtiments par mélange d'unités
    pub unit_mix: HashMap<String, usize>,

    /// Liste des warnings
    pub warnings: Vec<ConvertWarning>,
}

impl Default for ConvertReport {
    fn default() -> Self {
        Self {
            extract_date: String::new(),
            duration_secs: 0.0,
            status: ConvertStatus::Success,
            addresses_read: 0,
            buildings_read: 0,
            addresses_kept: 0,
            buildings_merged: 0,
            rows_written: 0,
            ambiguous_streets: 0,
            records_dropped: 0,
            dropped_by_reason: HashMap::new(),
            unit_mix: HashMap::new(),
            warnings: Vec::new(),
        }
    }
}

impl ConvertReport {
    /// Crée un nouveau rapport pour une date d'extrait
    pub fn new(extract_date: &str) -> Self {
        Self {
            extract_date: extract_date.to_string(),
            ..Default::default()
        }
    }

    /// Enregistre un enregistrement écarté
    pub fn record_drop(&mut self, reason: DropReason) {
        self.records_dropped += 1;
        *self
            .dropped_by_reason
            .entry(reason.label().to_string())
            .or_default() += 1;
    }

    /// Enregistre le mélange d'unités d'une adresse multi-bâtiments
    pub fn record_unit_mix(&mut self, label: &str) {
        *self.unit_mix.entry(label.to_string()).or_default() += 1;
    }

    /// Enregistre un warning
    pub fn record_warning(&mut self, record_id: &str, message: &str) {
        self.warnings.push(ConvertWarning {
            record_id: record_id.to_string(),
            message: message.to_string(),
        });
    }

    /// Définit la durée de la conversion
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        self.status = if self.rows_written == 0 {
            ConvertStatus::Failed
        } else if self.records_dropped > 0 {
            ConvertStatus::PartialSuccess
        } else {
            ConvertStatus::Success
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CONVERT REPORT - Extract {}", self.extract_date);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Read: {} addresses, {} buildings",
            self.addresses_read, self.buildings_read
        );
        println!(
            "Kept: {} addresses, {} buildings merged, {} rows written",
            self.addresses_kept, self.buildings_merged, self.rows_written
        );
        println!(
            "Ambiguous street names: {}, records dropped: {}",
            self.ambiguous_streets, self.records_dropped
        );

        if !self.dropped_by_reason.is_empty() {
            println!("\n--- DROPPED BY REASON ---");
            let mut reasons: Vec<_> = self.dropped_by_reason.iter().collect();
            reasons.sort_by_key(|(k, _)| k.as_str());
            for (reason, count) in reasons {
                println!("  {}: {}", reason, count);
            }
        }

        if !self.unit_mix.is_empty() {
            println!("\n--- MULTI-BUILDING ADDRESSES ---");
            let mut mixes: Vec<_> = self.unit_mix.iter().collect();
            mixes.sort_by_key(|(k, _)| k.as_str());
            for (mix, count) in mixes {
                println!("  {}: {}", mix, count);
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(10) {
                println!("  [{}] {}", w.record_id, w.message);
            }
            if self.warnings.len() > 10 {
                println!("  ... and {} more", self.warnings.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} addresses kept, {} rows written, {} dropped",
            self.extract_date, self.addresses_kept, self.rows_written, self.records_dropped
        )
    }
}
