//! Types d'erreurs pour le crate bev

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture des extraits CSV du BEV
#[derive(Debug, Error)]
pub enum BevError {
    /// Erreur d'I/O lors de la lecture d'un fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Table source obligatoire absente du répertoire d'entrée
    #[error("Missing required table: {0}")]
    MissingFile(String),

    /// Colonne attendue absente de l'en-tête
    #[error("Missing column '{column}' in {file}")]
    InvalidHeader { file: String, column: String },
}

impl BevError {
    /// Crée une erreur d'en-tête invalide
    pub fn invalid_header(file: impl Into<String>, column: impl Into<String>) -> Self {
        Self::InvalidHeader {
            file: file.into(),
            column: column.into(),
        }
    }
}
