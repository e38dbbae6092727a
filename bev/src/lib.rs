//! # bev
//!
//! Parser pour les extraits CSV du registre d'adresses autrichien
//! (Adressregister du BEV, Bundesamt für Eich- und Vermessungswesen).
//!
//! ## Features
//!
//! - Lecture `;`-CSV rapide avec `memchr` et `simdutf8`
//! - Gestion du BOM UTF-8 et des anciens extraits Windows-1252
//! - Tables de référence matérialisées (STRASSE, GEMEINDE, ORTSCHAFT)
//! - Lecture en streaming des tables volumineuses (ADRESSE, GEBAEUDE)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! let dir = Path::new("./data");
//! bev::check_dataset(dir)?;
//!
//! let refs = bev::load_reference_tables(dir)?;
//! println!("{} rues, {} communes", refs.strassen.len(), refs.gemeinden.len());
//!
//! let adressen = bev::AdresseReader::open(dir)?;
//! for row in adressen.rows() {
//!     println!("{} {}", row.adrcd, row.plz);
//! }
//! ```

pub mod error;
pub mod reader;
pub mod tables;
pub mod types;

pub use error::BevError;
pub use reader::{parse_coordinate, CsvFile};
pub use tables::{
    check_dataset, load_gemeinden, load_ortschaften, load_reference_tables, load_strassen,
    AdresseReader, GebaeudeReader,
};
pub use types::{AdresseRow, GebaeudeRow, ReferenceTables, Strasse};
