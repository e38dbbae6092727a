//! Conversion des extraits d'adresses du registre BEV
//!
//! Transforme les cinq tables CSV d'un extrait du registre autrichien des
//! adresses en table dénormalisée, arborescence OSM ou GeoJSON, avec
//! reprojection des coordonnées Gauss-Krüger.

pub mod cli;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod reproject_lite;
