//! Reprojection légère en Rust pur (sans dépendances externes)
//!
//! Supporte les trois systèmes Gauss-Krüger du registre BEV:
//! - M28 / GK West (EPSG:31254)
//! - M31 / GK Mitte (EPSG:31255)
//! - M34 / GK Ost (EPSG:31256)
//!
//! Cibles supportées:
//! - WGS84 (EPSG:4326), défaut
//! - Web Mercator (EPSG:3857)
//! - Lambert Autriche (EPSG:31287), sortie historique

mod datum;
mod ellipsoid;
mod gauss_krueger;
mod lambert;
mod mercator;

pub use ellipsoid::{Bessel1841, WGS84};

use anyhow::{bail, Result};
use geo::Coord;
use tracing::warn;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Convertit en degrés
    pub fn to_degrees(self) -> (f64, f64) {
        (self.lon.to_degrees(), self.lat.to_degrees())
    }

    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Reprojecteur pour les coordonnées du registre BEV
///
/// La cible est fixée à la construction; la source est déclarée ligne par
/// ligne dans les extraits, via son code EPSG.
pub struct Reprojector {
    target_epsg: u32,
    /// Décimales conservées: 6 pour une cible en degrés, 2 en mètres
    precision: u8,
}

impl Reprojector {
    /// Crée un nouveau reprojecteur
    pub fn new(target_epsg: u32) -> Result<Self> {
        if !Self::is_supported_target(target_epsg) {
            bail!(
                "EPSG:{} non supporté. Cibles supportées: 4326, 3857, 31287",
                target_epsg
            );
        }

        let precision = if target_epsg == 4326 { 6 } else { 2 };
        Ok(Self {
            target_epsg,
            precision,
        })
    }

    /// Vérifie si l'EPSG source est supporté
    pub fn is_supported_source(epsg: u32) -> bool {
        matches!(epsg, 31254 | 31255 | 31256)
    }

    /// Vérifie si l'EPSG cible est supporté
    pub fn is_supported_target(epsg: u32) -> bool {
        matches!(epsg, 4326 | 3857 | 31287)
    }

    /// Retourne le SRID cible
    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Reprojette un point du registre vers la cible, arrondi.
    ///
    /// Un CRS source inconnu n'est pas fatal: la fonction retourne `(0, 0)`,
    /// signal que l'appelant écarte l'enregistrement.
    pub fn reproject(&self, source_epsg: u32, point: Coord) -> Coord {
        let Some(lon0) = gauss_krueger::central_meridian(source_epsg) else {
            warn!("unknown source CRS: {}", source_epsg);
            return Coord { x: 0.0, y: 0.0 };
        };

        // Étape 1: Gauss-Krüger -> géographique MGI
        let mgi = gauss_krueger::gk_to_geographic(point.x, point.y, lon0);

        // Étape 2: géographique MGI -> cible
        let (x, y) = match self.target_epsg {
            4326 => datum::mgi_to_wgs84(mgi).to_degrees(),
            3857 => mercator::geographic_to_web_mercator(datum::mgi_to_wgs84(mgi)),
            // 31287 partage le datum MGI: pas de Helmert
            31287 => lambert::geographic_to_lambert_austria(mgi),
            other => {
                warn!("unsupported target CRS: {}", other);
                return Coord { x: 0.0, y: 0.0 };
            }
        };

        Coord {
            x: round_to(x, self.precision),
            y: round_to(y, self.precision),
        }
    }

    /// Chemin retour cible -> source, sans arrondi.
    ///
    /// Sert à la propriété d'aller-retour des tests; `None` si le CRS source
    /// demandé est inconnu.
    pub fn reproject_back(&self, source_epsg: u32, point: Coord) -> Option<Coord> {
        let lon0 = gauss_krueger::central_meridian(source_epsg)?;

        let mgi = match self.target_epsg {
            4326 => datum::wgs84_to_mgi(Geographic::from_degrees(point.x, point.y)),
            3857 => datum::wgs84_to_mgi(mercator::web_mercator_to_geographic(point.x, point.y)),
            31287 => lambert::lambert_austria_to_geographic(point.x, point.y),
            _ => return None,
        };

        let (x, y) = gauss_krueger::geographic_to_gk(mgi, lon0);
        Some(Coord { x, y })
    }
}

/// Vrai si la reprojection a signalé un échec (coordonnée nulle)
pub fn reprojection_failed(point: &Coord) -> bool {
    point.x == 0.0 || point.y == 0.0
}

/// Arrondit à `decimals` décimales
fn round_to(v: f64, decimals: u8) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (v * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_source_crs() {
        let reproj = Reprojector::new(4326).unwrap();
        let out = reproj.reproject(12345, Coord { x: 1000.0, y: 250000.0 });
        assert!(reprojection_failed(&out));

        let out = reproj.reproject(0, Coord { x: 1000.0, y: 250000.0 });
        assert!(reprojection_failed(&out));
    }

    #[test]
    fn test_unsupported_target() {
        assert!(Reprojector::new(2154).is_err());
        assert!(Reprojector::new(31256).is_err());
    }

    #[test]
    fn test_gk_ost_to_wgs84() {
        // Centre de Vienne approximativement
        let reproj = Reprojector::new(4326).unwrap();
        let out = reproj.reproject(31256, Coord { x: 2950.0, y: 341000.0 });

        assert!((out.x - 16.37).abs() < 0.1, "lon={}", out.x);
        assert!((out.y - 48.21).abs() < 0.1, "lat={}", out.y);
    }

    #[test]
    fn test_gk_west_to_wgs84() {
        // Innsbruck approximativement
        let reproj = Reprojector::new(4326).unwrap();
        let out = reproj.reproject(31254, Coord { x: 80000.0, y: 236000.0 });

        assert!((out.x - 11.39).abs() < 0.15, "lon={}", out.x);
        assert!((out.y - 47.26).abs() < 0.15, "lat={}", out.y);
    }

    #[test]
    fn test_gk_ost_to_lambert_austria() {
        // Vienne en Lambert Autriche: ~(625 km, 483 km)
        let reproj = Reprojector::new(31287).unwrap();
        let out = reproj.reproject(31256, Coord { x: 2950.0, y: 341000.0 });

        assert!((out.x - 625000.0).abs() < 8000.0, "x={}", out.x);
        assert!((out.y - 483000.0).abs() < 8000.0, "y={}", out.y);
    }

    #[test]
    fn test_rounding() {
        let reproj = Reprojector::new(4326).unwrap();
        let out = reproj.reproject(31255, Coord { x: 5000.0, y: 210000.0 });

        // 6 décimales max en degrés
        let rescaled = out.x * 1e6;
        assert!((rescaled - rescaled.round()).abs() < 1e-6, "x={}", out.x);
        let rescaled = out.y * 1e6;
        assert!((rescaled - rescaled.round()).abs() < 1e-6, "y={}", out.y);
    }

    #[test]
    fn test_roundtrip_all_sources() {
        // Aller-retour source -> cible -> source, pour les trois zones.
        // L'arrondi à 6 décimales borne l'erreur à ~6 cm, l'inversion de la
        // série et du Helmert reste bien en dessous.
        for &target in &[4326u32, 3857, 31287] {
            let reproj = Reprojector::new(target).unwrap();
            for &source in &[31254u32, 31255, 31256] {
                let orig = Coord { x: 15000.0, y: 260000.0 };
                let projected = reproj.reproject(source, orig);
                assert!(!reprojection_failed(&projected));

                let back = reproj.reproject_back(source, projected).unwrap();
                assert!(
                    (back.x - orig.x).abs() < 0.5,
                    "target={} source={} x={} back={}",
                    target,
                    source,
                    orig.x,
                    back.x
                );
                assert!(
                    (back.y - orig.y).abs() < 0.5,
                    "target={} source={} y={} back={}",
                    target,
                    source,
                    orig.y,
                    back.y
                );
            }
        }
    }
}
