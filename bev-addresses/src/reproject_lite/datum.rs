//! Changement de datum MGI <-> WGS84
//!
//! Transformation à 7 paramètres (convention position vector, jeu EPSG:1618),
//! via les coordonnées géocentriques. L'altitude est prise à 0: l'erreur
//! planimétrique induite reste négligeable pour des adresses.

use super::ellipsoid::{Bessel1841, WGS84};
use super::Geographic;

/// Translations MGI -> WGS84 en mètres
const DX: f64 = 577.326;
const DY: f64 = 90.129;
const DZ: f64 = 463.919;

/// Rotations en secondes d'arc
const RX_ARCSEC: f64 = 5.137;
const RY_ARCSEC: f64 = 1.474;
const RZ_ARCSEC: f64 = 5.297;

/// Facteur d'échelle en ppm
const DS_PPM: f64 = 2.4232;

const ARCSEC_TO_RAD: f64 = std::f64::consts::PI / (180.0 * 3600.0);

/// Convertit géographique (h=0) vers géocentrique
fn geographic_to_geocentric(geo: Geographic, a: f64, e2: f64) -> (f64, f64, f64) {
    let sin_lat = geo.lat.sin();
    let cos_lat = geo.lat.cos();
    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();

    let x = n * cos_lat * geo.lon.cos();
    let y = n * cos_lat * geo.lon.sin();
    let z = n * (1.0 - e2) * sin_lat;
    (x, y, z)
}

/// Convertit géocentrique vers géographique (itératif)
fn geocentric_to_geographic(x: f64, y: f64, z: f64, a: f64, e2: f64) -> Geographic {
    let lon = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    let mut lat = z.atan2(p * (1.0 - e2));
    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let new_lat = (z + e2 * n * sin_lat).atan2(p);
        if (new_lat - lat).abs() < 1e-13 {
            lat = new_lat;
            break;
        }
        lat = new_lat;
    }

    Geographic::new(lon, lat)
}

/// Convertit des coordonnées géographiques MGI (Bessel) vers WGS84
pub fn mgi_to_wgs84(geo: Geographic) -> Geographic {
    let (x, y, z) = geographic_to_geocentric(geo, Bessel1841::A, Bessel1841::E2);

    let rx = RX_ARCSEC * ARCSEC_TO_RAD;
    let ry = RY_ARCSEC * ARCSEC_TO_RAD;
    let rz = RZ_ARCSEC * ARCSEC_TO_RAD;
    let m = 1.0 + DS_PPM * 1e-6;

    let xt = DX + m * (x - rz * y + ry * z);
    let yt = DY + m * (rz * x + y - rx * z);
    let zt = DZ + m * (-ry * x + rx * y + z);

    geocentric_to_geographic(xt, yt, zt, WGS84::A, WGS84::E2)
}

/// Convertit WGS84 vers MGI (chemin retour)
///
/// Inverse exacte au premier ordre: pour des rotations de quelques secondes
/// d'arc, la transposée de la matrice de rotation suffit largement.
pub fn wgs84_to_mgi(geo: Geographic) -> Geographic {
    let (x, y, z) = geographic_to_geocentric(geo, WGS84::A, WGS84::E2);

    let rx = RX_ARCSEC * ARCSEC_TO_RAD;
    let ry = RY_ARCSEC * ARCSEC_TO_RAD;
    let rz = RZ_ARCSEC * ARCSEC_TO_RAD;
    let m = 1.0 + DS_PPM * 1e-6;

    let xs = (x - DX) / m;
    let ys = (y - DY) / m;
    let zs = (z - DZ) / m;

    let xt = xs + rz * ys - ry * zs;
    let yt = -rz * xs + ys + rx * zs;
    let zt = ry * xs - rx * ys + zs;

    geocentric_to_geographic(xt, yt, zt, Bessel1841::A, Bessel1841::E2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shift_magnitude() {
        // Le décalage MGI -> WGS84 en Autriche est de l'ordre de quelques
        // centaines de mètres, jamais plus de ~0.01°
        let mgi = Geographic::from_degrees(16.37, 48.20);
        let wgs = mgi_to_wgs84(mgi);
        let (lon, lat) = wgs.to_degrees();

        assert!((lon - 16.37).abs() < 0.01, "lon={}", lon);
        assert!((lat - 48.20).abs() < 0.01, "lat={}", lat);
        // Et le décalage n'est pas nul
        assert!((lon - 16.37).abs() > 1e-5 || (lat - 48.20).abs() > 1e-5);
    }

    #[test]
    fn test_roundtrip() {
        let mgi = Geographic::from_degrees(13.04, 47.80);
        let back = wgs84_to_mgi(mgi_to_wgs84(mgi));
        let (lon, lat) = back.to_degrees();

        assert!((lon - 13.04).abs() < 1e-7, "lon={}", lon);
        assert!((lat - 47.80).abs() < 1e-7, "lat={}", lat);
    }

    #[test]
    fn test_geocentric_roundtrip() {
        let geo = Geographic::from_degrees(10.5, 47.0);
        let (x, y, z) = geographic_to_geocentric(geo, WGS84::A, WGS84::E2);
        let back = geocentric_to_geographic(x, y, z, WGS84::A, WGS84::E2);
        let (lon, lat) = back.to_degrees();

        assert!((lon - 10.5).abs() < 1e-9);
        assert!((lat - 47.0).abs() < 1e-9);
    }
}
