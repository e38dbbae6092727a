//! Projection Gauss-Krüger autrichienne (MGI)
//!
//! Zones supportées:
//! - M28 / GK West (EPSG:31254) - méridien central 10°20'
//! - M31 / GK Mitte (EPSG:31255) - méridien central 13°20'
//! - M34 / GK Ost (EPSG:31256) - méridien central 16°20'
//!
//! Transverse Mercator sur l'ellipsoïde Bessel 1841, facteur d'échelle 1.0,
//! false northing de -5 000 000 m. Les coordonnées géographiques produites
//! sont dans le datum MGI, pas WGS84.

use super::ellipsoid::Bessel1841;
use super::Geographic;

/// Facteur d'échelle (Gauss-Krüger: 1.0, contrairement à l'UTM)
const K0: f64 = 1.0;

/// False northing (le registre compte depuis -5 000 km)
const Y0: f64 = -5_000_000.0;

/// Méridien central d'une zone MGI, en degrés
pub fn central_meridian(epsg: u32) -> Option<f64> {
    match epsg {
        31254 => Some(10.0 + 20.0 / 60.0),
        31255 => Some(13.0 + 20.0 / 60.0),
        31256 => Some(16.0 + 20.0 / 60.0),
        _ => None,
    }
}

/// Convertit Gauss-Krüger vers coordonnées géographiques MGI
pub fn gk_to_geographic(x: f64, y: f64, lon0_deg: f64) -> Geographic {
    let a = Bessel1841::A;
    let e2 = Bessel1841::E2;
    let ep2 = Bessel1841::EP2;

    let lon0 = lon0_deg.to_radians();

    // Coordonnées réduites
    let y = y - Y0;

    // Calcul du footprint latitude
    let m = y / K0;
    let mu = m / (a * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

    // Coefficients pour la série
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    // Calculs intermédiaires
    let sin_phi1 = phi1.sin();
    let cos_phi1 = phi1.cos();
    let tan_phi1 = phi1.tan();

    let n1 = a / (1.0 - e2 * sin_phi1.powi(2)).sqrt();
    let t1 = tan_phi1.powi(2);
    let c1 = ep2 * cos_phi1.powi(2);
    let r1 = a * (1.0 - e2) / (1.0 - e2 * sin_phi1.powi(2)).powf(1.5);
    let d = x / (n1 * K0);

    // Latitude
    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2) - 252.0 * ep2 - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    // Longitude
    let lon = lon0
        + (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
            + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
                * d.powi(5)
                / 120.0)
            / cos_phi1;

    Geographic::new(lon, lat)
}

/// Convertit coordonnées géographiques MGI vers Gauss-Krüger
/// (chemin retour, utilisé pour la propriété d'aller-retour)
pub fn geographic_to_gk(geo: Geographic, lon0_deg: f64) -> (f64, f64) {
    let a = Bessel1841::A;
    let e2 = Bessel1841::E2;
    let ep2 = Bessel1841::EP2;

    let lon0 = lon0_deg.to_radians();
    let phi = geo.lat;

    let sin_phi = phi.sin();
    let cos_phi = phi.cos();
    let tan_phi = phi.tan();

    let n = a / (1.0 - e2 * sin_phi.powi(2)).sqrt();
    let t = tan_phi.powi(2);
    let c = ep2 * cos_phi.powi(2);
    let big_a = (geo.lon - lon0) * cos_phi;

    // Arc de méridien
    let m = a
        * ((1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e2.powi(2) / 32.0 + 45.0 * e2.powi(3) / 1024.0)
                * (2.0 * phi).sin()
            + (15.0 * e2.powi(2) / 256.0 + 45.0 * e2.powi(3) / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e2.powi(3) / 3072.0) * (6.0 * phi).sin());

    let x = K0
        * n
        * (big_a
            + (1.0 - t + c) * big_a.powi(3) / 6.0
            + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * big_a.powi(5) / 120.0);

    let y = K0
        * (m + n
            * tan_phi
            * (big_a.powi(2) / 2.0
                + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * big_a.powi(4) / 24.0
                + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2) * big_a.powi(6)
                    / 720.0));

    (x, y + Y0)
}
