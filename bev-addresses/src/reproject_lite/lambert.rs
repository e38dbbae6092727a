//! Projection Lambert Autriche (EPSG:31287)
//!
//! Lambert Conformal Conic avec 2 parallèles standards, sur le datum MGI.
//! Cible de compatibilité: c'était la sortie de la première génération de
//! l'outil.

use super::ellipsoid::Bessel1841;
use super::Geographic;

/// Paramètres Lambert Autriche (EPSG:31287)
struct LambertAustria {
    /// Longitude origine (13°20' Est)
    lon0: f64,
    /// Latitude origine
    lat0: f64,
    /// Premier parallèle standard
    lat1: f64,
    /// Deuxième parallèle standard
    lat2: f64,
    /// False easting
    x0: f64,
    /// False northing
    y0: f64,
}

impl Default for LambertAustria {
    fn default() -> Self {
        Self {
            lon0: (13.0 + 20.0 / 60.0_f64).to_radians(),
            lat0: 47.5_f64.to_radians(),
            lat1: 49.0_f64.to_radians(),
            lat2: 46.0_f64.to_radians(),
            x0: 400000.0,
            y0: 400000.0,
        }
    }
}

/// Constantes dérivées de la projection (n, c, r0)
fn projection_constants(params: &LambertAustria) -> (f64, f64, f64) {
    let e = Bessel1841::E;
    let e2 = Bessel1841::E2;
    let a = Bessel1841::A;

    let n1 = grande_normale(params.lat1, a, e2);
    let n2 = grande_normale(params.lat2, a, e2);

    let iso_lat1 = isometric_latitude(params.lat1, e);
    let iso_lat2 = isometric_latitude(params.lat2, e);
    let iso_lat0 = isometric_latitude(params.lat0, e);

    // Exposant de la projection
    let n = (n1 * params.lat1.cos()).ln() - (n2 * params.lat2.cos()).ln();
    let n = n / (iso_lat2 - iso_lat1);

    // Constante C
    let c = (n1 * params.lat1.cos() / n) * (n * iso_lat1).exp();

    // Rayon à l'origine
    let r0 = c * (-n * iso_lat0).exp();

    (n, c, r0)
}

/// Calcule la latitude isométrique
fn isometric_latitude(lat: f64, e: f64) -> f64 {
    let sin_lat = lat.sin();
    let term = ((1.0 - e * sin_lat) / (1.0 + e * sin_lat)).powf(e / 2.0);
    ((std::f64::consts::FRAC_PI_4 + lat / 2.0).tan() * term).ln()
}

/// Calcule la latitude depuis la latitude isométrique (itératif)
fn latitude_from_isometric(iso_lat: f64, e: f64) -> f64 {
    let mut lat = 2.0 * iso_lat.exp().atan() - std::f64::consts::FRAC_PI_2;

    for _ in 0..10 {
        let sin_lat = lat.sin();
        let term = ((1.0 + e * sin_lat) / (1.0 - e * sin_lat)).powf(e / 2.0);
        let new_lat = 2.0 * (iso_lat.exp() * term).atan() - std::f64::consts::FRAC_PI_2;

        if (new_lat - lat).abs() < 1e-12 {
            return new_lat;
        }
        lat = new_lat;
    }
    lat
}

/// Calcule le grand normal (rayon de courbure dans le plan vertical)
fn grande_normale(lat: f64, a: f64, e2: f64) -> f64 {
    a / (1.0 - e2 * lat.sin().powi(2)).sqrt()
}

/// Convertit des coordonnées géographiques MGI vers Lambert Autriche
pub fn geographic_to_lambert_austria(geo: Geographic) -> (f64, f64) {
    let params = LambertAustria::default();
    let (n, c, r0) = projection_constants(&params);
    let e = Bessel1841::E;

    let iso_lat = isometric_latitude(geo.lat, e);
    let r = c * (-n * iso_lat).exp();
    let gamma = n * (geo.lon - params.lon0);

    let x = params.x0 + r * gamma.sin();
    let y = params.y0 + r0 - r * gamma.cos();
    (x, y)
}

/// Convertit Lambert Autriche vers coordonnées géographiques MGI
pub fn lambert_austria_to_geographic(x: f64, y: f64) -> Geographic {
    let params = LambertAustria::default();
    let (n, c, r0) = projection_constants(&params);
    let e = Bessel1841::E;

    // Coordonnées centrées
    let dx = x - params.x0;
    let dy = y - params.y0;

    // Rayon et angle
    let r = (dx.powi(2) + (r0 - dy).powi(2)).sqrt();
    let r = if n < 0.0 { -r } else { r };

    let gamma = (dx / (r0 - dy)).atan();

    let iso_lat = -(r / c).ln() / n;
    let lat = latitude_from_isometric(iso_lat, e);
    let lon = params.lon0 + gamma / n;

    Geographic::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin() {
        // L'origine de la projection (13°20'E, 47.5°N) tombe sur le false
        // easting/northing
        let geo = Geographic::from_degrees(13.0 + 20.0 / 60.0, 47.5);
        let (x, y) = geographic_to_lambert_austria(geo);

        assert!((x - 400000.0).abs() < 0.01, "x={}", x);
        assert!((y - 400000.0).abs() < 0.01, "y={}", y);
    }

    #[test]
    fn test_vienne() {
        // Vienne (~16.37°E, ~48.2°N MGI): à l'est et au nord de l'origine
        let geo = Geographic::from_degrees(16.37, 48.2);
        let (x, y) = geographic_to_lambert_austria(geo);

        assert!(x > 550000.0 && x < 700000.0, "x={}", x);
        assert!(y > 430000.0 && y < 520000.0, "y={}", y);
    }

    #[test]
    fn test_roundtrip() {
        let geo = Geographic::from_degrees(14.3, 46.62);
        let (x, y) = geographic_to_lambert_austria(geo);
        let back = lambert_austria_to_geographic(x, y);
        let (lon, lat) = back.to_degrees();

        assert!((lon - 14.3).abs() < 1e-9, "lon={}", lon);
        assert!((lat - 46.62).abs() < 1e-9, "lat={}", lat);
    }
}
