//! Projection Web Mercator (EPSG:3857)
//!
//! Aussi connu sous le nom de Pseudo-Mercator ou Spherical Mercator.
//! Utilisé par Google Maps, OpenStreetMap, etc.

use super::ellipsoid::WGS84;
use super::Geographic;

/// Convertit coordonnées géographiques WGS84 vers Web Mercator (EPSG:3857)
pub fn geographic_to_web_mercator(geo: Geographic) -> (f64, f64) {
    // Web Mercator utilise un modèle sphérique avec le rayon équatorial
    let r = WGS84::A;

    // Limiter la latitude pour éviter l'infini
    let lat = geo.lat.clamp(-85.0_f64.to_radians(), 85.0_f64.to_radians());

    let x = r * geo.lon;
    let y = r * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();

    (x, y)
}

/// Convertit Web Mercator vers coordonnées géographiques (chemin retour)
pub fn web_mercator_to_geographic(x: f64, y: f64) -> Geographic {
    let r = WGS84::A;

    let lon = x / r;
    let lat = 2.0 * (y / r).exp().atan() - std::f64::consts::FRAC_PI_2;

    Geographic::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vienne_to_web_mercator() {
        // Vienne: 16.37°E, 48.21°N
        let geo = Geographic::from_degrees(16.37, 48.21);
        let (x, y) = geographic_to_web_mercator(geo);

        // Valeurs attendues approximatives
        assert!((x - 1822300.0).abs() < 5000.0, "x={}", x);
        assert!((y - 6142000.0).abs() < 20000.0, "y={}", y);
    }

    #[test]
    fn test_roundtrip() {
        let geo = Geographic::from_degrees(16.37, 48.21);
        let (x, y) = geographic_to_web_mercator(geo);
        let back = web_mercator_to_geographic(x, y);
        let (lon, lat) = back.to_degrees();

        assert!((lon - 16.37).abs() < 0.001, "lon={}", lon);
        assert!((lat - 48.21).abs() < 0.001, "lat={}", lat);
    }
}
