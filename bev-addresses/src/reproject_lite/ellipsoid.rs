//! Définitions des ellipsoïdes

/// Ellipsoïde Bessel 1841 (datum MGI, projections Gauss-Krüger autrichiennes)
pub struct Bessel1841;

impl Bessel1841 {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub const A: f64 = 6377397.155;

    /// Aplatissement
    pub const F: f64 = 1.0 / 299.1528128;

    /// Première excentricité au carré
    pub const E2: f64 = 2.0 * Self::F - Self::F * Self::F;

    /// Première excentricité
    pub const E: f64 = 0.081696831222; // sqrt(E2)

    /// Deuxième excentricité au carré
    pub const EP2: f64 = Self::E2 / (1.0 - Self::E2);
}

/// Ellipsoïde WGS84
pub struct WGS84;

impl WGS84 {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257223563;

    /// Première excentricité au carré
    pub const E2: f64 = 2.0 * Self::F - Self::F * Self::F;

    /// Première excentricité
    pub const E: f64 = 0.0818191908426215; // sqrt(E2)
}
