/// Lorentzian distance: `Σ ln(1 + |aᵢ − bᵢ|)`.
///
/// Grows logarithmically in each coordinate, so a single outlying feature
/// cannot dominate the sum. Slices of unequal length are compared over the
/// shorter prefix.
pub fn lorentzian_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs().ln_1p()).sum()
}
