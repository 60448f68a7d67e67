//! Diffractometer geometry used by the intensity calculation.

/// Cu Kα1 wavelength in ångström.
pub const CU_KALPHA: f64 = 1.5406;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goniometer {
    /// Wavelength in ångström.
    pub wavelength: f64,
}

impl Default for Goniometer {
    fn default() -> Self {
        Goniometer { wavelength: CU_KALPHA }
    }
}

impl Goniometer {
    pub fn new(wavelength: f64) -> Self {
        Goniometer { wavelength }
    }

    /// Scattering vector length `s = 2 sin θ / λ` (1/Å) for a `2θ` in degrees.
    pub fn stl(&self, two_theta_deg: f64) -> f64 {
        let theta = 0.5 * two_theta_deg.to_radians();
        2.0 * theta.sin() / self.wavelength
    }

    /// Lorentz-polarisation factor `(1 + cos² 2θ) / (sin² θ cos θ)`; 0 where
    /// the denominator vanishes.
    pub fn lorentz_polarisation_factor(&self, two_theta_deg: f64) -> f64 {
        let two_theta = two_theta_deg.to_radians();
        let theta = 0.5 * two_theta;
        let denom = theta.sin().powi(2) * theta.cos();
        if denom.abs() < 1e-12 {
            return 0.0;
        }
        (1.0 + two_theta.cos().powi(2)) / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lp_factor_matches_closed_form_and_guards_zero() {
        let g = Goniometer::default();
        let t = 30.0_f64.to_radians();
        let expected = (1.0 + (2.0 * t).cos().powi(2)) / (t.sin().powi(2) * t.cos());
        assert_relative_eq!(g.lorentz_polarisation_factor(60.0), expected, epsilon = 1e-12);
        assert_eq!(g.lorentz_polarisation_factor(0.0), 0.0);
        assert_relative_eq!(g.stl(60.0), 1.0 / CU_KALPHA, epsilon = 1e-12);
    }
}
