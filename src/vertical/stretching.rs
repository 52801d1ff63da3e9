//! Vertical stretching functions for terrain-following grids.
//!
//! A stretching function gives, for each of the `N + 1` w-levels and `N`
//! rho-levels, the fractional coordinate `s ∈ [-1, 0]` and the stretched
//! curve `Cs(s)`, with `Cs(-1) = -1` and `Cs(0) = 0`. The grid transform in
//! [`VerticalGrid`](super::VerticalGrid) blends the two through the critical
//! depth `hc`.
//!
//! # Available Stretching Functions
//!
//! - [`UniformStretching`]: `Cs = s`
//! - [`SongHaidvogelStretching`]: surface/bottom refinement (Song & Haidvogel 1994)
//!
//! # Example
//!
//! ```
//! use ocean_split::vertical::{SongHaidvogelStretching, Stretching};
//!
//! let sh = SongHaidvogelStretching::new(7.0, 0.1, 250.0);
//! let curves = sh.curves(20);
//! assert_eq!(curves.s_w.len(), 21);
//! assert!((curves.cs_w[0] + 1.0).abs() < 1e-12);
//! ```

use crate::error::{OceanError, Result};

/// Fractional coordinates and stretching curves at rho- and w-levels.
#[derive(Clone, Debug, PartialEq)]
pub struct StretchingCurves {
    /// `s` at w-levels, length `N + 1`, bottom first
    pub s_w: Vec<f64>,
    /// `Cs(s_w)`
    pub cs_w: Vec<f64>,
    /// `s` at rho-levels, length `N`
    pub s_r: Vec<f64>,
    /// `Cs(s_r)`
    pub cs_r: Vec<f64>,
}

/// Trait for vertical stretching functions.
pub trait Stretching: Send + Sync {
    /// Stretching curve `Cs(s)` on `[-1, 0]`.
    fn cs(&self, s: f64) -> f64;

    /// Critical depth used by the grid transform.
    fn hc(&self) -> f64;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;

    /// Curves for `n_levels` cells.
    fn curves(&self, n_levels: usize) -> StretchingCurves {
        let n = n_levels as f64;
        let s_w: Vec<f64> = (0..=n_levels).map(|k| (k as f64 - n) / n).collect();
        let s_r: Vec<f64> = (0..n_levels).map(|k| (k as f64 - n + 0.5) / n).collect();
        let cs_w = s_w.iter().map(|&s| self.cs(s)).collect();
        let cs_r = s_r.iter().map(|&s| self.cs(s)).collect();
        StretchingCurves {
            s_w,
            cs_w,
            s_r,
            cs_r,
        }
    }
}

/// Equal spacing: `Cs(s) = s`, no critical depth.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformStretching;

impl Stretching for UniformStretching {
    fn cs(&self, s: f64) -> f64 {
        s
    }

    fn hc(&self) -> f64 {
        0.0
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}

/// Song-Haidvogel stretching.
///
/// ```text
/// Cs(s) = (1 - θb)·sinh(θs·s)/sinh(θs)
///       + θb·[tanh(θs·(s + ½)) / (2·tanh(½θs)) - ½]
/// ```
///
/// - `theta_s`: surface refinement (0 to 10), 0 gives `Cs = s`
/// - `theta_b`: bottom refinement weight (0 to 1)
/// - `hc`: critical depth (m)
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SongHaidvogelStretching {
    pub theta_s: f64,
    pub theta_b: f64,
    pub hc: f64,
}

impl Default for SongHaidvogelStretching {
    fn default() -> Self {
        Self {
            theta_s: 5.0,
            theta_b: 0.4,
            hc: 200.0,
        }
    }
}

impl SongHaidvogelStretching {
    pub fn new(theta_s: f64, theta_b: f64, hc: f64) -> Self {
        Self {
            theta_s,
            theta_b,
            hc,
        }
    }
}

impl Stretching for SongHaidvogelStretching {
    fn cs(&self, s: f64) -> f64 {
        if self.theta_s <= 0.0 {
            return s;
        }
        let surface = (self.theta_s * s).sinh() / self.theta_s.sinh();
        let bottom = (self.theta_s * (s + 0.5)).tanh() / (2.0 * (0.5 * self.theta_s).tanh()) - 0.5;
        (1.0 - self.theta_b) * surface + self.theta_b * bottom
    }

    fn hc(&self) -> f64 {
        self.hc
    }

    fn name(&self) -> &'static str {
        "song_haidvogel"
    }
}

/// Configuration-level choice of stretching.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StretchingKind {
    #[default]
    Uniform,
    SongHaidvogel(SongHaidvogelStretching),
}

impl StretchingKind {
    pub fn validate(&self) -> Result<()> {
        if let StretchingKind::SongHaidvogel(sh) = self {
            if !(0.0..=10.0).contains(&sh.theta_s) {
                return Err(OceanError::InvalidConfig(format!(
                    "theta_s must be in [0, 10], got {}",
                    sh.theta_s
                )));
            }
            if !(0.0..=1.0).contains(&sh.theta_b) {
                return Err(OceanError::InvalidConfig(format!(
                    "theta_b must be in [0, 1], got {}",
                    sh.theta_b
                )));
            }
            if sh.hc.is_nan() || sh.hc < 0.0 {
                return Err(OceanError::InvalidConfig(format!(
                    "hc must be non-negative, got {}",
                    sh.hc
                )));
            }
        }
        Ok(())
    }

    pub fn as_stretching(&self) -> &dyn Stretching {
        match self {
            StretchingKind::Uniform => &UniformStretching,
            StretchingKind::SongHaidvogel(sh) => sh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_uniform_curves() {
        let c = UniformStretching.curves(4);
        assert_eq!(c.s_w, vec![-1.0, -0.75, -0.5, -0.25, 0.0]);
        assert_eq!(c.s_r, vec![-0.875, -0.625, -0.375, -0.125]);
        assert_eq!(c.cs_r, c.s_r);
    }

    #[test]
    fn test_song_haidvogel_endpoints() {
        for theta_b in [0.0, 0.4, 1.0] {
            let sh = SongHaidvogelStretching::new(6.0, theta_b, 50.0);
            assert!((sh.cs(-1.0) + 1.0).abs() < TOL, "Cs(-1) with theta_b={}", theta_b);
            assert!(sh.cs(0.0).abs() < TOL, "Cs(0) with theta_b={}", theta_b);
        }
    }

    #[test]
    fn test_song_haidvogel_surface_refinement() {
        let c = SongHaidvogelStretching::new(7.0, 0.0, 250.0).curves(30);
        let top = c.cs_w[30] - c.cs_w[29];
        let bottom = c.cs_w[1] - c.cs_w[0];
        assert!(
            top < bottom,
            "Surface layers should be thinner: top={}, bottom={}",
            top,
            bottom
        );
        for k in 1..=30 {
            assert!(c.cs_w[k] > c.cs_w[k - 1], "Cs must increase upward");
        }
    }

    #[test]
    fn test_zero_theta_is_uniform() {
        let sh = SongHaidvogelStretching::new(0.0, 0.5, 10.0);
        assert_eq!(sh.curves(8).cs_w, UniformStretching.curves(8).s_w);
    }

    #[test]
    fn test_kind_validation() {
        assert!(StretchingKind::Uniform.validate().is_ok());
        let bad = StretchingKind::SongHaidvogel(SongHaidvogelStretching::new(12.0, 0.1, 10.0));
        assert!(bad.validate().is_err());
        let bad = StretchingKind::SongHaidvogel(SongHaidvogelStretching::new(5.0, 0.1, f64::NAN));
        assert!(bad.validate().is_err());
        assert_eq!(StretchingKind::default().as_stretching().name(), "uniform");
    }
}
