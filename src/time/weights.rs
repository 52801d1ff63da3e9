//! Barotropic time-averaging filter.
//!
//! The fast mode is averaged over its sub-cycle with two weight sets:
//!
//! - primary weights, applied to the free surface and transport at each
//!   predictor (`Zt_avg1`, `DU_avg1`, `DV_avg1`)
//! - secondary weights, the tail sums of the primary ones, applied to the
//!   transports that couple to the next 3D step (`DU_avg2`, `DV_avg2`)
//!
//! The power-law shape `w(τ) = τ^α - τ^(α+β) - γ·τ` is scaled so its centre
//! of gravity falls on the baroclinic step, which usually requires running
//! the sub-cycle past `ndtfast` to `nfast` steps. After scaling, the discrete
//! weights are shifted until the centroid sits exactly on `ndtfast`, then
//! both sets are normalised to unit sum.

use crate::error::{OceanError, Result};

/// Barotropic filter selection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FastWeightKind {
    /// Constant sub-step weights `(0, 1, 0, 0)`, no extension of the cycle.
    /// Meant for a single barotropic step per baroclinic step.
    SingleStep,
    /// Power-law shape function.
    PowerLaw { alpha: f64, beta: f64, gamma: f64 },
}

impl Default for FastWeightKind {
    fn default() -> Self {
        Self::PowerLaw {
            alpha: 2.0,
            beta: 4.0,
            gamma: 0.284,
        }
    }
}

impl FastWeightKind {
    pub fn validate(&self) -> Result<()> {
        match *self {
            FastWeightKind::SingleStep => Ok(()),
            FastWeightKind::PowerLaw { alpha, beta, gamma } => {
                if !(alpha.is_finite() && beta.is_finite() && gamma.is_finite()) {
                    return Err(OceanError::InvalidConfig(
                        "power-law weight parameters must be finite".into(),
                    ));
                }
                if alpha <= 0.0 || beta <= 0.0 {
                    return Err(OceanError::InvalidConfig(format!(
                        "power-law exponents must be positive, got alpha={} beta={}",
                        alpha, beta
                    )));
                }
                if gamma < 0.0 {
                    return Err(OceanError::InvalidConfig(format!(
                        "power-law gamma must be non-negative, got {}",
                        gamma
                    )));
                }
                Ok(())
            }
        }
    }

    /// Weights for a cycle of `ndtfast` nominal sub-steps.
    pub fn resolve(&self, ndtfast: usize) -> FastWeights {
        match *self {
            FastWeightKind::SingleStep => FastWeights::single_step(ndtfast),
            FastWeightKind::PowerLaw { alpha, beta, gamma } => {
                FastWeights::power_law(ndtfast, alpha, beta, gamma)
            }
        }
    }
}

/// Averaging weights of one barotropic sub-step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SubstepWeights {
    /// Secondary weight two steps ahead, first-step `DU_avg2` seed
    pub a: f64,
    /// Primary weight of the current predictor
    pub b: f64,
    /// Secondary weight one step ahead
    pub c: f64,
    /// Secondary weight two steps ahead
    pub d: f64,
}

#[derive(Clone, Debug, PartialEq)]
enum WeightTable {
    Fixed(SubstepWeights),
    /// Entry `i` holds the weight of step `i + 1`.
    Filter { primary: Vec<f64>, secondary: Vec<f64> },
}

/// Resolved averaging weights for one barotropic cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct FastWeights {
    nfast: usize,
    table: WeightTable,
}

impl FastWeights {
    /// The fixed `(0, 1, 0, 0)` set over `ndtfast` steps.
    pub fn single_step(ndtfast: usize) -> Self {
        Self {
            nfast: ndtfast,
            table: WeightTable::Fixed(SubstepWeights {
                a: 0.0,
                b: 1.0,
                c: 0.0,
                d: 0.0,
            }),
        }
    }

    /// Power-law filter for `ndtfast` nominal sub-steps.
    pub fn power_law(ndtfast: usize, alpha: f64, beta: f64, gamma: f64) -> Self {
        let nd = ndtfast.max(1);
        let ndf = nd as f64;
        let gamma = gamma * (1.0 - 10.0 / ndf).max(0.0);

        // 1-based, slot 0 unused
        let mut w = vec![0.0; 2 * nd + 2];
        let mut nfast = 0;
        let mut scale = (alpha + 1.0) * (alpha + beta + 1.0)
            / ((alpha + 2.0) * (alpha + beta + 2.0) * ndf);
        for _ in 0..16 {
            nfast = 0;
            for (i, wi) in w.iter_mut().enumerate().take(2 * nd + 1).skip(1) {
                let cff = scale * i as f64;
                *wi = cff.powf(alpha) - cff.powf(alpha + beta) - gamma * cff;
                if *wi > 0.0 {
                    nfast = i;
                }
                if nfast > 0 && *wi < 0.0 {
                    *wi = 0.0;
                }
            }
            let (sum, moment) = moments(&w[..=nfast]);
            scale *= moment / (sum * ndf);
        }

        // shift the discrete weights until the centroid is on ndtfast
        for _ in 0..nd {
            let (sum, moment) = moments(&w[..=nfast]);
            let cff = ndf - moment / sum;
            if cff > 1.0 {
                nfast += 1;
                if nfast >= w.len() {
                    w.push(0.0);
                }
                for i in (2..=nfast).rev() {
                    w[i] = w[i - 1];
                }
                w[1] = 0.0;
            } else if cff > 0.0 {
                let keep = 1.0 - cff;
                for i in (2..=nfast).rev() {
                    w[i] = keep * w[i] + cff * w[i - 1];
                }
                w[1] *= keep;
            } else if cff < -1.0 {
                nfast -= 1;
                for i in 1..=nfast {
                    w[i] = w[i + 1];
                }
                w[nfast + 1] = 0.0;
            } else if cff < 0.0 {
                let keep = 1.0 + cff;
                for i in 1..nfast {
                    w[i] = keep * w[i] - cff * w[i + 1];
                }
                w[nfast] *= keep;
            }
        }

        let primary: Vec<f64> = w[1..=nfast].to_vec();
        let mut secondary = vec![0.0; nfast];
        for (j, &wj) in primary.iter().enumerate() {
            for s in secondary.iter_mut().take(j + 1) {
                *s += wj;
            }
        }
        let normalise = |v: Vec<f64>| {
            let sum: f64 = v.iter().sum();
            v.into_iter().map(|x| x / sum).collect::<Vec<_>>()
        };

        Self {
            nfast,
            table: WeightTable::Filter {
                primary: normalise(primary),
                secondary: normalise(secondary),
            },
        }
    }

    /// Number of barotropic steps in the cycle.
    pub fn nfast(&self) -> usize {
        self.nfast
    }

    /// Primary weight of 1-based step `i` (zero outside the cycle).
    pub fn primary(&self, i: usize) -> f64 {
        match &self.table {
            WeightTable::Fixed(w) => w.b,
            WeightTable::Filter { primary, .. } => lookup(primary, i),
        }
    }

    /// Secondary weight of 1-based step `i` (zero outside the cycle).
    pub fn secondary(&self, i: usize) -> f64 {
        match &self.table {
            WeightTable::Fixed(w) => w.c,
            WeightTable::Filter { secondary, .. } => lookup(secondary, i),
        }
    }

    /// Weights used at 0-based sub-step `my_iif`.
    pub fn substep(&self, my_iif: usize) -> SubstepWeights {
        match &self.table {
            WeightTable::Fixed(w) => *w,
            WeightTable::Filter { primary, secondary } => SubstepWeights {
                a: lookup(secondary, my_iif + 2),
                b: lookup(primary, my_iif),
                c: lookup(secondary, my_iif + 1),
                d: lookup(secondary, my_iif + 2),
            },
        }
    }
}

fn lookup(table: &[f64], i: usize) -> f64 {
    if i == 0 {
        0.0
    } else {
        table.get(i - 1).copied().unwrap_or(0.0)
    }
}

/// Sum and first moment of 1-based weights.
fn moments(w: &[f64]) -> (f64, f64) {
    w.iter()
        .enumerate()
        .skip(1)
        .fold((0.0, 0.0), |(s, m), (i, &x)| (s + x, m + x * i as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    fn centroid(w: &FastWeights) -> f64 {
        (1..=w.nfast()).map(|i| i as f64 * w.primary(i)).sum()
    }

    #[test]
    fn test_power_law_sums_and_centroid() {
        for ndtfast in [10, 20, 30, 60] {
            let w = FastWeightKind::default().resolve(ndtfast);
            let s1: f64 = (1..=w.nfast()).map(|i| w.primary(i)).sum();
            let s2: f64 = (1..=w.nfast()).map(|i| w.secondary(i)).sum();
            assert!((s1 - 1.0).abs() < TOL, "ndtfast={}: primary sum {}", ndtfast, s1);
            assert!((s2 - 1.0).abs() < TOL, "ndtfast={}: secondary sum {}", ndtfast, s2);
            assert!(
                (centroid(&w) - ndtfast as f64).abs() < 1e-6,
                "ndtfast={}: centroid {}",
                ndtfast,
                centroid(&w)
            );
            assert!(w.nfast() >= ndtfast, "cycle extends past the step");
            assert!(w.nfast() < 2 * ndtfast);
        }
    }

    #[test]
    fn test_secondary_weights_are_tail_sums() {
        let w = FastWeightKind::default().resolve(20);
        // first tail sum is the whole primary set: 1 / centroid after normalising
        assert!((w.secondary(1) - 1.0 / 20.0).abs() < 1e-8);
        for i in 1..w.nfast() {
            let step = w.secondary(i) - w.secondary(i + 1);
            assert!((step - w.primary(i) / 20.0).abs() < 1e-8, "step {}", i);
        }
        assert_eq!(w.secondary(w.nfast() + 1), 0.0);
    }

    #[test]
    fn test_single_barotropic_step() {
        let w = FastWeightKind::default().resolve(1);
        assert_eq!(w.nfast(), 1);
        assert!((w.primary(1) - 1.0).abs() < TOL);
        assert!((w.secondary(1) - 1.0).abs() < TOL);
    }

    #[test]
    fn test_substep_lookup() {
        let w = FastWeightKind::default().resolve(10);
        let s0 = w.substep(0);
        assert_eq!(s0.b, 0.0, "no primary weight before the first step");
        assert_eq!(s0.c, w.secondary(1));
        assert_eq!(s0.a, w.secondary(2));
        let s3 = w.substep(3);
        assert_eq!(s3.b, w.primary(3));
        assert_eq!(s3.d, w.secondary(5));
    }

    #[test]
    fn test_single_step_set() {
        let w = FastWeightKind::SingleStep.resolve(4);
        assert_eq!(w.nfast(), 4);
        assert_eq!(
            w.substep(2),
            SubstepWeights {
                a: 0.0,
                b: 1.0,
                c: 0.0,
                d: 0.0
            }
        );
    }

    #[test]
    fn test_validation() {
        assert!(FastWeightKind::default().validate().is_ok());
        assert!(FastWeightKind::PowerLaw {
            alpha: -1.0,
            beta: 4.0,
            gamma: 0.0
        }
        .validate()
        .is_err());
        assert!(FastWeightKind::PowerLaw {
            alpha: 2.0,
            beta: f64::NAN,
            gamma: 0.0
        }
        .validate()
        .is_err());
    }
}
