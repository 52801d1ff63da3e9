//! Time-level slot derivation.
//!
//! Multi-level fields carry their history in components. The barotropic
//! fields (`zeta`, `ubar`, `vbar`) have three slots: two rotating time levels
//! and a scratch slot `2` that the predictor writes. Their right-hand-side
//! histories (`rzeta`, `rubar`, `rvbar`) have two. The 3D fields have two
//! slots, `nstp` and `nnew`.
//!
//! Every slot index used by the integrator comes from this module.

/// Predictor or corrector half of a barotropic sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Predictor,
    Corrector,
}

/// Slot indices of one barotropic sub-step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FastSlots {
    /// Level the right-hand side is evaluated at
    pub krhs: usize,
    /// Level the step starts from
    pub kstp: usize,
    /// Level written by the step
    pub knew: usize,
    /// The other rotating level, two steps back for the Adams-Moulton terms
    pub ptsk: usize,
    /// `knew` of the corrector that follows this predictor
    pub next_rhs: usize,
}

impl FastSlots {
    /// Slots of the predictor at sub-step `my_iif` of baroclinic step `iic`.
    pub fn predictor(my_iif: usize, iic: usize) -> Self {
        let krhs = (my_iif + iic) % 2;
        let kstp = if my_iif <= 1 {
            iic % 2
        } else {
            (iic % 2 + my_iif % 2 + 1) % 2
        };
        Self {
            krhs,
            kstp,
            knew: 2,
            ptsk: 1 - kstp,
            next_rhs: 1 - krhs,
        }
    }

    /// Slots of the corrector following `predictor`.
    pub fn corrector(predictor: &FastSlots) -> Self {
        let knew = predictor.next_rhs;
        let kstp = 1 - knew;
        Self {
            krhs: 2,
            kstp,
            knew,
            ptsk: 1 - kstp,
            next_rhs: knew,
        }
    }

    pub fn for_phase(phase: Phase, my_iif: usize, iic: usize) -> Self {
        let predictor = Self::predictor(my_iif, iic);
        match phase {
            Phase::Predictor => predictor,
            Phase::Corrector => Self::corrector(&predictor),
        }
    }
}

/// Slot indices of one baroclinic step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlowSlots {
    /// Level the step starts from
    pub nstp: usize,
    /// Level written by the step
    pub nnew: usize,
    /// Level of the 3D right-hand side
    pub nrhs: usize,
}

impl SlowSlots {
    /// Slots of step `iic` of a run that started at step `ntfirst`.
    pub fn new(iic: usize, ntfirst: usize) -> Self {
        let nstp = iic.saturating_sub(ntfirst) % 2;
        Self {
            nstp,
            nnew: 1 - nstp,
            nrhs: nstp,
        }
    }
}
