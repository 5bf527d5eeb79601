use crate::lsm::policy::Policy;
use crate::lsm::system::System;
use crate::Bits;
use crate::Cost;

/// a selected tuning: merge policy, size ratio, and the memory split
/// between bloom filters and the write buffer, in bits.
///
/// invariant: mfilt + mbuff equals the profile's total budget, with
/// mbuff strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Design {
    pub policy: Policy,
    /// filter bits per element
    pub h: f64,
    /// size ratio between adjacent levels
    pub t: f64,
    pub mfilt: Bits,
    pub mbuff: Bits,
    /// expected-workload cost at (h, T)
    pub cost: Cost,
    /// present on designs produced by the robust tuner
    pub dual: Option<Dual>,
}

/// dual-side diagnostics of a robust solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dual {
    pub lambda: f64,
    pub eta: f64,
    /// worst-case objective value at the solution
    pub obj: f64,
    pub exit_mode: i32,
}

impl Design {
    pub fn new(system: &System, policy: Policy, h: f64, t: f64, cost: Cost) -> Self {
        let mfilt = h * system.n;
        Self {
            policy,
            h,
            t,
            mfilt,
            mbuff: system.m - mfilt,
            cost,
            dual: None,
        }
    }

    pub fn with_dual(self, dual: Dual) -> Self {
        Self { dual: Some(dual), ..self }
    }
}
