use crate::error::Error;
use crate::error::Result;
use crate::Arbitrary;
use crate::Divergence;
use serde::Deserialize;

/// a point on the operation simplex: relative frequency of empty
/// lookups, non-empty lookups, range queries, and writes.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Workload {
    pub z0: f64,
    pub z1: f64,
    pub q: f64,
    pub w: f64,
}

impl Workload {
    pub fn new(z0: f64, z1: f64, q: f64, w: f64) -> Result<Self> {
        let this = Self { z0, z1, q, w };
        if !this.weights().iter().all(|x| x.is_finite()) {
            return Err(Error::Numerical("non-finite workload weight".into()));
        }
        if this.weights().iter().any(|&x| x < 0.) {
            return Err(Error::Domain("workload weights cannot be negative".into()));
        }
        if (this.weights().iter().sum::<f64>() - 1.).abs() > crate::SIMPLEX_EPSILON {
            return Err(Error::Domain("workload weights must sum to one".into()));
        }
        Ok(this)
    }

    pub const fn uniform() -> Self {
        Self { z0: 0.25, z1: 0.25, q: 0.25, w: 0.25 }
    }

    pub const fn weights(&self) -> [f64; 4] {
        [self.z0, self.z1, self.q, self.w]
    }

    /// divergence of self from the reference, restricted to the masked
    /// operations. 0 ln 0 ≡ 0; mass where the reference has none is
    /// infinitely far away.
    pub fn kl(&self, reference: &Self, mask: Mask) -> Divergence {
        let p = self.weights();
        let q = reference.weights();
        let mut total = 0.;
        for k in 0..4 {
            if mask.admits(k) && p[k] > 0. {
                total += p[k] * (p[k].ln() - q[k].ln());
            }
        }
        total
    }
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(z0 {:.4} z1 {:.4} q {:.4} w {:.4})",
            self.z0, self.z1, self.q, self.w
        )
    }
}

impl Arbitrary for Workload {
    fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::rng();
        let pulls: [f64; 4] =
            std::array::from_fn(|_| rng.random_range(1..crate::SAMPLE_CEILING) as f64);
        let total = pulls.iter().sum::<f64>();
        Self::new(
            pulls[0] / total,
            pulls[1] / total,
            pulls[2] / total,
            pulls[3] / total,
        )
        .expect("normalized weights lie on the simplex")
    }
}

/// operation mask over (z0, z1, q, w)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mask(pub [bool; 4]);

impl Mask {
    pub const fn admits(&self, k: usize) -> bool {
        self.0[k]
    }
    pub const fn any(&self) -> bool {
        self.0[0] || self.0[1] || self.0[2] || self.0[3]
    }
}

impl Default for Mask {
    fn default() -> Self {
        Self([true; 4])
    }
}
