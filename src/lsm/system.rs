use crate::error::Error;
use crate::error::Result;
use crate::Bits;
use crate::Bytes;

/// physical profile of the tree being tuned.
///
/// memory quantities (m, and the filter/buffer split derived from h) are
/// carried in bits; buffer sizes come out of `buffer` in bytes. the
/// derived geometry lives here so that every cost model states each
/// formula exactly once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct System {
    /// total entries
    pub n: f64,
    /// entry size in bits
    pub e: Bits,
    /// total memory budget in bits
    pub m: Bits,
    /// entries per page
    pub b: f64,
    /// range query selectivity
    pub s: f64,
    /// compaction overhead factor
    pub phi: f64,
}

impl System {
    pub fn new(n: f64, e: Bits, m: Bits, b: f64, s: f64, phi: f64) -> Result<Self> {
        let this = Self { n, e, m, b, s, phi };
        if ![n, e, m, b, s, phi].iter().all(|x| x.is_finite()) {
            return Err(Error::Numerical("non-finite system parameter".into()));
        }
        if n <= 0. || e <= 0. {
            return Err(Error::Domain("entry count and entry size must be positive".into()));
        }
        if b < 1. {
            return Err(Error::Domain("page must hold at least one entry".into()));
        }
        if !(0. ..=1.).contains(&s) {
            return Err(Error::Domain("selectivity must lie in [0, 1]".into()));
        }
        if phi < 0. {
            return Err(Error::Domain("compaction overhead cannot be negative".into()));
        }
        if this.h_max() <= 0. {
            return Err(Error::Domain("memory budget leaves no room for the write buffer".into()));
        }
        Ok(this)
    }

    /// same profile under a different memory budget
    pub fn with_memory(self, m: Bits) -> Result<Self> {
        Self::new(self.n, self.e, m, self.b, self.s, self.phi)
    }

    /// largest admissible filter allocation: everything except one MiB of buffer
    pub fn h_max(&self) -> f64 {
        (self.m - crate::MIB_IN_BITS) / self.n
    }

    /// write buffer left over after h bits of filter per element, in bytes
    pub fn buffer(&self, h: f64) -> Bytes {
        (self.m - h * self.n) / crate::BITS_IN_BYTES
    }

    /// number of levels needed to hold n entries at size ratio t
    pub fn levels(&self, h: f64, t: f64) -> f64 {
        ((self.n * self.e / self.buffer(h)) + 1.).ln() / t.ln()
    }

    /// levels rounded up to the materialized tree depth
    pub fn depth(&self, h: f64, t: f64) -> f64 {
        self.levels(h, t).ceil()
    }

    /// bloom false positive rate of the filter at level i
    pub fn fp(&self, h: f64, t: f64, i: usize) -> f64 {
        let alpha = (-h * std::f64::consts::LN_2.powi(2)).exp();
        let top = t.powf(t / (t - 1.));
        let bot = t.powf(self.depth(h, t) + 1. - i as f64);
        alpha * top / bot
    }

    /// entries held by a tree filled through its full depth
    pub fn capacity(&self, h: f64, t: f64) -> f64 {
        let depth = self.depth(h, t) as usize;
        (1..=depth)
            .map(|level| (t - 1.) * t.powi(level as i32 - 1) * self.buffer(h) / self.e)
            .sum()
    }

    /// probability that a lookup's target resides at level i
    pub fn occupancy(&self, h: f64, t: f64, i: usize) -> f64 {
        (t - 1.) * self.buffer(h) * t.powi(i as i32 - 1) / (self.capacity(h, t) * self.e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> System {
        let n = 1e8;
        System::new(n, 8192., 10. * n + 8. * crate::MIB_IN_BITS, 4., 4e-7, 1.).unwrap()
    }

    #[test]
    fn buffer_splits_the_budget() {
        let system = profile();
        let h = 5.;
        assert!(system.buffer(h) == (system.m - h * system.n) / 8.);
        assert!(system.buffer(h) > 0.);
    }

    #[test]
    fn more_filter_means_more_levels() {
        let system = profile();
        assert!(system.levels(8., 10.) > system.levels(2., 10.));
    }

    #[test]
    fn depth_is_the_level_ceiling() {
        let system = profile();
        let levels = system.levels(5., 10.);
        let depth = system.depth(5., 10.);
        assert!(depth >= levels);
        assert!(depth - levels < 1.);
    }

    #[test]
    fn deeper_levels_leak_more() {
        let system = profile();
        let depth = system.depth(5., 10.) as usize;
        assert!(system.fp(5., 10., 1) < system.fp(5., 10., depth));
    }

    #[test]
    fn occupancy_is_a_distribution() {
        let system = profile();
        let depth = system.depth(5., 10.) as usize;
        let total = (1..=depth).map(|i| system.occupancy(5., 10., i)).sum::<f64>();
        assert!((total - 1.).abs() < 1e-9);
    }

    #[test]
    fn rejects_degenerate_profiles() {
        assert!(System::new(0., 8192., 1e9, 4., 4e-7, 1.).is_err());
        assert!(System::new(1e8, 8192., 1e9, 4., 1.5, 1.).is_err());
        assert!(System::new(1e8, 8192., 1e9, 0.5, 4e-7, 1.).is_err());
        assert!(System::new(1e8, 8192., crate::MIB_IN_BITS / 2., 4., 4e-7, 1.).is_err());
        assert!(System::new(1e8, f64::NAN, 1e9, 4., 4e-7, 1.).is_err());
    }
}
