use super::policy::Policy;
use super::system::System;
use super::workload::Workload;
use crate::Cost;

/// closed-form i/o cost of a tuning (h, T) under one merge policy.
///
/// h is the filter allocation in bits per element, T the size ratio
/// between adjacent levels. evaluation is pure; a NaN coordinate or an
/// exhausted buffer maps to the sentinel cost, which a minimizing
/// solver treats as a wall.
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    pub system: System,
    pub workload: Workload,
    pub policy: Policy,
}

impl CostModel {
    pub fn new(system: System, workload: Workload, policy: Policy) -> Self {
        Self { system, workload, policy }
    }

    /// expected i/os of a lookup that misses every level
    pub fn z0(&self, h: f64, t: f64) -> Cost {
        let depth = self.system.depth(h, t) as usize;
        let leaks = (1..=depth).map(|i| self.system.fp(h, t, i)).sum::<f64>();
        match self.policy {
            Policy::Leveling => leaks,
            Policy::Tiering => (t - 1.) * leaks,
        }
    }

    /// expected i/os of a lookup that finds its key.
    ///
    /// one true read at the resident level, plus false positives from the
    /// filters above it; runs at the resident level itself only matter
    /// under tiering, where the key sits halfway through them on average.
    pub fn z1(&self, h: f64, t: f64) -> Cost {
        let depth = self.system.depth(h, t) as usize;
        let mut cost = 0.;
        for i in 1..=depth {
            let above = (1..i).map(|j| self.system.fp(h, t, j)).sum::<f64>();
            let (above, within) = match self.policy {
                Policy::Leveling => (above, 0.),
                Policy::Tiering => ((t - 1.) * above, (t - 2.) / 2. * self.system.fp(h, t, i)),
            };
            cost += self.system.occupancy(h, t, i) * (1. + above + within);
        }
        cost
    }

    /// expected i/os of a range query touching a fraction s of the keys
    pub fn q(&self, h: f64, t: f64) -> Cost {
        let pages = self.system.s * self.system.n / self.system.b;
        match self.policy {
            Policy::Leveling => pages + self.system.levels(h, t),
            Policy::Tiering => pages + (t - 1.) * self.system.levels(h, t),
        }
    }

    /// amortized i/os a write incurs through compaction
    pub fn w(&self, h: f64, t: f64) -> Cost {
        let passes = (1. + self.system.phi) * self.system.levels(h, t) / self.system.b;
        match self.policy {
            Policy::Leveling => passes * t / 2.,
            Policy::Tiering => passes,
        }
    }

    /// workload-weighted cost of the tuning
    pub fn cost(&self, h: f64, t: f64) -> Cost {
        if h.is_nan() || t.is_nan() {
            return crate::COST_SENTINEL;
        }
        if self.system.buffer(h) <= 0. {
            return crate::COST_SENTINEL;
        }
        let [z0, z1, q, w] = self.workload.weights();
        z0 * self.z0(h, t) + z1 * self.z1(h, t) + q * self.q(h, t) + w * self.w(h, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> System {
        let n = 1e8;
        System::new(n, 8192., 10. * n + 8. * crate::MIB_IN_BITS, 4., 4e-7, 1.).unwrap()
    }

    fn model(policy: Policy) -> CostModel {
        CostModel::new(system(), Workload::uniform(), policy)
    }

    #[test]
    fn terms_are_finite_and_nonnegative() {
        for policy in Policy::all().iter().copied() {
            let model = model(policy);
            for h in [1., 5., 9.] {
                for t in [2., 10., 50.] {
                    for term in [model.z0(h, t), model.z1(h, t), model.q(h, t), model.w(h, t)] {
                        assert!(term.is_finite());
                        assert!(term >= 0.);
                    }
                }
            }
        }
    }

    #[test]
    fn cost_is_the_weighted_sum() {
        let model = CostModel::new(
            system(),
            Workload::new(0.1, 0.2, 0.3, 0.4).unwrap(),
            Policy::Leveling,
        );
        let (h, t) = (5., 10.);
        let sum = 0.1 * model.z0(h, t)
            + 0.2 * model.z1(h, t)
            + 0.3 * model.q(h, t)
            + 0.4 * model.w(h, t);
        assert!(model.cost(h, t) == sum);
    }

    #[test]
    fn tiering_scales_empty_lookups_by_run_count() {
        let leveling = model(Policy::Leveling);
        let tiering = model(Policy::Tiering);
        for t in [2., 5., 10.] {
            let scaled = (t - 1.) * leveling.z0(5., t);
            assert!((tiering.z0(5., t) - scaled).abs() < 1e-12);
        }
    }

    #[test]
    fn tiering_never_reads_less() {
        let leveling = model(Policy::Leveling);
        let tiering = model(Policy::Tiering);
        for t in [2., 5., 10.] {
            assert!(tiering.z1(5., t) >= leveling.z1(5., t));
        }
    }

    #[test]
    fn range_gap_is_the_extra_runs_per_level() {
        let leveling = model(Policy::Leveling);
        let tiering = model(Policy::Tiering);
        let (h, t) = (5., 10.);
        let gap = (t - 2.) * leveling.system.levels(h, t);
        assert!((tiering.q(h, t) - leveling.q(h, t) - gap).abs() < 1e-9);
    }

    #[test]
    fn leveling_writes_cost_half_the_fanout_more() {
        let leveling = model(Policy::Leveling);
        let tiering = model(Policy::Tiering);
        for t in [2., 10., 50.] {
            assert!((leveling.w(5., t) - tiering.w(5., t) * t / 2.).abs() < 1e-12);
        }
    }

    #[test]
    fn filters_trade_lookups_for_buffer() {
        let model = model(Policy::Leveling);
        assert!(model.z0(10., 10.) < model.z0(5., 10.));
        assert!(model.z1(10., 10.) < model.z1(5., 10.));
        assert!(model.q(10., 10.) > model.q(5., 10.));
        assert!(model.w(10., 10.) > model.w(5., 10.));
    }

    #[test]
    fn inadmissible_points_hit_the_sentinel() {
        let model = model(Policy::Leveling);
        assert!(model.cost(f64::NAN, 10.) == crate::COST_SENTINEL);
        assert!(model.cost(5., f64::NAN) == crate::COST_SENTINEL);
        assert!(model.cost(11., 10.) == crate::COST_SENTINEL);
    }
}
