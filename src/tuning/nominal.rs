use super::design::Design;
use super::solver;
use crate::error::Error;
use crate::error::Result;
use crate::lsm::cost::CostModel;
use crate::lsm::policy::Policy;
use crate::lsm::system::System;
use crate::lsm::workload::Workload;

/// tunes (h, T) for the expected workload exactly as given.
///
/// each merge policy is a smooth subproblem over the same box; both are
/// solved from the same starting point and the cheaper converged design
/// wins. pass a policy filter to tune just one of them.
#[derive(Debug, Clone, Copy)]
pub struct Nominal {
    pub system: System,
    pub workload: Workload,
}

impl Nominal {
    pub fn new(system: System, workload: Workload) -> Self {
        Self { system, workload }
    }

    pub fn tune(&self, filter: Option<Policy>) -> Result<Design> {
        let lower = [0., crate::T_MIN];
        let upper = [self.system.h_max(), crate::T_MAX];
        if upper[0] <= lower[0] {
            return Err(Error::Optimization("no admissible filter allocation".into()));
        }
        let mut best: Option<Design> = None;
        for policy in Policy::all()
            .iter()
            .copied()
            .filter(|p| filter.is_none_or(|f| f == *p))
        {
            let model = CostModel::new(self.system, self.workload, policy);
            let outcome = solver::slsqp(
                |x| model.cost(x[0], x[1]),
                &[crate::H_INITIAL, crate::T_INITIAL],
                &lower,
                &upper,
                crate::FTOL_NOMINAL,
            );
            let (h, t) = (outcome.x[0], outcome.x[1]);
            let cost = model.cost(h, t);
            log::debug!(
                "nominal {:?}: cost {:.6} at h {:.4} T {:.4} (status {})",
                policy,
                cost,
                h,
                t,
                outcome.status
            );
            if !cost.is_finite() || cost >= crate::COST_SENTINEL {
                continue;
            }
            if best.is_none_or(|b| cost < b.cost) {
                best = Some(Design::new(&self.system, policy, h, t, cost));
            }
        }
        best.ok_or_else(|| Error::Optimization("no policy reached a finite cost".into()))
    }
}
