use super::design::Design;
use super::design::Dual;
use super::solver;
use crate::error::Error;
use crate::error::Result;
use crate::lsm::cost::CostModel;
use crate::lsm::policy::Policy;
use crate::lsm::system::System;
use crate::lsm::workload::Workload;

/// tunes (h, T) against the worst workload within a KL ball of radius
/// rho around the expected one, through the convex dual of the
/// distributionally robust problem.
///
/// the dual trades the inner maximization for two extra variables: a
/// multiplier lambda on the ball radius and a shift eta, giving one
/// smooth minimization over (h, T, lambda, eta) per policy. the policy
/// with the smaller dual objective wins; the recorded cost is the plain
/// expected-workload cost at the chosen (h, T).
///
/// the tiering subproblem starts lambda enormous: its per-operation
/// costs spread across orders of magnitude at the starting point, and
/// the exponential in the conjugate must stay evaluable there.
#[derive(Debug, Clone, Copy)]
pub struct Robust {
    pub system: System,
    pub workload: Workload,
}

impl Robust {
    pub fn new(system: System, workload: Workload) -> Self {
        Self { system, workload }
    }

    pub fn tune(
        &self,
        rho: f64,
        filter: Option<Policy>,
        warm: Option<&Design>,
    ) -> Result<Design> {
        let lower = [1., crate::T_MIN, crate::LAMBDA_FLOOR, f64::NEG_INFINITY];
        let upper = [self.system.h_max(), crate::T_MAX, f64::INFINITY, f64::INFINITY];
        if upper[0] <= lower[0] {
            return Err(Error::Optimization("no admissible filter allocation".into()));
        }
        let (h0, t0) = warm
            .map(|d| (d.h, d.t))
            .unwrap_or((crate::H_INITIAL, crate::T_INITIAL));
        let mut best: Option<Design> = None;
        for policy in Policy::all()
            .iter()
            .copied()
            .filter(|p| filter.is_none_or(|f| f == *p))
        {
            let model = CostModel::new(self.system, self.workload, policy);
            let lambda0 = match policy {
                Policy::Leveling => 1.,
                Policy::Tiering => crate::LAMBDA_TIERING_INITIAL,
            };
            let outcome = solver::slsqp(
                |x| Self::lagrangian(&model, rho, x),
                &[h0, t0, lambda0, 1.],
                &lower,
                &upper,
                crate::FTOL_ROBUST,
            );
            let (h, t) = (outcome.x[0], outcome.x[1]);
            let cost = model.cost(h, t);
            log::debug!(
                "robust {:?} rho {:.2}: obj {:.6} cost {:.6} at h {:.4} T {:.4} (status {})",
                policy,
                rho,
                outcome.objective,
                cost,
                h,
                t,
                outcome.status
            );
            if outcome.objective.is_nan() {
                continue;
            }
            let design = Design::new(&self.system, policy, h, t, cost).with_dual(Dual {
                lambda: outcome.x[2],
                eta: outcome.x[3],
                obj: outcome.objective,
                exit_mode: outcome.status,
            });
            if best.is_none_or(|b| design.dual.map(|d| d.obj) < b.dual.map(|d| d.obj)) {
                best = Some(design);
            }
        }
        best.ok_or_else(|| Error::Optimization("no policy reached a finite objective".into()))
    }

    /// dual objective: eta + rho lambda + lambda E[phi*((C_k - eta) / lambda)],
    /// with phi*(s) = exp(s) - 1 the conjugate of the KL generator
    fn lagrangian(model: &CostModel, rho: f64, x: &[f64]) -> f64 {
        let (h, t, lambda, eta) = (x[0], x[1], x[2], x[3]);
        let conjugate = |s: f64| s.exp() - 1.;
        let [z0, z1, q, w] = model.workload.weights();
        let mut spread = 0.;
        spread += z0 * conjugate((model.z0(h, t) - eta) / lambda);
        spread += z1 * conjugate((model.z1(h, t) - eta) / lambda);
        spread += q * conjugate((model.q(h, t) - eta) / lambda);
        spread += w * conjugate((model.w(h, t) - eta) / lambda);
        let objective = eta + rho * lambda + lambda * spread;
        if objective.is_nan() {
            crate::COST_SENTINEL
        } else {
            objective
        }
    }
}
