use crate::config::Config;
use crate::config::Job;
use crate::error::Result;
use crate::lsm::policy::Policy;
use crate::lsm::system::System;
use crate::lsm::workload::Workload;
use crate::tuning::design::Design;
use crate::tuning::design::Dual;
use crate::tuning::nominal::Nominal;
use crate::tuning::robust::Robust;
use crate::uncertainty::sampler::Sampler;
use crate::uncertainty::session::Cohort;
use serde::Serialize;
use std::path::Path;

/// one sweep entry: an expected workload under a memory budget, with
/// its nominal design and the robust design at one ball radius.
///
/// a tuning that failed outright keeps the sentinel cost and a negative
/// exit mode so downstream analysis can filter the row out.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    pub workload_idx: usize,
    pub z0: f64,
    pub z1: f64,
    pub q: f64,
    pub w: f64,
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "M")]
    pub m: f64,
    pub rho: f64,
    pub nominal_m_filt: f64,
    pub nominal_m_buff: f64,
    #[serde(rename = "nominal_T")]
    pub nominal_t: f64,
    pub nominal_cost: f64,
    pub nominal_is_leveling_policy: bool,
    pub robust_m_filt: f64,
    pub robust_m_buff: f64,
    #[serde(rename = "robust_T")]
    pub robust_t: f64,
    pub robust_cost: f64,
    pub robust_is_leveling_policy: bool,
    pub robust_exit_mode: i32,
    pub robust_lambda: f64,
    pub robust_eta: f64,
    pub robust_obj: f64,
}

impl Row {
    fn new(
        workload_idx: usize,
        workload: &Workload,
        system: &System,
        rho: f64,
        nominal: &Result<Design>,
        robust: &Result<Design>,
    ) -> Self {
        let sentinel = Design {
            policy: Policy::Leveling,
            h: f64::NAN,
            t: f64::NAN,
            mfilt: f64::NAN,
            mbuff: f64::NAN,
            cost: crate::COST_SENTINEL,
            dual: None,
        };
        let nominal = nominal.as_ref().ok().copied().unwrap_or(sentinel);
        let robust = robust.as_ref().ok().copied().unwrap_or(sentinel);
        let dual = robust.dual.unwrap_or(Dual {
            lambda: f64::NAN,
            eta: f64::NAN,
            obj: crate::COST_SENTINEL,
            exit_mode: -1,
        });
        Self {
            workload_idx,
            z0: workload.z0,
            z1: workload.z1,
            q: workload.q,
            w: workload.w,
            n: system.n,
            m: system.m,
            rho,
            nominal_m_filt: nominal.mfilt,
            nominal_m_buff: nominal.mbuff,
            nominal_t: nominal.t,
            nominal_cost: nominal.cost,
            nominal_is_leveling_policy: nominal.policy.is_leveling(),
            robust_m_filt: robust.mfilt,
            robust_m_buff: robust.mbuff,
            robust_t: robust.t,
            robust_cost: robust.cost,
            robust_is_leveling_policy: robust.policy.is_leveling(),
            robust_exit_mode: dual.exit_mode,
            robust_lambda: dual.lambda,
            robust_eta: dual.eta,
            robust_obj: dual.obj,
        }
    }
}

/// nominal-only sweep entry
#[derive(Debug, Clone, Serialize)]
pub struct NominalRow {
    pub workload_idx: usize,
    pub z0: f64,
    pub z1: f64,
    pub q: f64,
    pub w: f64,
    #[serde(rename = "N")]
    pub n: f64,
    #[serde(rename = "M")]
    pub m: f64,
    pub nominal_m_filt: f64,
    pub nominal_m_buff: f64,
    #[serde(rename = "nominal_T")]
    pub nominal_t: f64,
    pub nominal_cost: f64,
    pub nominal_is_leveling_policy: bool,
}

/// one sampled workload scored against an expected workload
#[derive(Debug, Clone, Serialize)]
pub struct SampleRow {
    pub workload_idx: usize,
    pub sample_idx: usize,
    pub z0_s: f64,
    pub z1_s: f64,
    pub q_s: f64,
    pub w_s: f64,
    pub kl_div: f64,
}

/// a session draw from the scored samples
#[derive(Debug, Clone, Serialize)]
pub struct SessionRow {
    pub workload_idx: usize,
    pub session_id: usize,
    pub sample_idx: usize,
    pub z0_s: f64,
    pub z1_s: f64,
    pub q_s: f64,
    pub w_s: f64,
    pub kl_div: f64,
}

/// cartesian tuning sweep: expected workloads over memory budgets over
/// ball radii, in that loop order, one nominal solve per (w, m) and one
/// robust solve per radius. row order is deterministic.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub system: System,
    pub workloads: Vec<Workload>,
    pub budgets: Vec<f64>,
    pub rhos: Vec<f64>,
}

impl Sweep {
    /// half-open grid [low, high) in step increments
    pub fn arange(low: f64, high: f64, step: f64) -> Vec<f64> {
        let count = ((high - low) / step).ceil().max(0.) as usize;
        (0..count).map(|i| low + i as f64 * step).collect()
    }

    pub fn table(&self) -> Result<Vec<Row>> {
        let mut rows = vec![];
        let progress = crate::progress(self.workloads.len() * self.budgets.len());
        for (idx, workload) in self.workloads.iter().enumerate() {
            log::info!("workload {:02} {}", idx, workload);
            for &bits in self.budgets.iter() {
                log::debug!("bits per element {}", bits);
                let system = self.system.with_memory(bits * self.system.n)?;
                let nominal = Nominal::new(system, *workload).tune(None);
                let robust = Robust::new(system, *workload);
                for &rho in self.rhos.iter() {
                    let design = robust.tune(rho, None, None);
                    rows.push(Row::new(idx, workload, &system, rho, &nominal, &design));
                }
                progress.inc(1);
            }
        }
        progress.finish_and_clear();
        Ok(rows)
    }

    pub fn nominals(&self) -> Result<Vec<NominalRow>> {
        let mut rows = vec![];
        let progress = crate::progress(self.workloads.len() * self.budgets.len());
        for (idx, workload) in self.workloads.iter().enumerate() {
            log::info!("workload {:02} {}", idx, workload);
            for &bits in self.budgets.iter() {
                let system = self.system.with_memory(bits * self.system.n)?;
                let design = Nominal::new(system, *workload).tune(None)?;
                rows.push(NominalRow {
                    workload_idx: idx,
                    z0: workload.z0,
                    z1: workload.z1,
                    q: workload.q,
                    w: workload.w,
                    n: system.n,
                    m: system.m,
                    nominal_m_filt: design.mfilt,
                    nominal_m_buff: design.mbuff,
                    nominal_t: design.t,
                    nominal_cost: design.cost,
                    nominal_is_leveling_policy: design.policy.is_leveling(),
                });
                progress.inc(1);
            }
        }
        progress.finish_and_clear();
        Ok(rows)
    }
}

/// serialize rows to a csv file, headers from the row type
pub fn export<S: Serialize>(rows: &[S], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

impl Job {
    pub fn run(&self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::NominalTunings => nominal_tunings(config),
            Self::UncertaintyTunings => uncertainty_tunings(config),
            Self::SampleWorkloads => sample_workloads(config),
        }
    }
}

fn sweep(config: &Config) -> Result<Sweep> {
    Ok(Sweep {
        system: config.system.profile()?,
        workloads: config.workload.expected.clone(),
        budgets: config.memory.bits_per_element.clone(),
        rhos: Sweep::arange(
            config.uncertainty.rho_low,
            config.uncertainty.rho_high,
            config.uncertainty.rho_step,
        ),
    })
}

fn nominal_tunings(config: &Config) -> anyhow::Result<()> {
    log::info!("starting job: nominal tunings");
    let rows = sweep(config)?.nominals()?;
    export(&rows, &config.app.data_dir.join("workload_nominal_tunings.csv"))?;
    log::info!("finished job: nominal tunings");
    Ok(())
}

fn uncertainty_tunings(config: &Config) -> anyhow::Result<()> {
    log::info!("starting job: uncertainty tunings");
    let rows = sweep(config)?.table()?;
    export(&rows, &config.app.data_dir.join("workload_uncertainty_tunings.csv"))?;
    log::info!("finished job: uncertainty tunings");
    Ok(())
}

fn sample_workloads(config: &Config) -> anyhow::Result<()> {
    log::info!("starting job: sample workloads");
    let sampler = Sampler::default();
    let samples = sampler.sample(config.uncertainty.samples)?;
    let mut scored = vec![];
    let mut drawn = vec![];
    for (idx, expected) in config.workload.expected.iter().enumerate() {
        let cohort = Cohort::new(*expected, &samples, sampler.mask);
        for tagged in cohort.tagged.iter() {
            scored.push(SampleRow {
                workload_idx: idx,
                sample_idx: tagged.index,
                z0_s: tagged.workload.z0,
                z1_s: tagged.workload.z1,
                q_s: tagged.workload.q,
                w_s: tagged.workload.w,
                kl_div: tagged.distance,
            });
        }
        for (session, draws) in cohort.sessions(crate::SESSION_DRAWS, sampler.seed) {
            for tagged in draws {
                drawn.push(SessionRow {
                    workload_idx: idx,
                    session_id: session.id(),
                    sample_idx: tagged.index,
                    z0_s: tagged.workload.z0,
                    z1_s: tagged.workload.z1,
                    q_s: tagged.workload.q,
                    w_s: tagged.workload.w,
                    kl_div: tagged.distance,
                });
            }
        }
    }
    export(&scored, &config.app.data_dir.join("uncertain_workloads.csv"))?;
    export(&drawn, &config.app.data_dir.join("uncertainty_sessions.csv"))?;
    log::info!("finished job: sample workloads");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep() -> Sweep {
        let n = 1e8;
        Sweep {
            system: System::new(n, 8192., 10. * n + 8. * crate::MIB_IN_BITS, 4., 4e-7, 1.)
                .unwrap(),
            workloads: vec![Workload::uniform()],
            budgets: vec![10.],
            rhos: vec![0., 0.5],
        }
    }

    fn render<S: Serialize>(rows: &[S]) -> Vec<u8> {
        let mut writer = csv::Writer::from_writer(vec![]);
        for row in rows {
            writer.serialize(row).unwrap();
        }
        writer.into_inner().unwrap()
    }

    #[test]
    fn grid_is_half_open() {
        assert!(Sweep::arange(0., 1., 0.25) == vec![0., 0.25, 0.5, 0.75]);
        assert!(Sweep::arange(0., 4., 0.25).len() == 16);
        assert!(Sweep::arange(1., 1., 0.25).is_empty());
    }

    #[test]
    fn rows_come_out_in_cartesian_order() {
        let mut sweep = sweep();
        sweep.workloads.push(Workload::new(0.97, 0.01, 0.01, 0.01).unwrap());
        let rows = sweep.table().unwrap();
        assert!(rows.len() == 2 * 1 * 2);
        let idxs = rows.iter().map(|r| r.workload_idx).collect::<Vec<_>>();
        assert!(idxs == vec![0, 0, 1, 1]);
        let rhos = rows.iter().map(|r| r.rho).collect::<Vec<_>>();
        assert!(rhos == vec![0., 0.5, 0., 0.5]);
    }

    #[test]
    fn tables_are_deterministic() {
        let sweep = sweep();
        let first = render(&sweep.table().unwrap());
        let second = render(&sweep.table().unwrap());
        assert!(first == second);
    }

    #[test]
    fn nominal_rows_share_the_nominal_design() {
        let sweep = sweep();
        let rows = sweep.table().unwrap();
        assert!(rows[0].nominal_cost == rows[1].nominal_cost);
        assert!(rows[0].nominal_t == rows[1].nominal_t);
    }

    #[test]
    fn rows_carry_the_memory_budget() {
        let sweep = sweep();
        for row in sweep.table().unwrap() {
            assert!(row.m == 10. * row.n);
            assert!((row.nominal_m_filt + row.nominal_m_buff - row.m).abs() < 1e-3);
        }
    }
}
