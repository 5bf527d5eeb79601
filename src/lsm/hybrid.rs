//! secondary cost models that relax the per-level run count beyond the
//! leveling/tiering dichotomy. they share the primary model's geometry
//! and differ only in how many runs each level is allowed to carry.

use super::system::System;
use super::workload::Workload;
use crate::Cost;

/// a uniform run count applied at every level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QFixed {
    pub runs: f64,
}

impl QFixed {
    pub fn z0(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        (1..=depth).map(|i| self.runs * system.fp(h, t, i)).sum()
    }

    pub fn z1(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        let mut cost = 0.;
        for i in 1..=depth {
            let above = (1..i).map(|j| self.runs * system.fp(h, t, j)).sum::<f64>();
            let within = (self.runs - 1.) / 2. * system.fp(h, t, i);
            cost += system.occupancy(h, t, i) * (1. + above + within);
        }
        cost
    }

    pub fn q(&self, system: &System, h: f64, t: f64) -> Cost {
        self.runs * system.levels(h, t) + system.s * system.n / system.b
    }

    pub fn w(&self, system: &System, h: f64, t: f64) -> Cost {
        system.levels(h, t) * (t - 1. + self.runs) * (1. + system.phi)
            / (2. * self.runs * system.b)
    }

    pub fn cost(&self, system: &System, workload: &Workload, h: f64, t: f64) -> Cost {
        if h.is_nan() || t.is_nan() || self.runs.is_nan() || system.buffer(h) <= 0. {
            return crate::COST_SENTINEL;
        }
        let [z0, z1, q, w] = workload.weights();
        z0 * self.z0(system, h, t)
            + z1 * self.z1(system, h, t)
            + q * self.q(system, h, t)
            + w * self.w(system, h, t)
    }
}

/// an explicit run count per level, shallowest first.
///
/// the vector must cover the materialized depth at (h, T); a shorter one
/// is inadmissible and costs the sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct KHybrid {
    pub runs: Vec<f64>,
}

impl KHybrid {
    fn covers(&self, system: &System, h: f64, t: f64) -> bool {
        self.runs.len() >= system.depth(h, t) as usize
    }

    pub fn z0(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        (1..=depth).map(|i| self.runs[i - 1] * system.fp(h, t, i)).sum()
    }

    pub fn z1(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        let mut cost = 0.;
        for i in 1..=depth {
            let above = (1..i).map(|j| self.runs[j - 1] * system.fp(h, t, j)).sum::<f64>();
            let within = (self.runs[i - 1] - 1.) / 2. * system.fp(h, t, i);
            cost += system.occupancy(h, t, i) * (1. + above + within);
        }
        cost
    }

    pub fn q(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        system.s * system.n / system.b + self.runs[..depth].iter().sum::<f64>()
    }

    pub fn w(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        self.runs[..depth]
            .iter()
            .map(|k| (t - 1. + k) / (2. * k))
            .sum::<f64>()
            * (1. + system.phi)
            / system.b
    }

    pub fn cost(&self, system: &System, workload: &Workload, h: f64, t: f64) -> Cost {
        if h.is_nan() || t.is_nan() || system.buffer(h) <= 0. || !self.covers(system, h, t) {
            return crate::COST_SENTINEL;
        }
        let [z0, z1, q, w] = workload.weights();
        z0 * self.z0(system, h, t)
            + z1 * self.z1(system, h, t)
            + q * self.q(system, h, t)
            + w * self.w(system, h, t)
    }
}

/// one run count for the upper levels and another for the last,
/// which holds most of the data and merges on its own cadence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YZHybrid {
    pub y: f64,
    pub z: f64,
}

impl YZHybrid {
    pub fn z0(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        let upper = (1..depth).map(|i| self.y * system.fp(h, t, i)).sum::<f64>();
        upper + self.z * system.fp(h, t, depth)
    }

    pub fn z1(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t) as usize;
        let mut cost = 0.;
        for i in 1..depth {
            let above = (1..i).map(|j| self.y * system.fp(h, t, j)).sum::<f64>();
            let within = (self.y - 1.) / 2. * system.fp(h, t, i);
            cost += system.occupancy(h, t, i) * (1. + above + within);
        }
        let above = (1..depth).map(|j| self.y * system.fp(h, t, j)).sum::<f64>();
        let within = (self.z - 1.) / 2. * system.fp(h, t, depth);
        cost + system.occupancy(h, t, depth) * (1. + above + within)
    }

    pub fn q(&self, system: &System, h: f64, t: f64) -> Cost {
        system.s * system.n / system.b + self.y * system.depth(h, t) - 1. + self.z
    }

    pub fn w(&self, system: &System, h: f64, t: f64) -> Cost {
        let depth = system.depth(h, t);
        let upper = (depth - 1.) * (t - 1. + self.y) / (2. * self.y);
        let last = (t - 1. + self.z) / (2. * self.z);
        (upper + last) * (1. + system.phi) / system.b
    }

    pub fn cost(&self, system: &System, workload: &Workload, h: f64, t: f64) -> Cost {
        if h.is_nan() || t.is_nan() || self.y.is_nan() || self.z.is_nan()
            || system.buffer(h) <= 0.
        {
            return crate::COST_SENTINEL;
        }
        let [z0, z1, q, w] = workload.weights();
        z0 * self.z0(system, h, t)
            + z1 * self.z1(system, h, t)
            + q * self.q(system, h, t)
            + w * self.w(system, h, t)
    }
}
