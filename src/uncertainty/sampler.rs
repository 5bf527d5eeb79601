use crate::error::Error;
use crate::error::Result;
use crate::lsm::workload::Mask;
use crate::lsm::workload::Workload;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

/// uniform draws from the operation simplex, restricted by a mask.
///
/// every call reseeds, so a sampler is a pure function of
/// (seed, mask, count) and two runs agree byte for byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sampler {
    pub seed: u64,
    pub mask: Mask,
}

impl Sampler {
    pub fn sample(&self, count: usize) -> Result<Vec<Workload>> {
        if !self.mask.any() {
            return Err(Error::Domain("operation mask admits nothing".into()));
        }
        let mut rng = SmallRng::seed_from_u64(self.seed);
        (0..count).map(|_| self.draw(&mut rng)).collect()
    }

    /// four integer draws on [0, 100), masked, normalized, and rounded
    /// to four decimals. rounding is presentational and the sum is left
    /// to drift within the simplex tolerance. an all-zero draw is
    /// discarded and taken again.
    fn draw(&self, rng: &mut SmallRng) -> Result<Workload> {
        loop {
            let mut pulls = [0.; 4];
            for (k, pull) in pulls.iter_mut().enumerate() {
                let drawn = rng.random_range(0..crate::SAMPLE_CEILING) as f64;
                *pull = if self.mask.admits(k) { drawn } else { 0. };
            }
            let total = pulls.iter().sum::<f64>();
            if total == 0. {
                continue;
            }
            let [z0, z1, q, w] = pulls.map(|pull| quantize(pull / total));
            return Workload::new(z0, z1, q, w);
        }
    }
}

fn quantize(x: f64) -> f64 {
    (x * crate::SAMPLE_SCALE).round() / crate::SAMPLE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sampling_is_reproducible() {
        let sampler = Sampler::default();
        assert!(sampler.sample(1000).unwrap() == sampler.sample(1000).unwrap());
    }

    #[test]
    fn seeds_matter() {
        let a = Sampler::default().sample(100).unwrap();
        let b = Sampler { seed: 1, ..Sampler::default() }.sample(100).unwrap();
        assert!(a != b);
    }

    #[test]
    fn samples_stay_on_the_simplex() {
        for workload in Sampler::default().sample(1000).unwrap() {
            let total = workload.weights().iter().sum::<f64>();
            assert!((total - 1.).abs() <= 4e-4);
            assert!(workload.weights().iter().all(|&x| x >= 0.));
        }
    }

    #[test]
    fn components_are_exchangeable() {
        let samples = Sampler::default().sample(1000).unwrap();
        for k in 0..4 {
            let mean = samples.iter().map(|s| s.weights()[k]).sum::<f64>() / 1000.;
            assert!((mean - 0.25).abs() < 0.02);
        }
    }

    #[test]
    fn mask_zeroes_operations() {
        let sampler = Sampler { seed: 0, mask: Mask([true, false, false, true]) };
        for workload in sampler.sample(500).unwrap() {
            assert!(workload.z1 == 0.);
            assert!(workload.q == 0.);
            let total = workload.weights().iter().sum::<f64>();
            assert!((total - 1.).abs() <= 4e-4);
        }
    }

    #[test]
    fn empty_masks_are_rejected() {
        let sampler = Sampler { seed: 0, mask: Mask([false; 4]) };
        assert!(sampler.sample(1).is_err());
    }
}
