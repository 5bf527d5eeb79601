use crate::lsm::workload::Mask;
use crate::lsm::workload::Workload;
use crate::Divergence;
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

/// named slices of the uncertainty region around a reference workload.
///
/// the first five pick out samples dominated by one operation class;
/// the last picks out samples that barely diverge from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    Lookups,
    Ranges,
    Empty,
    NonEmpty,
    Writes,
    Nearby,
}

impl Session {
    pub const fn all() -> &'static [Self] {
        &[
            Self::Lookups,
            Self::Ranges,
            Self::Empty,
            Self::NonEmpty,
            Self::Writes,
            Self::Nearby,
        ]
    }

    pub const fn id(&self) -> usize {
        match self {
            Self::Lookups => 0,
            Self::Ranges => 1,
            Self::Empty => 2,
            Self::NonEmpty => 3,
            Self::Writes => 4,
            Self::Nearby => 5,
        }
    }

    /// membership predicate over a scored sample
    pub fn admits(&self, sample: &Tagged) -> bool {
        let Workload { z0, z1, q, w } = sample.workload;
        match self {
            Self::Lookups => z0 + z1 > crate::SESSION_DOMINANT,
            Self::Ranges => q > crate::SESSION_DOMINANT,
            Self::Empty => z0 > crate::SESSION_DOMINANT,
            Self::NonEmpty => z1 > crate::SESSION_DOMINANT,
            Self::Writes => w > crate::SESSION_DOMINANT,
            Self::Nearby => sample.distance < crate::SESSION_NEARBY,
        }
    }
}

/// a sampled workload scored by its divergence from the reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tagged {
    pub index: usize,
    pub workload: Workload,
    pub distance: Divergence,
}

/// scores a batch of samples against a reference workload and hands out
/// reproducible fixed-size draws from each session
#[derive(Debug, Clone)]
pub struct Cohort {
    pub reference: Workload,
    pub tagged: Vec<Tagged>,
}

impl Cohort {
    pub fn new(reference: Workload, samples: &[Workload], mask: Mask) -> Self {
        let tagged = samples
            .iter()
            .enumerate()
            .map(|(index, workload)| Tagged {
                index,
                workload: *workload,
                distance: workload.kl(&reference, mask),
            })
            .collect();
        Self { reference, tagged }
    }

    pub fn members(&self, session: Session) -> Vec<&Tagged> {
        self.tagged.iter().filter(|t| session.admits(t)).collect()
    }

    /// fixed-size draw from one session, without replacement while the
    /// session can afford it
    pub fn draw(&self, session: Session, count: usize, seed: u64) -> Vec<Tagged> {
        let members = self.members(session);
        let mut rng = SmallRng::seed_from_u64(seed);
        if members.is_empty() {
            vec![]
        } else if members.len() >= count {
            rand::seq::index::sample(&mut rng, members.len(), count)
                .into_iter()
                .map(|i| *members[i])
                .collect()
        } else {
            (0..count)
                .map(|_| *members[rng.random_range(0..members.len())])
                .collect()
        }
    }

    pub fn sessions(&self, count: usize, seed: u64) -> Vec<(Session, Vec<Tagged>)> {
        Session::all()
            .iter()
            .map(|&session| (session, self.draw(session, count, seed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uncertainty::sampler::Sampler;

    fn cohort() -> Cohort {
        let samples = Sampler::default().sample(10_000).unwrap();
        Cohort::new(Workload::uniform(), &samples, Mask::default())
    }

    #[test]
    fn sessions_cover_every_label() {
        let cohort = cohort();
        let sessions = cohort.sessions(crate::SESSION_DRAWS, 0);
        assert!(sessions.len() == 6);
        for (session, draws) in sessions {
            assert!(draws.len() == crate::SESSION_DRAWS, "{:?}", session);
            assert!(draws.iter().all(|t| session.admits(t)));
        }
    }

    #[test]
    fn draws_are_reproducible() {
        let cohort = cohort();
        let a = cohort.draw(Session::Lookups, 5, 0);
        let b = cohort.draw(Session::Lookups, 5, 0);
        assert!(a == b);
    }

    #[test]
    fn scarce_sessions_draw_with_replacement() {
        let reference = Workload::uniform();
        let samples = [
            Workload::new(0.05, 0.05, 0.05, 0.85).unwrap(),
            Workload::new(0.25, 0.25, 0.25, 0.25).unwrap(),
        ];
        let cohort = Cohort::new(reference, &samples, Mask::default());
        let draws = cohort.draw(Session::Writes, 5, 0);
        assert!(draws.len() == 5);
        assert!(draws.iter().all(|t| t.index == 0));
    }

    #[test]
    fn empty_sessions_draw_nothing() {
        let reference = Workload::uniform();
        let samples = [Workload::uniform()];
        let cohort = Cohort::new(reference, &samples, Mask::default());
        assert!(cohort.draw(Session::Ranges, 5, 0).is_empty());
    }

    #[test]
    fn distances_score_against_the_reference() {
        let cohort = cohort();
        assert!(cohort.tagged.iter().all(|t| t.distance >= 0.));
        let nearby = cohort.members(Session::Nearby);
        assert!(!nearby.is_empty());
        assert!(nearby.iter().all(|t| t.distance < crate::SESSION_NEARBY));
    }
}
