use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parent selection strategy, applied within the breeding pool
/// (the top [`survival_threshold`] fraction of the population).
///
/// [`survival_threshold`]: crate::PopulationConfig::survival_threshold
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionScheme {
    /// Every member of the pool is equally likely to be chosen.
    Truncation,
    /// Members are chosen with probability proportional to their
    /// fitness ("roulette wheel"). If every member has a fitness of 0,
    /// selection falls back to uniform.
    FitnessProportionate,
    /// The best of `size` uniformly drawn members is chosen.
    Tournament { size: usize },
}

/// Ranked breeding pool that parents are drawn from.
pub(super) struct BreedingPool<'a> {
    /// Genome indices, best first.
    members: &'a [usize],
    scheme: SelectionScheme,
    weights: Option<WeightedIndex<f32>>,
}

impl<'a> BreedingPool<'a> {
    /// Builds a pool from the `members` (best first) and their fitnesses.
    pub(super) fn new(
        members: &'a [usize],
        fitness_of: impl Fn(usize) -> f32,
        scheme: SelectionScheme,
    ) -> BreedingPool<'a> {
        debug_assert!(!members.is_empty());
        let weights = match scheme {
            SelectionScheme::FitnessProportionate => {
                WeightedIndex::new(members.iter().map(|m| fitness_of(*m))).ok()
            }
            _ => None,
        };
        BreedingPool {
            members,
            scheme,
            weights,
        }
    }

    /// Chooses a single parent.
    pub(super) fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let position = match (self.scheme, &self.weights) {
            (SelectionScheme::FitnessProportionate, Some(weights)) => weights.sample(rng),
            (SelectionScheme::Tournament { size }, _) => (0..size.max(1))
                .map(|_| rng.gen_range(0..self.members.len()))
                .min()
                .unwrap_or(0),
            _ => rng.gen_range(0..self.members.len()),
        };
        self.members[position]
    }

    /// Chooses two parents, distinct whenever the pool allows it.
    pub(super) fn choose_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, usize) {
        let first = self.choose(rng);
        if self.members.len() < 2 {
            return (first, first);
        }
        // Roulette selection can be dominated by a single member,
        // so re-draws are bounded.
        for _ in 0..self.members.len() {
            let second = self.choose(rng);
            if second != first {
                return (first, second);
            }
        }
        (first, first)
    }

    pub(super) fn len(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const FITNESS: [f32; 5] = [9.0, 7.0, 5.0, 0.0, 0.0];

    #[test]
    fn truncation_stays_within_pool() {
        let members = [4, 2, 0];
        let pool = BreedingPool::new(&members, |i| FITNESS[i], SelectionScheme::Truncation);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(members.contains(&pool.choose(&mut rng)));
        }
    }

    #[test]
    fn proportionate_never_picks_zero_fitness() {
        let members = [0, 1, 3];
        let pool = BreedingPool::new(
            &members,
            |i| FITNESS[i],
            SelectionScheme::FitnessProportionate,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            assert_ne!(pool.choose(&mut rng), 3);
        }
    }

    #[test]
    fn proportionate_falls_back_to_uniform() {
        let members = [3, 4];
        let pool = BreedingPool::new(
            &members,
            |i| FITNESS[i],
            SelectionScheme::FitnessProportionate,
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let picks: Vec<_> = (0..100).map(|_| pool.choose(&mut rng)).collect();
        assert!(picks.contains(&3) && picks.contains(&4));
    }

    #[test]
    fn large_tournament_favours_best() {
        let members = [0, 1, 2, 3, 4];
        let pool = BreedingPool::new(
            &members,
            |i| FITNESS[i],
            SelectionScheme::Tournament { size: 64 },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!((0..50).all(|_| pool.choose(&mut rng) == 0));
    }

    #[test]
    fn pairs_are_distinct() {
        let members = [0, 1];
        let pool = BreedingPool::new(&members, |i| FITNESS[i], SelectionScheme::Truncation);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..50 {
            let (a, b) = pool.choose_pair(&mut rng);
            assert_ne!(a, b);
        }
    }

    #[test]
    fn same_seed_same_choices() {
        let members = [0, 1, 2];
        let pool = BreedingPool::new(
            &members,
            |i| FITNESS[i],
            SelectionScheme::FitnessProportionate,
        );
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..20).map(|_| pool.choose(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(draw(3), draw(3));
    }
}
