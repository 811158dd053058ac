use serde::{Deserialize, Serialize};

use std::fmt;

/// A struct for reporting basic statistical data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub maximum: f32,
    pub minimum: f32,
    pub mean: f32,
    pub median: f32,
}

impl Stats {
    /// Returns statistics about numbers in a sequence.
    /// An empty sequence yields all zeroes.
    ///
    /// # Examples
    /// ```
    /// use dinoneat::Stats;
    ///
    /// let stats = Stats::from_values([-2.0, -1.0, 0.5, 1.0, 1.5].iter().copied());
    /// assert_eq!(stats.maximum, 1.5);
    /// assert_eq!(stats.minimum, -2.0);
    /// assert_eq!(stats.mean, 0.0);
    /// assert_eq!(stats.median, 0.5);
    ///
    /// let even = Stats::from_values([4.0, 1.0, 3.0, 2.0].iter().copied());
    /// assert_eq!(even.median, 2.5);
    /// ```
    pub fn from_values(data: impl Iterator<Item = f32>) -> Stats {
        let mut data: Vec<f32> = data.collect();
        if data.is_empty() {
            return Stats {
                maximum: 0.0,
                minimum: 0.0,
                mean: 0.0,
                median: 0.0,
            };
        }
        data.sort_by(|a, b| a.total_cmp(b));

        let len = data.len();
        let median = if len % 2 == 0 {
            (data[len / 2 - 1] + data[len / 2]) / 2.0
        } else {
            data[len / 2]
        };

        Stats {
            maximum: data[len - 1],
            minimum: data[0],
            mean: data.iter().sum::<f32>() / len as f32,
            median,
        }
    }
}

/// Summary of an evaluated generation, returned by
/// [`Population::evolve`].
///
/// [`Population::evolve`]: crate::Population::evolve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// The generation that was evaluated (before advancing).
    pub generation: usize,
    pub fitness: Stats,
    /// Best fitness ever evaluated, this generation included.
    pub champion_fitness: f32,
    /// Whether the best fitness failed to improve enough,
    /// triggering the injection of fresh genomes.
    pub stagnated: bool,
    pub elites: usize,
    pub offspring: usize,
    pub fresh: usize,
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {}: max {:.3}, mean {:.3}, median {:.3}, min {:.3} (champion {:.3}){}",
            self.generation,
            self.fitness.maximum,
            self.fitness.mean,
            self.fitness.median,
            self.fitness.minimum,
            self.champion_fitness,
            if self.stagnated { " [stagnated]" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_are_zero() {
        let stats = Stats::from_values(std::iter::empty());
        assert_eq!(stats.maximum, 0.0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.median, 0.0);
    }

    #[test]
    fn single_value() {
        let stats = Stats::from_values(std::iter::once(3.0));
        assert_eq!(stats.minimum, 3.0);
        assert_eq!(stats.maximum, 3.0);
        assert_eq!(stats.median, 3.0);
    }

    #[test]
    fn report_display_mentions_stagnation() {
        let report = GenerationReport {
            generation: 4,
            fitness: Stats::from_values([1.0, 2.0].iter().copied()),
            champion_fitness: 2.0,
            stagnated: true,
            elites: 1,
            offspring: 1,
            fresh: 0,
        };
        let text = report.to_string();
        assert!(text.starts_with("generation 4"));
        assert!(text.ends_with("[stagnated]"));
    }
}
