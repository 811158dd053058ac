use crate::course::{Action, Course, CourseConfig, Run, SENSOR_COUNT};

use dinoneat_nn::genomics::NNGenome;
use dinoneat_nn::networks::{argmax, softmax, FeedForwardNetwork, NetworkError};

/// Maps course sensors to actions with a network.
#[derive(Debug)]
pub struct Controller {
    network: FeedForwardNetwork,
}

impl Controller {
    pub fn new(genome: &NNGenome) -> Result<Controller, NetworkError> {
        Ok(Controller {
            network: FeedForwardNetwork::try_from(genome)?,
        })
    }

    /// Picks the action whose output has the highest
    /// softmax probability. Falls back to running if the
    /// network produces no usable output.
    pub fn decide(&self, sensors: &[f32; SENSOR_COUNT]) -> Result<Action, NetworkError> {
        let outputs = self.network.evaluate(sensors)?;
        let action = argmax(&softmax(&outputs))
            .and_then(|i| Action::ALL.get(i).copied())
            .unwrap_or(Action::Run);
        Ok(action)
    }

    pub fn run(&self, config: &CourseConfig, seed: u64) -> Result<Run, NetworkError> {
        Course::new(config, seed).complete(|sensors| self.decide(sensors))
    }
}

/// Scores a run: one point per tick survived plus
/// `obstacle_reward` per obstacle cleared.
pub fn score(run: &Run, obstacle_reward: f32) -> f32 {
    run.ticks as f32 + run.cleared as f32 * obstacle_reward
}

/// Average score of `genome` over the courses generated
/// from `seeds`.
pub fn fitness(
    genome: &NNGenome,
    config: &CourseConfig,
    seeds: &[u64],
    obstacle_reward: f32,
) -> Result<f32, NetworkError> {
    if seeds.is_empty() {
        return Ok(0.0);
    }
    let controller = Controller::new(genome)?;
    let mut total = 0.0;
    for &seed in seeds {
        total += score(&controller.run(config, seed)?, obstacle_reward);
    }
    Ok(total / seeds.len() as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    use dinoneat_nn::genomics::{ActivationType, Edge, GeneticConfig, NNGenome, Node, NodeType};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use std::num::NonZeroUsize;

    fn genetic_config() -> GeneticConfig {
        GeneticConfig {
            input_count: NonZeroUsize::new(SENSOR_COUNT).unwrap(),
            output_count: NonZeroUsize::new(3).unwrap(),
            bias: true,
            weight_bound: 1.0,
            ..GeneticConfig::zero()
        }
    }

    fn blank_genome() -> NNGenome {
        NNGenome::new(&genetic_config(), &mut ChaCha8Rng::seed_from_u64(0))
    }

    #[test]
    fn blank_network_runs() {
        let controller = Controller::new(&blank_genome()).unwrap();
        assert_eq!(controller.decide(&[0.5; SENSOR_COUNT]), Ok(Action::Run));
    }

    #[test]
    fn strongest_output_wins() {
        // Bias (node 6) into the duck output (node 9).
        let mut genome = blank_genome();
        genome.add_edge(Edge::new(100, 6, 9, 1.0)).unwrap();
        let controller = Controller::new(&genome).unwrap();
        assert_eq!(controller.decide(&[0.0; SENSOR_COUNT]), Ok(Action::Duck));
    }

    #[test]
    fn fitness_is_deterministic() {
        let mut genome = blank_genome();
        genome.add_edge(Edge::new(100, 0, 8, -1.0)).unwrap();
        genome.add_edge(Edge::new(101, 6, 8, 0.3)).unwrap();
        let config = CourseConfig {
            max_ticks: 400,
            ..CourseConfig::default()
        };
        let seeds = [1, 2, 3];

        let a = fitness(&genome, &config, &seeds, 10.0).unwrap();
        let b = fitness(&genome, &config, &seeds, 10.0).unwrap();
        assert_eq!(a, b);
        assert!(a > 0.0);
        assert_eq!(fitness(&genome, &config, &[], 10.0), Ok(0.0));
    }

    #[test]
    fn cleared_obstacles_are_rewarded() {
        let run = Run {
            ticks: 120,
            cleared: 2,
            crashed: true,
        };
        assert_eq!(score(&run, 0.0), 120.0);
        assert_eq!(score(&run, 25.0), 170.0);
    }

    #[test]
    fn cyclic_genome_is_rejected() {
        let config = GeneticConfig {
            bias: false,
            ..genetic_config()
        };
        let mut genome = NNGenome::new(&config, &mut ChaCha8Rng::seed_from_u64(0));
        for id in [20, 21] {
            genome
                .add_node(Node::new(id, NodeType::Hidden, ActivationType::Sigmoid))
                .unwrap();
        }
        genome.add_edge(Edge::new(30, 20, 21, 1.0)).unwrap();
        genome.add_edge(Edge::new(31, 21, 20, 1.0)).unwrap();

        assert!(matches!(
            Controller::new(&genome),
            Err(NetworkError::CycleDetected(_))
        ));
    }
}
