use crate::course::{Action, CourseConfig, SENSOR_COUNT};
use crate::errors::TrainerError;

use dinoneat::PopulationConfig;
use dinoneat_nn::genomics::GeneticConfig;
use serde::{Deserialize, Serialize};

use std::fs;
use std::path::Path;

/// Everything a training run needs, as read from a RON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub population: PopulationConfig,
    pub genetic: GeneticConfig,
    pub course: CourseConfig,
    /// Seeds of the courses every genome runs.
    pub course_seeds: Vec<u64>,
    /// Fitness bonus per obstacle cleared.
    pub obstacle_reward: f32,
    pub generations: usize,
    /// Training stops early once the champion reaches this fitness.
    #[serde(default)]
    pub target_fitness: Option<f32>,
    /// Generations between population saves, if saving.
    #[serde(default)]
    pub save_interval: Option<usize>,
}

impl TrainerConfig {
    /// Reads and validates a configuration file.
    pub fn load(path: &Path) -> Result<TrainerConfig, TrainerError> {
        let text = fs::read_to_string(path).map_err(|source| TrainerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: TrainerConfig = ron::from_str(&text).map_err(|source| TrainerError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), TrainerError> {
        self.population.validate()?;
        self.genetic.validate()?;

        let (inputs, outputs) = (
            self.genetic.input_count.get(),
            self.genetic.output_count.get(),
        );
        if inputs != SENSOR_COUNT || outputs != Action::ALL.len() {
            return Err(TrainerError::NetworkShape {
                expected_inputs: SENSOR_COUNT,
                expected_outputs: Action::ALL.len(),
                inputs,
                outputs,
            });
        }

        let course = &self.course;
        if !(0.0..=1.0).contains(&course.airborne_chance) {
            return Err(TrainerError::Course {
                parameter: "airborne_chance",
                reason: "must be in [0.0, 1.0]",
            });
        }
        if !(course.initial_speed > 0.0 && course.initial_speed <= course.max_speed) {
            return Err(TrainerError::Course {
                parameter: "initial_speed",
                reason: "must be positive and at most max_speed",
            });
        }
        if !(course.acceleration >= 0.0) {
            return Err(TrainerError::Course {
                parameter: "acceleration",
                reason: "must be non-negative",
            });
        }
        if self.course_seeds.is_empty() {
            return Err(TrainerError::Course {
                parameter: "course_seeds",
                reason: "at least one course is required",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT_CONFIG: &str = include_str!("../config.ron");

    fn default_config() -> TrainerConfig {
        ron::from_str(DEFAULT_CONFIG).unwrap()
    }

    #[test]
    fn shipped_config_is_valid() {
        let config = default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.genetic.input_count.get(), SENSOR_COUNT);
        assert!(config.genetic.bias);
    }

    #[test]
    fn network_shape_must_match_course() {
        let mut config = default_config();
        config.genetic.output_count = std::num::NonZeroUsize::new(2).unwrap();
        assert!(matches!(
            config.validate(),
            Err(TrainerError::NetworkShape { outputs: 2, .. })
        ));
    }

    #[test]
    fn course_parameters_are_checked() {
        let mut config = default_config();
        config.course.airborne_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(TrainerError::Course {
                parameter: "airborne_chance",
                ..
            })
        ));

        let mut config = default_config();
        config.course_seeds.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn engine_config_errors_surface() {
        let mut config = default_config();
        config.population.elitism = config.population.size.get();
        assert!(matches!(config.validate(), Err(TrainerError::Config(_))));
    }

    #[test]
    fn missing_file_is_reported() {
        let error = TrainerConfig::load(Path::new("does/not/exist.ron")).unwrap_err();
        assert!(matches!(error, TrainerError::Io { .. }));
        assert!(error.to_string().contains("does/not/exist.ron"));
    }
}
