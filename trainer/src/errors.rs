use dinoneat::{ConfigError, PopulationError};
use thiserror::Error;

use std::io;
use std::path::PathBuf;

#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("could not access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::Error,
    },
    #[error("could not serialize population state")]
    Serialize(#[source] ron::Error),
    /// Networks must read every sensor and drive every action.
    #[error("genomes must have {expected_inputs} inputs and {expected_outputs} outputs, configured {inputs} and {outputs}")]
    NetworkShape {
        expected_inputs: usize,
        expected_outputs: usize,
        inputs: usize,
        outputs: usize,
    },
    #[error("course parameter `{parameter}` is invalid: {reason}")]
    Course {
        parameter: &'static str,
        reason: &'static str,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Population(#[from] PopulationError),
}
