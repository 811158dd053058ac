use crate::errors::TrainerError;

use dinoneat::PopulationState;
use dinoneat_nn::genomics::{LineageCounter, NNGenome};
use ron::ser::PrettyConfig;

use std::fs;
use std::path::Path;

pub type SavedPopulation = PopulationState<LineageCounter, NNGenome>;

/// Writes `state` to `path` as RON.
pub fn save(path: &Path, state: &SavedPopulation) -> Result<(), TrainerError> {
    let text = ron::ser::to_string_pretty(state, PrettyConfig::new().indentor("  ".to_owned()))
        .map_err(TrainerError::Serialize)?;
    fs::write(path, text).map_err(|source| TrainerError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a population saved with [`save`]. Genomes are
/// re-validated, and the lineage counter is advanced past
/// every id they carry.
pub fn load(path: &Path) -> Result<SavedPopulation, TrainerError> {
    let text = fs::read_to_string(path).map_err(|source| TrainerError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state: SavedPopulation = ron::from_str(&text).map_err(|source| TrainerError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for genome in state.genomes.iter().chain(&state.champion) {
        state.history.observe(genome);
    }
    Ok(state)
}
