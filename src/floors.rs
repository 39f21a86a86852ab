//! Floor table: which biomes each level draws from.
//!
//! Persisted as `{"floors": [{"Forest": 0.5, "Cave": 0.5}, ...]}`, one biome
//! weight map per level, level 0 first.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GroveError, GroveResult};
use crate::selection::WeightDistribution;

/// Ordered biome distributions indexed by level.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FloorTable {
    floors: Vec<WeightDistribution>,
}

/// The floor document as stored, before its weights are checked.
#[derive(Deserialize)]
struct FloorRecord {
    #[serde(default)]
    floors: Vec<BTreeMap<String, f64>>,
}

impl TryFrom<FloorRecord> for FloorTable {
    type Error = GroveError;

    fn try_from(record: FloorRecord) -> GroveResult<Self> {
        let floors = record
            .floors
            .into_iter()
            .map(WeightDistribution::new)
            .collect::<GroveResult<Vec<_>>>()?;
        Ok(Self { floors })
    }
}

impl FloorTable {
    pub fn new(floors: Vec<WeightDistribution>) -> Self {
        Self { floors }
    }

    /// Parse a floor document. Weight maps that do not sum to 1 are
    /// `InvalidWeights`; malformed JSON is `Json`.
    pub fn from_json(text: &str) -> GroveResult<Self> {
        serde_json::from_str::<FloorRecord>(text)?.try_into()
    }

    /// Biome distribution for `level`.
    pub fn floor(&self, level: usize) -> GroveResult<&WeightDistribution> {
        self.floors.get(level).ok_or(GroveError::LevelNotFound {
            level,
            floors: self.floors.len(),
        })
    }

    /// Append a floor; returns its level.
    pub fn push(&mut self, biome_weights: WeightDistribution) -> usize {
        self.floors.push(biome_weights);
        self.floors.len() - 1
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }
}

/// A [`FloorTable`] backed by a JSON file.
pub struct FloorStore {
    path: PathBuf,
    table: FloorTable,
}

impl FloorStore {
    /// Load the table at `path`; a missing file gives an empty table.
    pub fn load<P: AsRef<Path>>(path: P) -> GroveResult<Self> {
        let path = path.as_ref().to_path_buf();
        let table = if path.exists() {
            let record: FloorRecord = serde_json::from_reader(BufReader::new(File::open(&path)?))?;
            FloorTable::try_from(record)?
        } else {
            FloorTable::default()
        };
        Ok(Self { path, table })
    }

    pub fn table(&self) -> &FloorTable {
        &self.table
    }

    /// Append a floor and write the file immediately. Returns the new level.
    pub fn new_floor(&mut self, biome_weights: WeightDistribution) -> GroveResult<usize> {
        let level = self.table.push(biome_weights);
        self.save()?;
        tracing::info!(level, path = %self.path.display(), "floor added");
        Ok(level)
    }

    pub fn save(&self) -> GroveResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut writer, &self.table)?;
        writer.flush()?;
        Ok(())
    }
}
