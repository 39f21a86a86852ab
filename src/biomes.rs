//! Biome records and their on-disk registry.
//!
//! A biome is a JSON document with four top-level keys:
//!
//! ```json
//! {
//!   "heightmaps": { "hills": 0.5, "valleys": 0.5 },
//!   "colormaps": { "viridis": 1.0 },
//!   "glyphs": { "leaves": 1.0 },
//!   "quirks": { "invert_heightmap": 0.5, "noise": 0.5, "gradient": 0.0,
//!               "invert_glyphs": false, "alpha_glyphs": false }
//! }
//! ```
//!
//! The record is kept as loaded; pools and quirks are parsed when they are used,
//! so a biome with a missing pool only fails when that pool is needed.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{GroveError, GroveResult};
use crate::selection::{Probability, WeightDistribution};

/// Top-level keys of a biome record.
pub const HEIGHTMAPS: &str = "heightmaps";
pub const COLORMAPS: &str = "colormaps";
pub const GLYPHS: &str = "glyphs";
pub const QUIRKS: &str = "quirks";

/// Optional transforms a biome applies to its generations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quirks {
    /// Chance of inverting the heightmap
    pub invert_heightmap: Probability,
    /// Chance of filling zero cells with Perlin noise
    pub noise: Probability,
    /// Chance that a custom colormap is a gradient rather than discrete colors
    pub gradient: Probability,
    /// Draw glyphs in the inverse of their cell color
    pub invert_glyphs: bool,
    /// Draw glyphs semi-transparent
    pub alpha_glyphs: bool,
}

impl Default for Quirks {
    fn default() -> Self {
        Self {
            invert_heightmap: Probability::HALF,
            noise: Probability::HALF,
            gradient: Probability::HALF,
            invert_glyphs: false,
            alpha_glyphs: false,
        }
    }
}

#[derive(Deserialize)]
struct QuirksRecord {
    #[serde(default = "half")]
    invert_heightmap: f64,
    #[serde(default = "half")]
    noise: f64,
    #[serde(default = "half")]
    gradient: f64,
    #[serde(default)]
    invert_glyphs: bool,
    #[serde(default)]
    alpha_glyphs: bool,
}

fn half() -> f64 {
    0.5
}

impl Quirks {
    /// Parse a quirks object. Missing keys take their defaults.
    pub fn from_value(value: &Value) -> GroveResult<Self> {
        let record = QuirksRecord::deserialize(value)?;
        Ok(Self {
            invert_heightmap: Probability::new("invert_heightmap", record.invert_heightmap)?,
            noise: Probability::new("noise", record.noise)?,
            gradient: Probability::new("gradient", record.gradient)?,
            invert_glyphs: record.invert_glyphs,
            alpha_glyphs: record.alpha_glyphs,
        })
    }
}

/// A named bundle of weighted pools plus quirks.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Biome {
    pub id: String,
    record: Map<String, Value>,
}

impl Biome {
    /// A biome with no data.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            record: Map::new(),
        }
    }

    pub fn from_record(id: impl Into<String>, record: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            record,
        }
    }

    /// Parse a biome from a JSON object string.
    pub fn from_json(id: impl Into<String>, json: &str) -> GroveResult<Self> {
        Ok(Self::from_record(id, serde_json::from_str(json)?))
    }

    pub fn record(&self) -> &Map<String, Value> {
        &self.record
    }

    pub fn is_empty(&self) -> bool {
        self.record.is_empty()
    }

    pub fn heightmaps(&self) -> GroveResult<WeightDistribution> {
        self.pool(HEIGHTMAPS)
    }

    pub fn colormaps(&self) -> GroveResult<WeightDistribution> {
        self.pool(COLORMAPS)
    }

    pub fn glyphs(&self) -> GroveResult<WeightDistribution> {
        self.pool(GLYPHS)
    }

    pub fn quirks(&self) -> GroveResult<Quirks> {
        Quirks::from_value(self.field(QUIRKS)?)
    }

    fn field(&self, field: &'static str) -> GroveResult<&Value> {
        self.record.get(field).ok_or_else(|| GroveError::MissingBiomeField {
            biome: self.id.clone(),
            field,
        })
    }

    fn pool(&self, field: &'static str) -> GroveResult<WeightDistribution> {
        let weights = BTreeMap::<String, f64>::deserialize(self.field(field)?)?;
        WeightDistribution::new(weights)
    }

    /// Shallow merge: each top-level key of `partial` replaces the same key here.
    /// Nested weight maps are replaced whole, never merged.
    pub fn merge(&mut self, partial: Map<String, Value>) {
        for (key, value) in partial {
            self.record.insert(key, value);
        }
    }
}

/// Read-only biome lookup used by the resolver.
///
/// Unknown IDs yield an empty [`Biome`], never an error.
pub trait BiomeSource {
    fn load_biome(&self, id: &str) -> GroveResult<Biome>;
}

impl BiomeSource for HashMap<String, Biome> {
    fn load_biome(&self, id: &str) -> GroveResult<Biome> {
        Ok(self.get(id).cloned().unwrap_or_else(|| Biome::new(id)))
    }
}

/// Biome records stored as `{dir}/{biome_id}.json`.
///
/// Writes go straight to disk. There is no locking: concurrent overwrites of
/// the same biome race and the last write wins.
pub struct BiomeRegistry {
    dir: PathBuf,
}

impl BiomeRegistry {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn biome_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// Load a biome. A missing file gives an empty biome.
    pub fn load(&self, id: &str) -> GroveResult<Biome> {
        let path = self.biome_path(id);
        if !path.exists() {
            tracing::debug!(biome = id, "no record on disk, using empty biome");
            return Ok(Biome::new(id));
        }

        let reader = BufReader::new(File::open(&path)?);
        let record: Map<String, Value> = serde_json::from_reader(reader)?;
        Ok(Biome::from_record(id, record))
    }

    /// Write the whole record of `biome`.
    pub fn save(&self, biome: &Biome) -> GroveResult<()> {
        fs::create_dir_all(&self.dir)?;
        let mut writer = BufWriter::new(File::create(self.biome_path(&biome.id))?);
        serde_json::to_writer_pretty(&mut writer, biome.record())?;
        writer.flush()?;
        Ok(())
    }

    /// Merge `partial` into the stored record and write it back immediately.
    pub fn overwrite(&self, id: &str, partial: Map<String, Value>) -> GroveResult<Biome> {
        let mut biome = self.load(id)?;
        biome.merge(partial);
        self.save(&biome)?;
        tracing::info!(biome = id, "biome record updated");
        Ok(biome)
    }

    /// IDs of all stored biomes, sorted.
    pub fn list(&self) -> GroveResult<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

impl BiomeSource for BiomeRegistry {
    fn load_biome(&self, id: &str) -> GroveResult<Biome> {
        self.load(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    const FOREST: &str = r#"{
        "heightmaps": {"hills": 0.5, "valleys": 0.5},
        "colormaps": {"viridis": 1.0},
        "glyphs": {"leaves": 1.0},
        "quirks": {"invert_heightmap": 0, "noise": 0}
    }"#;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_pools_parse() {
        let forest = Biome::from_json("Forest", FOREST).unwrap();
        assert_eq!(forest.heightmaps().unwrap().len(), 2);
        assert!(forest.colormaps().unwrap().contains("viridis"));
        assert!(forest.glyphs().unwrap().contains("leaves"));
    }

    #[test]
    fn test_quirk_defaults() {
        let forest = Biome::from_json("Forest", FOREST).unwrap();
        let quirks = forest.quirks().unwrap();
        assert_eq!(quirks.invert_heightmap, Probability::NEVER);
        assert_eq!(quirks.noise, Probability::NEVER);
        assert_eq!(quirks.gradient, Probability::HALF);
        assert!(!quirks.invert_glyphs);
        assert!(!quirks.alpha_glyphs);
    }

    #[test]
    fn test_quirk_probability_out_of_range() {
        let biome = Biome::from_json("Bad", r#"{"quirks": {"noise": 2.0}}"#).unwrap();
        assert!(matches!(
            biome.quirks(),
            Err(GroveError::InvalidProbability { quirk: "noise", .. })
        ));
    }

    #[test]
    fn test_missing_pool_fails_at_use() {
        let biome = Biome::new("Void");
        assert!(biome.is_empty());
        assert!(matches!(
            biome.heightmaps(),
            Err(GroveError::MissingBiomeField { field: "heightmaps", .. })
        ));
        assert!(biome.quirks().is_err());
    }

    #[test]
    fn test_bad_weights_in_record() {
        let biome = Biome::from_json("Bad", r#"{"glyphs": {"a": 0.9, "b": 0.05}, "colormaps": {"a": "x"}}"#).unwrap();
        assert!(matches!(biome.glyphs(), Err(GroveError::InvalidWeights { .. })));
        assert!(matches!(biome.colormaps(), Err(GroveError::Json(_))));
    }

    #[test]
    fn test_registry_missing_is_empty() {
        let dir = tempdir().unwrap();
        let registry = BiomeRegistry::new(dir.path());
        let biome = registry.load("Nowhere").unwrap();
        assert_eq!(biome.id, "Nowhere");
        assert!(biome.is_empty());
    }

    #[test]
    fn test_overwrite_is_shallow_and_persistent() {
        let dir = tempdir().unwrap();
        let registry = BiomeRegistry::new(dir.path());
        registry
            .save(&Biome::from_json("Forest", FOREST).unwrap())
            .unwrap();

        registry
            .overwrite("Forest", object(json!({"heightmaps": {"ridges": 1.0}})))
            .unwrap();

        let reloaded = registry.load("Forest").unwrap();
        let heightmaps = reloaded.heightmaps().unwrap();
        assert_eq!(heightmaps.names().collect::<Vec<_>>(), vec!["ridges"]);
        // Untouched keys survive
        assert!(reloaded.colormaps().unwrap().contains("viridis"));
    }

    #[test]
    fn test_overwrite_creates_record() {
        let dir = tempdir().unwrap();
        let registry = BiomeRegistry::new(dir.path().join("biomes"));
        registry
            .overwrite("Desert", object(json!({"glyphs": {"sand": 1.0}})))
            .unwrap();
        assert_eq!(registry.list().unwrap(), vec!["Desert".to_string()]);
    }

    #[test]
    fn test_list_sorted() {
        let dir = tempdir().unwrap();
        let registry = BiomeRegistry::new(dir.path());
        for id in ["Tundra", "Forest", "Cave"] {
            registry.save(&Biome::new(id)).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        assert_eq!(registry.list().unwrap(), vec!["Cave", "Forest", "Tundra"]);
    }

    #[test]
    fn test_map_source_defaults_to_empty() {
        let mut biomes = HashMap::new();
        biomes.insert("Forest".to_string(), Biome::from_json("Forest", FOREST).unwrap());
        assert!(!biomes.load_biome("Forest").unwrap().is_empty());
        assert!(biomes.load_biome("Swamp").unwrap().is_empty());
    }
}
