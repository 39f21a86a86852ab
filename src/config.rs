//! Grove directory layout and generation settings.
//!
//! A grove root looks like:
//!
//! ```text
//! root/
//!   grove.json        optional overrides for the settings below
//!   floors.json
//!   biomes/*.json
//!   heightmaps/*
//!   colors/*
//!   glyphtables/*
//!   output/
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::GroveResult;
use crate::heightmap::{PerlinParams, DEFAULT_SIZE};

/// Name of the optional settings file inside a grove root.
pub const CONFIG_FILE: &str = "grove.json";

/// Settings for a grove root. Every field has a default; `grove.json` only
/// needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroveConfig {
    #[serde(skip)]
    pub root: PathBuf,
    /// Directory glyph-table font names are resolved against
    pub font_dir: PathBuf,
    pub rows: usize,
    pub cols: usize,
    /// Side of one rendered cell in pixels
    pub cell_size: u32,
    pub perlin: PerlinParams,
    /// Heightmap value replaced by noise when the noise quirk fires
    pub noise_flag: u8,
}

impl Default for GroveConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            font_dir: PathBuf::from("/usr/share/fonts/truetype/noto/"),
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            cell_size: 24,
            perlin: PerlinParams::default(),
            noise_flag: 0,
        }
    }
}

impl GroveConfig {
    /// Defaults rooted at `root`, overridden by `root/grove.json` when present.
    pub fn load<P: AsRef<Path>>(root: P) -> GroveResult<Self> {
        let root = root.as_ref().to_path_buf();
        let path = root.join(CONFIG_FILE);

        let mut config = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(&path)?)?
        } else {
            Self::default()
        };
        config.root = root;
        Ok(config)
    }

    pub fn biomes_dir(&self) -> PathBuf {
        self.root.join("biomes")
    }

    pub fn floors_path(&self) -> PathBuf {
        self.root.join("floors.json")
    }

    pub fn heightmaps_dir(&self) -> PathBuf {
        self.root.join("heightmaps")
    }

    pub fn colors_dir(&self) -> PathBuf {
        self.root.join("colors")
    }

    pub fn glyphs_dir(&self) -> PathBuf {
        self.root.join("glyphtables")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("output")
    }
}
