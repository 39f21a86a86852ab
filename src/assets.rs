//! Asset pools consumed by the resolver, and loading them from a grove root.
//!
//! The resolver only ever sees an [`Assets`] value; reading files happens here,
//! once, before any resolution.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::colormap::Color;
use crate::config::GroveConfig;
use crate::error::{GroveError, GroveResult};

/// Font size used when a glyph table does not name one.
pub const DEFAULT_FONT_SIZE: u32 = 16;

pub const HEIGHTMAP_POOL: &str = "heightmap_templates";
pub const COLOR_POOL: &str = "color_sets";
pub const GLYPH_POOL: &str = "glyph_tables";

/// Glyphs drawn over the cells, with the font they are meant for.
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphTable {
    pub name: String,
    pub glyphs: Vec<char>,
    pub font: PathBuf,
    pub font_size: u32,
}

impl GlyphTable {
    pub fn new(name: impl Into<String>, glyphs: &str, font: impl Into<PathBuf>, font_size: u32) -> Self {
        Self {
            name: name.into(),
            glyphs: glyphs.chars().collect(),
            font: font.into(),
            font_size,
        }
    }

    /// Parse a glyph-table file: font file name, glyph line, optional font size.
    pub fn parse(name: &str, contents: &str, font_dir: &Path) -> Option<Self> {
        let mut lines = contents.lines().map(str::trim);
        let font = lines.next().filter(|l| !l.is_empty())?;
        let glyphs = lines.next().filter(|l| !l.is_empty())?;
        let font_size = lines
            .next()
            .and_then(|l| l.parse().ok())
            .unwrap_or(DEFAULT_FONT_SIZE);
        Some(Self::new(name, glyphs, font_dir.join(font), font_size))
    }
}

/// An ordered list of colors loaded from a user file.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorSet {
    pub name: String,
    pub colors: Vec<Color>,
}

impl ColorSet {
    pub fn from_hex<S: AsRef<str>>(name: impl Into<String>, hex: &[S]) -> GroveResult<Self> {
        let colors = hex
            .iter()
            .map(|h| Color::parse_hex(h.as_ref()))
            .collect::<GroveResult<Vec<_>>>()?;
        Ok(Self {
            name: name.into(),
            colors,
        })
    }

    /// One hex color per line; blank lines are skipped.
    pub fn parse(name: &str, contents: &str) -> GroveResult<Self> {
        let lines: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        Self::from_hex(name, &lines)
    }

    pub fn hex(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.to_hex()).collect()
    }
}

/// Heightmap templates, color sets and glyph tables keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Assets {
    pub heightmap_templates: HashMap<String, String>,
    pub color_sets: HashMap<String, ColorSet>,
    pub glyph_tables: HashMap<String, GlyphTable>,
}

impl Assets {
    pub fn with_template(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.heightmap_templates.insert(name.into(), template.into());
        self
    }

    pub fn with_color_set(mut self, set: ColorSet) -> Self {
        self.color_sets.insert(set.name.clone(), set);
        self
    }

    pub fn with_glyph_table(mut self, table: GlyphTable) -> Self {
        self.glyph_tables.insert(table.name.clone(), table);
        self
    }

    pub fn template(&self, name: &str) -> GroveResult<&str> {
        self.heightmap_templates
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| GroveError::AssetNotFound {
                pool: HEIGHTMAP_POOL,
                key: name.to_string(),
            })
    }

    pub fn color_set(&self, name: &str) -> Option<&ColorSet> {
        self.color_sets.get(name)
    }

    pub fn glyph_table(&self, name: &str) -> GroveResult<&GlyphTable> {
        self.glyph_tables.get(name).ok_or_else(|| GroveError::AssetNotFound {
            pool: GLYPH_POOL,
            key: name.to_string(),
        })
    }

    /// Load every pool from the directories of `config`. Missing directories
    /// give empty pools; unreadable or malformed files are skipped.
    pub fn load(config: &GroveConfig) -> GroveResult<Self> {
        let mut assets = Assets::default();

        for (name, contents) in read_dir_files(&config.heightmaps_dir())? {
            assets.heightmap_templates.insert(name, contents);
        }

        for (name, contents) in read_dir_files(&config.colors_dir())? {
            match ColorSet::parse(&name, &contents) {
                Ok(set) => {
                    assets.color_sets.insert(name, set);
                }
                Err(e) => tracing::warn!(color_set = %name, error = %e, "skipping color set"),
            }
        }

        for (file_name, contents) in read_dir_files(&config.glyphs_dir())? {
            let name = Path::new(&file_name)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(&file_name)
                .to_string();
            match GlyphTable::parse(&name, &contents, &config.font_dir) {
                Some(table) => {
                    assets.glyph_tables.insert(name, table);
                }
                None => tracing::warn!(glyph_table = %name, "skipping malformed glyph table"),
            }
        }

        tracing::debug!(
            templates = assets.heightmap_templates.len(),
            color_sets = assets.color_sets.len(),
            glyph_tables = assets.glyph_tables.len(),
            "assets loaded"
        );
        Ok(assets)
    }
}

/// `(file name, contents)` for every readable UTF-8 file directly in `dir`.
fn read_dir_files(dir: &Path) -> GroveResult<Vec<(String, String)>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        match fs::read_to_string(&path) {
            Ok(contents) => files.push((name.to_string(), contents)),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable asset"),
        }
    }
    files.sort();
    Ok(files)
}
