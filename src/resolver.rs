//! Resolving a (level, seed) pair into a fully concrete generation plan.
//!
//! Every choice is drawn from the one seed: the biome, the three asset pools,
//! and every quirk gate. Each draw builds its own generator, so a plan depends
//! only on the level, the seed, the floor table, the biomes and the assets.
//! Because every draw restarts from the same seed, the draws are correlated:
//! two gates with equal probability always agree for a given seed.

use std::ops::Range;
use std::path::PathBuf;

use rayon::prelude::*;

use crate::assets::{Assets, COLOR_POOL};
use crate::biomes::BiomeSource;
use crate::colormap::{BuiltinColormap, Colormap};
use crate::config::GroveConfig;
use crate::error::{GroveError, GroveResult};
use crate::floors::FloorTable;
use crate::grid::Grid;
use crate::heightmap::{self, PerlinParams, DEFAULT_SIZE};
use crate::naming::{CanonicalName, ColormapKind};
use crate::selection::gate;

/// Heightmap source name that means "Perlin noise from the seed".
pub const PERLIN_SOURCE: &str = "perlin";
/// Heightmap source name that means "uniform random cells from the seed".
pub const UNIFORM_SOURCE: &str = "uniform";

/// Grid and noise settings used during resolution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveOptions {
    pub rows: usize,
    pub cols: usize,
    pub perlin: PerlinParams,
    /// Cells with this value are replaced by noise when the noise quirk fires
    pub noise_flag: u8,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            rows: DEFAULT_SIZE,
            cols: DEFAULT_SIZE,
            perlin: PerlinParams::default(),
            noise_flag: 0,
        }
    }
}

impl From<&GroveConfig> for ResolveOptions {
    fn from(config: &GroveConfig) -> Self {
        Self {
            rows: config.rows,
            cols: config.cols,
            perlin: config.perlin,
            noise_flag: config.noise_flag,
        }
    }
}

/// The resolved output of one generation. Built fresh per call and owned by
/// the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationPlan {
    pub seed: u64,
    pub level: usize,
    pub biome: String,
    pub heightmap: String,
    pub colormap: String,
    pub colormap_kind: ColormapKind,
    /// Lookup table for cell colors
    pub colors: Colormap,
    pub glyph_table: String,
    pub invert_heightmap: bool,
    pub add_noise: bool,
    pub invert_glyphs: bool,
    pub alpha_glyphs: bool,
    pub grid: Grid,
    pub glyphs: Vec<char>,
    pub font: PathBuf,
    pub font_size: u32,
    /// Canonical name, also the default output file stem
    pub name: String,
}

impl GenerationPlan {
    /// True when the colormap came from a user color list.
    pub fn is_custom(&self) -> bool {
        self.colormap_kind.is_custom()
    }

    /// True for a custom colormap drawn as a gradient.
    pub fn is_gradient(&self) -> bool {
        self.colormap_kind == ColormapKind::Gradient
    }

    pub fn canonical(&self) -> CanonicalName {
        CanonicalName {
            colormap: self.colormap.clone(),
            colormap_kind: self.colormap_kind,
            heightmap: self.heightmap.clone(),
            inverted: self.invert_heightmap,
            noise: self.add_noise,
            glyph_table: self.glyph_table.clone(),
            glyphs_inverted: self.invert_glyphs,
            glyph_alpha: self.alpha_glyphs,
            seed: self.seed,
        }
    }

    /// Caption drawn under the image.
    pub fn label(&self) -> String {
        format!("Level {}", self.level)
    }

    /// Glyph for cell `(row, col)`: `glyphs[(value + seed) mod len]`.
    pub fn glyph_at(&self, row: usize, col: usize) -> Option<char> {
        glyph_index(self.grid.get(row, col), self.seed, self.glyphs.len()).map(|i| self.glyphs[i])
    }
}

/// Index of the glyph for a cell value, shifted by the seed.
pub fn glyph_index(value: u8, seed: u64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = len as u64;
    Some(((value as u64 + seed % len) % len) as usize)
}

/// Resolves generation plans from a floor table and a biome source.
pub struct FloorResolver<'a, B: BiomeSource> {
    floors: &'a FloorTable,
    biomes: &'a B,
    options: ResolveOptions,
}

impl<'a, B: BiomeSource> FloorResolver<'a, B> {
    pub fn new(floors: &'a FloorTable, biomes: &'a B) -> Self {
        Self {
            floors,
            biomes,
            options: ResolveOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ResolveOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Resolve one plan for `level` and `seed`.
    pub fn resolve(&self, level: usize, seed: u64, assets: &Assets) -> GroveResult<GenerationPlan> {
        let opts = &self.options;

        let biome_id = self.floors.floor(level)?.select(seed);
        let biome = self.biomes.load_biome(biome_id)?;
        tracing::debug!(level, seed, biome = biome_id, "biome selected");

        let heightmap_pool = biome.heightmaps()?;
        let colormap_pool = biome.colormaps()?;
        let glyph_pool = biome.glyphs()?;
        let heightmap_name = heightmap_pool.select(seed);
        let colormap_name = colormap_pool.select(seed);
        let glyph_name = glyph_pool.select(seed);
        tracing::debug!(
            heightmap = heightmap_name,
            colormap = colormap_name,
            glyphs = glyph_name,
            "pools resolved"
        );

        let mut grid = match heightmap_name {
            PERLIN_SOURCE => heightmap::perlin(opts.rows, opts.cols, seed, &opts.perlin),
            UNIFORM_SOURCE => heightmap::uniform_random(opts.rows, opts.cols, seed),
            name => heightmap::from_template(assets.template(name)?, opts.rows, opts.cols),
        };

        let quirks = biome.quirks()?;
        let invert_heightmap = gate(seed, quirks.invert_heightmap);
        let add_noise = gate(seed, quirks.noise);
        if invert_heightmap {
            grid = heightmap::invert(&grid);
        }
        if add_noise {
            let noise = heightmap::perlin(opts.rows, opts.cols, seed, &opts.perlin);
            grid = heightmap::blend_noise(&grid, &noise, opts.noise_flag)?;
        }

        // The gradient gate is only drawn for custom color lists
        let (colormap_kind, colors) = match assets.color_set(colormap_name) {
            Some(set) if gate(seed, quirks.gradient) => {
                (ColormapKind::Gradient, Colormap::Gradient(set.colors.clone()))
            }
            Some(set) => (ColormapKind::Specific, Colormap::Specific(set.colors.clone())),
            None => {
                let builtin = BuiltinColormap::from_name(colormap_name).ok_or_else(|| {
                    GroveError::AssetNotFound {
                        pool: COLOR_POOL,
                        key: colormap_name.to_string(),
                    }
                })?;
                (ColormapKind::Builtin, Colormap::Builtin(builtin))
            }
        };

        let table = assets.glyph_table(glyph_name)?;

        let mut plan = GenerationPlan {
            seed,
            level,
            biome: biome.id.clone(),
            heightmap: heightmap_name.to_string(),
            colormap: colormap_name.to_string(),
            colormap_kind,
            colors,
            glyph_table: glyph_name.to_string(),
            invert_heightmap,
            add_noise,
            invert_glyphs: quirks.invert_glyphs,
            alpha_glyphs: quirks.alpha_glyphs,
            grid,
            glyphs: table.glyphs.clone(),
            font: table.font.clone(),
            font_size: table.font_size,
            name: String::new(),
        };
        plan.name = plan.canonical().to_string();

        tracing::info!(level, seed, name = %plan.name, "generation resolved");
        Ok(plan)
    }
}

impl<'a, B: BiomeSource + Sync> FloorResolver<'a, B> {
    /// Resolve every seed in `seeds` in parallel. Results are in seed order and
    /// equal to resolving each seed on its own.
    pub fn resolve_many(
        &self,
        level: usize,
        seeds: Range<u64>,
        assets: &Assets,
    ) -> Vec<GroveResult<GenerationPlan>> {
        seeds
            .into_par_iter()
            .map(|seed| self.resolve(level, seed, assets))
            .collect()
    }
}
