//! Manual composition: one artwork from explicit choices instead of a floor draw.
//!
//! The heightmap source, colormap and glyph table are named directly. The
//! seed still drives synthesis, the noise grid and the glyph shift, so a
//! composition is as reproducible as a resolved plan and gets a canonical name
//! in the same format.

use std::path::PathBuf;

use crate::assets::{Assets, COLOR_POOL};
use crate::colormap::{BuiltinColormap, Colormap};
use crate::error::{GroveError, GroveResult};
use crate::grid::Grid;
use crate::heightmap::{self, HeightmapMode};
use crate::naming::{CanonicalName, ColormapKind};
use crate::render::RenderRequest;
use crate::resolver::{ResolveOptions, PERLIN_SOURCE, UNIFORM_SOURCE};

/// Heightmap field of the name for a literal digit source.
pub const LITERAL_SOURCE: &str = "literal";

/// Where the cells of a composition come from.
#[derive(Clone, Debug, PartialEq)]
pub enum Source {
    Uniform,
    Perlin,
    /// Exactly `rows * cols` digits, row-major
    Literal(String),
    /// A named heightmap template
    Template(String),
}

impl Source {
    /// Name used for the heightmap field of the canonical name.
    pub fn name(&self) -> &str {
        match self {
            Source::Uniform => UNIFORM_SOURCE,
            Source::Perlin => PERLIN_SOURCE,
            Source::Literal(_) => LITERAL_SOURCE,
            Source::Template(name) => name.as_str(),
        }
    }
}

/// Every choice of one manual artwork.
#[derive(Clone, Debug, PartialEq)]
pub struct Composition {
    pub source: Source,
    pub seed: u64,
    /// Grid size, Perlin settings and the noise flag value
    pub options: ResolveOptions,
    pub invert: bool,
    /// Replace cells equal to the noise flag with Perlin noise from the seed
    pub noise: bool,
    /// Replacement cells in [`Grid::to_text`] form, applied last
    pub edit: Option<String>,
    pub colormap: String,
    pub colormap_kind: ColormapKind,
    pub glyph_table: String,
    /// Overrides the glyph table's font size
    pub font_size: Option<u32>,
    pub invert_glyphs: bool,
    pub alpha_glyphs: bool,
    pub label: Option<String>,
    /// Overrides the canonical name
    pub name: Option<String>,
}

impl Composition {
    pub fn new(source: Source, colormap: impl Into<String>, glyph_table: impl Into<String>, seed: u64) -> Self {
        Self {
            source,
            seed,
            options: ResolveOptions::default(),
            invert: false,
            noise: false,
            edit: None,
            colormap: colormap.into(),
            colormap_kind: ColormapKind::Builtin,
            glyph_table: glyph_table.into(),
            font_size: None,
            invert_glyphs: false,
            alpha_glyphs: false,
            label: None,
            name: None,
        }
    }

    pub fn canonical(&self) -> CanonicalName {
        CanonicalName {
            colormap: self.colormap.clone(),
            colormap_kind: self.colormap_kind,
            heightmap: self.source.name().to_string(),
            inverted: self.invert,
            noise: self.noise,
            glyph_table: self.glyph_table.clone(),
            glyphs_inverted: self.invert_glyphs,
            glyph_alpha: self.alpha_glyphs,
            seed: self.seed,
        }
    }

    /// Build the grid, then look up the colormap and glyph table.
    ///
    /// Operators apply in a fixed order: invert, noise blend, edit. A rejected
    /// edit fails the whole composition.
    pub fn compose(&self, assets: &Assets) -> GroveResult<Artwork> {
        let opts = &self.options;
        let mode = match &self.source {
            Source::Uniform => HeightmapMode::UniformRandom,
            Source::Perlin => HeightmapMode::Perlin(opts.perlin),
            Source::Literal(digits) => HeightmapMode::LiteralString(digits),
            Source::Template(name) => HeightmapMode::TemplateString(assets.template(name)?),
        };

        let mut grid = heightmap::synthesize(&mode, self.seed, opts.rows, opts.cols)?;
        if self.invert {
            grid = heightmap::invert(&grid);
        }
        if self.noise {
            let noise = heightmap::perlin(opts.rows, opts.cols, self.seed, &opts.perlin);
            grid = heightmap::blend_noise(&grid, &noise, opts.noise_flag)?;
        }
        if let Some(edit) = &self.edit {
            grid.apply_edit(edit)?;
        }

        let colors = self.colors(assets)?;
        let table = assets.glyph_table(&self.glyph_table)?;
        let name = match &self.name {
            Some(name) => name.clone(),
            None => self.canonical().to_string(),
        };

        tracing::info!(seed = self.seed, source = self.source.name(), name = %name, "composition built");
        Ok(Artwork {
            seed: self.seed,
            grid,
            colors,
            glyphs: table.glyphs.clone(),
            font: table.font.clone(),
            font_size: self.font_size.unwrap_or(table.font_size),
            invert_glyphs: self.invert_glyphs,
            alpha_glyphs: self.alpha_glyphs,
            label: self.label.clone().unwrap_or_default(),
            name,
        })
    }

    fn colors(&self, assets: &Assets) -> GroveResult<Colormap> {
        let colors = match self.colormap_kind {
            ColormapKind::Builtin => BuiltinColormap::from_name(&self.colormap).map(Colormap::Builtin),
            ColormapKind::Specific => assets
                .color_set(&self.colormap)
                .map(|set| Colormap::Specific(set.colors.clone())),
            ColormapKind::Gradient => assets
                .color_set(&self.colormap)
                .map(|set| Colormap::Gradient(set.colors.clone())),
        };
        colors.ok_or_else(|| GroveError::AssetNotFound {
            pool: COLOR_POOL,
            key: self.colormap.clone(),
        })
    }
}

/// A composed artwork, ready to render.
#[derive(Clone, Debug, PartialEq)]
pub struct Artwork {
    pub seed: u64,
    pub grid: Grid,
    pub colors: Colormap,
    pub glyphs: Vec<char>,
    pub font: PathBuf,
    pub font_size: u32,
    pub invert_glyphs: bool,
    pub alpha_glyphs: bool,
    pub label: String,
    pub name: String,
}

impl<'a> From<&'a Artwork> for RenderRequest<'a> {
    fn from(artwork: &'a Artwork) -> Self {
        Self {
            grid: &artwork.grid,
            glyphs: &artwork.glyphs,
            seed: artwork.seed,
            font: &artwork.font,
            font_size: artwork.font_size,
            colors: &artwork.colors,
            invert_glyph_colors: artwork.invert_glyphs,
            glyph_alpha: artwork.alpha_glyphs,
            label: artwork.label.clone(),
            name: &artwork.name,
        }
    }
}
