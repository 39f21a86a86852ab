//! Grovekeeper library
//!
//! Seeded selection of biomes and assets per floor, heightmap synthesis, and
//! composition of glyph artworks. Re-exports modules for use by the binary.

pub mod assets;
pub mod biomes;
pub mod colormap;
pub mod compose;
pub mod config;
pub mod error;
pub mod floors;
pub mod grid;
pub mod heightmap;
pub mod naming;
pub mod render;
pub mod resolver;
pub mod seeds;
pub mod selection;
pub mod terminal;

pub use assets::Assets;
pub use biomes::{Biome, BiomeRegistry, BiomeSource, Quirks};
pub use compose::{Artwork, Composition, Source};
pub use config::GroveConfig;
pub use error::{GroveError, GroveResult};
pub use floors::{FloorStore, FloorTable};
pub use grid::Grid;
pub use naming::CanonicalName;
pub use render::{RasterRenderer, RenderRequest, Renderer};
pub use resolver::{FloorResolver, GenerationPlan, ResolveOptions};
pub use selection::{gate, Probability, WeightDistribution};
