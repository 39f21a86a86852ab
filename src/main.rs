//! Grovekeeper CLI - seeded glyph artworks per floor.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};

use grovekeeper::colormap::{BuiltinColormap, Color};
use grovekeeper::naming::ColormapKind;
use grovekeeper::render::{save_png, RasterRenderer, RenderRequest, Renderer};
use grovekeeper::{
    heightmap, seeds, terminal, Assets, BiomeRegistry, Composition, FloorResolver, FloorStore,
    GroveConfig, GroveResult, ResolveOptions, Source, WeightDistribution,
};

#[derive(Parser)]
#[command(name = "grovekeeper")]
#[command(author, version, about = "Generate seeded glyph heightmap artworks", long_about = None)]
struct Cli {
    /// Grove root holding biomes, floors and asset directories.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and render one artwork.
    Generate {
        /// Floor level to draw the biome from.
        #[arg(short, long)]
        level: usize,

        /// Seed for every choice (random in 0..10000 if not given).
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output PNG path (default: output/<name>.png under the root).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Also print the heightmap digits.
        #[arg(long)]
        print_grid: bool,
    },

    /// Render one artwork from explicit choices instead of a floor draw.
    Compose {
        /// Where the heightmap cells come from.
        #[arg(long, value_enum, default_value = "perlin")]
        mode: ComposeMode,

        /// Digits for literal mode (rows * cols of them).
        #[arg(long)]
        source: Option<String>,

        /// Heightmap template name for template mode.
        #[arg(long)]
        template: Option<String>,

        #[arg(long)]
        glyphtable: String,

        /// Built-in colormap or color set name.
        #[arg(long, default_value = "viridis")]
        cmap: String,

        /// How `--cmap` is read.
        #[arg(long, value_enum, default_value = "builtin")]
        color_mode: ColorMode,

        /// Seed for synthesis, noise and glyph shift (random in 0..10000 if not given).
        #[arg(short, long)]
        seed: Option<u64>,

        #[arg(long)]
        rows: Option<usize>,

        #[arg(long)]
        cols: Option<usize>,

        /// Invert the heightmap (9 - v).
        #[arg(long)]
        invert: bool,

        /// Fill cells equal to the noise flag with Perlin noise.
        #[arg(long)]
        noise: bool,

        /// File of replacement cells, one row of space-separated digits per line.
        #[arg(long)]
        edit: Option<PathBuf>,

        /// Font size override for the glyph table.
        #[arg(long)]
        font_size: Option<u32>,

        #[arg(long)]
        invert_glyphs: bool,

        #[arg(long)]
        alpha_glyphs: bool,

        /// Text drawn at the right of the footer.
        #[arg(long)]
        label: Option<String>,

        /// Output PNG path (default: output/<name>.png under the root).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Resolve a range of seeds in parallel and print their names.
    Batch {
        #[arg(short, long)]
        level: usize,

        /// First seed (inclusive).
        #[arg(long)]
        from: u64,

        /// Last seed (exclusive).
        #[arg(long)]
        to: u64,
    },

    /// Print a UUID-derived pattern to the terminal.
    Pattern {
        /// Glyph table to use (default: first by name).
        #[arg(long)]
        glyphtable: Option<String>,

        /// Color set or built-in colormap to use.
        #[arg(long)]
        cmap: Option<String>,

        /// Seed for the UUID and the color shuffle.
        #[arg(long)]
        seed: Option<u64>,

        /// Use this UUID instead of a generated one.
        #[arg(long)]
        uuid: Option<String>,
    },

    /// Append a floor with the given biome weights.
    NewFloor {
        /// Comma-separated `biome=weight` pairs summing to 1.
        #[arg(long, value_delimiter = ',', value_parser = parse_weight, required = true)]
        weights: Vec<(String, f64)>,
    },

    /// Merge top-level keys into a biome record and save it.
    Biome {
        #[arg(long)]
        id: String,

        /// JSON object whose keys replace the biome's keys.
        #[arg(long)]
        json: String,
    },

    /// List persisted biome IDs.
    Biomes,

    /// Print an image as a literal heightmap digit string.
    Digits {
        #[arg(long)]
        image: PathBuf,

        #[arg(long, default_value = "32")]
        rows: usize,

        #[arg(long, default_value = "32")]
        cols: usize,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ComposeMode {
    Uniform,
    Perlin,
    Literal,
    Template,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorMode {
    Builtin,
    Specific,
    Gradient,
}

impl From<ColorMode> for ColormapKind {
    fn from(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Builtin => ColormapKind::Builtin,
            ColorMode::Specific => ColormapKind::Specific,
            ColorMode::Gradient => ColormapKind::Gradient,
        }
    }
}

fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (name, weight) = s
        .split_once('=')
        .ok_or_else(|| format!("expected biome=weight, got '{}'", s))?;
    let weight = weight
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("bad weight for '{}': {}", name, e))?;
    Ok((name.trim().to_string(), weight))
}

fn main() {
    let cli = Cli::parse();

    let result = GroveConfig::load(&cli.root).and_then(|config| match cli.command {
        Commands::Generate {
            level,
            seed,
            out,
            print_grid,
        } => run_generate(&config, level, seed, out.as_deref(), print_grid),
        Commands::Compose {
            mode,
            source,
            template,
            glyphtable,
            cmap,
            color_mode,
            seed,
            rows,
            cols,
            invert,
            noise,
            edit,
            font_size,
            invert_glyphs,
            alpha_glyphs,
            label,
            out,
        } => {
            let source = match mode {
                ComposeMode::Uniform => Source::Uniform,
                ComposeMode::Perlin => Source::Perlin,
                ComposeMode::Literal => Source::Literal(source.unwrap_or_default()),
                ComposeMode::Template => Source::Template(template.unwrap_or_default()),
            };
            let mut options = ResolveOptions::from(&config);
            options.rows = rows.unwrap_or(options.rows);
            options.cols = cols.unwrap_or(options.cols);
            let seed = seed.unwrap_or_else(seeds::new_random_seed);

            let composition = Composition {
                options,
                invert,
                noise,
                colormap_kind: color_mode.into(),
                font_size,
                invert_glyphs,
                alpha_glyphs,
                label,
                ..Composition::new(source, cmap, glyphtable, seed)
            };
            run_compose(&config, composition, edit.as_deref(), out.as_deref())
        }
        Commands::Batch { level, from, to } => run_batch(&config, level, from, to),
        Commands::Pattern {
            glyphtable,
            cmap,
            seed,
            uuid,
        } => run_pattern(&config, glyphtable.as_deref(), cmap.as_deref(), seed, uuid),
        Commands::NewFloor { weights } => run_new_floor(&config, weights),
        Commands::Biome { id, json } => run_biome(&config, &id, &json),
        Commands::Biomes => run_biomes(&config),
        Commands::Digits { image, rows, cols } => run_digits(&image, rows, cols),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_generate(
    config: &GroveConfig,
    level: usize,
    seed: Option<u64>,
    out: Option<&Path>,
    print_grid: bool,
) -> GroveResult<()> {
    let seed = seed.unwrap_or_else(seeds::new_random_seed);
    println!("Generating level {} with seed: {}", level, seed);

    let assets = Assets::load(config)?;
    let floors = FloorStore::load(config.floors_path())?;
    let biomes = BiomeRegistry::new(config.biomes_dir());
    let resolver = FloorResolver::new(floors.table(), &biomes).with_options(ResolveOptions::from(config));

    let plan = resolver.resolve(level, seed, &assets)?;
    println!("Biome: {}", plan.biome);
    if print_grid {
        println!("{}", plan.grid.to_text());
    }

    let image = RasterRenderer::new(config.cell_size).render(&RenderRequest::from(&plan))?;
    let path = match out {
        Some(path) => {
            image.save(path)?;
            path.to_path_buf()
        }
        None => save_png(&image, &config.output_dir(), &plan.name)?,
    };

    println!("Saved {} to {}", plan.name, path.display());
    Ok(())
}

fn run_compose(
    config: &GroveConfig,
    mut composition: Composition,
    edit: Option<&Path>,
    out: Option<&Path>,
) -> GroveResult<()> {
    if let Some(path) = edit {
        composition.edit = Some(std::fs::read_to_string(path)?);
    }
    println!("Composing {} heightmap with seed: {}", composition.source.name(), composition.seed);

    let assets = Assets::load(config)?;
    let artwork = composition.compose(&assets)?;
    let image = RasterRenderer::new(config.cell_size).render(&RenderRequest::from(&artwork))?;
    let path = match out {
        Some(path) => {
            image.save(path)?;
            path.to_path_buf()
        }
        None => save_png(&image, &config.output_dir(), &artwork.name)?,
    };

    println!("Saved {} to {}", artwork.name, path.display());
    Ok(())
}

fn run_batch(config: &GroveConfig, level: usize, from: u64, to: u64) -> GroveResult<()> {
    let assets = Assets::load(config)?;
    let floors = FloorStore::load(config.floors_path())?;
    let biomes = BiomeRegistry::new(config.biomes_dir());
    let resolver = FloorResolver::new(floors.table(), &biomes).with_options(ResolveOptions::from(config));

    println!("Resolving seeds {}..{} on level {}...", from, to, level);
    for (seed, plan) in (from..to).zip(resolver.resolve_many(level, from..to, &assets)) {
        match plan {
            Ok(plan) => println!("{} {}", seed, plan.name),
            Err(e) => println!("{} error: {}", seed, e),
        }
    }
    Ok(())
}

fn run_pattern(
    config: &GroveConfig,
    glyphtable: Option<&str>,
    cmap: Option<&str>,
    seed: Option<u64>,
    uuid: Option<String>,
) -> GroveResult<()> {
    let assets = Assets::load(config)?;
    let seed = seed.unwrap_or_else(seeds::new_random_seed);
    let uuid = uuid.unwrap_or_else(|| seeds::uuid_from_seed(seed));

    let table = match glyphtable.filter(|name| assets.glyph_tables.contains_key(*name)) {
        Some(name) => Some(assets.glyph_table(name)?),
        None => assets
            .glyph_tables
            .keys()
            .min()
            .map(|name| assets.glyph_table(name))
            .transpose()?,
    };
    let glyphs = table.map(|t| t.glyphs.clone()).unwrap_or_default();

    let colors = pattern_colors(&assets, cmap);
    let grid = heightmap::from_uuid(&uuid)?;

    println!("\nGenerated Pattern:");
    terminal::print_pattern(&mut std::io::stdout(), &grid, &glyphs, &colors, seed)?;
    println!("\nUUID: {}\n", uuid);
    Ok(())
}

/// Colors for the terminal preview: a named color set, a named built-in sampled
/// at the ten cell values, or else the first color set by name.
fn pattern_colors(assets: &Assets, cmap: Option<&str>) -> Vec<Color> {
    if let Some(name) = cmap {
        if let Some(set) = assets.color_set(name) {
            return set.colors.clone();
        }
        if let Some(builtin) = BuiltinColormap::from_name(name) {
            return (0..10).map(|i| builtin.color_at(i as f64 / 9.0)).collect();
        }
    }

    match assets.color_sets.keys().min() {
        Some(name) => assets.color_sets[name].colors.clone(),
        None => (0..10)
            .map(|i| BuiltinColormap::VIRIDIS.color_at(i as f64 / 9.0))
            .collect(),
    }
}

fn run_new_floor(config: &GroveConfig, weights: Vec<(String, f64)>) -> GroveResult<()> {
    let distribution = WeightDistribution::new(weights)?;
    let mut store = FloorStore::load(config.floors_path())?;
    let level = store.new_floor(distribution)?;
    println!("Added floor {} to {}", level, config.floors_path().display());
    Ok(())
}

fn run_biome(config: &GroveConfig, id: &str, json: &str) -> GroveResult<()> {
    let partial: Map<String, Value> = serde_json::from_str(json)?;
    let registry = BiomeRegistry::new(config.biomes_dir());
    let biome = registry.overwrite(id, partial)?;
    println!("{}", serde_json::to_string_pretty(biome.record())?);
    Ok(())
}

fn run_biomes(config: &GroveConfig) -> GroveResult<()> {
    for id in BiomeRegistry::new(config.biomes_dir()).list()? {
        println!("{}", id);
    }
    Ok(())
}

fn run_digits(path: &Path, rows: usize, cols: usize) -> GroveResult<()> {
    let image = image::open(path)?;
    println!("{}", heightmap::from_image(&image, rows, cols).to_digit_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_compose_writes_edited_artwork() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("heightmaps")).unwrap();
        std::fs::create_dir_all(root.join("glyphtables")).unwrap();
        std::fs::write(root.join("heightmaps").join("hills"), "rolling green hills").unwrap();
        std::fs::write(root.join("glyphtables").join("leaves.txt"), "Leaf.ttf\n*+x%\n18\n").unwrap();
        std::fs::write(root.join("edit.txt"), "0 9\n9 0\n").unwrap();

        let config = GroveConfig::load(root).unwrap();
        let mut options = ResolveOptions::from(&config);
        options.rows = 2;
        options.cols = 2;
        let composition = Composition {
            options,
            invert: true,
            ..Composition::new(Source::Template("hills".into()), "Blues", "leaves", 12)
        };
        run_compose(&config, composition, Some(&root.join("edit.txt")), None).unwrap();

        let path = config.output_dir().join("Blues.m_hills.i_leaves_12.png");
        let image = image::open(&path).unwrap().to_rgba8();
        assert_eq!(image.width(), 2 * config.cell_size);
        assert!(image.height() >= 2 * config.cell_size);

        // the edit put value 0 in the top-left cell
        let top_left = BuiltinColormap::from_name("Blues").unwrap().color_at(0.0);
        let [r, g, b] = top_left.to_array();
        assert_eq!(image.get_pixel(0, 0).0, [r, g, b, 255]);
    }

    #[test]
    fn test_compose_rejects_bad_edit_file() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("glyphtables")).unwrap();
        std::fs::write(root.join("glyphtables").join("leaves.txt"), "Leaf.ttf\n*+x%\n").unwrap();
        std::fs::write(root.join("edit.txt"), "1 2 3\n").unwrap();

        let config = GroveConfig::load(root).unwrap();
        let mut options = ResolveOptions::from(&config);
        options.rows = 2;
        options.cols = 2;
        let composition = Composition {
            options,
            ..Composition::new(Source::Uniform, "viridis", "leaves", 1)
        };
        let result = run_compose(&config, composition, Some(&root.join("edit.txt")), None);
        assert!(matches!(result, Err(grovekeeper::GroveError::ShapeMismatch { .. })));
        assert!(!config.output_dir().exists());
    }
}
