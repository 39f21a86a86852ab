//! Heightmap synthesis and post-processing.
//!
//! Every source yields a [`Grid`] of values in `0..=9`:
//! - uniform random cells
//! - fractal Perlin noise
//! - a literal string of digits
//! - an arbitrary template string, rescaled by code point
//!
//! plus the image and UUID conversions used by the preview tools.

use image::imageops::FilterType;
use image::DynamicImage;
use noise::{NoiseFn, Perlin};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GroveError, GroveResult};
use crate::grid::{Grid, MAX_CELL};
use crate::seeds::seeded_rng;

/// Default heightmap side length.
pub const DEFAULT_SIZE: usize = 32;

/// Rows and columns of a UUID pattern grid.
pub const UUID_ROWS: usize = 3;
pub const UUID_COLS: usize = 8;

/// Parameters for fractal Perlin synthesis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerlinParams {
    /// Cell coordinates are divided by this before sampling
    pub scale: f64,
    pub octaves: u32,
    /// Amplitude multiplier per octave
    pub persistence: f64,
    /// Frequency multiplier per octave
    pub lacunarity: f64,
}

impl Default for PerlinParams {
    fn default() -> Self {
        Self {
            scale: 10.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Where a heightmap's cells come from.
#[derive(Clone, Debug, PartialEq)]
pub enum HeightmapMode<'a> {
    UniformRandom,
    Perlin(PerlinParams),
    /// Exactly `rows * cols` ASCII digits, row-major
    LiteralString(&'a str),
    /// Any string, repeated and rescaled by code point
    TemplateString(&'a str),
}

/// Build a `rows` x `cols` grid from `mode`.
pub fn synthesize(mode: &HeightmapMode<'_>, seed: u64, rows: usize, cols: usize) -> GroveResult<Grid> {
    match mode {
        HeightmapMode::UniformRandom => Ok(uniform_random(rows, cols, seed)),
        HeightmapMode::Perlin(params) => Ok(perlin(rows, cols, seed, params)),
        HeightmapMode::LiteralString(source) => from_literal(source, rows, cols),
        HeightmapMode::TemplateString(source) => Ok(from_template(source, rows, cols)),
    }
}

/// Every cell independently uniform over `0..=9`.
pub fn uniform_random(rows: usize, cols: usize, seed: u64) -> Grid {
    let mut rng = seeded_rng(seed);
    let data = (0..rows * cols).map(|_| rng.gen_range(0..=MAX_CELL)).collect();
    Grid::from_vec(rows, cols, data).unwrap_or_else(|_| Grid::new(rows, cols))
}

/// Fractal Perlin noise sampled at `(row / scale, col / scale)` and mapped from
/// `[-1, 1]` onto `0..=9`.
pub fn perlin(rows: usize, cols: usize, seed: u64, params: &PerlinParams) -> Grid {
    let noise = Perlin::new(perlin_seed(seed));
    let mut grid = Grid::new(rows, cols);

    for row in 0..rows {
        for col in 0..cols {
            let value = fbm(
                &noise,
                row as f64 / params.scale,
                col as f64 / params.scale,
                params.octaves,
                params.persistence,
                params.lacunarity,
            );
            let level = ((value + 1.0) * 4.5).floor().clamp(0.0, MAX_CELL as f64);
            grid.set(row, col, level as u8);
        }
    }

    grid
}

/// `Perlin` takes a 32-bit seed; the high half of `seed` is folded into the low.
fn perlin_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Fractional Brownian Motion - multi-octave noise normalized to `[-1, 1]`
fn fbm(noise: &Perlin, x: f64, y: f64, octaves: u32, persistence: f64, lacunarity: f64) -> f64 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut max_value = 0.0;

    for _ in 0..octaves.max(1) {
        total += amplitude * noise.get([x * frequency, y * frequency]);
        max_value += amplitude;
        amplitude *= persistence;
        frequency *= lacunarity;
    }

    total / max_value
}

/// Parse exactly `rows * cols` digits, row-major.
pub fn from_literal(source: &str, rows: usize, cols: usize) -> GroveResult<Grid> {
    let data = source
        .chars()
        .enumerate()
        .map(|(index, c)| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or(GroveError::InvalidDigit { index, found: c })
        })
        .collect::<GroveResult<Vec<u8>>>()?;
    Grid::from_vec(rows, cols, data)
}

/// Map a string onto a grid through its code points.
///
/// The code points are repeated until they cover the grid, truncated to
/// `rows * cols`, and rescaled so the smallest becomes 0 and the largest 9
/// (truncating). When every code point is equal the grid is all zeros; an
/// empty string also yields zeros.
pub fn from_template(source: &str, rows: usize, cols: usize) -> Grid {
    let cells = rows * cols;
    let codes: Vec<u32> = source.chars().map(u32::from).cycle().take(cells).collect();

    let (min, max) = match (codes.iter().min(), codes.iter().max()) {
        (Some(&min), Some(&max)) if max > min => (min, max),
        _ => return Grid::new(rows, cols),
    };

    let range = (max - min) as f64;
    let data = codes
        .iter()
        .map(|&code| ((code - min) as f64 / range * MAX_CELL as f64) as u8)
        .collect();
    Grid::from_vec(rows, cols, data).unwrap_or_else(|_| Grid::new(rows, cols))
}

/// Every cell `v` becomes `9 - v`.
pub fn invert(grid: &Grid) -> Grid {
    grid.map(|v| MAX_CELL - v.min(MAX_CELL))
}

/// Replace every cell equal to `flagged` with the matching cell of `noise`.
pub fn blend_noise(grid: &Grid, noise: &Grid, flagged: u8) -> GroveResult<Grid> {
    if grid.shape() != noise.shape() {
        return Err(GroveError::ShapeMismatch {
            expected: grid.shape(),
            actual: noise.shape(),
        });
    }

    let data = grid
        .cells()
        .iter()
        .zip(noise.cells())
        .map(|(&v, &n)| if v == flagged { n } else { v })
        .collect();
    Grid::from_vec(grid.rows, grid.cols, data)
}

/// Grayscale, resize to `cols` x `rows`, and scale each pixel to `0..=9`.
pub fn from_image(image: &DynamicImage, rows: usize, cols: usize) -> Grid {
    let gray = if image.width() == cols as u32 && image.height() == rows as u32 {
        image.to_luma8()
    } else {
        image
            .resize_exact(cols as u32, rows as u32, FilterType::CatmullRom)
            .to_luma8()
    };

    let mut grid = Grid::new(rows, cols);
    for (x, y, pixel) in gray.enumerate_pixels() {
        let level = (pixel.0[0] as f64 / 255.0 * MAX_CELL as f64) as u8;
        grid.set(y as usize, x as usize, level);
    }
    grid
}

/// A 3x8 grid from the last four groups of a hyphenated UUID.
///
/// Digits keep their value; hex letters map to `letter - 'A' + 3`, so `A..=F`
/// become `3..=8`.
pub fn from_uuid(uuid: &str) -> GroveResult<Grid> {
    let groups: Vec<&str> = uuid.trim().split('-').collect();
    if groups.len() != 5 {
        return Err(GroveError::InvalidUuid(uuid.to_string()));
    }

    let mut values = groups[1..]
        .concat()
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            d @ '0'..='9' => Ok(d as u8 - b'0'),
            l @ 'A'..='F' => Ok(l as u8 - b'A' + 10 - 7),
            _ => Err(GroveError::InvalidUuid(uuid.to_string())),
        })
        .collect::<GroveResult<Vec<u8>>>()?;

    values.resize(UUID_ROWS * UUID_COLS, 0);
    Grid::from_vec(UUID_ROWS, UUID_COLS, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn test_uniform_is_seeded_and_bounded() {
        let a = uniform_random(32, 32, 99);
        assert_eq!(a, uniform_random(32, 32, 99));
        assert_ne!(a, uniform_random(32, 32, 100));
        assert!(a.cells().iter().all(|&v| v <= MAX_CELL));
    }

    #[test]
    fn test_perlin_reproducible() {
        let params = PerlinParams::default();
        let a = perlin(32, 32, 42, &params);
        let b = perlin(32, 32, 42, &params);
        assert_eq!(a, b);
        assert!(a.cells().iter().all(|&v| v <= MAX_CELL));
    }

    #[test]
    fn test_perlin_origin_is_midpoint() {
        // Perlin noise is zero on integer lattice points
        let grid = perlin(1, 1, 7, &PerlinParams::default());
        assert_eq!(grid.get(0, 0), 4);
    }

    #[test]
    fn test_perlin_uses_high_seed_bits() {
        assert_eq!(perlin_seed(5), 5);
        assert_eq!(perlin_seed(5 + (1 << 32)), 4);

        let params = PerlinParams {
            scale: 3.7,
            ..PerlinParams::default()
        };
        let low = perlin(16, 16, 5, &params);
        let high = perlin(16, 16, 5 + (1 << 32), &params);
        assert_ne!(low, high);
    }

    #[test]
    fn test_literal_parses_row_major() {
        let grid = from_literal("012345", 2, 3).unwrap();
        assert_eq!(grid.get(0, 2), 2);
        assert_eq!(grid.get(1, 0), 3);
    }

    #[test]
    fn test_literal_errors() {
        assert!(matches!(
            from_literal("01234", 2, 3),
            Err(GroveError::ShapeMismatch { expected: (2, 3), .. })
        ));
        assert!(matches!(
            from_literal("01a345", 2, 3),
            Err(GroveError::InvalidDigit { index: 2, found: 'a' })
        ));
    }

    #[test]
    fn test_template_rescales_code_points() {
        // 'a' = 97 .. 'j' = 106: a spread of exactly 9
        let grid = from_template("abcdefghij", 2, 5);
        assert_eq!(grid.cells(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_template_repeats_and_truncates() {
        let grid = from_template("az", 2, 3);
        assert_eq!(grid.cells(), &[0, 9, 0, 9, 0, 9]);
    }

    #[test]
    fn test_template_truncates_not_rounds() {
        // (1 / 2) * 9 = 4.5 -> 4
        let grid = from_template("abc", 1, 3);
        assert_eq!(grid.cells(), &[0, 4, 9]);
    }

    #[test]
    fn test_template_constant_input_is_zero() {
        assert_eq!(from_template("xxxx", 32, 32), Grid::new(32, 32));
        assert_eq!(from_template("", 4, 4), Grid::new(4, 4));
        // Only the truncated window counts
        assert_eq!(from_template(&("q".repeat(1024) + "z"), 32, 32), Grid::new(32, 32));
    }

    #[test]
    fn test_synthesize_dispatch() {
        let literal = synthesize(&HeightmapMode::LiteralString("1234"), 0, 2, 2).unwrap();
        assert_eq!(literal.cells(), &[1, 2, 3, 4]);
        let uniform = synthesize(&HeightmapMode::UniformRandom, 5, 4, 4).unwrap();
        assert_eq!(uniform, uniform_random(4, 4, 5));
    }

    #[test]
    fn test_invert_round_trip() {
        for seed in 0..20 {
            let grid = uniform_random(8, 8, seed);
            assert_eq!(invert(&invert(&grid)), grid);
        }
        let grid = Grid::from_rows(&[vec![0, 9, 3]]).unwrap();
        assert_eq!(invert(&grid).cells(), &[9, 0, 6]);
    }

    #[test]
    fn test_blend_noise_only_touches_flagged() {
        let grid = uniform_random(16, 16, 1);
        let noise = uniform_random(16, 16, 2);
        let blended = blend_noise(&grid, &noise, 0).unwrap();

        for (row, col, v) in grid.iter() {
            let expected = if v == 0 { noise.get(row, col) } else { v };
            assert_eq!(blended.get(row, col), expected);
        }
    }

    #[test]
    fn test_blend_noise_shape_mismatch() {
        let result = blend_noise(&Grid::new(2, 2), &Grid::new(3, 3), 0);
        assert!(matches!(result, Err(GroveError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_from_image_scales_levels() {
        let mut img = GrayImage::new(2, 1);
        img.put_pixel(0, 0, Luma([0]));
        img.put_pixel(1, 0, Luma([255]));
        let grid = from_image(&DynamicImage::ImageLuma8(img), 1, 2);
        assert_eq!(grid.cells(), &[0, 9]);
    }

    #[test]
    fn test_from_uuid() {
        let grid = from_uuid("12345678-9abc-def0-1234-56789abcdef0").unwrap();
        assert_eq!(grid.shape(), (3, 8));
        assert_eq!(&grid.cells()[..8], &[9, 3, 4, 5, 6, 7, 8, 0]);
        assert!(from_uuid("not-a-uuid").is_err());
        assert!(from_uuid("12345678-zzzz-def0-1234-56789abcdef0").is_err());
    }
}
