//! Raster rendering of generation plans.
//!
//! Each cell is filled with its colormap color and overlaid with one glyph drawn
//! from a built-in 5x7 bitmap font. A footer strip under the grid carries the
//! canonical name and the level label.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};

use crate::colormap::{Color, Colormap};
use crate::error::GroveResult;
use crate::grid::Grid;
use crate::resolver::{glyph_index, GenerationPlan};

/// Opacity of glyphs when the alpha quirk is set.
pub const GLYPH_ALPHA: f64 = 0.7;

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;
const FOOTER_HEIGHT: u32 = 16;
const FOOTER_BG: Rgba<u8> = Rgba([30, 30, 35, 255]);
const FOOTER_TEXT: Rgba<u8> = Rgba([220, 220, 220, 255]);

/// Everything a renderer needs from a plan.
#[derive(Clone, Debug)]
pub struct RenderRequest<'a> {
    pub grid: &'a Grid,
    pub glyphs: &'a [char],
    pub seed: u64,
    pub font: &'a Path,
    pub font_size: u32,
    pub colors: &'a Colormap,
    pub invert_glyph_colors: bool,
    pub glyph_alpha: bool,
    pub label: String,
    pub name: &'a str,
}

impl<'a> From<&'a GenerationPlan> for RenderRequest<'a> {
    fn from(plan: &'a GenerationPlan) -> Self {
        Self {
            grid: &plan.grid,
            glyphs: &plan.glyphs,
            seed: plan.seed,
            font: &plan.font,
            font_size: plan.font_size,
            colors: &plan.colors,
            invert_glyph_colors: plan.invert_glyphs,
            glyph_alpha: plan.alpha_glyphs,
            label: plan.label(),
            name: &plan.name,
        }
    }
}

/// Turns a render request into some output artifact.
pub trait Renderer {
    type Output;

    fn render(&self, request: &RenderRequest<'_>) -> GroveResult<Self::Output>;
}

/// Renders to an RGBA image.
#[derive(Clone, Debug)]
pub struct RasterRenderer {
    /// Side of one cell in pixels
    pub cell_size: u32,
    /// Draw the name and label strip under the grid
    pub footer: bool,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self {
            cell_size: 24,
            footer: true,
        }
    }
}

impl RasterRenderer {
    pub fn new(cell_size: u32) -> Self {
        Self {
            cell_size: cell_size.max(GLYPH_H + 1),
            ..Self::default()
        }
    }

    /// Pixel scale of the bitmap font inside one cell.
    fn glyph_scale(&self, font_size: u32) -> u32 {
        let fit = (self.cell_size / GLYPH_H).max(1);
        (font_size / GLYPH_H).clamp(1, fit)
    }

    fn draw_cell(&self, img: &mut RgbaImage, request: &RenderRequest<'_>, row: usize, col: usize, value: u8) {
        let cell = self.cell_size;
        let x0 = col as u32 * cell;
        let y0 = row as u32 * cell;

        let background = request.colors.cell_color(value);
        let bg = to_rgba(background);
        for py in 0..cell {
            for px in 0..cell {
                img.put_pixel(x0 + px, y0 + py, bg);
            }
        }

        let Some(index) = glyph_index(value, request.seed, request.glyphs.len()) else {
            return;
        };
        let glyph = request.glyphs[index];

        let ink = if request.invert_glyph_colors {
            background.inverted()
        } else {
            Color::BLACK
        };
        let ink = if request.glyph_alpha {
            ink.lerp(background, 1.0 - GLYPH_ALPHA)
        } else {
            ink
        };

        let scale = self.glyph_scale(request.font_size);
        let gx = x0 + cell.saturating_sub(GLYPH_W * scale) / 2;
        let gy = y0 + cell.saturating_sub(GLYPH_H * scale) / 2;
        let bits = glyph_bits(glyph).unwrap_or(&MISSING_GLYPH);
        draw_bits(img, gx, gy, bits, scale, to_rgba(ink));
    }

    fn draw_footer(&self, img: &mut RgbaImage, y: u32, name: &str, label: &str) {
        for py in y..img.height() {
            for px in 0..img.width() {
                img.put_pixel(px, py, FOOTER_BG);
            }
        }

        let text_y = y + (FOOTER_HEIGHT - GLYPH_H) / 2;
        draw_text(img, 4, text_y, name, FOOTER_TEXT);

        let label_width = label.chars().count() as u32 * (GLYPH_W + 1);
        let label_x = img.width().saturating_sub(label_width + 4);
        draw_text(img, label_x, text_y, label, FOOTER_TEXT);
    }
}

impl Renderer for RasterRenderer {
    type Output = RgbaImage;

    fn render(&self, request: &RenderRequest<'_>) -> GroveResult<RgbaImage> {
        let (rows, cols) = request.grid.shape();
        let width = cols as u32 * self.cell_size;
        let grid_height = rows as u32 * self.cell_size;
        let height = grid_height + if self.footer { FOOTER_HEIGHT } else { 0 };

        let mut img = RgbaImage::new(width, height);
        for (row, col, value) in request.grid.iter() {
            self.draw_cell(&mut img, request, row, col, value);
        }
        if self.footer {
            self.draw_footer(&mut img, grid_height, request.name, &request.label);
        }

        tracing::debug!(name = request.name, width, height, "plan rendered");
        Ok(img)
    }
}

/// Encode an image as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> GroveResult<Vec<u8>> {
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/// Save an image as `{dir}/{name}.png`, creating `dir` if needed.
pub fn save_png(img: &RgbaImage, dir: &Path, name: &str) -> GroveResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.png", name));
    img.save(&path)?;
    Ok(path)
}

fn to_rgba(color: Color) -> Rgba<u8> {
    let [r, g, b] = color.to_array();
    Rgba([r, g, b, 255])
}

fn draw_bits(img: &mut RgbaImage, x: u32, y: u32, bits: &[u8; 7], scale: u32, color: Rgba<u8>) {
    for (row, &byte) in bits.iter().enumerate() {
        for col in 0..GLYPH_W {
            if byte & (0b10000 >> col) == 0 {
                continue;
            }
            for dy in 0..scale {
                for dx in 0..scale {
                    let px = x + col * scale + dx;
                    let py = y + row as u32 * scale + dy;
                    if px < img.width() && py < img.height() {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }
    }
}

fn draw_text(img: &mut RgbaImage, x: u32, y: u32, text: &str, color: Rgba<u8>) {
    let mut cx = x;
    for ch in text.chars() {
        if let Some(bits) = glyph_bits(ch) {
            draw_bits(img, cx, y, bits, 1, color);
        }
        cx += GLYPH_W + 1;
    }
}

/// Bitmap for `ch`. Lowercase letters use the uppercase shape.
fn glyph_bits(ch: char) -> Option<&'static [u8; 7]> {
    let upper = ch.to_ascii_uppercase();
    FONT_5X7
        .iter()
        .find(|(c, _)| *c == ch || *c == upper)
        .map(|(_, bits)| bits)
}

/// Outlined box drawn for characters the font does not cover.
const MISSING_GLYPH: [u8; 7] = [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111];

/// 5x7 bitmaps, MSB is the leftmost pixel.
const FONT_5X7: &[(char, [u8; 7])] = &[
    ('A', [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('B', [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('D', [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('F', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('G', [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110]),
    ('H', [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001]),
    ('I', [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('J', [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100]),
    ('K', [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001]),
    ('L', [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111]),
    ('M', [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001]),
    ('N', [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001]),
    ('O', [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('Q', [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101]),
    ('R', [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001]),
    ('S', [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('U', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110]),
    ('V', [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100]),
    ('W', [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010]),
    ('X', [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001]),
    ('Y', [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100]),
    ('Z', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111]),
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    (' ', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('-', [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000]),
    ('.', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100]),
    ('_', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111]),
    ('~', [0b00000, 0b01000, 0b10101, 0b00010, 0b00000, 0b00000, 0b00000]),
    (',', [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100, 0b11000]),
    (':', [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000]),
    ('#', [0b01010, 0b11111, 0b01010, 0b01010, 0b11111, 0b01010, 0b00000]),
    ('+', [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000]),
    ('=', [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000]),
    ('*', [0b00000, 0b10101, 0b01110, 0b11111, 0b01110, 0b10101, 0b00000]),
    ('^', [0b00100, 0b01010, 0b10001, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('%', [0b11001, 0b11010, 0b00100, 0b01000, 0b01011, 0b10011, 0b00000]),
    ('@', [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110]),
    ('!', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100]),
    ('?', [0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100]),
    ('/', [0b00001, 0b00010, 0b00100, 0b00100, 0b01000, 0b10000, 0b00000]),
    ('\\', [0b10000, 0b01000, 0b00100, 0b00100, 0b00010, 0b00001, 0b00000]),
    ('|', [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
];

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const FONT: &str = "/fonts/Noto.ttf";

    fn request<'a>(grid: &'a Grid, glyphs: &'a [char], colors: &'a Colormap) -> RenderRequest<'a> {
        RenderRequest {
            grid,
            glyphs,
            seed: 0,
            font: Path::new(FONT),
            font_size: 16,
            colors,
            invert_glyph_colors: false,
            glyph_alpha: false,
            label: "Level 0".to_string(),
            name: "viridis.m_hills_leaves_0",
        }
    }

    // With cell 24 and font 16 the glyph scale is 2: a 10x14 box at offset (7, 5).
    // The centre column of '|' covers x = 11..13.
    const BAR_X: u32 = 11;
    const BAR_Y: u32 = 10;

    #[test]
    fn test_dimensions() {
        let grid = Grid::new(3, 8);
        let colors = Colormap::Specific(vec![Color::WHITE]);
        let glyphs = ['|'];
        let img = RasterRenderer::default().render(&request(&grid, &glyphs, &colors)).unwrap();
        assert_eq!(img.dimensions(), (8 * 24, 3 * 24 + FOOTER_HEIGHT));

        let bare = RasterRenderer { footer: false, ..RasterRenderer::default() };
        let img = bare.render(&request(&grid, &glyphs, &colors)).unwrap();
        assert_eq!(img.dimensions(), (8 * 24, 3 * 24));
    }

    #[test]
    fn test_cell_and_glyph_colors() {
        let grid = Grid::new(1, 1);
        let colors = Colormap::Specific(vec![Color::WHITE]);
        let glyphs = ['|'];
        let img = RasterRenderer::default().render(&request(&grid, &glyphs, &colors)).unwrap();

        assert_eq!(*img.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*img.get_pixel(BAR_X, BAR_Y), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_inverted_glyphs() {
        let grid = Grid::new(1, 1);
        let cell = Color::new(200, 100, 0);
        let colors = Colormap::Specific(vec![cell]);
        let glyphs = ['|'];
        let req = RenderRequest {
            invert_glyph_colors: true,
            ..request(&grid, &glyphs, &colors)
        };
        let img = RasterRenderer::default().render(&req).unwrap();
        assert_eq!(*img.get_pixel(BAR_X, BAR_Y), Rgba([55, 155, 255, 255]));
    }

    #[test]
    fn test_alpha_glyphs_blend_with_cell() {
        let grid = Grid::new(1, 1);
        let colors = Colormap::Specific(vec![Color::WHITE]);
        let glyphs = ['|'];
        let req = RenderRequest {
            glyph_alpha: true,
            ..request(&grid, &glyphs, &colors)
        };
        let img = RasterRenderer::default().render(&req).unwrap();
        let Rgba([r, g, b, _]) = *img.get_pixel(BAR_X, BAR_Y);
        assert!(r > 0 && r < 128);
        assert_eq!((r, r), (g, b));
    }

    #[test]
    fn test_glyph_shift_by_seed() {
        let grid = Grid::new(1, 1);
        let colors = Colormap::Specific(vec![Color::WHITE]);
        let glyphs = [' ', '|'];

        let blank = RasterRenderer::default().render(&request(&grid, &glyphs, &colors)).unwrap();
        assert_eq!(*blank.get_pixel(BAR_X, BAR_Y), Rgba([255, 255, 255, 255]));

        let req = RenderRequest { seed: 1, ..request(&grid, &glyphs, &colors) };
        let shifted = RasterRenderer::default().render(&req).unwrap();
        assert_eq!(*shifted.get_pixel(BAR_X, BAR_Y), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_unknown_glyph_is_boxed() {
        let grid = Grid::new(1, 1);
        let colors = Colormap::Specific(vec![Color::WHITE]);
        let glyphs = ['ᚠ'];
        let img = RasterRenderer::default().render(&request(&grid, &glyphs, &colors)).unwrap();
        // Top-left corner of the box
        assert_eq!(*img.get_pixel(7, 5), Rgba([0, 0, 0, 255]));
        // Hollow inside
        assert_eq!(*img.get_pixel(12, 12), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_empty_glyph_table_leaves_cells_plain() {
        let grid = Grid::new_with(2, 2, 9);
        let colors = Colormap::Specific(vec![Color::BLACK, Color::WHITE]);
        let img = RasterRenderer { footer: false, ..RasterRenderer::default() }
            .render(&request(&grid, &[], &colors))
            .unwrap();
        assert!(img.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }

    #[test]
    fn test_png_encoding_and_save() {
        let grid = Grid::new(2, 2);
        let colors = Colormap::Specific(vec![Color::WHITE]);
        let glyphs = ['*'];
        let req = request(&grid, &glyphs, &colors);
        let img = RasterRenderer::default().render(&req).unwrap();

        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let dir = tempdir().unwrap();
        let path = save_png(&img, &dir.path().join("output"), req.name).unwrap();
        assert_eq!(path.file_name().unwrap(), "viridis.m_hills_leaves_0.png");
        assert_eq!(image::open(&path).unwrap().to_rgba8(), img);
    }

    #[test]
    fn test_glyph_scale_fits_cell() {
        let renderer = RasterRenderer::new(24);
        assert_eq!(renderer.glyph_scale(16), 2);
        assert_eq!(renderer.glyph_scale(4), 1);
        assert_eq!(renderer.glyph_scale(200), 3);
    }
}
