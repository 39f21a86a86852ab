//! Colormaps: built-in named ramps and user color lists.
//!
//! Cell values `0..=9` are normalized to `t = v / 9` before lookup.
//!
//! Built-ins are looked up by their exact, case-sensitive matplotlib name:
//!
//! - perceptual: `viridis`, `magma`, `inferno`, `plasma`, `cividis`, `twilight`
//! - sequential: `Greys`, `Reds`, `Blues`, `Greens`, `Purples`, `PuBu`, `PuRd`,
//!   `BuGn`, `YlGn`, `YlGnBu`, `YlOrBr`, `YlOrRd`
//! - diverging: `PiYG`, `PRGn`, `Spectral`, `coolwarm`
//! - classic: `terrain`, `pink`, `bone`, `hot`, `afmhot`, `copper`, `spring`,
//!   `summer`, `autumn`, `cool`, `Wistia`, `jet`, `hsv`
//! - qualitative (discrete bins): `Dark2`, `Pastel1`, `Pastel2`, `tab20c`

use std::fmt;

use crate::error::{GroveError, GroveResult};
use crate::grid::MAX_CELL;

/// An opaque RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From a packed `0xrrggbb` value.
    pub const fn from_rgb(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(hex: &str) -> GroveResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GroveError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| GroveError::InvalidColor(hex.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channel-wise `255 - c`.
    pub fn inverted(self) -> Self {
        Self::new(255 - self.r, 255 - self.g, 255 - self.b)
    }

    pub fn lerp(self, other: Color, t: f64) -> Self {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Self::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// How a built-in's colors are laid out over `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Stops {
    /// `(position, 0xrrggbb)` control points, positions ascending from 0 to 1
    Anchored(&'static [(f64, u32)]),
    /// Control points spaced evenly from 0 to 1
    Even(&'static [u32]),
    /// Discrete colors, one equal-width bin each
    Listed(&'static [u32]),
}

/// A built-in named colormap, matched by its exact matplotlib name.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuiltinColormap {
    name: &'static str,
    stops: Stops,
}

impl BuiltinColormap {
    pub const VIRIDIS: BuiltinColormap = BuiltinColormap {
        name: "viridis",
        stops: Stops::Even(&[
            0x440154, 0x472d7b, 0x3b528b, 0x2c728e, 0x21918c, 0x28ae80, 0x5ec962, 0xaddc30, 0xfde725,
        ]),
    };

    pub const GREYS: BuiltinColormap = BuiltinColormap {
        name: "Greys",
        stops: Stops::Even(&[
            0xffffff, 0xf0f0f0, 0xd9d9d9, 0xbdbdbd, 0x969696, 0x737373, 0x525252, 0x252525, 0x000000,
        ]),
    };

    pub fn all() -> &'static [BuiltinColormap] {
        BUILTINS
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Look up a built-in by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        BUILTINS.iter().copied().find(|c| c.name == name)
    }

    /// Whether the map is a set of discrete colors rather than a ramp.
    pub fn is_listed(&self) -> bool {
        matches!(self.stops, Stops::Listed(_))
    }

    pub fn color_at(&self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        match self.stops {
            Stops::Anchored(anchors) => {
                for pair in anchors.windows(2) {
                    let (p0, c0) = pair[0];
                    let (p1, c1) = pair[1];
                    if t <= p1 {
                        let frac = if p1 > p0 { (t - p0) / (p1 - p0) } else { 0.0 };
                        return Color::from_rgb(c0).lerp(Color::from_rgb(c1), frac);
                    }
                }
                anchors.last().map_or(Color::BLACK, |(_, c)| Color::from_rgb(*c))
            }
            Stops::Even(colors) => match colors.len() {
                0 => Color::BLACK,
                1 => Color::from_rgb(colors[0]),
                n => {
                    let scaled = t * (n - 1) as f64;
                    let idx = (scaled as usize).min(n - 2);
                    Color::from_rgb(colors[idx]).lerp(Color::from_rgb(colors[idx + 1]), scaled - idx as f64)
                }
            },
            Stops::Listed(colors) => match colors.len() {
                0 => Color::BLACK,
                n => Color::from_rgb(colors[((t * n as f64) as usize).min(n - 1)]),
            },
        }
    }
}

const fn anchored(name: &'static str, anchors: &'static [(f64, u32)]) -> BuiltinColormap {
    BuiltinColormap {
        name,
        stops: Stops::Anchored(anchors),
    }
}

const fn even(name: &'static str, colors: &'static [u32]) -> BuiltinColormap {
    BuiltinColormap {
        name,
        stops: Stops::Even(colors),
    }
}

const fn listed(name: &'static str, colors: &'static [u32]) -> BuiltinColormap {
    BuiltinColormap {
        name,
        stops: Stops::Listed(colors),
    }
}

// Stops follow matplotlib's colormap data, resampled where it is defined per channel.
const BUILTINS: &[BuiltinColormap] = &[
    BuiltinColormap::VIRIDIS,
    even("magma", &[0x000004, 0x1c1044, 0x4f127b, 0x812581, 0xb5367a, 0xe55064, 0xfb8761, 0xfec287, 0xfcfdbf]),
    even("inferno", &[0x000004, 0x1f0c48, 0x550f6d, 0x88226a, 0xba3655, 0xe35933, 0xf98e09, 0xf9cb35, 0xfcffa4]),
    even("plasma", &[0x0d0887, 0x4c02a1, 0x7e03a8, 0xa92395, 0xcc4778, 0xe56b5d, 0xf89441, 0xfdc328, 0xf0f921]),
    even("cividis", &[0x00224e, 0x123570, 0x3b496c, 0x575d6d, 0x707173, 0x8a8678, 0xa59c74, 0xc3b369, 0xfee838]),
    even("twilight", &[0xe2d9e2, 0xa1b4cb, 0x6584bc, 0x5a4aa4, 0x2f1436, 0x7c2c4f, 0xb05a4b, 0xcb9e8d, 0xe2d9e2]),
    anchored("terrain", &[
        (0.0, 0x333399),
        (0.15, 0x0099ff),
        (0.25, 0x00cc66),
        (0.5, 0xffff99),
        (0.75, 0x805c54),
        (1.0, 0xffffff),
    ]),
    BuiltinColormap::GREYS,
    even("Reds", &[0xfff5f0, 0xfee0d2, 0xfcbba1, 0xfc9272, 0xfb6a4a, 0xef3b2c, 0xcb181d, 0xa50f15, 0x67000d]),
    even("Blues", &[0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b]),
    even("Greens", &[0xf7fcf5, 0xe5f5e0, 0xc7e9c0, 0xa1d99b, 0x74c476, 0x41ab5d, 0x238b45, 0x006d2c, 0x00441b]),
    even("Purples", &[0xfcfbfd, 0xefedf5, 0xdadaeb, 0xbcbddc, 0x9e9ac8, 0x807dba, 0x6a51a3, 0x54278f, 0x3f007d]),
    even("PuBu", &[0xfff7fb, 0xece7f2, 0xd0d1e6, 0xa6bddb, 0x74a9cf, 0x3690c0, 0x0570b0, 0x045a8d, 0x023858]),
    even("PuRd", &[0xf7f4f9, 0xe7e1ef, 0xd4b9da, 0xc994c7, 0xdf65b0, 0xe7298a, 0xce1256, 0x980043, 0x67001f]),
    even("BuGn", &[0xf7fcfd, 0xe5f5f9, 0xccece6, 0x99d8c9, 0x66c2a4, 0x41ae76, 0x238b45, 0x006d2c, 0x00441b]),
    even("YlGn", &[0xffffe5, 0xf7fcb9, 0xd9f0a3, 0xaddd8e, 0x78c679, 0x41ab5d, 0x238443, 0x006837, 0x004529]),
    even("YlGnBu", &[0xffffd9, 0xedf8b1, 0xc7e9b4, 0x7fcdbb, 0x41b6c4, 0x1d91c0, 0x225ea8, 0x253494, 0x081d58]),
    even("YlOrBr", &[0xffffe5, 0xfff7bc, 0xfee391, 0xfec44f, 0xfe9929, 0xec7014, 0xcc4c02, 0x993404, 0x662506]),
    even("YlOrRd", &[0xffffcc, 0xffeda0, 0xfed976, 0xfeb24c, 0xfd8d3c, 0xfc4e2a, 0xe31a1c, 0xbd0026, 0x800026]),
    even("PiYG", &[
        0x8e0152, 0xc51b7d, 0xde77ae, 0xf1b6da, 0xfde0ef, 0xf7f7f7, 0xe6f5d0, 0xb8e186, 0x7fbc41, 0x4d9221, 0x276419,
    ]),
    even("PRGn", &[
        0x40004b, 0x762a83, 0x9970ab, 0xc2a5cf, 0xe7d4e8, 0xf7f7f7, 0xd9f0d3, 0xa6dba0, 0x5aae61, 0x1b7837, 0x00441b,
    ]),
    even("Spectral", &[
        0x9e0142, 0xd53e4f, 0xf46d43, 0xfdae61, 0xfee08b, 0xffffbf, 0xe6f598, 0xabdda4, 0x66c2a5, 0x3288bd, 0x5e4fa2,
    ]),
    even("coolwarm", &[0x3b4cc0, 0x8db0fe, 0xdddddd, 0xf49a7b, 0xb40426]),
    even("pink", &[0x1e0000, 0x744a4a, 0xa16868, 0xc38280, 0xd0ab93, 0xddcda5, 0xe9e9b5, 0xf4f4dd, 0xffffff]),
    anchored("bone", &[(0.0, 0x000000), (0.3651, 0x515171), (0.746, 0xa6c6c6), (1.0, 0xffffff)]),
    anchored("hot", &[(0.0, 0x0b0000), (0.3651, 0xff0000), (0.746, 0xffff00), (1.0, 0xffffff)]),
    anchored("afmhot", &[(0.0, 0x000000), (0.25, 0x800000), (0.5, 0xff8000), (0.75, 0xffff80), (1.0, 0xffffff)]),
    anchored("copper", &[(0.0, 0x000000), (0.8, 0xff9f65), (1.0, 0xffc77f)]),
    even("spring", &[0xff00ff, 0xffff00]),
    even("summer", &[0x008066, 0xffff66]),
    even("autumn", &[0xff0000, 0xffff00]),
    even("cool", &[0x00ffff, 0xff00ff]),
    even("Wistia", &[0xe4ff7a, 0xffe81a, 0xffbd00, 0xffa000, 0xfc7f00]),
    anchored("jet", &[
        (0.0, 0x000080),
        (0.11, 0x0000ff),
        (0.125, 0x0000ff),
        (0.34, 0x00dbff),
        (0.35, 0x00e5f7),
        (0.375, 0x15ffe2),
        (0.64, 0xefff08),
        (0.65, 0xf7f600),
        (0.66, 0xffec00),
        (0.89, 0xff1300),
        (0.91, 0xe80000),
        (1.0, 0x800000),
    ]),
    anchored("hsv", &[
        (0.0, 0xff0000),
        (0.1587, 0xffef00),
        (0.1746, 0xf7ff00),
        (0.3333, 0x08ff00),
        (0.3492, 0x00ff10),
        (0.5079, 0x00ffff),
        (0.6667, 0x0010ff),
        (0.6825, 0x0800ff),
        (0.8413, 0xf700ff),
        (0.8571, 0xff00ef),
        (1.0, 0xff0018),
    ]),
    listed("Dark2", &[0x1b9e77, 0xd95f02, 0x7570b3, 0xe7298a, 0x66a61e, 0xe6ab02, 0xa6761d, 0x666666]),
    listed("Pastel1", &[0xfbb4ae, 0xb3cde3, 0xccebc5, 0xdecbe4, 0xfed9a6, 0xffffcc, 0xe5d8bd, 0xfddaec, 0xf2f2f2]),
    listed("Pastel2", &[0xb3e2cd, 0xfdcdac, 0xcbd5e8, 0xf4cae4, 0xe6f5c9, 0xfff2ae, 0xf1e2cc, 0xcccccc]),
    listed("tab20c", &[
        0x3182bd, 0x6baed6, 0x9ecae1, 0xc6dbef, 0xe6550d, 0xfd8d3c, 0xfdae6b, 0xfdd0a2, 0x31a354, 0x74c476,
        0xa1d99b, 0xc7e9c0, 0x756bb1, 0x9e9ac8, 0xbcbddc, 0xdadaeb, 0x636363, 0x969696, 0xbdbdbd, 0xd9d9d9,
    ]),
];

/// A resolved colormap ready for lookup.
#[derive(Clone, Debug, PartialEq)]
pub enum Colormap {
    Builtin(BuiltinColormap),
    /// Discrete bins, one per listed color
    Specific(Vec<Color>),
    /// Linear interpolation through the listed colors
    Gradient(Vec<Color>),
}

impl Colormap {
    /// Color for a normalized position `t` in `[0, 1]`.
    pub fn color_at(&self, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        match self {
            Colormap::Builtin(builtin) => builtin.color_at(t),
            Colormap::Specific(colors) => match colors.len() {
                0 => Color::BLACK,
                n => colors[((t * n as f64) as usize).min(n - 1)],
            },
            Colormap::Gradient(colors) => match colors.len() {
                0 => Color::BLACK,
                1 => colors[0],
                n => {
                    let scaled = t * (n - 1) as f64;
                    let idx = (scaled as usize).min(n - 2);
                    colors[idx].lerp(colors[idx + 1], scaled - idx as f64)
                }
            },
        }
    }

    /// Color for a heightmap cell value.
    pub fn cell_color(&self, value: u8) -> Color {
        self.color_at(value.min(MAX_CELL) as f64 / MAX_CELL as f64)
    }
}
