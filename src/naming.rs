//! Canonical generation names.
//!
//! A name joins four fields with `_`:
//!
//! ```text
//! <colormap>.<cg|cs|m>_<heightmap>[.i][.n]_<glyphs>[.i][.a]_<seed>
//! ```
//!
//! - `.cg` gradient custom colormap, `.cs` specific custom colormap, `.m` built-in
//! - heightmap `.i` inverted, `.n` noise-blended
//! - glyphs `.i` inverted colors, `.a` semi-transparent
//!
//! The name is also the default output file stem. Parsing only works when the
//! asset names themselves contain no `_` and do not end in a marker suffix.

use std::fmt;

/// Field separator.
pub const SEPARATOR: char = '_';

/// How a colormap was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColormapKind {
    /// A named built-in ramp
    Builtin,
    /// A user color list used as discrete bins
    Specific,
    /// A user color list interpolated as a gradient
    Gradient,
}

impl ColormapKind {
    pub fn suffix(self) -> &'static str {
        match self {
            ColormapKind::Builtin => ".m",
            ColormapKind::Specific => ".cs",
            ColormapKind::Gradient => ".cg",
        }
    }

    pub fn is_custom(self) -> bool {
        !matches!(self, ColormapKind::Builtin)
    }
}

/// Every resolved choice that goes into a canonical name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    pub colormap: String,
    pub colormap_kind: ColormapKind,
    pub heightmap: String,
    pub inverted: bool,
    pub noise: bool,
    pub glyph_table: String,
    pub glyphs_inverted: bool,
    pub glyph_alpha: bool,
    pub seed: u64,
}

impl CanonicalName {
    /// Split a canonical name back into its fields.
    pub fn parse(name: &str) -> Option<Self> {
        let fields: Vec<&str> = name.split(SEPARATOR).collect();
        let [colormap, heightmap, glyphs, seed] = fields.as_slice() else {
            return None;
        };

        let (colormap, colormap_kind) = [ColormapKind::Gradient, ColormapKind::Specific, ColormapKind::Builtin]
            .into_iter()
            .find_map(|kind| colormap.strip_suffix(kind.suffix()).map(|base| (base, kind)))?;

        let (heightmap, noise) = strip_flag(heightmap, ".n");
        let (heightmap, inverted) = strip_flag(heightmap, ".i");
        let (glyph_table, glyph_alpha) = strip_flag(glyphs, ".a");
        let (glyph_table, glyphs_inverted) = strip_flag(glyph_table, ".i");

        Some(Self {
            colormap: colormap.to_string(),
            colormap_kind,
            heightmap: heightmap.to_string(),
            inverted,
            noise,
            glyph_table: glyph_table.to_string(),
            glyphs_inverted,
            glyph_alpha,
            seed: seed.parse().ok()?,
        })
    }
}

fn strip_flag<'a>(field: &'a str, suffix: &str) -> (&'a str, bool) {
    match field.strip_suffix(suffix) {
        Some(base) => (base, true),
        None => (field, false),
    }
}

fn flag(on: bool, suffix: &'static str) -> &'static str {
    if on {
        suffix
    } else {
        ""
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{sep}{}{}{}{sep}{}{}{}{sep}{}",
            self.colormap,
            self.colormap_kind.suffix(),
            self.heightmap,
            flag(self.inverted, ".i"),
            flag(self.noise, ".n"),
            self.glyph_table,
            flag(self.glyphs_inverted, ".i"),
            flag(self.glyph_alpha, ".a"),
            self.seed,
            sep = SEPARATOR,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CanonicalName {
        CanonicalName {
            colormap: "viridis".into(),
            colormap_kind: ColormapKind::Builtin,
            heightmap: "hills".into(),
            inverted: false,
            noise: false,
            glyph_table: "leaves".into(),
            glyphs_inverted: false,
            glyph_alpha: false,
            seed: 7,
        }
    }

    #[test]
    fn test_plain_name() {
        assert_eq!(sample().to_string(), "viridis.m_hills_leaves_7");
    }

    #[test]
    fn test_all_markers() {
        let name = CanonicalName {
            colormap: "dusk".into(),
            colormap_kind: ColormapKind::Gradient,
            inverted: true,
            noise: true,
            glyphs_inverted: true,
            glyph_alpha: true,
            ..sample()
        };
        assert_eq!(name.to_string(), "dusk.cg_hills.i.n_leaves.i.a_7");
        assert_eq!(CanonicalName::parse(&name.to_string()), Some(name));
    }

    #[test]
    fn test_single_markers() {
        let name = CanonicalName {
            colormap_kind: ColormapKind::Specific,
            noise: true,
            glyph_alpha: true,
            ..sample()
        };
        assert_eq!(name.to_string(), "viridis.cs_hills.n_leaves.a_7");
        assert_eq!(CanonicalName::parse("viridis.cs_hills.n_leaves.a_7"), Some(name));
    }

    #[test]
    fn test_stable() {
        assert_eq!(sample().to_string(), sample().to_string());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(CanonicalName::parse("viridis_hills_leaves_7"), None);
        assert_eq!(CanonicalName::parse("viridis.m_hills_leaves"), None);
        assert_eq!(CanonicalName::parse("viridis.m_hills_leaves_seven"), None);
    }

    #[test]
    fn test_kind_flags() {
        assert!(!ColormapKind::Builtin.is_custom());
        assert!(ColormapKind::Specific.is_custom());
        assert!(ColormapKind::Gradient.is_custom());
    }
}
