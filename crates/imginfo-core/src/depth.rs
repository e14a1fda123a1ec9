//! Color depth resolution from pixel encoding mode.

use std::fmt;

use crate::probe::ColorMode;

/// Bits per pixel for a color mode, or the raw mode when it has no fixed
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorDepth {
    Bits(u8),
    Unknown(String),
}

impl ColorDepth {
    /// Bits per pixel, if known.
    pub fn bits(&self) -> Option<u8> {
        match self {
            ColorDepth::Bits(bits) => Some(*bits),
            ColorDepth::Unknown(_) => None,
        }
    }
}

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorDepth::Bits(bits) => write!(f, "{}", bits),
            ColorDepth::Unknown(mode) => write!(f, "unknown({})", mode),
        }
    }
}

/// Resolve the bits per pixel of a color mode. Never fails.
pub fn color_depth(mode: &ColorMode) -> ColorDepth {
    let bits = match mode {
        ColorMode::Bilevel => 1,
        ColorMode::Gray | ColorMode::Palette => 8,
        ColorMode::Rgb | ColorMode::YCbCr | ColorMode::Lab | ColorMode::Hsv => 24,
        ColorMode::Rgba | ColorMode::Cmyk | ColorMode::Int32 | ColorMode::Float32 => 32,
        ColorMode::Other(tag) => return ColorDepth::Unknown(tag.clone()),
    };
    ColorDepth::Bits(bits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_table() {
        let table = [
            ("1", 1),
            ("L", 8),
            ("P", 8),
            ("RGB", 24),
            ("RGBA", 32),
            ("CMYK", 32),
            ("YCbCr", 24),
            ("LAB", 24),
            ("HSV", 24),
            ("I", 32),
            ("F", 32),
        ];
        for (tag, bits) in table {
            assert_eq!(
                color_depth(&ColorMode::from_tag(tag)),
                ColorDepth::Bits(bits),
                "mode {}",
                tag
            );
        }
    }

    #[test]
    fn test_unknown_mode_fallback() {
        let depth = color_depth(&ColorMode::from_tag("LA"));
        assert_eq!(depth, ColorDepth::Unknown("LA".into()));
        assert_eq!(depth.to_string(), "unknown(LA)");
        assert_eq!(depth.bits(), None);
    }

    #[test]
    fn test_display_bits() {
        assert_eq!(ColorDepth::Bits(24).to_string(), "24");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const KNOWN: [&str; 11] = ["1", "L", "P", "RGB", "RGBA", "CMYK", "YCbCr", "LAB", "HSV", "I", "F"];

    proptest! {
        /// Property: any mode outside the table falls back to a label that
        /// embeds the raw mode string.
        #[test]
        fn prop_unmapped_mode_embeds_tag(tag in "[A-Za-z0-9;]{1,8}") {
            prop_assume!(!KNOWN.contains(&tag.as_str()));
            let depth = color_depth(&ColorMode::from_tag(&tag));
            prop_assert_eq!(depth.bits(), None);
            prop_assert!(depth.to_string().contains(&tag));
        }
    }
}
