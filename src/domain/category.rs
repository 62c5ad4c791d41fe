//! Habit categories
//!
//! In memory a category is a structured record. Older rows pack it into a
//! single text field such as `"📝 Productivity|color:3"` or
//! `"💪 Workout|rgb:120,200,90"`; [`Category::parse_legacy`] and
//! [`Category::to_legacy`] convert at the store boundary.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Emoji used when a category string has none
pub const DEFAULT_CATEGORY_EMOJI: &str = "📋";

/// Named pastel colours a category can reference by index
pub static PASTEL_PALETTE: &[&str] = &[
    // Purples & violets
    "Lavender", "Lilac", "Periwinkle", "Lavender Mist", "Orchid", "Plum",
    // Pinks & roses
    "Rose", "Blush", "Dusty Rose", "Peony", "Cherry Blossom",
    // Blues & cyans
    "Sky", "Ocean", "Aqua", "Azure", "Powder Blue", "Baby Blue",
    // Greens & teals
    "Sage", "Mint", "Forest", "Seafoam", "Meadow", "Jade", "Eucalyptus",
    // Yellows & oranges
    "Butter", "Peach", "Honey", "Sunset", "Coral", "Apricot", "Cream", "Lemon",
    // Reds
    "Salmon", "Terracotta", "Strawberry",
    // Neutrals
    "Sand", "Beige", "Taupe", "Ivory",
    // Combinations
    "Tropical", "Sunrise", "Ocean Breeze", "Spring", "Autumn", "Winter", "Tulip",
    "Lavender Field", "Cotton Candy", "Iris", "Lilac Dream", "Mint Chip", "Peach Melba",
    "Buttercup",
    // Ultra light
    "Whisper Pink", "Whisper Blue", "Whisper Green", "Whisper Purple", "Whisper Yellow",
    "Whisper Peach", "Whisper Mint", "Whisper Lavender",
    // Soft pastels
    "Soft Sky", "Pale Blue", "Light Cyan", "Cloud Blue", "Ice Blue",
    "Soft Pink", "Pale Rose", "Light Blush", "Powder Pink", "Baby Pink",
    "Soft Purple", "Pale Lavender", "Light Lilac", "Misty Purple", "Dusty Lavender",
    "Soft Green", "Pale Mint", "Light Sage", "Pale Lime", "Soft Emerald",
    "Soft Yellow", "Pale Peach", "Light Honey", "Soft Apricot", "Pale Butter",
    "Soft Gray", "Pale Beige", "Light Taupe", "Soft Ivory", "Pale Cream",
    "Soft Sunrise", "Pale Sunset", "Light Ocean", "Soft Meadow", "Pale Spring",
    "Light Dream", "Soft Petal", "Pale Mist",
];

static LEADING_EMOJI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[\p{Extended_Pictographic}\p{Regional_Indicator}\p{Emoji_Modifier}\x{200D}\x{FE0F}\x{20E3}]+",
    )
    .expect("valid emoji regex")
});

static PALETTE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|color:(\d+)$").expect("valid palette regex"));

static RGB_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\|rgb:(\d+),(\d+),(\d+)$").expect("valid rgb regex"));

/// Colour reference of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CategoryColor {
    /// Index into [`PASTEL_PALETTE`]
    Palette { index: usize },
    /// Custom colour
    Rgb { r: u8, g: u8, b: u8 },
}

/// Structured habit category
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub emoji: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<CategoryColor>,
}

impl Category {
    pub fn new(emoji: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            emoji: emoji.into(),
            name: name.into(),
            color: None,
        }
    }

    /// Attach a palette colour. Out-of-range indexes leave the colour unset.
    pub fn with_palette(mut self, index: usize) -> Self {
        self.color = (index < PASTEL_PALETTE.len()).then_some(CategoryColor::Palette { index });
        self
    }

    pub fn with_rgb(mut self, r: u8, g: u8, b: u8) -> Self {
        self.color = Some(CategoryColor::Rgb { r, g, b });
        self
    }

    /// Parse the packed single-field encoding
    pub fn parse_legacy(raw: &str) -> Self {
        let (emoji, rest) = match LEADING_EMOJI.find(raw) {
            Some(m) => (m.as_str().to_string(), &raw[m.end()..]),
            None => (DEFAULT_CATEGORY_EMOJI.to_string(), raw),
        };

        let mut color = None;
        let mut name = rest.trim();

        if let Some(caps) = RGB_SUFFIX.captures(name) {
            let channel = |i: usize| {
                caps.get(i)
                    .and_then(|m| m.as_str().parse::<u32>().ok())
                    .map(|v| v.min(255) as u8)
                    .unwrap_or(255)
            };
            color = Some(CategoryColor::Rgb {
                r: channel(1),
                g: channel(2),
                b: channel(3),
            });
            name = name[..caps.get(0).map_or(name.len(), |m| m.start())].trim();
        } else if let Some(caps) = PALETTE_SUFFIX.captures(name) {
            color = caps
                .get(1)
                .and_then(|m| m.as_str().parse::<usize>().ok())
                .filter(|index| *index < PASTEL_PALETTE.len())
                .map(|index| CategoryColor::Palette { index });
            name = name[..caps.get(0).map_or(name.len(), |m| m.start())].trim();
        }

        let name = if name.is_empty() {
            raw.to_string()
        } else {
            name.to_string()
        };

        Self { emoji, name, color }
    }

    /// Emit the packed single-field encoding
    pub fn to_legacy(&self) -> String {
        match self.color {
            Some(CategoryColor::Rgb { r, g, b }) => {
                format!("{} {}|rgb:{},{},{}", self.emoji, self.name, r, g, b)
            }
            Some(CategoryColor::Palette { index }) if index < PASTEL_PALETTE.len() => {
                format!("{} {}|color:{}", self.emoji, self.name, index)
            }
            _ => format!("{} {}", self.emoji, self.name),
        }
    }

    /// Palette slot used for display.
    ///
    /// Categories without an explicit colour get a stable slot derived from
    /// their name. Custom RGB colours have no slot.
    pub fn palette_index(&self) -> Option<usize> {
        match self.color {
            Some(CategoryColor::Palette { index }) => Some(index),
            Some(CategoryColor::Rgb { .. }) => None,
            None => {
                let sum: u64 = self.name.encode_utf16().map(u64::from).sum();
                Some((sum % PASTEL_PALETTE.len() as u64) as usize)
            }
        }
    }

    pub fn palette_name(&self) -> Option<&'static str> {
        self.palette_index().and_then(|i| PASTEL_PALETTE.get(i).copied())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.emoji, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_size() {
        assert_eq!(PASTEL_PALETTE.len(), 99);
    }

    #[test]
    fn test_parse_palette_suffix() {
        let cat = Category::parse_legacy("📝 Productivity|color:3");
        assert_eq!(cat.emoji, "📝");
        assert_eq!(cat.name, "Productivity");
        assert_eq!(cat.color, Some(CategoryColor::Palette { index: 3 }));
        assert_eq!(cat.palette_name(), Some("Lavender Mist"));
    }

    #[test]
    fn test_parse_rgb_suffix_saturates() {
        let cat = Category::parse_legacy("💪 Workout|rgb:120,300,90");
        assert_eq!(cat.name, "Workout");
        assert_eq!(cat.color, Some(CategoryColor::Rgb { r: 120, g: 255, b: 90 }));
        assert_eq!(cat.palette_index(), None);
    }

    #[test]
    fn test_parse_keeps_variation_selector_in_emoji() {
        let cat = Category::parse_legacy("🏋️ Fitness Lifestyle");
        assert_eq!(cat.emoji, "🏋️");
        assert_eq!(cat.name, "Fitness Lifestyle");
        assert_eq!(cat.color, None);
    }

    #[test]
    fn test_parse_without_emoji_uses_default() {
        let cat = Category::parse_legacy("Reading");
        assert_eq!(cat.emoji, DEFAULT_CATEGORY_EMOJI);
        assert_eq!(cat.name, "Reading");
    }

    #[test]
    fn test_out_of_range_palette_index_is_dropped() {
        let cat = Category::parse_legacy("🧠 Learning|color:500");
        assert_eq!(cat.name, "Learning");
        assert_eq!(cat.color, None);
        assert!(cat.palette_index().is_some());
    }

    #[test]
    fn test_legacy_encoding_reparses_to_same_record() {
        let cat = Category::new("👥", "Social").with_palette(12);
        assert_eq!(cat.to_legacy(), "👥 Social|color:12");
        assert_eq!(Category::parse_legacy(&cat.to_legacy()), cat);

        let plain = Category::new("📱", "Digital");
        assert_eq!(plain.to_legacy(), "📱 Digital");
        assert_eq!(Category::parse_legacy(&plain.to_legacy()), plain);
    }

    #[test]
    fn test_hash_fallback_is_stable() {
        let a = Category::parse_legacy("🌟 Self-Care");
        let b = Category::new("✨", "Self-Care");
        assert_eq!(a.palette_index(), b.palette_index());
    }
}
