/// Tab group colors
use serde::{Deserialize, Serialize};
use std::fmt;

/// The colors a tab group can carry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ColorTag {
    Grey,
    Blue,
    Red,
    Yellow,
    Green,
    Pink,
    Purple,
    Cyan,
    Orange,
}

impl ColorTag {
    pub const ALL: [ColorTag; 9] = [
        ColorTag::Grey,
        ColorTag::Blue,
        ColorTag::Red,
        ColorTag::Yellow,
        ColorTag::Green,
        ColorTag::Pink,
        ColorTag::Purple,
        ColorTag::Cyan,
        ColorTag::Orange,
    ];

    /// Parse a stored color name. Unknown names give `None`.
    pub fn from_name(name: &str) -> Option<ColorTag> {
        ColorTag::ALL.into_iter().find(|color| color.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorTag::Grey => "grey",
            ColorTag::Blue => "blue",
            ColorTag::Red => "red",
            ColorTag::Yellow => "yellow",
            ColorTag::Green => "green",
            ColorTag::Pink => "pink",
            ColorTag::Purple => "purple",
            ColorTag::Cyan => "cyan",
            ColorTag::Orange => "orange",
        }
    }

    /// CSS color used for previews in the options page
    pub fn swatch(self) -> &'static str {
        match self {
            ColorTag::Grey => "#9ca3af",
            ColorTag::Blue => "#3b82f6",
            ColorTag::Red => "#ef4444",
            ColorTag::Yellow => "#f59e0b",
            ColorTag::Green => "#10b981",
            ColorTag::Pink => "#ec4899",
            ColorTag::Purple => "#8b5cf6",
            ColorTag::Cyan => "#06b6d4",
            ColorTag::Orange => "#f97316",
        }
    }

    /// Pick a palette color at random
    pub fn random() -> ColorTag {
        let mut byte = [0u8; 1];
        match getrandom::getrandom(&mut byte) {
            Ok(()) => ColorTag::ALL[byte[0] as usize % ColorTag::ALL.len()],
            Err(e) => {
                log::warn!("No random source available, using grey: {}", e);
                ColorTag::Grey
            }
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Swatch for a stored color name; unknown names show as grey
///
/// Only the preview falls back. The stored name is left as the user wrote it.
pub fn swatch_for_name(name: &str) -> &'static str {
    ColorTag::from_name(name).unwrap_or(ColorTag::Grey).swatch()
}
