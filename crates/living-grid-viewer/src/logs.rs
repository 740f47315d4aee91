//! Log line classification and the category style table.
//!
//! The simulation tags each log line with an emoji marker. Classification
//! scans a fixed, ordered marker table and the first marker found wins, so
//! a line mentioning both a death and a harvest is always a death.
//!
//! | Order | Category | Marker |
//! |---|---|---|
//! | 1 | [`LogCategory::Death`] | `💀` |
//! | 2 | [`LogCategory::Escape`] | `🚀` |
//! | 3 | [`LogCategory::Harvest`] | `🎉` |
//! | 4 | [`LogCategory::Craft`] | `🔨` |
//! | 5 | [`LogCategory::Eat`] | `🍞` |
//! | 6 | [`LogCategory::Warn`] | `⚠` |
//! | 7 | [`LogCategory::Move`] | `🏃` |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display category of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    /// An agent died.
    Death,
    /// An agent escaped through an exit.
    Escape,
    /// An agent harvested a resource.
    Harvest,
    /// An agent crafted an item.
    Craft,
    /// An agent ate to regain health.
    Eat,
    /// A rejected or failed action.
    Warn,
    /// An agent moved.
    Move,
    /// Anything without a known marker.
    Default,
}

impl LogCategory {
    /// Every category, in classification order with the fallback last.
    pub const ALL: [Self; 8] = [
        Self::Death,
        Self::Escape,
        Self::Harvest,
        Self::Craft,
        Self::Eat,
        Self::Warn,
        Self::Move,
        Self::Default,
    ];

    /// Short lowercase tag, matching the settings file keys.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Death => "death",
            Self::Escape => "escape",
            Self::Harvest => "harvest",
            Self::Craft => "craft",
            Self::Eat => "eat",
            Self::Warn => "warn",
            Self::Move => "move",
            Self::Default => "default",
        }
    }
}

/// Marker table, scanned in order.
///
/// The warning sign is matched without its variation selector so both
/// `⚠` and `⚠️` hit.
const MARKERS: [(&str, LogCategory); 7] = [
    ("\u{1f480}", LogCategory::Death),
    ("\u{1f680}", LogCategory::Escape),
    ("\u{1f389}", LogCategory::Harvest),
    ("\u{1f528}", LogCategory::Craft),
    ("\u{1f35e}", LogCategory::Eat),
    ("\u{26a0}", LogCategory::Warn),
    ("\u{1f3c3}", LogCategory::Move),
];

/// Map a log line to its category. First marker in table order wins.
pub fn classify(line: &str) -> LogCategory {
    MARKERS
        .iter()
        .find(|(marker, _)| line.contains(*marker))
        .map_or(LogCategory::Default, |&(_, category)| category)
}

// ---------------------------------------------------------------------------
// Styles
// ---------------------------------------------------------------------------

/// Font weight of a rendered log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontWeight {
    /// Regular text.
    #[default]
    Normal,
    /// Emphasized text.
    Bold,
}

/// How a log category is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStyle {
    /// CSS-style hex color, e.g. `#ff4444`.
    pub color: String,
    /// Font weight.
    pub weight: FontWeight,
}

impl LogStyle {
    fn new(color: &str, weight: FontWeight) -> Self {
        Self {
            color: color.to_owned(),
            weight,
        }
    }
}

impl Default for LogStyle {
    fn default() -> Self {
        Self::new("#cccccc", FontWeight::Normal)
    }
}

/// Partial style from the settings file. Missing fields keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogStyleOverride {
    /// Replacement color.
    #[serde(default)]
    pub color: Option<String>,
    /// Replacement weight.
    #[serde(default)]
    pub weight: Option<FontWeight>,
}

/// Category to style lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPalette {
    styles: BTreeMap<LogCategory, LogStyle>,
    fallback: LogStyle,
}

impl Default for LogPalette {
    fn default() -> Self {
        let styles = BTreeMap::from([
            (LogCategory::Harvest, LogStyle::new("#ffd700", FontWeight::Normal)),
            (LogCategory::Death, LogStyle::new("#ff4444", FontWeight::Normal)),
            (LogCategory::Craft, LogStyle::new("#00bfff", FontWeight::Normal)),
            (LogCategory::Escape, LogStyle::new("#00ff00", FontWeight::Bold)),
            (LogCategory::Eat, LogStyle::new("#ffcc99", FontWeight::Normal)),
            (LogCategory::Warn, LogStyle::new("#ff8800", FontWeight::Normal)),
            (LogCategory::Move, LogStyle::new("#808080", FontWeight::Normal)),
            (LogCategory::Default, LogStyle::default()),
        ]);
        Self {
            styles,
            fallback: LogStyle::default(),
        }
    }
}

impl LogPalette {
    /// Default table with per-category overrides applied on top.
    pub fn with_overrides(overrides: &BTreeMap<LogCategory, LogStyleOverride>) -> Self {
        let mut palette = Self::default();
        for (category, patch) in overrides {
            let style = palette.styles.entry(*category).or_default();
            if let Some(color) = &patch.color {
                style.color.clone_from(color);
            }
            if let Some(weight) = patch.weight {
                style.weight = weight;
            }
        }
        palette
    }

    /// Style for a category.
    pub fn style(&self, category: LogCategory) -> &LogStyle {
        self.styles.get(&category).unwrap_or(&self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_marker_maps_to_its_category() {
        assert_eq!(classify("🎉 Alice harvested Wheat"), LogCategory::Harvest);
        assert_eq!(classify("💀 Bob starved."), LogCategory::Death);
        assert_eq!(classify("🔨 Carol crafted an Axe"), LogCategory::Craft);
        assert_eq!(classify("🚀🚀🚀 Dave escaped!"), LogCategory::Escape);
        assert_eq!(classify("🍞 Erin ate (HP=55)"), LogCategory::Eat);
        assert_eq!(classify("⚠️ Frank hit a wall"), LogCategory::Warn);
        assert_eq!(classify("🏃 Gina moved RIGHT"), LogCategory::Move);
    }

    #[test]
    fn unmarked_lines_fall_back_to_default() {
        assert_eq!(classify("----- new round -----"), LogCategory::Default);
        assert_eq!(classify(""), LogCategory::Default);
    }

    #[test]
    fn death_beats_every_other_marker() {
        assert_eq!(classify("🎉🔨🏃 💀 died armed"), LogCategory::Death);
        assert_eq!(classify("🚀 tried to escape but 💀"), LogCategory::Death);
    }

    #[test]
    fn warning_without_variation_selector_still_matches() {
        assert_eq!(classify("\u{26a0} blocked"), LogCategory::Warn);
    }

    #[test]
    fn classification_is_deterministic() {
        let line = "🍞 Hank ate, then 🏃 moved";
        let first = classify(line);
        assert!((0..10).all(|_| classify(line) == first));
        assert_eq!(first, LogCategory::Eat);
    }

    #[test]
    fn default_palette_covers_every_category() {
        let palette = LogPalette::default();
        assert_eq!(palette.style(LogCategory::Death).color, "#ff4444");
        assert_eq!(palette.style(LogCategory::Escape).weight, FontWeight::Bold);
        assert_eq!(palette.style(LogCategory::Default).color, "#cccccc");
        for category in LogCategory::ALL {
            assert!(palette.style(category).color.starts_with('#'));
        }
    }

    #[test]
    fn overrides_patch_only_given_fields() {
        let overrides = BTreeMap::from([(
            LogCategory::Move,
            LogStyleOverride {
                color: None,
                weight: Some(FontWeight::Bold),
            },
        )]);
        let palette = LogPalette::with_overrides(&overrides);
        let style = palette.style(LogCategory::Move);
        assert_eq!(style.color, "#808080");
        assert_eq!(style.weight, FontWeight::Bold);
    }
}
