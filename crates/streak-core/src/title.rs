//! Chat title codec.
//!
//! A tracked chat's title is `<base> <streak><glyph>`, e.g. `Night Owls 12🔥`.
//! The codec strips a previously applied suffix back to the base title and
//! composes a new title from a base, a streak count and a status glyph.
//! `strip_suffix(compose(b, n, g)) == b` for every trimmed base `b` that does
//! not itself end in a suffix.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{config::GlyphConfig, error::StreakError};

/// Status indicator rendered after the streak count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glyph {
    /// No streak (or streak lost). With a zero count nothing is rendered.
    Inactive,
    /// The day is armed but nobody has spoken yet.
    Waiting,
    /// Today already counted.
    Active,
}

/// Strips and composes streak suffixes using a fixed glyph set.
#[derive(Debug, Clone)]
pub struct TitleCodec {
    active: String,
    waiting: String,
    inactive: String,
    suffix: Regex,
}

impl TitleCodec {
    /// Build a codec for the configured glyphs.
    ///
    /// Glyphs must be non-empty, distinct, and free of digits and whitespace,
    /// otherwise the suffix would be ambiguous.
    pub fn new(glyphs: &GlyphConfig) -> Result<Self, StreakError> {
        let set = [&glyphs.active, &glyphs.waiting, &glyphs.inactive];
        for glyph in set {
            if glyph.is_empty() {
                return Err(StreakError::Config("glyphs must not be empty".into()));
            }
            if glyph
                .chars()
                .any(|c| c.is_ascii_digit() || c.is_whitespace())
            {
                return Err(StreakError::Config(format!(
                    "glyph '{glyph}' must not contain digits or whitespace"
                )));
            }
        }
        if glyphs.active == glyphs.waiting
            || glyphs.active == glyphs.inactive
            || glyphs.waiting == glyphs.inactive
        {
            return Err(StreakError::Config("glyphs must be distinct".into()));
        }

        // Longest glyph first so a glyph that is a suffix of another never wins.
        let mut alternatives: Vec<&String> = set.to_vec();
        alternatives.sort_by_key(|g| std::cmp::Reverse(g.len()));
        let alternatives = alternatives
            .into_iter()
            .map(|g| regex::escape(g))
            .collect::<Vec<_>>()
            .join("|");
        let suffix = Regex::new(&format!(r"\s*[0-9]+\s*(?:{alternatives})\s*$"))
            .map_err(|e| StreakError::Config(format!("invalid glyph pattern: {e}")))?;

        Ok(Self {
            active: glyphs.active.clone(),
            waiting: glyphs.waiting.clone(),
            inactive: glyphs.inactive.clone(),
            suffix,
        })
    }

    /// The configured text for a glyph.
    pub fn glyph(&self, glyph: Glyph) -> &str {
        match glyph {
            Glyph::Active => &self.active,
            Glyph::Waiting => &self.waiting,
            Glyph::Inactive => &self.inactive,
        }
    }

    /// Remove every trailing streak suffix and trailing whitespace.
    ///
    /// Stacked suffixes (`Team 3🔥 4⏳`) are all removed, which keeps the
    /// operation idempotent on arbitrary input.
    pub fn strip_suffix(&self, title: &str) -> String {
        let mut current = title.trim_end();
        while let Some(m) = self.suffix.find(current) {
            current = current[..m.start()].trim_end();
        }
        current.to_string()
    }

    /// Compose a display title. A zero streak with the inactive glyph renders
    /// the bare base title. Trailing whitespace on `base` is dropped.
    pub fn compose(&self, base: &str, streak: u32, glyph: Glyph) -> String {
        let base = base.trim_end();
        if streak == 0 && glyph == Glyph::Inactive {
            return base.to_string();
        }
        format!("{base} {streak}{}", self.glyph(glyph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TitleCodec {
        TitleCodec::new(&GlyphConfig::default()).unwrap()
    }

    #[test]
    fn test_compose_active() {
        assert_eq!(codec().compose("Night Owls", 12, Glyph::Active), "Night Owls 12🔥");
    }

    #[test]
    fn test_compose_zero_inactive_is_bare_base() {
        assert_eq!(codec().compose("Night Owls", 0, Glyph::Inactive), "Night Owls");
    }

    #[test]
    fn test_compose_trims_base_trailing_whitespace() {
        let c = codec();
        assert_eq!(c.compose("a ", 3, Glyph::Waiting), "a 3\u{23f3}");
        assert_eq!(c.compose("a  ", 0, Glyph::Inactive), "a");
        for glyph in [Glyph::Active, Glyph::Waiting, Glyph::Inactive] {
            assert_eq!(c.strip_suffix(&c.compose("a ", 7, glyph)), "a");
        }
    }

    #[test]
    fn test_compose_zero_waiting_still_renders() {
        assert_eq!(codec().compose("Club", 0, Glyph::Waiting), "Club 0⏳");
    }

    #[test]
    fn test_strip_each_glyph() {
        let c = codec();
        assert_eq!(c.strip_suffix("Club 4🔥"), "Club");
        assert_eq!(c.strip_suffix("Club 4⏳"), "Club");
        assert_eq!(c.strip_suffix("Club 4🧊"), "Club");
        assert_eq!(c.strip_suffix("Club4🔥"), "Club");
        assert_eq!(c.strip_suffix("Club 4 🔥  "), "Club");
    }

    #[test]
    fn test_strip_without_suffix_trims_only() {
        let c = codec();
        assert_eq!(c.strip_suffix("Team 5"), "Team 5");
        assert_eq!(c.strip_suffix("Team 🔥"), "Team 🔥");
        assert_eq!(c.strip_suffix("Plain title   "), "Plain title");
        assert_eq!(c.strip_suffix(""), "");
    }

    #[test]
    fn test_strip_is_idempotent() {
        let c = codec();
        for title in [
            "Club 3🔥 4⏳",
            "A 1 2🔥",
            "🔥 7",
            "  spaced  ",
            "Fire🔥 10🔥",
            "x 99999999999999999999🧊",
        ] {
            let once = c.strip_suffix(title);
            assert_eq!(c.strip_suffix(&once), once, "not idempotent for {title:?}");
        }
    }

    #[test]
    fn test_round_trip_property() {
        let c = codec();
        let bases = [
            "",
            "Night Owls",
            "Team 5",
            "Fire🔥",
            "Chat ⏳ waiting room",
            "Клуб любителей кофе",
            "digits 123",
            "x",
        ];
        for base in bases {
            for n in [0u32, 1, 2, 9, 10, 365, u32::MAX] {
                for glyph in [Glyph::Active, Glyph::Waiting, Glyph::Inactive] {
                    let title = c.compose(base, n, glyph);
                    assert_eq!(
                        c.strip_suffix(&title),
                        base,
                        "round trip failed for {base:?} {n} {glyph:?} -> {title:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_custom_glyphs_are_escaped() {
        let glyphs = GlyphConfig {
            active: "*".into(),
            waiting: "?".into(),
            inactive: "(x)".into(),
        };
        let c = TitleCodec::new(&glyphs).unwrap();
        assert_eq!(c.compose("Base", 3, Glyph::Waiting), "Base 3?");
        assert_eq!(c.strip_suffix("Base 3?"), "Base");
        assert_eq!(c.strip_suffix("Base 3(x)"), "Base");
        assert_eq!(c.strip_suffix("Base 3x"), "Base 3x");
    }

    #[test]
    fn test_rejects_ambiguous_glyphs() {
        let dup = GlyphConfig {
            active: "*".into(),
            waiting: "*".into(),
            inactive: "-".into(),
        };
        assert!(TitleCodec::new(&dup).is_err());

        let digit = GlyphConfig {
            active: "1".into(),
            ..Default::default()
        };
        assert!(TitleCodec::new(&digit).is_err());

        let empty = GlyphConfig {
            inactive: String::new(),
            ..Default::default()
        };
        assert!(TitleCodec::new(&empty).is_err());
    }
}
