//! Scale table and parsed key labels.
//!
//! Table order matters: it is the tie-break order for key inference and
//! scale suggestions, so "Major" comes first.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::pitch::{parse_pitch_class, pitch_class_name};

/// Scale name → ascending intervals from the tonic (5 to 8 degrees).
pub const SCALES: &[(&str, &[u8])] = &[
    ("Major", &[0, 2, 4, 5, 7, 9, 11]),
    ("Natural Minor", &[0, 2, 3, 5, 7, 8, 10]),
    ("Harmonic Minor", &[0, 2, 3, 5, 7, 8, 11]),
    ("Melodic Minor", &[0, 2, 3, 5, 7, 9, 11]),
    ("Dorian", &[0, 2, 3, 5, 7, 9, 10]),
    ("Phrygian", &[0, 1, 3, 5, 7, 8, 10]),
    ("Lydian", &[0, 2, 4, 6, 7, 9, 11]),
    ("Mixolydian", &[0, 2, 4, 5, 7, 9, 10]),
    ("Locrian", &[0, 1, 3, 5, 6, 8, 10]),
    ("Major Pentatonic", &[0, 2, 4, 7, 9]),
    ("Minor Pentatonic", &[0, 3, 5, 7, 10]),
    ("Blues", &[0, 3, 5, 6, 7, 10]),
    ("Whole Tone", &[0, 2, 4, 6, 8, 10]),
    ("Bebop Dominant", &[0, 2, 4, 5, 7, 9, 10, 11]),
    ("Diminished", &[0, 2, 3, 5, 6, 8, 9, 11]),
];

/// Look up a scale by name, returning its canonical name and intervals.
pub fn scale(name: &str) -> Option<(&'static str, &'static [u8])> {
    SCALES.iter().copied().find(|&(n, _)| n == name)
}

/// Pitch classes of a scale rooted on `root`, in degree order.
pub fn scale_pitch_classes(intervals: &[u8], root: u8) -> Vec<u8> {
    intervals.iter().map(|&i| (root + i) % 12).collect()
}

/// A parsed `"<Root> <Scale Name>"` key label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLabel {
    pub root: u8,
    pub scale: &'static str,
    pub intervals: &'static [u8],
}

impl KeyLabel {
    pub fn new(root: u8, scale_name: &str) -> Option<KeyLabel> {
        scale(scale_name).map(|(scale, intervals)| KeyLabel {
            root: root % 12,
            scale,
            intervals,
        })
    }

    /// Whether diatonic-triad construction applies to this key.
    pub fn is_heptatonic(&self) -> bool {
        self.intervals.len() == 7
    }

    pub fn pitch_classes(&self) -> Vec<u8> {
        scale_pitch_classes(self.intervals, self.root)
    }
}

impl FromStr for KeyLabel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        let (root, name) = s
            .split_once(' ')
            .ok_or_else(|| ParseError::MissingQuality(s.to_string()))?;
        let root =
            parse_pitch_class(root).ok_or_else(|| ParseError::UnknownRoot(root.to_string()))?;
        KeyLabel::new(root, name.trim()).ok_or_else(|| ParseError::UnknownScale(name.to_string()))
    }
}

impl fmt::Display for KeyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", pitch_class_name(self.root), self.scale)
    }
}

pub(crate) fn parse_key(label: &str) -> Option<KeyLabel> {
    match label.parse() {
        Ok(key) => Some(key),
        Err(e) => {
            log::debug!("ignoring key label '{label}': {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scale_is_well_formed() {
        for &(name, intervals) in SCALES {
            assert!((5..=8).contains(&intervals.len()), "{name} has {} degrees", intervals.len());
            assert_eq!(intervals[0], 0, "{name} must start at the tonic");
            assert!(intervals.windows(2).all(|w| w[0] < w[1]), "{name} must ascend");
        }
    }

    #[test]
    fn key_label_with_spaced_scale_name() {
        let key: KeyLabel = "A Natural Minor".parse().unwrap();
        assert_eq!(key.root, 9);
        assert_eq!(key.scale, "Natural Minor");
        assert!(key.is_heptatonic());
        assert_eq!(key.to_string(), "A Natural Minor");
    }

    #[test]
    fn key_label_rejects_unknown_scale() {
        assert_eq!(
            "C Hypermajor".parse::<KeyLabel>(),
            Err(ParseError::UnknownScale("Hypermajor".into()))
        );
        assert!(!"C Blues".parse::<KeyLabel>().unwrap().is_heptatonic());
    }

    #[test]
    fn scale_pitch_classes_wrap() {
        let key: KeyLabel = "G Major".parse().unwrap();
        assert_eq!(key.pitch_classes(), vec![7, 9, 11, 0, 2, 4, 6]);
    }
}
