//! Chord qualities, stackable modal modifiers and parsed chord labels.
//!
//! The chord table maps a quality label ("Major", "Dom7", ...) to an
//! ascending interval set relative to a root at 0.  Interval sets may hold
//! compound intervals (14 for a 9th), so detection works on a *detection
//! key*: the intervals reduced mod 12, sorted and de-duplicated.  Both
//! directions of the table are indexed once on first use.
//!
//! Chord labels travel as `"<Root> <Quality>"` strings at the boundary and
//! are parsed into [`ChordLabel`] internally.  A quality is a table entry
//! plus an ordered list of modal [`Modifier`]s, so `"Sus4 add2 add6"` is
//! base `Sus4` with `add2` then `add6` stacked on top.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;

use crate::error::ParseError;
use crate::pitch::{parse_pitch_class, pitch_class_name};

// ═══════════════════════════════════════════════════════════════════════
// Chord table
// ═══════════════════════════════════════════════════════════════════════

/// Quality label → intervals above the root, in table order.
pub const CHORD_QUALITIES: &[(&str, &[u8])] = &[
    ("Major", &[0, 4, 7]),
    ("Minor", &[0, 3, 7]),
    ("Diminished", &[0, 3, 6]),
    ("Augmented", &[0, 4, 8]),
    ("Sus2", &[0, 2, 7]),
    ("Sus4", &[0, 5, 7]),
    ("Power", &[0, 7]),
    ("Dom7", &[0, 4, 7, 10]),
    ("Maj7", &[0, 4, 7, 11]),
    ("Min7", &[0, 3, 7, 10]),
    ("MinMaj7", &[0, 3, 7, 11]),
    ("m7b5", &[0, 3, 6, 10]),
    ("Dim7", &[0, 3, 6, 9]),
    ("Maj6", &[0, 4, 7, 9]),
    ("Min6", &[0, 3, 7, 9]),
    ("7sus4", &[0, 5, 7, 10]),
    ("Aug7", &[0, 4, 8, 10]),
    ("Add9", &[0, 4, 7, 14]),
    ("mAdd9", &[0, 3, 7, 14]),
    ("Dom9", &[0, 4, 7, 10, 14]),
    ("Maj9", &[0, 4, 7, 11, 14]),
    ("Min9", &[0, 3, 7, 10, 14]),
    ("Dom11", &[0, 4, 7, 10, 14, 17]),
    ("Dom13", &[0, 4, 7, 10, 14, 21]),
    ("7b9", &[0, 4, 7, 10, 13]),
    ("7#9", &[0, 4, 7, 10, 15]),
    ("7#11", &[0, 4, 7, 10, 18]),
];

struct ChordIndex {
    by_key: HashMap<Vec<u8>, &'static str>,
    by_name: HashMap<&'static str, &'static [u8]>,
}

static CHORD_INDEX: Lazy<ChordIndex> = Lazy::new(|| {
    let mut by_key = HashMap::with_capacity(CHORD_QUALITIES.len());
    let mut by_name = HashMap::with_capacity(CHORD_QUALITIES.len());
    for &(name, intervals) in CHORD_QUALITIES {
        // First entry wins if two qualities ever reduce to the same key.
        by_key.entry(detection_key(intervals)).or_insert(name);
        by_name.insert(name, intervals);
    }
    ChordIndex { by_key, by_name }
});

/// Reduce an interval set to its detection key: mod 12, sorted, distinct.
pub fn detection_key(intervals: &[u8]) -> Vec<u8> {
    let mut key: Vec<u8> = intervals.iter().map(|&i| i % 12).collect();
    key.sort_unstable();
    key.dedup();
    key
}

/// Intervals of a table quality, or `None` for anything not in the table.
pub fn quality_intervals(name: &str) -> Option<&'static [u8]> {
    CHORD_INDEX.by_name.get(name).copied()
}

/// Whether `name` is a chord-table quality label.
pub fn is_quality(name: &str) -> bool {
    CHORD_INDEX.by_name.contains_key(name)
}

/// Table quality whose detection key equals the key of `intervals`.
pub fn quality_for_intervals(intervals: &[u8]) -> Option<&'static str> {
    CHORD_INDEX.by_key.get(&detection_key(intervals)).copied()
}

/// Like [`quality_for_intervals`] but restricted to 3-note qualities.
pub fn triad_quality_for_intervals(intervals: &[u8]) -> Option<&'static str> {
    quality_for_intervals(intervals)
        .filter(|q| quality_intervals(q).map_or(false, |iv| iv.len() == 3))
}

/// Canonical `&'static` spelling of a table quality.
fn intern_quality(name: &str) -> Option<&'static str> {
    CHORD_INDEX.by_name.get_key_value(name).map(|(&k, _)| k)
}

// ═══════════════════════════════════════════════════════════════════════
// Modal modifiers
// ═══════════════════════════════════════════════════════════════════════

/// A stackable color modifier for chords without a third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Add2,
    Add4,
    Add6,
    Add9,
    Add11,
    Add13,
    No3,
    No5,
}

impl Modifier {
    pub const ALL: [Modifier; 8] = [
        Modifier::Add2,
        Modifier::Add4,
        Modifier::Add6,
        Modifier::Add9,
        Modifier::Add11,
        Modifier::Add13,
        Modifier::No3,
        Modifier::No5,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Modifier::Add2 => "add2",
            Modifier::Add4 => "add4",
            Modifier::Add6 => "add6",
            Modifier::Add9 => "add9",
            Modifier::Add11 => "add11",
            Modifier::Add13 => "add13",
            Modifier::No3 => "no3",
            Modifier::No5 => "no5",
        }
    }

    pub fn from_token(token: &str) -> Option<Modifier> {
        Modifier::ALL.iter().copied().find(|m| m.token() == token)
    }

    /// Apply this modifier to an ascending interval set, keeping it ascending.
    pub fn apply(self, intervals: &mut Vec<u8>) {
        let added = match self {
            Modifier::Add2 => 2,
            Modifier::Add4 => 5,
            Modifier::Add6 => 9,
            Modifier::Add9 => 14,
            Modifier::Add11 => 17,
            Modifier::Add13 => 21,
            Modifier::No3 => {
                intervals.retain(|&i| i != 3 && i != 4);
                return;
            }
            Modifier::No5 => {
                intervals.retain(|&i| i != 7);
                return;
            }
        };
        if let Err(pos) = intervals.binary_search(&added) {
            intervals.insert(pos, added);
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Quality
// ═══════════════════════════════════════════════════════════════════════

/// A chord-table quality with zero or more stacked modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quality {
    base: &'static str,
    modifiers: Vec<Modifier>,
}

impl Quality {
    /// A plain table quality. Returns `None` for unknown names.
    pub fn plain(name: &str) -> Option<Quality> {
        intern_quality(name).map(|base| Quality {
            base,
            modifiers: Vec::new(),
        })
    }

    pub fn base(&self) -> &'static str {
        self.base
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn is_plain(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Interval set: the base intervals with each modifier applied in order.
    pub fn intervals(&self) -> Vec<u8> {
        let mut intervals = quality_intervals(self.base).unwrap_or(&[]).to_vec();
        for m in &self.modifiers {
            m.apply(&mut intervals);
        }
        intervals
    }

    /// A voicing with neither a minor nor a major third.
    pub fn is_modal(&self) -> bool {
        !self.intervals().iter().any(|&i| i % 12 == 3 || i % 12 == 4)
    }

    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// This quality with `modifier` stacked on. Already-present modifiers
    /// are not repeated.
    pub fn with_modifier(&self, modifier: Modifier) -> Quality {
        let mut next = self.clone();
        if !next.has_modifier(modifier) {
            next.modifiers.push(modifier);
        }
        next
    }
}

impl FromStr for Quality {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(q) = Quality::plain(s) {
            return Ok(q);
        }

        let unknown = || ParseError::UnknownQuality(s.to_string());
        let mut words = s.split_whitespace();
        let mut quality = words.next().and_then(Quality::plain).ok_or_else(unknown)?;
        for word in words {
            let modifier = Modifier::from_token(word).ok_or_else(unknown)?;
            quality = quality.with_modifier(modifier);
        }
        Ok(quality)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base)?;
        for m in &self.modifiers {
            write!(f, " {m}")?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Chord labels
// ═══════════════════════════════════════════════════════════════════════

/// A parsed `"<Root> <Quality>"` chord label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChordLabel {
    /// Pitch class of the root (0=C, 1=C#, ... 11=B)
    pub root: u8,
    pub quality: Quality,
}

impl ChordLabel {
    pub fn new(root: u8, quality: Quality) -> Self {
        Self {
            root: root % 12,
            quality,
        }
    }

    /// Convenience constructor for a plain table quality.
    pub fn plain(root: u8, quality: &str) -> Option<Self> {
        Quality::plain(quality).map(|q| ChordLabel::new(root, q))
    }

    pub fn intervals(&self) -> Vec<u8> {
        self.quality.intervals()
    }

    /// Absolute pitch classes sounded by this chord, ascending and distinct.
    pub fn pitch_classes(&self) -> Vec<u8> {
        let mut pcs: Vec<u8> = self
            .intervals()
            .iter()
            .map(|&i| (self.root + i) % 12)
            .collect();
        pcs.sort_unstable();
        pcs.dedup();
        pcs
    }
}

impl FromStr for ChordLabel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty);
        }
        let (root, quality) = s
            .split_once(' ')
            .ok_or_else(|| ParseError::MissingQuality(s.to_string()))?;
        let root =
            parse_pitch_class(root).ok_or_else(|| ParseError::UnknownRoot(root.to_string()))?;
        Ok(ChordLabel::new(root, quality.trim().parse()?))
    }
}

impl fmt::Display for ChordLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", pitch_class_name(self.root), self.quality)
    }
}

/// Parse a chord label, logging and discarding the reason on failure.
pub(crate) fn parse_label(label: &str) -> Option<ChordLabel> {
    match label.parse() {
        Ok(chord) => Some(chord),
        Err(e) => {
            log::debug!("ignoring chord label '{label}': {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_keys_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for &(name, intervals) in CHORD_QUALITIES {
            assert!(seen.insert(detection_key(intervals)), "{name} shares a detection key");
        }
    }

    #[test]
    fn index_works_both_ways() {
        assert_eq!(quality_intervals("Maj7"), Some(&[0u8, 4, 7, 11][..]));
        assert_eq!(quality_for_intervals(&[0, 4, 7, 11]), Some("Maj7"));
        // Add9 is stored with a compound 9th but detected from pitch classes.
        assert_eq!(quality_for_intervals(&[0, 2, 4, 7]), Some("Add9"));
        assert_eq!(quality_intervals("maj7"), None);
    }

    #[test]
    fn triad_lookup_ignores_larger_chords() {
        assert_eq!(triad_quality_for_intervals(&[0, 3, 6]), Some("Diminished"));
        assert_eq!(triad_quality_for_intervals(&[0, 4, 7, 10]), None);
    }

    #[test]
    fn parse_plain_label() {
        let c: ChordLabel = "C# Min7".parse().unwrap();
        assert_eq!(c.root, 1);
        assert_eq!(c.quality.base(), "Min7");
        assert!(c.quality.is_plain());
        assert_eq!(c.to_string(), "C# Min7");
    }

    #[test]
    fn parse_compound_label_keeps_modifier_order() {
        let c: ChordLabel = "D Sus4 add6 add2".parse().unwrap();
        assert_eq!(c.quality.modifiers(), &[Modifier::Add6, Modifier::Add2]);
        assert_eq!(c.intervals(), vec![0, 2, 5, 7, 9]);
        assert_eq!(c.to_string(), "D Sus4 add6 add2");
    }

    #[test]
    fn parse_failures_are_typed() {
        assert_eq!("".parse::<ChordLabel>(), Err(ParseError::Empty));
        assert_eq!(
            "C".parse::<ChordLabel>(),
            Err(ParseError::MissingQuality("C".into()))
        );
        assert_eq!(
            "Db Major".parse::<ChordLabel>(),
            Err(ParseError::UnknownRoot("Db".into()))
        );
        assert_eq!(
            "C Major add7".parse::<ChordLabel>(),
            Err(ParseError::UnknownQuality("Major add7".into()))
        );
    }

    #[test]
    fn modifiers_remove_and_add_tones() {
        let mut iv = vec![0, 4, 7];
        Modifier::No3.apply(&mut iv);
        assert_eq!(iv, vec![0, 7]);
        Modifier::Add13.apply(&mut iv);
        Modifier::Add13.apply(&mut iv);
        assert_eq!(iv, vec![0, 7, 21]);
        Modifier::No5.apply(&mut iv);
        assert_eq!(iv, vec![0, 21]);
    }

    #[test]
    fn modal_means_no_third() {
        assert!(Quality::plain("Sus2").unwrap().is_modal());
        assert!(Quality::plain("Power").unwrap().is_modal());
        assert!(!Quality::plain("Minor").unwrap().is_modal());
        let no3: Quality = "Major no3".parse().unwrap();
        assert!(no3.is_modal());
    }

    #[test]
    fn pitch_classes_wrap_around_octave() {
        let b: ChordLabel = "B Major".parse().unwrap();
        assert_eq!(b.pitch_classes(), vec![3, 6, 11]);
    }
}
