//! Church-mode detection from chord history, and modal next-chord ranking.
//!
//! Each (tonic, mode) pair is scored by how many chords in the history are
//! exactly one of that mode's seven diatonic triads.  Unlike the key
//! tracker this looks at the whole history the caller passes in, and
//! matches whole chords rather than individual chord tones.

use serde::Serialize;

use crate::chords::{parse_label, triad_quality_for_intervals, ChordLabel, Quality};
use crate::pitch::{parse_pitch_class, pitch_class_name};
use crate::scales::scale;
use crate::suggest::{sort_by_confidence, Suggestion};

/// The seven rotations of the major scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChurchMode {
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
}

impl ChurchMode {
    /// Scan order; also the tie-break order within one tonic.
    pub const ALL: [ChurchMode; 7] = [
        ChurchMode::Ionian,
        ChurchMode::Dorian,
        ChurchMode::Phrygian,
        ChurchMode::Lydian,
        ChurchMode::Mixolydian,
        ChurchMode::Aeolian,
        ChurchMode::Locrian,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ChurchMode::Ionian => "Ionian",
            ChurchMode::Dorian => "Dorian",
            ChurchMode::Phrygian => "Phrygian",
            ChurchMode::Lydian => "Lydian",
            ChurchMode::Mixolydian => "Mixolydian",
            ChurchMode::Aeolian => "Aeolian",
            ChurchMode::Locrian => "Locrian",
        }
    }

    pub fn from_name(name: &str) -> Option<ChurchMode> {
        ChurchMode::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Name of this mode's entry in the scale table.
    pub fn scale_name(self) -> &'static str {
        match self {
            ChurchMode::Ionian => "Major",
            ChurchMode::Aeolian => "Natural Minor",
            other => other.name(),
        }
    }

    pub fn intervals(self) -> &'static [u8] {
        scale(self.scale_name()).map_or(&[], |(_, intervals)| intervals)
    }

    /// Roman-numeral labels for the seven degrees, spelled the way each
    /// mode's own triads read.
    pub fn degree_labels(self) -> [&'static str; 7] {
        match self {
            ChurchMode::Ionian => ["I", "ii", "iii", "IV", "V", "vi", "vii°"],
            ChurchMode::Dorian => ["i", "ii", "bIII", "IV", "v", "vi°", "bVII"],
            ChurchMode::Phrygian => ["i", "bII", "bIII", "iv", "v°", "bVI", "bvii"],
            ChurchMode::Lydian => ["I", "II", "iii", "#iv°", "V", "vi", "vii"],
            ChurchMode::Mixolydian => ["I", "ii", "iii°", "IV", "v", "vi", "bVII"],
            ChurchMode::Aeolian => ["i", "ii°", "bIII", "iv", "v", "bVI", "bVII"],
            ChurchMode::Locrian => ["i°", "bII", "biii", "iv", "bV", "bVI", "bvii"],
        }
    }
}

/// Best-fitting tonic and mode for a chord history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModalEstimate {
    pub tonic: String,
    pub mode: ChurchMode,
    pub confidence: f64,
}

/// The stacked-thirds triads on each degree of a 7-note scale rooted at
/// `root`, as (degree, chord) pairs.  Degrees whose triad is not a 3-note
/// table quality are left out.
pub fn diatonic_triads(intervals: &[u8], root: u8) -> Vec<(usize, ChordLabel)> {
    let n = intervals.len();
    if n != 7 {
        return Vec::new();
    }

    let mut triads = Vec::with_capacity(n);
    for degree in 0..n {
        let base = intervals[degree];
        let rel = |step: usize| (intervals[(degree + step) % n] + 12 - base) % 12;
        let shape = [0, rel(2), rel(4)];
        let Some(quality) = triad_quality_for_intervals(&shape).and_then(Quality::plain) else {
            continue;
        };
        triads.push((degree, ChordLabel::new((root + base) % 12, quality)));
    }
    triads
}

/// Infer the tonic and church mode implied by a chord history.
///
/// Returns `None` for an empty history or when no chord is diatonic to any
/// mode.  Confidence is the matched fraction, rounded to two decimals.
pub fn detect_mode_from_chords(history: &[String]) -> Option<ModalEstimate> {
    if history.is_empty() {
        return None;
    }
    let chords: Vec<Option<ChordLabel>> = history.iter().map(|c| parse_label(c)).collect();
    let len = history.len() as f64;

    let mut best: Option<(usize, u8, ChurchMode)> = None;
    for tonic in 0..12u8 {
        for mode in ChurchMode::ALL {
            let triads = diatonic_triads(mode.intervals(), tonic);
            let score = chords
                .iter()
                .flatten()
                .filter(|c| triads.iter().any(|(_, t)| t == *c))
                .count();

            // Strictly better only: earlier tonic and mode win ties.
            if best.map_or(true, |(best_score, _, _)| score > best_score) {
                best = Some((score, tonic, mode));
            }
        }
    }

    let (score, tonic, mode) = best?;
    if score == 0 {
        return None;
    }
    Some(ModalEstimate {
        tonic: pitch_class_name(tonic).to_string(),
        mode,
        confidence: (score as f64 / len * 100.0).round() / 100.0,
    })
}

/// Rank the seven diatonic triads of `mode` on `tonic` as next chords.
///
/// Tonic weighs most, subdominant and dominant next.  Repeating the last
/// chord is down-ranked, not excluded.
pub fn suggest_modal_next_chords(
    mode: ChurchMode,
    tonic: &str,
    last_chord: Option<&str>,
) -> Vec<Suggestion> {
    let Some(tonic_pc) = parse_pitch_class(tonic) else {
        log::debug!("unknown tonic '{tonic}'");
        return Vec::new();
    };
    let last = last_chord.and_then(parse_label);
    let labels = mode.degree_labels();

    let mut suggestions: Vec<Suggestion> = diatonic_triads(mode.intervals(), tonic_pc)
        .into_iter()
        .map(|(degree, chord)| {
            let mut confidence = match degree {
                0 => 0.9,
                3 | 4 => 0.7,
                _ => 0.5,
            };
            if last.as_ref() == Some(&chord) {
                confidence -= 0.2;
            }
            Suggestion::new(chord.to_string(), labels[degree], confidence)
        })
        .collect();

    sort_by_confidence(&mut suggestions);
    suggestions
}
