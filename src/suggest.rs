//! Suggestion engine: what to play or add next.
//!
//! Every function here is pure.  Malformed labels, unknown qualities and
//! scale shapes that don't support the requested analysis produce an empty
//! list (or `None`), never an error.  All ranked lists are sorted by
//! confidence, highest first, with ties kept in generation order.

use serde::Serialize;

use crate::chords::{is_quality, parse_label, ChordLabel, Modifier};
use crate::detect::{detect_chord, MIN_CHORD_NOTES};
use crate::mode::diatonic_triads;
use crate::pitch::{pitch_class, pitch_class_name, pitch_class_set};
use crate::scales::{parse_key, scale_pitch_classes, KeyLabel, SCALES};
use crate::voicing::{calculate_voice_leading_cost, chord_notes, DEFAULT_OCTAVE};

/// One ranked suggestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// Chord label, scale name or extension token.
    pub name: String,
    /// Role label: Roman numeral, degree name or short description.
    pub function: String,
    /// Clamped to 0.0..=1.0.
    pub confidence: f64,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, function: impl Into<String>, confidence: f64) -> Self {
        Self {
            name: name.into(),
            function: function.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}

/// Stable sort, highest confidence first.
pub fn sort_by_confidence(suggestions: &mut [Suggestion]) {
    suggestions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

const NUMERALS: [&str; 7] = ["I", "II", "III", "IV", "V", "VI", "VII"];

/// Roman numeral for a diatonic triad, cased by its quality.
fn roman_numeral(degree: usize, chord: &ChordLabel) -> String {
    let numeral = NUMERALS[degree % 7];
    match chord.quality.base() {
        "Minor" => numeral.to_lowercase(),
        "Diminished" => format!("{}°", numeral.to_lowercase()),
        "Augmented" => format!("{numeral}+"),
        _ => numeral.to_string(),
    }
}

fn heptatonic_key(key: &str) -> Option<KeyLabel> {
    let key = parse_key(key)?;
    if !key.is_heptatonic() {
        log::debug!("key '{key}' has {} degrees, need 7", key.intervals.len());
        return None;
    }
    Some(key)
}

// ═══════════════════════════════════════════════════════════════════════
// Diatonic chords
// ═══════════════════════════════════════════════════════════════════════

/// The diatonic triads of `key`, minus the chord currently sounding.
pub fn suggest_diatonic_chords(key: &str, current_chord: Option<&str>) -> Vec<Suggestion> {
    let Some(key) = heptatonic_key(key) else {
        return Vec::new();
    };
    let current = current_chord.and_then(parse_label);

    let mut suggestions: Vec<Suggestion> = diatonic_triads(key.intervals, key.root)
        .into_iter()
        .filter(|(_, chord)| current.as_ref() != Some(chord))
        .map(|(degree, chord)| {
            let confidence = match degree {
                0 => 1.0,
                4 => 0.9,
                3 | 5 => 0.8,
                _ => 0.5,
            };
            Suggestion::new(chord.to_string(), roman_numeral(degree, &chord), confidence)
        })
        .collect();

    sort_by_confidence(&mut suggestions);
    suggestions
}

// ═══════════════════════════════════════════════════════════════════════
// Compatible scales
// ═══════════════════════════════════════════════════════════════════════

/// Scales that contain every tone of the current chord.
///
/// Rooted on the key if one is given, otherwise on the chord root.  With no
/// chord, every scale is listed at a neutral confidence.  The key's own
/// scale gets a small bonus.
pub fn suggest_scales(key: Option<&str>, current_chord: Option<&str>) -> Vec<Suggestion> {
    let key = key.and_then(parse_key);
    let chord = current_chord.and_then(parse_label);
    let root = match (&key, &chord) {
        (Some(k), _) => k.root,
        (None, Some(c)) => c.root,
        (None, None) => return Vec::new(),
    };
    let chord_tones = chord.as_ref().map(ChordLabel::pitch_classes).unwrap_or_default();

    let mut suggestions = Vec::new();
    for &(name, intervals) in SCALES {
        let in_scale = scale_pitch_classes(intervals, root);
        let containment = if chord_tones.is_empty() {
            0.5
        } else {
            let present = chord_tones.iter().filter(|pc| in_scale.contains(pc)).count();
            present as f64 / chord_tones.len() as f64
        };
        if !chord_tones.is_empty() && containment < 1.0 {
            continue;
        }

        let mut confidence = containment;
        if key.map_or(false, |k| k.scale == name) {
            confidence += 0.2;
        }
        suggestions.push(Suggestion::new(
            format!("{} {}", pitch_class_name(root), name),
            format!("{}-note scale", intervals.len()),
            confidence.min(1.0),
        ));
    }

    sort_by_confidence(&mut suggestions);
    suggestions
}

// ═══════════════════════════════════════════════════════════════════════
// Extensions and modal modifiers
// ═══════════════════════════════════════════════════════════════════════

/// Extensions offered for each plain triad, with their confidences.
fn extension_menu(base: &str) -> &'static [(&'static str, f64)] {
    match base {
        "Major" => &[
            ("Maj7", 0.9),
            ("Dom7", 0.8),
            ("Maj6", 0.7),
            ("Sus4", 0.5),
            ("Sus2", 0.5),
            ("Add9", 0.6),
        ],
        "Minor" => &[("Min7", 0.9), ("MinMaj7", 0.5), ("Min6", 0.6), ("mAdd9", 0.6)],
        "Diminished" => &[("m7b5", 0.8), ("Dim7", 0.7)],
        _ => &[],
    }
}

/// Extensions `apply_extension` accepts outright for a tonal base quality.
fn allowed_extensions(base: &str) -> &'static [&'static str] {
    match base {
        "Major" => &["Maj7", "Dom7", "Maj6", "Sus4", "Sus2", "Add9", "7sus4"],
        "Minor" => &["Min7", "MinMaj7", "Min6", "mAdd9"],
        "Diminished" => &["m7b5", "Dim7"],
        _ => &[],
    }
}

fn extension_description(quality: &str) -> &'static str {
    match quality {
        "Maj7" => "Major 7th",
        "Dom7" => "Dominant 7th",
        "Maj6" => "Major 6th",
        "Sus4" => "Suspended 4th",
        "Sus2" => "Suspended 2nd",
        "Add9" => "Added 9th",
        "Min7" => "Minor 7th",
        "MinMaj7" => "Minor-major 7th",
        "Min6" => "Minor 6th",
        "mAdd9" => "Minor added 9th",
        "m7b5" => "Half-diminished 7th",
        "Dim7" => "Diminished 7th",
        _ => "Extension",
    }
}

const MODIFIER_CONFIDENCE: f64 = 0.6;

/// Extensions and voicing modifiers that fit the current chord.
///
/// Plain triads get a tonal menu.  Chords without a third additionally get
/// the full menu of stackable modal modifiers; reapplying one a chord
/// already carries leaves it unchanged.
pub fn suggest_extensions(current_chord: &str) -> Vec<Suggestion> {
    let Some(chord) = parse_label(current_chord) else {
        return Vec::new();
    };

    let mut suggestions: Vec<Suggestion> = Vec::new();
    if chord.quality.is_plain() {
        for &(quality, confidence) in extension_menu(chord.quality.base()) {
            suggestions.push(Suggestion::new(quality, extension_description(quality), confidence));
        }
    }
    if chord.quality.is_modal() {
        for modifier in Modifier::ALL {
            suggestions.push(Suggestion::new(
                modifier.token(),
                "Modal color",
                MODIFIER_CONFIDENCE,
            ));
        }
    }

    sort_by_confidence(&mut suggestions);
    suggestions
}

/// Apply an extension or modifier to a chord, returning the new label.
///
/// On a modal chord (no third) only stackable modifiers are accepted; they
/// are appended to the existing ones, so `add2` then `add6` on `"C Sus4"`
/// gives `"C Sus4 add2 add6"`.  On a tonal chord the extension replaces the
/// quality: anything on the base quality's allow-list is accepted, and any
/// other chord-table quality is tolerated.  Everything else is rejected.
pub fn apply_extension(base_chord: &str, extension: &str) -> Option<String> {
    let chord = parse_label(base_chord)?;

    if chord.quality.is_modal() {
        let Some(modifier) = Modifier::from_token(extension) else {
            log::debug!("'{extension}' is not a modal modifier, rejected on '{base_chord}'");
            return None;
        };
        let quality = chord.quality.with_modifier(modifier);
        return Some(ChordLabel::new(chord.root, quality).to_string());
    }

    if !allowed_extensions(chord.quality.base()).contains(&extension) {
        if !is_quality(extension) {
            log::debug!("unknown extension '{extension}' for '{base_chord}'");
            return None;
        }
        log::debug!("'{extension}' is not a usual extension of '{base_chord}', applying anyway");
    }
    Some(format!("{} {}", pitch_class_name(chord.root), extension))
}

// ═══════════════════════════════════════════════════════════════════════
// Interval completions
// ═══════════════════════════════════════════════════════════════════════

/// Intervals offered above the lowest held note, in evaluation order.
pub const COMPLETION_INTERVALS: [(u8, &str); 5] = [
    (3, "Minor 3rd"),
    (4, "Major 3rd"),
    (7, "Perfect 5th"),
    (10, "Minor 7th"),
    (11, "Major 7th"),
];

const NO_CHORD_YET: &str = "(no chord yet)";
const UNRECOGNIZED: &str = "(unrecognized)";

/// A note to add and the chord it would complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalSuggestion {
    /// Offset above the lowest held note, e.g. "+7".
    pub interval: String,
    pub description: &'static str,
    /// Note number to add.
    pub note: u8,
    /// Chord the resulting note set would form, if it has 3+ pitch classes
    /// and matches the chord table.
    pub predicted: Option<String>,
    /// Whether the resulting note set has enough notes to be a chord.
    pub complete: bool,
}

impl IntervalSuggestion {
    /// Text to show for the outcome of adding this note.
    pub fn result(&self) -> &str {
        match (&self.predicted, self.complete) {
            (Some(label), _) => label,
            (None, true) => UNRECOGNIZED,
            (None, false) => NO_CHORD_YET,
        }
    }
}

/// Notes that would grow one or two held notes toward a chord.
///
/// Empty unless 1 or 2 distinct notes are held.  Intervals whose pitch class
/// is already held are skipped; the rest keep their fixed order.
pub fn suggest_intervals(active_notes: &[u8]) -> Vec<IntervalSuggestion> {
    let mut notes = active_notes.to_vec();
    notes.sort_unstable();
    notes.dedup();
    if notes.is_empty() || notes.len() > 2 {
        return Vec::new();
    }
    let lowest = notes[0];
    let held = pitch_class_set(&notes);

    let mut suggestions = Vec::with_capacity(COMPLETION_INTERVALS.len());
    for (semitones, description) in COMPLETION_INTERVALS {
        let Some(candidate) = lowest.checked_add(semitones).filter(|&n| n <= 127) else {
            continue;
        };
        if held.contains(&pitch_class(candidate)) {
            continue;
        }

        let mut hypothetical = notes.clone();
        hypothetical.push(candidate);
        let complete = pitch_class_set(&hypothetical).len() >= MIN_CHORD_NOTES;
        suggestions.push(IntervalSuggestion {
            interval: format!("+{semitones}"),
            description,
            note: candidate,
            predicted: if complete { detect_chord(&hypothetical) } else { None },
            complete,
        });
    }
    suggestions
}

// ═══════════════════════════════════════════════════════════════════════
// Next-chord ranking
// ═══════════════════════════════════════════════════════════════════════

/// Default number of recent chords checked for repetition.
pub const DEFAULT_MEMORY_LENGTH: usize = 3;

/// Maximum number of next-chord suggestions.
pub const MAX_NEXT_CHORDS: usize = 5;

const REPEAT_PENALTY: f64 = 0.35;
const RECENCY_PENALTY: f64 = 0.1;
const VOICE_LEADING_WEIGHT: f64 = 0.05;

/// (from degree, to degree, bonus). First match wins.
const MOTION_BONUSES: &[(usize, usize, f64)] = &[
    (4, 0, 0.35), // V → I
    (3, 4, 0.25), // IV → V
    (0, 3, 0.2),  // I → IV
    (0, 4, 0.2),  // I → V
    (5, 3, 0.2),  // vi → IV
    (4, 5, 0.15), // V → vi (deceptive)
    (1, 4, 0.25), // ii → V
    (0, 5, 0.15), // I → vi
    (3, 0, 0.3),  // IV → I (plagal)
    (2, 5, 0.1),  // iii → vi
    (5, 1, 0.15), // vi → ii
];

fn degree_weight(degree: usize) -> f64 {
    match degree {
        0 => 0.5,
        4 => 0.4,
        3 => 0.35,
        5 => 0.3,
        _ => 0.2,
    }
}

fn motion_bonus(from: usize, to: usize) -> Option<f64> {
    MOTION_BONUSES
        .iter()
        .find(|&&(f, t, _)| f == from && t == to)
        .map(|&(_, _, bonus)| bonus)
}

/// Rank diatonic triads of `key` as continuations of `history`.
///
/// Scores combine degree weight, cadential motion from the last chord,
/// penalties for repetition, and the voice-leading distance from the last
/// chord's voicing.  Only positive scores survive; at most
/// [`MAX_NEXT_CHORDS`] are returned.
pub fn suggest_next_chords(history: &[String], key: &str, memory_length: usize) -> Vec<Suggestion> {
    let Some(key) = heptatonic_key(key) else {
        return Vec::new();
    };
    let triads = diatonic_triads(key.intervals, key.root);

    let window: Vec<ChordLabel> = history[history.len().saturating_sub(memory_length)..]
        .iter()
        .filter_map(|c| parse_label(c))
        .collect();
    let last = history.last().and_then(|c| parse_label(c));
    let last_degree = last
        .as_ref()
        .and_then(|l| triads.iter().find(|(_, t)| t == l).map(|&(d, _)| d));
    let last_notes = last.as_ref().map(|l| chord_notes(l, DEFAULT_OCTAVE));

    let mut suggestions = Vec::new();
    for (degree, chord) in &triads {
        let mut score = degree_weight(*degree);
        if let Some(bonus) = last_degree.and_then(|from| motion_bonus(from, *degree)) {
            score += bonus;
        }
        if last.as_ref() == Some(chord) {
            score -= REPEAT_PENALTY;
        }
        score -= RECENCY_PENALTY * window.iter().filter(|c| *c == chord).count() as f64;

        if let Some(prev) = &last_notes {
            let cost = calculate_voice_leading_cost(prev, &chord_notes(chord, DEFAULT_OCTAVE));
            score -= cost as f64 * VOICE_LEADING_WEIGHT;
        }

        let score = score.clamp(0.0, 1.0);
        log::trace!("next chord {chord}: {score:.3}");
        if score > 0.0 {
            let function = roman_numeral(*degree, chord);
            suggestions.push(Suggestion::new(chord.to_string(), function, score));
        }
    }

    sort_by_confidence(&mut suggestions);
    suggestions.truncate(MAX_NEXT_CHORDS);
    suggestions
}
