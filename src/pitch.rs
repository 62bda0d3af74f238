//! Pitch-class arithmetic and note-name conversions.
//!
//! Pitch classes are `u8` in 0..=11 with 0 = C.  Note numbers are MIDI
//! note numbers (0..=127), with 60 = C4.  Only sharp spellings are
//! produced or accepted.

use crate::error::ParseError;

/// Sharp-spelled pitch-class names, indexed by pitch class.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Pitch class of a note number.
pub fn pitch_class(note: u8) -> u8 {
    note % 12
}

/// Octave of a note number (60 → 4).
pub fn octave(note: u8) -> i8 {
    (note / 12) as i8 - 1
}

/// Name of a pitch class; wraps values above 11.
pub fn pitch_class_name(pc: u8) -> &'static str {
    NOTE_NAMES[(pc % 12) as usize]
}

/// Look up a sharp-spelled pitch-class name. Flats and lower-case are rejected.
pub fn parse_pitch_class(name: &str) -> Option<u8> {
    NOTE_NAMES.iter().position(|&n| n == name).map(|i| i as u8)
}

/// Transpose a pitch class by any number of semitones, wrapping.
pub fn transpose_pc(pc: u8, semitones: i32) -> u8 {
    (pc as i32 + semitones).rem_euclid(12) as u8
}

/// Full note name, e.g. 61 → "C#4".
pub fn note_name(note: u8) -> String {
    format!("{}{}", pitch_class_name(pitch_class(note)), octave(note))
}

/// Parse a full note name such as "C4" or "A#-1" into a note number.
pub fn parse_note_name(name: &str) -> Result<u8, ParseError> {
    let bad = || ParseError::UnknownNoteName(name.to_string());

    let split = name
        .find(|c: char| c == '-' || c.is_ascii_digit())
        .ok_or_else(bad)?;
    let (pc_part, octave_part) = name.split_at(split);
    let pc = parse_pitch_class(pc_part).ok_or_else(bad)?;
    let octave: i32 = octave_part.parse().map_err(|_| bad())?;

    let note = pc as i32 + 12 * (octave + 1);
    if (0..=127).contains(&note) {
        Ok(note as u8)
    } else {
        Err(bad())
    }
}

/// Distinct pitch classes of a note set, sorted ascending.
pub fn pitch_class_set(notes: &[u8]) -> Vec<u8> {
    let mut pcs: Vec<u8> = notes.iter().map(|&n| pitch_class(n)).collect();
    pcs.sort_unstable();
    pcs.dedup();
    pcs
}
