//! Chord detection from a set of sounding notes.
//!
//! Octave information is discarded up front: the notes are reduced to their
//! distinct pitch classes, and each pitch class is tried as the root in
//! ascending pitch-class order (not lowest-sounding-note order).  The first
//! candidate whose relative interval set is in the chord table wins.

use crate::chords::{quality_for_intervals, ChordLabel, Quality};
use crate::pitch::pitch_class_set;

/// Minimum number of distinct pitch classes for a chord.
pub const MIN_CHORD_NOTES: usize = 3;

/// Detect the chord formed by `notes`, as a parsed label.
pub fn detect(notes: &[u8]) -> Option<ChordLabel> {
    let pcs = pitch_class_set(notes);
    if pcs.len() < MIN_CHORD_NOTES {
        return None;
    }

    for &root in &pcs {
        let mut intervals: Vec<u8> = pcs.iter().map(|&pc| (pc + 12 - root) % 12).collect();
        intervals.sort_unstable();
        if let Some(quality) = quality_for_intervals(&intervals).and_then(Quality::plain) {
            return Some(ChordLabel::new(root, quality));
        }
    }

    log::trace!("no chord matches pitch classes {pcs:?}");
    None
}

/// Detect the chord formed by `notes` as a `"<Root> <Quality>"` label.
pub fn detect_chord(notes: &[u8]) -> Option<String> {
    detect(notes).map(|chord| chord.to_string())
}
