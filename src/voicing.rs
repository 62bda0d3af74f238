//! Chord voicings: resolving a label to concrete note numbers.
//!
//! `get_chord_metadata` gives the full close-position voicing that the UI
//! shows and plays.  [`VoicingStyle`] narrows it to the thinner shapes used
//! by the exporter (root only, root + 5th, root + 10th).

use serde::{Deserialize, Serialize};

use crate::chords::{parse_label, ChordLabel};
use crate::pitch::pitch_class_name;

/// Default octave for chord voicings (root of a C chord on C4 = 60).
pub const DEFAULT_OCTAVE: i8 = 4;

/// Note names, note numbers and suggested fingering for one voicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChordMetadata {
    pub note_names: Vec<String>,
    pub midi_notes: Vec<u8>,
    pub fingering: Vec<u8>,
}

/// How much of a chord the exporter sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VoicingStyle {
    #[serde(rename = "Root Only")]
    RootOnly,
    #[serde(rename = "Root + 5th")]
    RootFifth,
    #[serde(rename = "Root + 10th")]
    RootTenth,
    #[default]
    #[serde(rename = "Triad")]
    Triad,
}

/// Fingering for a voicing of `size` notes (1 = thumb).
pub fn fingering_for(size: usize) -> Vec<u8> {
    match size {
        3 => vec![1, 3, 5],
        4 => vec![1, 2, 3, 5],
        5 => vec![1, 2, 3, 4, 5],
        n => (1..=n as u8).collect(),
    }
}

/// MIDI note number of `pc` in `octave`, if it is in range.
pub fn root_note(pc: u8, octave: i8) -> Option<u8> {
    let note = pc as i32 + 12 * (octave as i32 + 1);
    u8::try_from(note).ok().filter(|&n| n <= 127)
}

/// Close-position voicing of a parsed chord at `octave`.
/// Notes that would fall outside 0..=127 are dropped.
pub fn chord_notes(chord: &ChordLabel, octave: i8) -> Vec<u8> {
    let base = chord.root as i32 + 12 * (octave as i32 + 1);
    chord
        .intervals()
        .iter()
        .map(|&i| base + i as i32)
        .filter(|n| (0..=127).contains(n))
        .map(|n| n as u8)
        .collect()
}

/// Resolve a chord label to note names, note numbers and fingering.
pub fn get_chord_metadata(label: &str, octave: i8) -> Option<ChordMetadata> {
    let chord = parse_label(label)?;
    let midi_notes = chord_notes(&chord, octave);
    Some(ChordMetadata {
        note_names: midi_notes
            .iter()
            .map(|&n| pitch_class_name(n % 12).to_string())
            .collect(),
        fingering: fingering_for(midi_notes.len()),
        midi_notes,
    })
}

/// Notes sounded for `chord` in the given style.
///
/// The 10th is major unless the quality name says minor ("min", any case).
pub fn styled_voicing(chord: &ChordLabel, octave: i8, style: VoicingStyle) -> Vec<u8> {
    let Some(root) = root_note(chord.root, octave) else {
        return Vec::new();
    };
    let above = |interval: u8| root.checked_add(interval).filter(|&n| n <= 127);

    match style {
        VoicingStyle::RootOnly => vec![root],
        VoicingStyle::RootFifth => std::iter::once(root).chain(above(7)).collect(),
        VoicingStyle::RootTenth => {
            let minor = chord.quality.base().to_ascii_lowercase().contains("min");
            let tenth = if minor { 15 } else { 16 };
            std::iter::once(root).chain(above(tenth)).collect()
        }
        VoicingStyle::Triad => chord_notes(chord, octave),
    }
}

/// Total distance each previous note must travel to its nearest next note.
///
/// Asymmetric: only notes of `prev` contribute.  An empty `next` costs 0.
pub fn calculate_voice_leading_cost(prev: &[u8], next: &[u8]) -> u32 {
    prev.iter()
        .filter_map(|&p| next.iter().map(|&n| (p as i32 - n as i32).unsigned_abs()).min())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_metadata_at_octave_4() {
        let meta = get_chord_metadata("C Major", DEFAULT_OCTAVE).unwrap();
        assert_eq!(meta.midi_notes, vec![60, 64, 67]);
        assert_eq!(meta.note_names, vec!["C", "E", "G"]);
        assert_eq!(meta.fingering, vec![1, 3, 5]);
    }

    #[test]
    fn seventh_and_ninth_fingering() {
        let meta = get_chord_metadata("A Min7", 3).unwrap();
        assert_eq!(meta.midi_notes, vec![57, 60, 64, 67]);
        assert_eq!(meta.fingering, vec![1, 2, 3, 5]);

        let meta = get_chord_metadata("G Dom9", 3).unwrap();
        assert_eq!(meta.midi_notes, vec![55, 59, 62, 65, 69]);
        assert_eq!(meta.note_names, vec!["G", "B", "D", "F", "A"]);
        assert_eq!(meta.fingering, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sequential_fingering_for_other_sizes() {
        assert_eq!(fingering_for(2), vec![1, 2]);
        assert_eq!(fingering_for(6), vec![1, 2, 3, 4, 5, 6]);
        let meta = get_chord_metadata("C Power", 4).unwrap();
        assert_eq!(meta.fingering, vec![1, 2]);
    }

    #[test]
    fn metadata_rejects_bad_labels() {
        assert_eq!(get_chord_metadata("X Major", 4), None);
        assert_eq!(get_chord_metadata("C Mystery", 4), None);
    }

    #[test]
    fn out_of_range_notes_are_dropped() {
        let meta = get_chord_metadata("G Major", 9).unwrap();
        assert_eq!(meta.midi_notes, vec![127]);
    }

    #[test]
    fn styled_voicings() {
        let c: ChordLabel = "C Major".parse().unwrap();
        let cm: ChordLabel = "C Minor".parse().unwrap();
        let cmm7: ChordLabel = "C MinMaj7".parse().unwrap();
        assert_eq!(styled_voicing(&c, 3, VoicingStyle::RootOnly), vec![48]);
        assert_eq!(styled_voicing(&c, 3, VoicingStyle::RootFifth), vec![48, 55]);
        assert_eq!(styled_voicing(&c, 3, VoicingStyle::RootTenth), vec![48, 64]);
        assert_eq!(styled_voicing(&cm, 3, VoicingStyle::RootTenth), vec![48, 63]);
        assert_eq!(styled_voicing(&cmm7, 3, VoicingStyle::RootTenth), vec![48, 63]);
        assert_eq!(styled_voicing(&c, 3, VoicingStyle::Triad), vec![48, 52, 55]);
    }

    #[test]
    fn voice_leading_cost_properties() {
        assert_eq!(calculate_voice_leading_cost(&[60, 64, 67], &[60, 64, 67]), 0);
        // C major → F major (C4 F4 A4): E→F 1, G→A 2.
        assert_eq!(calculate_voice_leading_cost(&[60, 64, 67], &[65, 69, 72]), 5 + 1 + 2);
        // Asymmetric.
        assert_eq!(calculate_voice_leading_cost(&[60], &[60, 72]), 0);
        assert_eq!(calculate_voice_leading_cost(&[60, 72], &[60]), 12);
        assert_eq!(calculate_voice_leading_cost(&[60], &[]), 0);
    }
}
