//! Playback plan for a chord progression.
//!
//! The engine does no real-time scheduling itself.  This module turns a
//! progression into a flat list of timed notes that the host's audio
//! scheduler can fire: each chord occupies `beats_per_chord` beats, and
//! the notes within a chord are staggered slightly (lowest first) so the
//! chord rolls like a strummed or arpeggiated pad:
//!   `onset_ms = chord_index * chord_ms + note_index * stagger_ms`

use serde::{Deserialize, Serialize};

use crate::chords::parse_label;
use crate::midi::DEFAULT_BPM;
use crate::voicing::{styled_voicing, VoicingStyle, DEFAULT_OCTAVE};

/// Timing and voicing used to build a playback plan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaybackOptions {
    pub bpm: f64,
    pub beats_per_chord: f64,
    pub velocity: u8,
    pub octave: i8,
    /// Delay between successive notes of one chord.
    pub stagger_ms: f64,
    pub voicing_style: VoicingStyle,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            beats_per_chord: 2.0,
            velocity: 100,
            octave: DEFAULT_OCTAVE,
            stagger_ms: 15.0,
            voicing_style: VoicingStyle::Triad,
        }
    }
}

impl PlaybackOptions {
    /// Length of one chord slot in milliseconds.
    pub fn chord_ms(&self) -> f64 {
        let bpm = if self.bpm > 0.0 { self.bpm } else { DEFAULT_BPM };
        self.beats_per_chord.max(0.0) * 60_000.0 / bpm
    }
}

/// One note for the host scheduler to play.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledNote {
    /// Index of the chord in the progression.
    pub chord_index: usize,
    pub note: u8,
    pub velocity: u8,
    pub onset_ms: f64,
    pub duration_ms: f64,
}

/// Build the playback plan for `progression`.
///
/// Chords that fail to parse keep their time slot but sound nothing.  All
/// notes of a chord end together at the end of its slot.
pub fn schedule_progression(
    progression: &[String],
    options: &PlaybackOptions,
) -> Vec<ScheduledNote> {
    let chord_ms = options.chord_ms();
    let stagger_ms = options.stagger_ms.max(0.0);
    let velocity = options.velocity.min(127);

    let mut notes = Vec::new();
    for (i, label) in progression.iter().enumerate() {
        let Some(chord) = parse_label(label) else {
            continue;
        };
        let start = i as f64 * chord_ms;
        for (j, note) in styled_voicing(&chord, options.octave, options.voicing_style)
            .into_iter()
            .enumerate()
        {
            let offset = (j as f64 * stagger_ms).min(chord_ms);
            notes.push(ScheduledNote {
                chord_index: i,
                note,
                velocity,
                onset_ms: start + offset,
                duration_ms: chord_ms - offset,
            });
        }
    }
    notes
}

/// Serialize a playback plan to JSON.
pub fn schedule_to_json(notes: &[ScheduledNote]) -> String {
    serde_json::to_string(notes).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progression(chords: &[&str]) -> Vec<String> {
        chords.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn chords_are_staggered_and_end_together() {
        let prog = progression(&["C Major", "F Major"]);
        let plan = schedule_progression(&prog, &PlaybackOptions::default());
        assert_eq!(plan.len(), 6);

        // 2 beats at 120 BPM = 1000 ms per chord.
        let onsets: Vec<f64> = plan.iter().map(|n| n.onset_ms).collect();
        assert_eq!(onsets, vec![0.0, 15.0, 30.0, 1000.0, 1015.0, 1030.0]);
        for n in &plan {
            let end = n.onset_ms + n.duration_ms;
            assert!((end - (n.chord_index as f64 + 1.0) * 1000.0).abs() < 1e-9);
        }
        assert_eq!(plan[3].note, 65);
    }

    #[test]
    fn unparsable_chord_keeps_its_slot() {
        let prog = progression(&["???", "G Major"]);
        let plan = schedule_progression(&prog, &PlaybackOptions::default());
        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|n| n.chord_index == 1));
        assert_eq!(plan[0].onset_ms, 1000.0);
    }

    #[test]
    fn root_only_has_no_stagger() {
        let opts = PlaybackOptions {
            voicing_style: VoicingStyle::RootOnly,
            octave: 2,
            ..PlaybackOptions::default()
        };
        let plan = schedule_progression(&progression(&["A Minor"]), &opts);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].note, 45);
        assert_eq!(plan[0].duration_ms, 1000.0);
    }

    #[test]
    fn json_field_names() {
        let plan = schedule_progression(&progression(&["C Major"]), &PlaybackOptions::default());
        let json = schedule_to_json(&plan);
        assert!(json.contains("\"onsetMs\":0.0"));
        assert!(json.contains("\"chordIndex\":0"));
    }
}
