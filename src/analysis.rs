//! One full analysis pass for a new set of held notes.
//!
//! This is what a host runs on every note-on / note-off: detect the chord,
//! feed it to the key tracker, then gather every suggestion category in a
//! single serializable result.  The caller keeps ownership of the chord
//! history (its progression); it is only read here.

use serde::{Deserialize, Serialize};

use crate::detect::detect_chord;
use crate::key_tracker::{KeyEstimate, KeyTracker};
use crate::mode::{detect_mode_from_chords, ModalEstimate};
use crate::suggest::{
    suggest_diatonic_chords, suggest_extensions, suggest_intervals, suggest_next_chords,
    suggest_scales, IntervalSuggestion, Suggestion, DEFAULT_MEMORY_LENGTH,
};
use crate::voicing::{get_chord_metadata, ChordMetadata, DEFAULT_OCTAVE};

/// Tunables for [`analyze`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisOptions {
    /// Recent chords checked for repetition when ranking next chords.
    pub memory_length: usize,
    /// Octave for the detected chord's metadata.
    pub octave: i8,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            memory_length: DEFAULT_MEMORY_LENGTH,
            octave: DEFAULT_OCTAVE,
        }
    }
}

/// Everything the UI shows for the current input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub chord: Option<String>,
    pub metadata: Option<ChordMetadata>,
    pub keys: Vec<KeyEstimate>,
    pub mode: Option<ModalEstimate>,
    pub diatonic: Vec<Suggestion>,
    pub scales: Vec<Suggestion>,
    pub extensions: Vec<Suggestion>,
    pub intervals: Vec<IntervalSuggestion>,
    pub next_chords: Vec<Suggestion>,
}

/// Run the per-input analysis cycle.
///
/// A detected chord is added to `tracker`.  Mode detection sees `history`
/// plus the detected chord; next-chord ranking sees `history` as is, since
/// the current chord may not be committed yet.  Key-dependent suggestions
/// use the tracker's best estimate and are empty while no key is known.
pub fn analyze(
    tracker: &mut KeyTracker,
    history: &[String],
    notes: &[u8],
    options: &AnalysisOptions,
) -> Analysis {
    let chord = detect_chord(notes);
    if let Some(label) = &chord {
        tracker.add_chord(label);
    }

    let keys = tracker.detect();
    let key = keys.first().map(|k| format!("{} {}", k.root, k.scale));

    let mut mode_history = history.to_vec();
    mode_history.extend(chord.iter().cloned());
    let mode = detect_mode_from_chords(&mode_history);

    let chord_ref = chord.as_deref();
    let (diatonic, next_chords) = match key.as_deref() {
        Some(k) => (
            suggest_diatonic_chords(k, chord_ref),
            suggest_next_chords(history, k, options.memory_length),
        ),
        None => (Vec::new(), Vec::new()),
    };

    let metadata = chord_ref.and_then(|c| get_chord_metadata(c, options.octave));
    let scales = suggest_scales(key.as_deref(), chord_ref);
    let extensions = chord_ref.map(suggest_extensions).unwrap_or_default();

    Analysis {
        chord,
        metadata,
        scales,
        extensions,
        intervals: suggest_intervals(notes),
        keys,
        mode,
        diatonic,
        next_chords,
    }
}

/// Serialize an analysis to JSON for hosts across the FFI boundary.
pub fn analysis_to_json(analysis: &Analysis) -> String {
    serde_json::to_string(analysis).unwrap_or_else(|_| "{}".to_string())
}
