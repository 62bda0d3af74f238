//! Rolling key inference over the most recent chords.
//!
//! The tracker keeps a ring buffer of the last [`HISTORY_CAPACITY`] chords
//! (as pitch-class sets plus root).  Every (root, scale) candidate is scored
//! by the fraction of historical chord tones that fall inside the scale, with
//! a small bonus when the candidate root matches the most recent chord root.

use std::collections::VecDeque;

use serde::Serialize;

use crate::chords::parse_label;
use crate::pitch::pitch_class_name;
use crate::scales::{scale_pitch_classes, SCALES};

/// Number of chords remembered.
pub const HISTORY_CAPACITY: usize = 10;

/// Number of estimates returned by [`KeyTracker::detect`].
pub const MAX_ESTIMATES: usize = 5;

/// Bonus for a candidate rooted on the most recent chord's root.
const RECENT_ROOT_BONUS: f64 = 0.15;

/// A candidate key with its score (containment fraction plus bonus).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEstimate {
    pub root: String,
    pub scale: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
struct HistoryEntry {
    pitch_classes: Vec<u8>,
    root: u8,
}

/// Stateful key tracker for one analysis session.
#[derive(Debug, Clone, Default)]
pub struct KeyTracker {
    history: VecDeque<HistoryEntry>,
}

impl KeyTracker {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Record a chord. Unparsable labels are ignored.
    pub fn add_chord(&mut self, label: &str) {
        let Some(chord) = parse_label(label) else {
            return;
        };
        if self.history.len() == HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry {
            pitch_classes: chord.pitch_classes(),
            root: chord.root,
        });
    }

    /// Up to [`MAX_ESTIMATES`] key estimates, best first. Empty when no
    /// chords have been recorded.
    pub fn detect(&self) -> Vec<KeyEstimate> {
        let Some(last) = self.history.back() else {
            return Vec::new();
        };
        let total: usize = self.history.iter().map(|e| e.pitch_classes.len()).sum();
        if total == 0 {
            return Vec::new();
        }

        let mut estimates = Vec::with_capacity(12 * SCALES.len());
        for root in 0..12u8 {
            for &(name, intervals) in SCALES {
                let mut in_scale = [false; 12];
                for pc in scale_pitch_classes(intervals, root) {
                    in_scale[pc as usize] = true;
                }
                let hits: usize = self
                    .history
                    .iter()
                    .flat_map(|e| e.pitch_classes.iter())
                    .filter(|&&pc| in_scale[pc as usize])
                    .count();

                let mut score = hits as f64 / total as f64;
                if last.root == root {
                    score += RECENT_ROOT_BONUS;
                }
                estimates.push(KeyEstimate {
                    root: pitch_class_name(root).to_string(),
                    scale: name.to_string(),
                    score,
                });
            }
        }

        // Stable: equal scores keep root-then-table order.
        estimates.sort_by(|a, b| b.score.total_cmp(&a.score));
        estimates.truncate(MAX_ESTIMATES);
        log::trace!("key estimates: {estimates:?}");
        estimates
    }

    /// Forget all recorded chords.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
