//! MIDI export of a finished chord progression.
//!
//! Produces a Standard MIDI File (SMF) Format 0 as raw bytes: one track
//! holding a tempo meta-event, then for each chord all note-ons together
//! followed by all note-offs `beats_per_chord` beats later.

use serde::Deserialize;

use crate::chords::parse_label;
use crate::voicing::{styled_voicing, VoicingStyle, DEFAULT_OCTAVE};

// ═══════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════

/// Named register, mapping to the octave the chords are voiced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Register {
    Sub,
    Bass,
    Mid,
    Harmony,
}

impl Register {
    pub fn octave(self) -> i8 {
        match self {
            Register::Sub => 1,
            Register::Bass => 2,
            Register::Mid => 3,
            Register::Harmony => 4,
        }
    }
}

/// Options controlling the exported file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub bpm: f64,
    pub beats_per_chord: f64,
    pub velocity: u8,
    pub register: Option<Register>,
    /// Explicit octave; takes precedence over `register`.
    pub octave: Option<i8>,
    pub voicing_style: VoicingStyle,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            beats_per_chord: 2.0,
            velocity: 100,
            register: None,
            octave: None,
            voicing_style: VoicingStyle::Triad,
        }
    }
}

impl ExportOptions {
    /// Octave chords are voiced in: explicit octave, then register, then 4.
    pub fn resolved_octave(&self) -> i8 {
        self.octave
            .or(self.register.map(Register::octave))
            .unwrap_or(DEFAULT_OCTAVE)
    }

    /// Chord length in ticks, kept within what a 4-byte delta can hold.
    fn ticks_per_chord(&self) -> u32 {
        let ticks = (self.beats_per_chord * TICKS_PER_QUARTER as f64).round();
        if ticks.is_nan() {
            return 0;
        }
        ticks.clamp(0.0, MAX_DELTA_TICKS as f64) as u32
    }
}

/// A single MIDI event (note on/off, meta event)
#[derive(Debug, Clone)]
pub struct MidiEvent {
    /// Absolute time in ticks from the start of the track
    pub tick: u32,
    /// Raw MIDI message bytes (status + data)
    pub bytes: Vec<u8>,
}

/// Ticks per quarter note in our MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Largest delta time a variable-length quantity may encode (4 bytes).
const MAX_DELTA_TICKS: u32 = 0x0FFF_FFFF;

/// Tempo used when none (or a non-positive one) is given.
pub const DEFAULT_BPM: f64 = 120.0;

/// Encode a chord progression as a Standard MIDI File (Format 0).
///
/// An empty progression gives an empty buffer.  Chords that fail to parse
/// are skipped.
pub fn export_progression_to_midi(progression: &[String], options: &ExportOptions) -> Vec<u8> {
    if progression.is_empty() {
        return Vec::new();
    }

    let octave = options.resolved_octave();
    let chord_ticks = options.ticks_per_chord();
    let velocity = options.velocity & 0x7F;

    let mut events = vec![tempo_event(0, options.bpm)];
    let mut tick: u32 = 0;
    for label in progression {
        let Some(chord) = parse_label(label) else {
            continue;
        };
        let notes = styled_voicing(&chord, octave, options.voicing_style);
        if notes.is_empty() {
            log::debug!("'{label}' has no notes at octave {octave}, skipped");
            continue;
        }

        for &note in &notes {
            events.push(MidiEvent {
                tick,
                bytes: vec![0x90, note & 0x7F, velocity],
            });
        }
        let off_tick = tick.saturating_add(chord_ticks);
        for &note in &notes {
            events.push(MidiEvent {
                tick: off_tick,
                bytes: vec![0x80, note & 0x7F, 0],
            });
        }
        tick = off_tick;
    }

    log::debug!("exported {} chords, {} ticks", progression.len(), tick);
    build_smf(&encode_track(&events))
}

// ═══════════════════════════════════════════════════════════════════════
// SMF byte encoding
// ═══════════════════════════════════════════════════════════════════════

/// Wrap one encoded track in a Format 0 file: MThd (format 0, one track,
/// [`TICKS_PER_QUARTER`] division) followed by its MTrk chunk.
fn build_smf(track: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(22 + track.len());
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&TICKS_PER_QUARTER.to_be_bytes());

    out.extend_from_slice(b"MTrk");
    out.extend_from_slice(&(track.len() as u32).to_be_bytes());
    out.extend_from_slice(track);
    out
}

/// Tempo meta-event: FF 51 03 tt tt tt (microseconds per quarter).
fn tempo_event(tick: u32, bpm: f64) -> MidiEvent {
    let bpm = if bpm > 0.0 { bpm } else { DEFAULT_BPM };
    let uspq = (60_000_000.0 / bpm).round().min(0xFF_FFFF as f64) as u32;
    MidiEvent {
        tick,
        bytes: vec![
            0xFF,
            0x51,
            0x03,
            ((uspq >> 16) & 0xFF) as u8,
            ((uspq >> 8) & 0xFF) as u8,
            (uspq & 0xFF) as u8,
        ],
    }
}

/// Encode a track's events into raw MTrk bytes (delta-time encoded).
/// Events at the same tick keep their insertion order.
fn encode_track(events: &[MidiEvent]) -> Vec<u8> {
    let mut data = Vec::new();

    let mut sorted: Vec<&MidiEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.tick);

    let mut last_tick: u32 = 0;
    for event in &sorted {
        let delta = event.tick.saturating_sub(last_tick);
        write_vlq(&mut data, delta);
        data.extend_from_slice(&event.bytes);
        last_tick = event.tick;
    }

    // End of track
    data.extend_from_slice(&[0x00, 0xFF, 0x2F, 0x00]);

    data
}

/// Write a variable-length quantity (VLQ) to a byte vector.
fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    if value == 0 {
        out.push(0);
        return;
    }
    let mut buf = [0u8; 5];
    let mut i = 0;
    while value > 0 {
        buf[i] = (value & 0x7F) as u8;
        value >>= 7;
        if i > 0 {
            buf[i] |= 0x80;
        }
        i += 1;
    }
    // Write in reverse order
    for j in (0..i).rev() {
        out.push(buf[j]);
    }
}
