//! chordlib — real-time chord, key and mode inference with playing suggestions.
//!
//! Feed it the notes currently held on a keyboard and it tells you which
//! chord is sounding, what key and church mode the recent chords imply, and
//! what would make sense to play or add next.  A finished progression can
//! be exported as a Standard MIDI File.
//!
//! # Example
//! ```
//! use chordlib::{detect_chord, KeyTracker, suggest_next_chords};
//!
//! let chord = detect_chord(&[60, 64, 67]).unwrap();
//! assert_eq!(chord, "C Major");
//!
//! let mut tracker = KeyTracker::new();
//! for c in ["D Minor", "G Major", &chord] {
//!     tracker.add_chord(c);
//! }
//! let key = &tracker.detect()[0];
//! assert_eq!((key.root.as_str(), key.scale.as_str()), ("C", "Major"));
//!
//! let history = vec!["D Minor".to_string(), "G Major".to_string()];
//! let next = suggest_next_chords(&history, "C Major", 3);
//! assert_eq!(next[0].name, "C Major");
//! ```

pub mod analysis;
pub mod chords;
pub mod detect;
pub mod error;
pub mod key_tracker;
pub mod midi;
pub mod mode;
pub mod pitch;
pub mod playback;
pub mod scales;
pub mod suggest;
pub mod voicing;

#[cfg(target_os = "android")]
pub mod android;

pub use analysis::{analysis_to_json, analyze, Analysis, AnalysisOptions};
pub use chords::{ChordLabel, Modifier, Quality};
pub use detect::detect_chord;
pub use error::ParseError;
pub use key_tracker::{KeyEstimate, KeyTracker};
pub use midi::{export_progression_to_midi, ExportOptions, Register};
pub use mode::{detect_mode_from_chords, suggest_modal_next_chords, ChurchMode, ModalEstimate};
pub use playback::{schedule_progression, PlaybackOptions, ScheduledNote};
pub use scales::KeyLabel;
pub use suggest::{
    apply_extension, suggest_diatonic_chords, suggest_extensions, suggest_intervals,
    suggest_next_chords, suggest_scales, IntervalSuggestion, Suggestion,
};
pub use voicing::{calculate_voice_leading_cost, get_chord_metadata, ChordMetadata, VoicingStyle};

/// Parse a JSON array of chord labels.
pub fn progression_from_json(json: &str) -> Result<Vec<String>, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid progression JSON: {e}"))
}

/// Export a progression given as JSON, with optional JSON options.
/// Missing option fields take their defaults.
pub fn export_progression_json(
    progression_json: &str,
    options_json: Option<&str>,
) -> Result<Vec<u8>, String> {
    let progression = progression_from_json(progression_json)?;
    let options = match options_json.map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| format!("Invalid export options JSON: {e}"))?,
        None => ExportOptions::default(),
    };
    Ok(export_progression_to_midi(&progression, &options))
}

// ═══════════════════════════════════════════════════════════════════════
// C FFI — for iOS (static library) and desktop hosts
// ═══════════════════════════════════════════════════════════════════════

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

fn string_to_c(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

/// Detect the chord formed by `len` note numbers.
/// Returns null when no chord is recognised.  The caller must free the
/// returned string with `chordlib_free_string`.
///
/// # Safety
/// `notes` must point to `len` valid bytes.
#[no_mangle]
pub unsafe extern "C" fn chordlib_detect_chord(notes: *const u8, len: usize) -> *mut c_char {
    if notes.is_null() || len == 0 {
        return std::ptr::null_mut();
    }
    let notes = unsafe { std::slice::from_raw_parts(notes, len) };
    match detect_chord(notes) {
        Some(label) => string_to_c(label),
        None => std::ptr::null_mut(),
    }
}

/// Create a key tracker for one analysis session.
/// Free it with `chordlib_tracker_free`.
#[no_mangle]
pub extern "C" fn chordlib_tracker_new() -> *mut KeyTracker {
    Box::into_raw(Box::new(KeyTracker::new()))
}

/// Clear a tracker's chord history.
///
/// # Safety
/// `tracker` must come from `chordlib_tracker_new`, or be null.
#[no_mangle]
pub unsafe extern "C" fn chordlib_tracker_reset(tracker: *mut KeyTracker) {
    if let Some(tracker) = unsafe { tracker.as_mut() } {
        tracker.reset();
    }
}

/// Free a tracker.
///
/// # Safety
/// `tracker` must come from `chordlib_tracker_new`, or be null.
#[no_mangle]
pub unsafe extern "C" fn chordlib_tracker_free(tracker: *mut KeyTracker) {
    if !tracker.is_null() {
        unsafe {
            drop(Box::from_raw(tracker));
        }
    }
}

/// Run one analysis cycle and return it as JSON.
///
/// `history_json` is the caller's committed progression as a JSON array of
/// chord labels, or null for none.  The caller must free the returned
/// string with `chordlib_free_string`.
///
/// # Safety
/// `tracker` must come from `chordlib_tracker_new`.  `notes` must point to
/// `len` valid bytes (or be null with `len` 0).  `history_json` must be a
/// valid null-terminated UTF-8 C string, or null.
#[no_mangle]
pub unsafe extern "C" fn chordlib_analyze(
    tracker: *mut KeyTracker,
    notes: *const u8,
    len: usize,
    history_json: *const c_char,
) -> *mut c_char {
    let Some(tracker) = (unsafe { tracker.as_mut() }) else {
        return std::ptr::null_mut();
    };
    let notes: &[u8] = if notes.is_null() || len == 0 {
        &[]
    } else {
        unsafe { std::slice::from_raw_parts(notes, len) }
    };
    let history = if history_json.is_null() {
        Vec::new()
    } else {
        let json = match unsafe { CStr::from_ptr(history_json) }.to_str() {
            Ok(s) => s,
            Err(_) => return std::ptr::null_mut(),
        };
        match progression_from_json(json) {
            Ok(h) => h,
            Err(_) => return std::ptr::null_mut(),
        }
    };

    let result = analyze(tracker, &history, notes, &AnalysisOptions::default());
    string_to_c(analysis_to_json(&result))
}

/// Export a progression to MIDI file bytes.
///
/// On success writes the buffer length to `out_len` and returns a buffer
/// the caller must free with `chordlib_free_bytes`.  Returns null on bad
/// input.  An empty progression yields a non-null zero-length buffer.
///
/// # Safety
/// `progression_json` must be a valid null-terminated UTF-8 C string.
/// `options_json` may be null.  `out_len` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn chordlib_export_midi(
    progression_json: *const c_char,
    options_json: *const c_char,
    out_len: *mut usize,
) -> *mut u8 {
    if progression_json.is_null() || out_len.is_null() {
        return std::ptr::null_mut();
    }
    let progression = match unsafe { CStr::from_ptr(progression_json) }.to_str() {
        Ok(s) => s,
        Err(_) => return std::ptr::null_mut(),
    };
    let options = if options_json.is_null() {
        None
    } else {
        unsafe { CStr::from_ptr(options_json) }.to_str().ok()
    };

    match export_progression_json(progression, options) {
        Ok(bytes) => {
            let boxed = bytes.into_boxed_slice();
            unsafe { *out_len = boxed.len() };
            Box::into_raw(boxed) as *mut u8
        }
        Err(_) => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by chordlib functions.
///
/// # Safety
/// `ptr` must be a string previously returned by a chordlib function, or null.
#[no_mangle]
pub unsafe extern "C" fn chordlib_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            let _ = CString::from_raw(ptr);
        }
    }
}

/// Free a buffer returned by `chordlib_export_midi`.
///
/// # Safety
/// `ptr` and `len` must be exactly what `chordlib_export_midi` returned, or
/// `ptr` must be null.
#[no_mangle]
pub unsafe extern "C" fn chordlib_free_bytes(ptr: *mut u8, len: usize) {
    if !ptr.is_null() {
        unsafe {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(ptr, len)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_from_json_with_partial_options() {
        let bytes =
            export_progression_json(r#"["C Major", "G Major"]"#, Some(r#"{"bpm": 60}"#)).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
        // 60 BPM = 1_000_000 µs per quarter = 0x0F4240
        assert!(bytes.windows(6).any(|w| w == [0xFF, 0x51, 0x03, 0x0F, 0x42, 0x40]));
    }

    #[test]
    fn export_from_json_rejects_garbage() {
        assert!(export_progression_json("not json", None).is_err());
        assert!(export_progression_json("[]", Some("{\"bpm\": \"fast\"}")).is_err());
        assert_eq!(export_progression_json("[]", Some("  ")), Ok(Vec::new()));
    }

    #[test]
    fn ffi_round_trip() {
        let notes = [60u8, 64, 67];
        unsafe {
            let s = chordlib_detect_chord(notes.as_ptr(), notes.len());
            assert!(!s.is_null());
            assert_eq!(CStr::from_ptr(s).to_str().unwrap(), "C Major");
            chordlib_free_string(s);

            let tracker = chordlib_tracker_new();
            let history = CString::new(r#"["G Major"]"#).unwrap();
            let json = chordlib_analyze(tracker, notes.as_ptr(), notes.len(), history.as_ptr());
            assert!(CStr::from_ptr(json).to_str().unwrap().contains("\"chord\":\"C Major\""));
            chordlib_free_string(json);
            chordlib_tracker_free(tracker);

            let progression = CString::new(r#"["C Major"]"#).unwrap();
            let mut len = 0usize;
            let buf = chordlib_export_midi(progression.as_ptr(), std::ptr::null(), &mut len);
            assert!(!buf.is_null());
            assert_eq!(std::slice::from_raw_parts(buf, 4), b"MThd");
            chordlib_free_bytes(buf, len);
        }
    }
}
