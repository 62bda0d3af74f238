//! JNI bindings for Android.
//!
//! These functions are called from Kotlin via the JNI bridge.

use jni::objects::{JClass, JIntArray, JString};
use jni::sys::{jbyteArray, jint, jstring};
use jni::JNIEnv;

use crate::{detect_chord, export_progression_json};

/// Detect the chord formed by the held notes.
///
/// Called from Kotlin as:
///   external fun detectChord(notes: IntArray): String?
#[no_mangle]
pub extern "system" fn Java_com_chordlib_app_ChordLib_detectChord(
    mut env: JNIEnv,
    _class: JClass,
    notes: JIntArray,
) -> jstring {
    let len = match env.get_array_length(&notes) {
        Ok(n) => n.max(0) as usize,
        Err(_) => return std::ptr::null_mut(),
    };
    let mut buf: Vec<jint> = vec![0; len];
    if env.get_int_array_region(&notes, 0, &mut buf).is_err() {
        return std::ptr::null_mut();
    }
    let notes: Vec<u8> = buf.iter().map(|&n| n.clamp(0, 127) as u8).collect();

    match detect_chord(&notes) {
        Some(label) => match env.new_string(&label) {
            Ok(js) => js.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        None => std::ptr::null_mut(),
    }
}

/// Export a progression (JSON array of chord labels) to MIDI file bytes.
///
/// Called from Kotlin as:
///   external fun exportProgression(progressionJson: String, optionsJson: String?): ByteArray?
#[no_mangle]
pub extern "system" fn Java_com_chordlib_app_ChordLib_exportProgression(
    mut env: JNIEnv,
    _class: JClass,
    progression_json: JString,
    options_json: JString,
) -> jbyteArray {
    let progression: String = match env.get_string(&progression_json) {
        Ok(s) => s.into(),
        Err(_) => return std::ptr::null_mut(),
    };
    let options: Option<String> = if options_json.is_null() {
        None
    } else {
        env.get_string(&options_json).ok().map(|s| s.into())
    };

    match export_progression_json(&progression, options.as_deref()) {
        Ok(bytes) => match env.byte_array_from_slice(&bytes) {
            Ok(arr) => arr.into_raw(),
            Err(_) => std::ptr::null_mut(),
        },
        Err(_) => std::ptr::null_mut(),
    }
}
