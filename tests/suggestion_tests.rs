//! Integration tests for the suggestion engine and voicings.

use chordlib::{
    apply_extension, calculate_voice_leading_cost, get_chord_metadata, suggest_diatonic_chords,
    suggest_extensions, suggest_intervals, suggest_modal_next_chords, suggest_next_chords,
    suggest_scales, ChurchMode,
};
use pretty_assertions::assert_eq;

fn history(chords: &[&str]) -> Vec<String> {
    chords.iter().map(|c| c.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════════
// Diatonic chords and scales
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn diatonic_suggestions_never_repeat_current_chord() {
    let all = suggest_diatonic_chords("C Major", None);
    assert_eq!(all.len(), 7);
    for current in &all {
        let s = suggest_diatonic_chords("C Major", Some(&current.name));
        assert_eq!(s.len(), 6);
        assert!(s.iter().all(|x| x.name != current.name), "{} was suggested", current.name);
    }
    println!("✓ diatonic suggestions exclude the current chord");
}

#[test]
fn scales_for_a_minor_chord_in_a_minor() {
    let s = suggest_scales(Some("A Natural Minor"), Some("A Minor"));
    assert_eq!(s[0].name, "A Natural Minor");
    assert_eq!(s[0].function, "7-note scale");
    assert!(s.iter().all(|x| x.name.starts_with("A ")));
    assert!(!s.iter().any(|x| x.name == "A Major"));
    println!("✓ {} scales fit A Minor", s.len());
}

// ═══════════════════════════════════════════════════════════════════════
// Extensions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn apply_extension_policy() {
    assert_eq!(apply_extension("C Major", "Maj7").as_deref(), Some("C Maj7"));
    assert_eq!(apply_extension("C Sus2", "Maj7"), None);
    assert_eq!(apply_extension("C Sus4", "add6").as_deref(), Some("C Sus4 add6"));
    assert_eq!(apply_extension("C Major", "Banana"), None);
    assert_eq!(apply_extension("nonsense", "Maj7"), None);
    println!("✓ extension policy");
}

#[test]
fn modal_modifiers_stack_without_duplicates() {
    let step1 = apply_extension("D Sus2", "add2").unwrap();
    let step2 = apply_extension(&step1, "add6").unwrap();
    assert_eq!(step2, "D Sus2 add2 add6");
    assert_eq!(apply_extension(&step2, "add2").as_deref(), Some("D Sus2 add2 add6"));

    // The whole modifier menu stays on offer; picking a present one is a no-op.
    let offered: Vec<String> = suggest_extensions(&step2).into_iter().map(|s| s.name).collect();
    assert_eq!(offered.len(), 8);
    for token in &offered {
        let applied = apply_extension(&step2, token).unwrap();
        assert!(applied.starts_with("D Sus2 add2 add6"), "{token} gave {applied}");
    }
    assert_eq!(apply_extension(&step2, "add6").as_deref(), Some("D Sus2 add2 add6"));
    println!("✓ modifier stacking: {step2}");
}

#[test]
fn extension_menu_for_triads() {
    let major = suggest_extensions("F Major");
    assert_eq!(major[0].name, "Maj7");
    assert_eq!(major[0].function, "Major 7th");
    let minor = suggest_extensions("E Minor");
    assert_eq!(minor[0].name, "Min7");
    assert!(suggest_extensions("C Maj7").is_empty());
    println!("✓ extension menus");
}

// ═══════════════════════════════════════════════════════════════════════
// Interval completions
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn fifth_completes_major_third_to_c_major() {
    let s = suggest_intervals(&[60, 64]);
    let fifth = s.iter().find(|x| x.interval == "+7").unwrap();
    assert_eq!(fifth.note, 67);
    assert_eq!(fifth.result(), "C Major");
    // The major 3rd is already held.
    assert!(!s.iter().any(|x| x.interval == "+4"));
    println!("✓ +7 over C-E → {}", fifth.result());
}

#[test]
fn single_note_has_no_chord_yet() {
    let s = suggest_intervals(&[62]);
    assert_eq!(s.len(), 5);
    assert!(s.iter().all(|x| x.result() == "(no chord yet)"));
    assert!(suggest_intervals(&[60, 64, 67]).is_empty());
    println!("✓ single-note intervals");
}

// ═══════════════════════════════════════════════════════════════════════
// Next chords
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn dominant_resolves_to_tonic() {
    let s = suggest_next_chords(&history(&["D Minor", "G Major"]), "C Major", 3);
    assert_eq!(s[0].name, "C Major");
    assert_eq!(s[0].function, "I");
    assert!(s.len() <= 5);
    assert!(s.iter().all(|x| x.confidence > 0.0 && x.confidence <= 1.0));
    assert!(s.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    println!("✓ V → {} ({:.2})", s[0].name, s[0].confidence);
}

#[test]
fn recency_window_counts_each_occurrence() {
    let prog = history(&["F Major", "A Minor", "F Major", "C Major"]);
    let f_score = |memory: usize| {
        suggest_next_chords(&prog, "C Major", memory)
            .into_iter()
            .find(|s| s.name == "F Major")
            .map(|s| s.confidence)
    };

    // Window [C]: I → IV bonus, voice leading C4 E4 G4 → F4 A4 C5 costs 8.
    let outside = f_score(1).unwrap();
    assert!((outside - 0.15).abs() < 1e-9, "got {outside}");
    // Window [F, C]: one F in range costs 0.1.
    let once = f_score(2).unwrap();
    assert!((outside - once - 0.1).abs() < 1e-9, "got {once}");
    // Window [Am, F, C]: the A Minor does not count against F.
    assert!((f_score(3).unwrap() - once).abs() < 1e-9);
    // Window covers both Fs: 0.15 - 0.2 drops out.
    assert_eq!(f_score(4), None);
    println!("✓ recency window: {outside:.2} → {once:.2} → dropped");
}

#[test]
fn subdominant_moves_to_dominant() {
    let s = suggest_next_chords(&history(&["F Major"]), "C Major", 3);
    let names: Vec<&str> = s.iter().map(|x| x.name.as_str()).collect();
    assert_eq!(&names[..3], &["C Major", "G Major", "A Minor"]);

    // IV → V: 0.4 + 0.25 - 6 semitones × 0.05.
    assert!((s[1].confidence - 0.35).abs() < 1e-9);
    let mediant = s.iter().find(|x| x.name == "E Minor").map_or(0.0, |x| x.confidence);
    assert!(s[1].confidence > mediant);
    println!("✓ IV → V ({:.2}) beats IV → iii ({mediant:.2})", s[1].confidence);
}

#[test]
fn next_chords_need_a_seven_note_key() {
    assert!(suggest_next_chords(&history(&["C Major"]), "C Blues", 3).is_empty());
    assert!(suggest_next_chords(&history(&["C Major"]), "Q Major", 3).is_empty());
    println!("✓ no next chords without a heptatonic key");
}

#[test]
fn modal_next_chords_favor_tonic() {
    let s = suggest_modal_next_chords(ChurchMode::Dorian, "D", None);
    assert_eq!(s.len(), 7);
    assert_eq!(s[0].name, "D Minor");
    assert_eq!(s[0].function, "i");
    println!("✓ D Dorian starts on {}", s[0].name);
}

// ═══════════════════════════════════════════════════════════════════════
// Voicing
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn voice_leading_cost_properties() {
    let c = get_chord_metadata("C Major", 4).unwrap().midi_notes;
    let f = get_chord_metadata("F Major", 4).unwrap().midi_notes;
    let g = get_chord_metadata("G Major", 3).unwrap().midi_notes;

    for v in [&c, &f, &g] {
        assert_eq!(calculate_voice_leading_cost(v, v), 0);
    }
    // C4 E4 G4 → F4 A4 C5: C up 5, E up 1, G by 2.
    assert_eq!(calculate_voice_leading_cost(&c, &f), 8);
    assert_eq!(calculate_voice_leading_cost(&c, &[]), 0);
    println!("✓ voice-leading cost");
}
