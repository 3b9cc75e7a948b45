use grokgram_core::{split_response, split_text, SplitWarning};

// ========================================================================
// Logical chunks
// ========================================================================

#[test]
fn test_short_text_is_one_trimmed_unit() {
    let split = split_text("  \n hello <b>world</b>\n\n ");
    assert_eq!(split.units, vec!["hello <b>world</b>".to_string()]);
    assert!(split.warnings.is_empty());
}

#[test]
fn test_empty_and_blank_input_yield_nothing() {
    assert!(split_text("").units.is_empty());
    assert!(split_text("   \n\t ").units.is_empty());
    assert!(split_text("<!--SPLIT--> <!--SPLIT-->\n<!--SPLIT-->").units.is_empty());
}

#[test]
fn test_split_on_marker() {
    let split = split_text("first part<!--SPLIT-->second part");
    assert_eq!(split.units, vec!["first part".to_string(), "second part".to_string()]);
}

#[test]
fn test_marker_pieces_are_trimmed_and_empty_ones_dropped() {
    let split = split_text("\n one \n<!--SPLIT-->\n\n<!--SPLIT-->  two<!--SPLIT-->");
    assert_eq!(split.units, vec!["one".to_string(), "two".to_string()]);
}

#[test]
fn test_chunk_count_bounded_by_markers() {
    let inputs = [
        "a<!--SPLIT-->b<!--SPLIT-->c",
        "<!--SPLIT-->a<!--SPLIT--><!--SPLIT-->",
        "no markers at all",
        "x<!--SPLIT-->   ",
    ];
    for input in inputs {
        let markers = input.matches("<!--SPLIT-->").count();
        let split = split_text(input);
        assert!(split.units.len() <= markers + 1, "{input:?}");
        assert!(split.units.iter().all(|u| !u.trim().is_empty()));
        assert!(split.units.iter().all(|u| !u.contains("<!--SPLIT-->")));
    }
}

// ========================================================================
// Oversized chunks
// ========================================================================

#[test]
fn test_oversized_without_safe_point_is_hard_cut() {
    let text = "A".repeat(5000);
    let split = split_text(&text);

    assert_eq!(split.units.len(), 2);
    assert_eq!(split.units[0].chars().count(), 4000);
    assert_eq!(split.units[1].chars().count(), 1000);
    assert!(split.warnings.contains(&SplitWarning::HardCut { chunk: 0, cuts: 1 }));
    assert!(split.warnings.contains(&SplitWarning::Oversized { chunk: 0, parts: 2 }));
}

#[test]
fn test_hard_cuts_reported_once_per_chunk() {
    let text = format!("{}<!--SPLIT-->{}", "A".repeat(40_000), "B".repeat(9000));
    let split = split_text(&text);

    assert_eq!(split.units.len(), 13);
    let hard_cuts: Vec<&SplitWarning> = split
        .warnings
        .iter()
        .filter(|w| matches!(w, SplitWarning::HardCut { .. }))
        .collect();
    assert_eq!(
        hard_cuts,
        vec![
            &SplitWarning::HardCut { chunk: 0, cuts: 9 },
            &SplitWarning::HardCut { chunk: 1, cuts: 2 },
        ]
    );
}

#[test]
fn test_blank_windows_not_counted_as_parts() {
    let text = format!("a{}b", " ".repeat(9000));
    let split = split_text(&text);

    // The middle window is all spaces and is never emitted
    assert_eq!(split.units.len(), 2);
    assert!(split.units[0].starts_with('a'));
    assert!(split.units[1].ends_with('b'));
    assert!(split.warnings.contains(&SplitWarning::Oversized { chunk: 0, parts: 2 }));
}

#[test]
fn test_exactly_at_limit_is_not_split() {
    let text = "B".repeat(4096);
    let split = split_text(&text);
    assert_eq!(split.units, vec![text]);
    assert!(split.warnings.is_empty());
}

#[test]
fn test_one_over_limit_is_split() {
    let text = "B".repeat(4097);
    let split = split_text(&text);
    assert_eq!(split.units.len(), 2);
    assert_eq!(split.units[0].chars().count(), 4000);
    assert_eq!(split.units[1].chars().count(), 97);
}

#[test]
fn test_oversized_cuts_before_last_whitespace() {
    let text = "lorem ipsum dolor ".repeat(600);
    let chunk = text.trim();
    let split = split_text(&text);

    assert!(split.units.len() >= 3);
    for unit in &split.units {
        assert!(unit.chars().count() <= 4000);
    }
    // Every cut landed on whitespace, so later units start with it
    for unit in &split.units[1..] {
        assert!(unit.starts_with(' '), "{:?}", &unit[..10]);
    }
    assert!(!split
        .warnings
        .iter()
        .any(|w| matches!(w, SplitWarning::HardCut { .. })));
    assert_eq!(split.units.concat(), chunk);
}

#[test]
fn test_oversized_cuts_after_closing_angle_bracket() {
    let text = format!("{}<b>{}", "a".repeat(3990), "c".repeat(2000));
    let split = split_text(&text);

    assert_eq!(split.units.len(), 2);
    assert_eq!(split.units[0], format!("{}<b>", "a".repeat(3990)));
    assert_eq!(split.units[1], "c".repeat(2000));
}

#[test]
fn test_oversized_multibyte_units_are_complete_and_lossless() {
    let text: String = "Привет, мир! 🌍🚀 ".repeat(400) + &"ж".repeat(5000);
    let chunk = text.trim().to_string();
    let split = split_text(&text);

    assert!(split.units.len() > 1);
    for unit in &split.units {
        assert!(unit.chars().count() <= 4000);
        // Round-trips through UTF-8 validation, i.e. no torn codepoint
        assert!(std::str::from_utf8(unit.as_bytes()).is_ok());
    }
    assert_eq!(split.units.concat(), chunk);
}

#[test]
fn test_each_marker_chunk_is_split_independently() {
    let text = format!("{}<!--SPLIT-->short<!--SPLIT-->{}", "x".repeat(4500), "y".repeat(4200));
    let split = split_text(&text);

    assert_eq!(split.units.len(), 5);
    assert_eq!(split.units[0], "x".repeat(4000));
    assert_eq!(split.units[1], "x".repeat(500));
    assert_eq!(split.units[2], "short");
    assert_eq!(split.units[3], "y".repeat(4000));
    assert_eq!(split.units[4], "y".repeat(200));
    assert!(split.warnings.contains(&SplitWarning::Oversized { chunk: 2, parts: 2 }));
}

#[test]
fn test_splitting_is_deterministic() {
    let text = format!("{} end<!--SPLIT-->tail", "word ".repeat(2000));
    assert_eq!(split_text(&text), split_text(&text));
}

// ========================================================================
// Encoding
// ========================================================================

#[test]
fn test_invalid_utf8_chunk_dropped_others_kept() {
    let mut raw = b"good<!--SPLIT-->".to_vec();
    raw.extend_from_slice(&[0xff, 0xfe, b' ', b'b', b'a', b'd']);
    raw.extend_from_slice(b"<!--SPLIT-->also good");

    let split = split_response(&raw);
    assert_eq!(split.units, vec!["good".to_string(), "also good".to_string()]);
    assert_eq!(split.warnings, vec![SplitWarning::InvalidEncoding { chunk: 1 }]);
}

#[test]
fn test_truncated_codepoint_is_invalid() {
    // "é" is 0xC3 0xA9; keep only the lead byte
    let raw = [b'c', b'a', b'f', 0xC3];
    let split = split_response(&raw);
    assert!(split.units.is_empty());
    assert_eq!(split.warnings, vec![SplitWarning::InvalidEncoding { chunk: 0 }]);
}

#[test]
fn test_invalid_byte_drops_only_the_unit_containing_it() {
    let mut raw = "word ".repeat(2000).into_bytes();
    raw.push(0xff);

    let split = split_response(&raw);

    assert_eq!(split.units.len(), 2);
    assert_eq!(split.units.concat(), "word ".repeat(1600).trim_end());
    assert_eq!(
        split.warnings,
        vec![
            SplitWarning::InvalidEncoding { chunk: 0 },
            SplitWarning::Oversized { chunk: 0, parts: 2 },
        ]
    );
}

#[test]
fn test_invalid_byte_in_middle_window_keeps_neighbours() {
    let mut raw = "a".repeat(3999).into_bytes();
    raw.push(b' ');
    raw.extend_from_slice("b".repeat(2000).as_bytes());
    raw.extend_from_slice(&[0xC3, 0x28]);
    raw.extend_from_slice("b".repeat(1997).as_bytes());
    raw.push(b' ');
    raw.extend_from_slice("c".repeat(100).as_bytes());

    let split = split_response(&raw);

    assert_eq!(split.units, vec!["a".repeat(3999), format!(" {}", "c".repeat(100))]);
    let dropped = split
        .warnings
        .iter()
        .filter(|w| matches!(w, SplitWarning::InvalidEncoding { chunk: 0 }))
        .count();
    assert_eq!(dropped, 1);
}
