use primka_pdf::{FontMetrics, height_for, wrap_text};

const SIZE: f32 = 9.5;

#[test]
fn empty_input_yields_one_empty_line() {
    let font = FontMetrics::helvetica();
    assert_eq!(wrap_text("", 100.0, &font, SIZE), vec![String::new()]);
    assert_eq!(wrap_text("   ", 100.0, &font, SIZE), vec![String::new()]);
}

#[test]
fn short_text_stays_on_one_line() {
    let font = FontMetrics::helvetica();
    let lines = wrap_text("Vijak M6", 200.0, &font, SIZE);
    assert_eq!(lines, vec!["Vijak M6".to_string()]);
}

#[test]
fn wrapping_is_total_and_reversible() {
    let font = FontMetrics::helvetica();
    let text = "pocinčani vijak s šesterokutnom glavom M6 x 40 mm";
    let width = 80.0;
    let lines = wrap_text(text, width, &font, SIZE);

    assert!(!lines.is_empty());
    for line in &lines {
        assert!(
            font.text_width(line, SIZE) <= width + 0.01,
            "line {line:?} exceeds {width}"
        );
    }
    // No word in this text is wider than the column, so joining the lines
    // reconstructs the whitespace-normalized input.
    let rejoined = lines.join(" ");
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    assert_eq!(rejoined, normalized);
}

#[test]
fn overlong_word_is_hard_split() {
    let font = FontMetrics::helvetica();
    let word = "x".repeat(50);
    let width = 40.0;
    let lines = wrap_text(&word, width, &font, SIZE);

    assert!(lines.len() > 1, "expected a mid-word break");
    for line in &lines {
        assert!(
            font.text_width(line, SIZE) <= width + 0.01,
            "fragment {line:?} exceeds {width}"
        );
    }
    // A hard split loses no characters.
    assert_eq!(lines.concat(), word);
}

#[test]
fn trailing_fragment_joins_following_words() {
    let font = FontMetrics::helvetica();
    let width = 40.0;
    let lines = wrap_text(&format!("{} kom", "x".repeat(10)), width, &font, SIZE);

    // The last fragment of the split word shares a line with the next word
    // when both fit.
    let last = lines.last().unwrap();
    assert!(last.ends_with(" kom"), "last line was {last:?}");
    assert_eq!(lines.concat().replace(' ', ""), format!("{}kom", "x".repeat(10)));
}

#[test]
fn height_is_line_count_times_line_height() {
    let font = FontMetrics::helvetica();
    let text = "pocinčani vijak s šesterokutnom glavom";
    let width = 80.0;
    let lines = wrap_text(text, width, &font, SIZE);
    assert_eq!(
        height_for(text, width, &font, SIZE, 10.0),
        lines.len() as f32 * 10.0
    );
    assert_eq!(height_for("", width, &font, SIZE, 10.0), 10.0);
}
