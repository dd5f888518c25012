use pdf_writer::{Content, Name, Str};

use crate::fonts::{FontEntry, FontMetrics};

#[derive(Clone, Copy, PartialEq)]
pub(crate) enum HAlign {
    Left,
    Right,
}

/// Greedy word wrap into lines no wider than `max_width`. Words that fit are
/// space-joined onto the current line; a word that alone exceeds the width
/// is hard-split character by character, and the trailing fragment carries
/// into the next accumulation. Never returns an empty sequence: empty or
/// whitespace-only input yields a single empty line.
///
/// Pure function of text, width and font metrics — no drawing involved.
pub fn wrap_text(text: &str, max_width: f32, font: &FontMetrics, font_size: f32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut buf = String::new();
    let mut buf_w = 0.0f32;
    let space_w = font.space_width(font_size);

    for word in text.split_whitespace() {
        let word_w = font.text_width(word, font_size);
        let joined_w = if buf.is_empty() {
            word_w
        } else {
            buf_w + space_w + word_w
        };
        if joined_w <= max_width {
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(word);
            buf_w = joined_w;
            continue;
        }

        if !buf.is_empty() {
            lines.push(std::mem::take(&mut buf));
            buf_w = 0.0;
        }
        if word_w > max_width {
            let mut piece = String::new();
            let mut piece_w = 0.0f32;
            for ch in word.chars() {
                let ch_w = font.char_width(ch, font_size);
                if piece.is_empty() || piece_w + ch_w <= max_width {
                    piece.push(ch);
                    piece_w += ch_w;
                } else {
                    lines.push(std::mem::take(&mut piece));
                    piece.push(ch);
                    piece_w = ch_w;
                }
            }
            buf = piece;
            buf_w = piece_w;
        } else {
            buf.push_str(word);
            buf_w = word_w;
        }
    }

    if !buf.is_empty() {
        lines.push(buf);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Rendered height of `text` wrapped into `width`: line count × line height.
/// Used to size table rows before anything is drawn.
pub fn height_for(
    text: &str,
    width: f32,
    font: &FontMetrics,
    font_size: f32,
    line_height: f32,
) -> f32 {
    wrap_text(text, width, font, font_size).len() as f32 * line_height
}

/// Draw one line of text with its baseline at `(x, baseline_y)`.
pub(crate) fn draw_line(
    content: &mut Content,
    font: &FontEntry,
    text: &str,
    x: f32,
    baseline_y: f32,
    font_size: f32,
) {
    if text.is_empty() {
        return;
    }
    content
        .begin_text()
        .set_font(Name(font.pdf_name.as_bytes()), font_size)
        .next_line(x, baseline_y)
        .show(Str(&font.encode(text)))
        .end_text();
}

/// Wrap `text` into `width` and draw the lines top-down from
/// `first_baseline_y`, each aligned within the span starting at `x`.
/// Right-aligned lines are positioned flush to `x + width` by measured
/// width.
pub(crate) fn draw_wrapped(
    content: &mut Content,
    font: &FontEntry,
    text: &str,
    x: f32,
    first_baseline_y: f32,
    width: f32,
    font_size: f32,
    line_height: f32,
    align: HAlign,
) {
    let mut baseline_y = first_baseline_y;
    for line in wrap_text(text, width, &font.metrics, font_size) {
        let line_x = match align {
            HAlign::Left => x,
            HAlign::Right => x + width - font.metrics.text_width(&line, font_size),
        };
        draw_line(content, font, &line, line_x, baseline_y, font_size);
        baseline_y -= line_height;
    }
}
