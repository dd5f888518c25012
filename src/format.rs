//! Locale-tolerant numeric presentation. Source cells may use a comma or a
//! point as the decimal separator; output always uses a point.

/// Replace a decimal comma with a point and parse. `None` when the text is
/// not numeric.
pub fn normalize_number(s: &str) -> Option<f64> {
    s.trim().replace(',', ".").parse::<f64>().ok()
}

/// Integer presentation: truncate toward zero. Non-numeric input passes
/// through trimmed but otherwise unchanged.
pub fn format_integer(s: &str) -> String {
    let t = s.trim();
    match normalize_number(t) {
        Some(n) => (n.trunc() as i64).to_string(),
        None => t.to_string(),
    }
}

/// Two-decimal presentation. Non-numeric input passes through trimmed but
/// otherwise unchanged.
pub fn format_fixed2(s: &str) -> String {
    let t = s.trim();
    match normalize_number(t) {
        Some(n) => fixed2(n),
        None => t.to_string(),
    }
}

/// Format with exactly two decimals, rounding half-up on the *decimal*
/// representation of the value rather than its binary approximation:
/// `fixed2(15.505)` is `"15.51"` even though the nearest f64 sits just
/// below the half. Negative values round half away from zero.
pub fn fixed2(n: f64) -> String {
    if !n.is_finite() {
        return format!("{n:.2}");
    }
    // Shortest round-trip decimal; f64 Display never uses exponent form.
    let repr = format!("{n}");
    let (sign, digits) = match repr.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", repr.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

    let mut frac: Vec<u8> = frac_part.bytes().take(3).collect();
    while frac.len() < 3 {
        frac.push(b'0');
    }

    // The value scaled by 100, as decimal digit values.
    let mut scaled: Vec<u8> = int_part
        .bytes()
        .chain(frac[..2].iter().copied())
        .map(|b| b - b'0')
        .collect();
    if frac[2] >= b'5' {
        let mut i = scaled.len();
        loop {
            if i == 0 {
                scaled.insert(0, 1);
                break;
            }
            i -= 1;
            if scaled[i] == 9 {
                scaled[i] = 0;
            } else {
                scaled[i] += 1;
                break;
            }
        }
    }

    let mut out = String::with_capacity(scaled.len() + 2);
    out.push_str(sign);
    for &d in &scaled[..scaled.len() - 2] {
        out.push((b'0' + d) as char);
    }
    out.push('.');
    for &d in &scaled[scaled.len() - 2..] {
        out.push((b'0' + d) as char);
    }
    out
}
