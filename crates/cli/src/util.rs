use unicode_width::UnicodeWidthStr;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
pub(crate) fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `width` display columns, adding ".." if truncated.
/// Uses Unicode display width so Hangul patient names stay aligned.
pub(crate) fn truncate_display(s: &str, width: usize) -> String {
    if width < 3 {
        for ch in s.chars() {
            let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
            if cw <= width {
                return ch.to_string();
            }
        }
        return String::new();
    }

    if UnicodeWidthStr::width(s) <= width {
        return s.to_string();
    }

    // Stop at width - 2 to leave room for ".."
    let budget = width - 2;
    let mut used = 0;
    let mut end_byte = 0;
    for (i, ch) in s.char_indices() {
        let cw = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            end_byte = i;
            break;
        }
        used += cw;
        end_byte = i + ch.len_utf8();
    }

    format!("{}..", &s[..end_byte])
}

/// Pad or truncate a string to exactly `width` display columns.
pub(crate) fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw > width {
        truncate_display(s, width)
    } else {
        format!("{}{}", s, " ".repeat(width - sw))
    }
}

/// Right-align within `width` display columns. Never truncates.
pub(crate) fn pad_left(s: &str, width: usize) -> String {
    let sw = display_width(s);
    format!("{}{}", " ".repeat(width.saturating_sub(sw)), s)
}

/// Whole won, half rounded up: `1234.5` → `1,235원`, `-1234` → `-1,234원`.
pub(crate) fn format_won(amount: f64) -> String {
    let v = round_won(amount);
    if v < 0 {
        format!("-{}원", group_thousands(v.unsigned_abs()))
    } else {
        format!("{}원", group_thousands(v.unsigned_abs()))
    }
}

/// Like [`format_won`] but always signed, and zero is plain `0원`.
pub(crate) fn format_won_signed(amount: f64) -> String {
    let v = round_won(amount);
    match v.signum() {
        0 => "0원".to_string(),
        1 => format!("+{}원", group_thousands(v.unsigned_abs())),
        _ => format!("-{}원", group_thousands(v.unsigned_abs())),
    }
}

fn round_won(amount: f64) -> i64 {
    if amount.is_finite() {
        (amount + 0.5).floor() as i64
    } else {
        0
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
