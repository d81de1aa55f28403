use rust_decimal::Decimal;

/// Format a decimal amount with thousand separators and 2 decimal places.
/// e.g. `1234567.89` → `"1,234,567.89"`
pub(crate) fn format_amount(val: Decimal) -> String {
    let abs = val.abs();
    let formatted = format!("{abs:.2}");
    let (int_part, dec_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_commas: String = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",");

    let sign = if val < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${with_commas}.{dec_part}")
}

/// Truncate a string to `max` visible characters, appending "…" if truncated.
/// Safe for multi-byte UTF-8 characters.
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    let truncated: String = s.chars().take(max - 1).collect();
    format!("{truncated}…")
}

/// `[████░░░░]` with `done` of `total` cells filled, `width` cells wide.
pub(crate) fn progress_bar(done: u32, total: u32, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (u64::from(done.min(total)) * width as u64 / u64::from(total)) as usize
    };
    format!("[{}{}]", "█".repeat(filled), "░".repeat(width - filled))
}

/// Command line as displayed: password arguments of `login`, `register`
/// and `passwd` are replaced by `*`.
pub(crate) fn mask_secrets(input: &str) -> String {
    let mut words = input.split(' ');
    let Some(cmd) = words.next() else {
        return String::new();
    };
    // Index of the first secret argument, counting the command as 0
    let first_secret = match cmd {
        "login" | "register" => 2,
        "passwd" => 1,
        _ => return input.to_string(),
    };
    std::iter::once(cmd.to_string())
        .chain(words.enumerate().map(|(i, word)| {
            if i + 1 >= first_secret {
                "*".repeat(word.chars().count())
            } else {
                word.to_string()
            }
        }))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Move a list cursor down by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_down(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if *index + 1 < len {
        *index += 1;
        if *index >= *scroll + page {
            *scroll = index.saturating_sub(page - 1);
        }
    }
}

/// Move a list cursor up by one, adjusting scroll to keep cursor visible.
pub(crate) fn scroll_up(index: &mut usize, scroll: &mut usize) {
    *index = index.saturating_sub(1);
    if *index < *scroll {
        *scroll = *index;
    }
}

pub(crate) fn scroll_to_top(index: &mut usize, scroll: &mut usize) {
    *index = 0;
    *scroll = 0;
}

pub(crate) fn scroll_to_bottom(index: &mut usize, scroll: &mut usize, len: usize, page: usize) {
    if len > 0 {
        *index = len - 1;
        *scroll = index.saturating_sub(page.saturating_sub(1));
    }
}
