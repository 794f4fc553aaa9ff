/// Converts free text into a canonical snake_case token.
///
/// Whitespace, `-` and `.` become word separators, lower-to-upper case
/// transitions start a new word, and everything is lowercased. Runs of
/// separators collapse into a single `_`.
pub fn snake_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 4);
    let mut previous_lower = false;
    let mut pending_separator = false;
    for ch in input.trim().chars() {
        if ch.is_whitespace() || ch == '-' || ch == '.' || ch == '_' {
            pending_separator = !out.is_empty();
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower {
            pending_separator = true;
        }
        if pending_separator {
            out.push('_');
            pending_separator = false;
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        out.extend(ch.to_lowercase());
    }
    out
}

/// Truncates `input` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
