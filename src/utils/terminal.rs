//! Terminal output sanitization for generated text.
//!
//! Model output and manual excerpts are untrusted text. Before anything reaches the
//! terminal it passes through [`sanitize_for_terminal`], which removes ANSI CSI escape
//! sequences (colors, cursor movement, screen clears) and stray control characters.

/// Strips ANSI escape codes and control characters other than tab, newline and carriage return
///
/// # Examples
///
/// ```
/// use amber_agent::utils::terminal::strip_ansi_codes;
///
/// let text = "\x1b[31mrms @CA first\x1b[0m";
/// assert_eq!(strip_ansi_codes(text), "rms @CA first");
/// ```
pub fn strip_ansi_codes(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // CSI sequences end at the first ASCII letter
            for next_ch in chars.by_ref() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        if ch.is_control() && ch != '\t' && ch != '\n' && ch != '\r' {
            continue;
        }

        result.push(ch);
    }

    result
}

/// Sanitizes generated text for printing: strips escapes and trailing whitespace
pub fn sanitize_for_terminal(text: &str) -> String {
    let mut cleaned = strip_ansi_codes(text);
    let trimmed_len = cleaned.trim_end().len();
    cleaned.truncate(trimmed_len);
    cleaned
}
