/// Turns the two-character sequence `\n` into a line break, so an outline fits in one
/// shell argument.
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}
