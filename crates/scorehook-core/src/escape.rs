//! Markdown escaping for untrusted text interpolated into reports.

/// Characters that change markdown structure in the notification sink.
pub const MARKDOWN_SPECIAL: &[char] = &['_', '*', '[', ']', '(', ')', '\\'];

/// Backslash-escape every markdown control character in `input`.
pub fn md_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if MARKDOWN_SPECIAL.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
