//! Filesystem-safe slugs for episode titles.

/// Longest slug we produce, leaving room for the date prefix, a hash suffix
/// and the extension under the 255-byte NAME_MAX.
const SLUG_MAX: usize = 200;

/// Used when a title sanitizes down to nothing.
const EMPTY_SLUG: &str = "episode";

/// Turns a title into a filesystem-safe ASCII slug.
///
/// - Transliterates Unicode to ASCII (`É` becomes `E`, `œ` becomes `oe`)
/// - Replaces whitespace, path separators, characters reserved on common
///   filesystems (`: * ? " < > |`) and control characters with `-`
/// - Collapses consecutive `-`
/// - Trims leading/trailing `-` and `.`
/// - Limits length to 200 bytes
pub fn slugify(title: &str) -> String {
    let ascii = deunicode::deunicode(title);

    let mut out = String::with_capacity(ascii.len());
    let mut prev_dash = false;

    for c in ascii.chars() {
        let replacement = if c.is_whitespace()
            || c.is_control()
            || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '-')
        {
            '-'
        } else {
            c
        };

        if replacement == '-' {
            if !prev_dash {
                out.push('-');
            }
            prev_dash = true;
        } else {
            out.push(replacement);
            prev_dash = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '-' || c == '.');
    let mut take = trimmed.len().min(SLUG_MAX);
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    let slug = trimmed[..take].trim_end_matches(|c| c == '-' || c == '.');

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
