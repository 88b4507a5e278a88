//! Title sanitization for artifact filenames.

/// Maximum length of a cleaned title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;

/// Cleans a candidate title for use as a filename.
///
/// - Strips `<`, `>`, `:`, `"`, `/`, `\`, `|`, `?`, `*` and control characters
/// - Replaces `&` with `and`
/// - Trims surrounding whitespace
/// - Caps the result at 200 characters (after trimming, so a cut may end in a space)
pub fn clean_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for c in title.chars() {
        match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => {}
            '&' => out.push_str("and"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    let trimmed = out.trim();
    match trimmed.char_indices().nth(MAX_TITLE_CHARS) {
        Some((cut, _)) => trimmed[..cut].to_string(),
        None => trimmed.to_string(),
    }
}
