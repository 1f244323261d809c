//! Filename sanitization for files that end up both on disk and as mail attachments.

/// Longest file name accepted (Linux NAME_MAX, in bytes).
const NAME_MAX: usize = 255;

/// Sanitizes a candidate filename.
///
/// - Replaces NUL, path separators, control characters, whitespace and the
///   characters mail clients and Windows reject (`<>:"|?*`) with `_`
/// - Collapses runs of `_`
/// - Trims leading/trailing dots and underscores
/// - Truncates to 255 bytes on a char boundary
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());

    for c in name.chars() {
        let bad = c.is_control()
            || c.is_whitespace()
            || matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*');
        if bad {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else if c == '_' {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    truncate_bytes(trimmed, NAME_MAX).to_string()
}

/// Caps `name` at 255 bytes, cutting the stem so the extension survives.
pub fn truncate_filename(name: &str) -> String {
    if name.len() <= NAME_MAX {
        return name.to_string();
    }
    let (stem, ext) = split_extension(name);
    if ext.len() >= NAME_MAX {
        return truncate_bytes(name, NAME_MAX).to_string();
    }
    format!("{}{}", truncate_bytes(stem, NAME_MAX - ext.len()), ext)
}

/// `name` with `-<n>` before the extension (`a.pdf`, 2 → `a-2.pdf`), within 255 bytes.
pub fn numbered_filename(name: &str, n: u32) -> String {
    let (stem, ext) = split_extension(name);
    let suffix = format!("-{n}{ext}");
    if suffix.len() >= NAME_MAX {
        return truncate_bytes(&format!("{stem}{suffix}"), NAME_MAX).to_string();
    }
    format!("{}{}", truncate_bytes(stem, NAME_MAX - suffix.len()), suffix)
}

/// (`stem`, `.ext`); no extension when the name has no dot past its first byte.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(i) if i > 0 => (&name[..i], &name[i..]),
        _ => (name, ""),
    }
}

fn truncate_bytes(s: &str, max: usize) -> &str {
    let mut take = s.len().min(max);
    while !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}
