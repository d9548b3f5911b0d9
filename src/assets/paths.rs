use crate::url::last_segment_decoded;
use std::path::{Path, PathBuf};
use url::Url;

/// Characters that are invalid in a path component on at least one platform
const INVALID_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Device names Windows refuses as file names, with or without extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Longest file name accepted by common filesystems, in bytes
const MAX_NAME_BYTES: usize = 255;

/// Name used when nothing usable is left after sanitizing
const FALLBACK_NAME: &str = "untitled";

const TEXT_EXTENSION: &str = ".txt";

/// Turns arbitrary text into a single valid path component
///
/// # Rules
///
/// 1. Remove `\ / : * ? " < > |` and control characters
/// 2. Trim surrounding whitespace and trailing dots
/// 3. Truncate to 255 bytes on a char boundary, then trim again
/// 4. Suffix the stem of Windows device names with `_` (`CON` → `CON_`,
///    `lpt1.txt` → `lpt1_.txt`)
/// 5. Replace an empty result with `untitled`
///
/// Sanitizing is idempotent and leaves clean names untouched.
///
/// # Examples
///
/// ```
/// use tome_harvest::assets::sanitize_file_name;
///
/// assert_eq!(sanitize_file_name("Book: Part/Two?"), "Book PartTwo");
/// assert_eq!(sanitize_file_name("Book PartTwo"), "Book PartTwo");
/// ```
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !INVALID_CHARS.contains(c) && !c.is_control())
        .collect();

    let trimmed = trim_name(&cleaned);
    let mut result = trim_name(truncate_bytes(trimmed, MAX_NAME_BYTES)).to_string();

    if is_reserved(&result) {
        let stem_end = result.find('.').unwrap_or(result.len());
        result.insert(stem_end, '_');
    }

    if result.is_empty() {
        return FALLBACK_NAME.to_string();
    }

    result
}

/// Longest prefix of `name` that fits in `max` bytes without splitting a char
fn truncate_bytes(name: &str, max: usize) -> &str {
    if name.len() <= max {
        return name;
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

fn trim_name(name: &str) -> &str {
    name.trim().trim_end_matches(|c: char| c == '.' || c.is_whitespace())
}

fn is_reserved(name: &str) -> bool {
    let stem = name.split('.').next().unwrap_or(name).trim_end();
    RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
}

/// Local destination of a book's text
///
/// Named after the id and the sanitized title, never after the remote URL, so
/// repeated runs write to the same file. Long titles are shortened so the
/// `.txt` extension always survives the file name length limit.
pub fn book_path(books_dir: &Path, id: &str, title: &str) -> PathBuf {
    let prefix = format!("{}. ", id);
    let budget = MAX_NAME_BYTES.saturating_sub(prefix.len() + TEXT_EXTENSION.len());
    let title = trim_name(truncate_bytes(title, budget));

    let file_name = sanitize_file_name(&format!("{}{}{}", prefix, title, TEXT_EXTENSION));
    books_dir.join(file_name)
}

/// Local destination of a cover image
///
/// Named after the percent-decoded last segment of the image URL.
pub fn image_path(images_dir: &Path, image_url: &Url) -> PathBuf {
    let segment = last_segment_decoded(image_url).unwrap_or_default();
    images_dir.join(sanitize_file_name(&segment))
}
