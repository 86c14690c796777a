//! File extension resolution.
//!
//! The frontend uses the extension to pick a file preview. An explicit
//! `file_type` always wins over the suffix of the artifact name.

/// Suffix of the last path segment of `name`.
///
/// `None` for names without a dot, dot-files such as `.env`, and names that
/// end in a dot.
pub fn name_suffix(name: &str) -> Option<&str> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

/// Normalize a user supplied file type: trimmed, without a leading dot.
///
/// Returns `None` when nothing is left.
pub fn normalize_file_type(file_type: &str) -> Option<String> {
    let trimmed = file_type.trim();
    let trimmed = trimmed.strip_prefix('.').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// `file_type` if set, else the suffix of `name`, else `None`.
pub fn resolve<'a>(name: &'a str, file_type: Option<&'a str>) -> Option<&'a str> {
    file_type.or_else(|| name_suffix(name))
}
