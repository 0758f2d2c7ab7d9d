//! Duplicate-title stripping and display-title derivation.
//!
//! Models that were asked for TITLE + BODY tend to repeat the title as the
//! first body line. There is exactly one strip algorithm here; every call
//! site goes through [`strip_duplicate_title`] rather than growing its own
//! variant.

use std::sync::LazyLock;

use regex::Regex;

/// Display titles are capped at this many characters (then `…`).
pub const DISPLAY_TITLE_MAX_CHARS: usize = 20;

/// Everything that normalization removes: whitespace, punctuation, symbols
/// (which includes emoji).
static NON_CONTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\p{P}\p{S}]+").expect("normalize regex must compile"));

/// A sentence: a run of non-terminators plus an optional terminator.
static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^。！？.!?]+[。！？.!?]?").expect("sentence regex must compile"));

/// Case/punctuation-insensitive comparison key.
fn normalize(s: &str) -> String {
    NON_CONTENT_RE.replace_all(s, "").to_lowercase()
}

/// Remove a duplicated title from the start of `body`.
///
/// With a title: if the normalized first body line and the normalized
/// title are both non-empty and either is a prefix of the other, the first
/// line is dropped. Otherwise an anchored literal occurrence of the title
/// (with an optional run of separator punctuation and a line break) is
/// removed; this covers titles preceded by blank lines, where the
/// first-line check sees nothing.
///
/// Without a title: a short (< 60 chars) first line that reappears as the
/// prefix of the next non-empty line is dropped.
pub fn strip_duplicate_title(body: &str, title: Option<&str>) -> String {
    let title = title.map(str::trim).filter(|t| !t.is_empty());

    let Some(title) = title else {
        return strip_untitled_duplicate(body);
    };

    let first_line = body.lines().next().unwrap_or("").trim();
    let n_title = normalize(title);
    let n_first = normalize(first_line);
    if !n_title.is_empty()
        && !n_first.is_empty()
        && (n_first.starts_with(&n_title) || n_title.starts_with(&n_first))
    {
        return match body.split_once('\n') {
            Some((_, rest)) => rest.trim().to_string(),
            None => String::new(),
        };
    }

    let pattern = format!(
        r"(?i)^\s*{}(\s*[-:：，,–—]*)?\s*(\n\s*)?",
        regex::escape(title)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.replace(body, "").trim().to_string(),
        Err(_) => body.to_string(),
    }
}

fn strip_untitled_duplicate(body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let Some(idx) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return body.to_string();
    };
    let first = lines[idx].trim();
    let second = lines[idx + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty());

    if let Some(second) = second
        && first.chars().count() < 60
        && second.starts_with(first)
    {
        return lines[idx + 1..].join("\n").trim().to_string();
    }
    body.to_string()
}

/// Derive the display title: the extracted title when present, otherwise
/// the first sentence of the first body line. Either way the result is
/// capped at [`DISPLAY_TITLE_MAX_CHARS`] characters plus `…`.
///
/// Derivation never mutates the body; the duplicated-title case is handled
/// by [`strip_duplicate_title`] before this runs.
pub fn display_title(title: Option<&str>, body: &str) -> Option<String> {
    let base = match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => {
            let first_line = body.lines().next().unwrap_or("").trim();
            SENTENCE_RE
                .find(first_line)
                .map(|m| m.as_str())
                .unwrap_or(first_line)
                .to_string()
        }
    };

    if base.is_empty() {
        return None;
    }
    if base.chars().count() > DISPLAY_TITLE_MAX_CHARS {
        let truncated: String = base.chars().take(DISPLAY_TITLE_MAX_CHARS).collect();
        Some(format!("{truncated}…"))
    } else {
        Some(base)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
