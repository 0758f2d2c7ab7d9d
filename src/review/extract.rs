//! Marker-based title/body extraction.
//!
//! The model is instructed to answer with a `TITLE:` line, a blank line,
//! and a body (`标题:` / `正文:` in Chinese). Extraction is a small
//! line-oriented grammar rather than a pile of regexes: a marker token at
//! line start, an ASCII or full-width colon, the title to end of line, and
//! the body from the next marker line to end of input. English markers are
//! tried first, then Chinese; if neither grammar matches, the whole text
//! is the body and there is no title.

use std::sync::LazyLock;

use regex::Regex;

/// Result of marker extraction. `title` is `None` when no grammar matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub title: Option<String>,
    pub body: String,
}

/// One locale's marker grammar.
struct MarkerGrammar {
    title_marker: &'static str,
    body_marker: &'static str,
    /// Chinese output frequently omits the colon after 正文.
    body_colon_optional: bool,
}

const ENGLISH: MarkerGrammar = MarkerGrammar {
    title_marker: "TITLE",
    body_marker: "BODY",
    body_colon_optional: false,
};

const CHINESE: MarkerGrammar = MarkerGrammar {
    title_marker: "标题",
    body_marker: "正文",
    body_colon_optional: true,
};

/// Extract a `{title, body}` pair from raw model output.
pub fn extract(raw: &str) -> Extracted {
    let text = raw.trim();

    for grammar in [&ENGLISH, &CHINESE] {
        if let Some(extracted) = try_grammar(text, grammar) {
            return extracted;
        }
    }

    Extracted {
        title: None,
        body: text.to_string(),
    }
}

fn try_grammar(text: &str, grammar: &MarkerGrammar) -> Option<Extracted> {
    let lines: Vec<&str> = text.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        let Some(title) = match_marker(line, grammar.title_marker, false) else {
            continue;
        };
        let title = title.trim();
        if title.is_empty() {
            continue;
        }

        // The body marker must open the first non-blank line after the
        // title line; anything else in between breaks the match.
        let mut j = i + 1;
        while j < lines.len() && lines[j].trim().is_empty() {
            j += 1;
        }
        if j >= lines.len() {
            continue;
        }
        let Some(first) = match_marker(lines[j], grammar.body_marker, grammar.body_colon_optional)
        else {
            continue;
        };

        let mut body = first.trim_start().to_string();
        for rest in &lines[j + 1..] {
            body.push('\n');
            body.push_str(rest);
        }
        let body = body.trim().to_string();
        if body.is_empty() {
            continue;
        }

        return Some(Extracted {
            title: Some(title.to_string()),
            body,
        });
    }

    None
}

/// Match `marker` (ASCII case-insensitive) at the start of `line`, followed
/// by an ASCII or full-width colon. Returns the text after the colon.
fn match_marker<'a>(line: &'a str, marker: &str, colon_optional: bool) -> Option<&'a str> {
    let line = line.trim_start();
    let n = marker.len();
    if line.len() < n || !line.is_char_boundary(n) {
        return None;
    }
    if !line[..n].eq_ignore_ascii_case(marker) {
        return None;
    }
    let rest = &line[n..];
    if let Some(after) = rest.strip_prefix(':').or_else(|| rest.strip_prefix('：')) {
        Some(after)
    } else if colon_optional {
        Some(rest)
    } else {
        None
    }
}

static MARKER_ECHO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(标题[:：]\s*|TITLE[:：]\s*)").expect("marker echo regex must compile")
});

/// Strip a leading marker echo (`TITLE:` / `标题：`) from a body.
///
/// Covers the case where the model emitted a title marker without a
/// matching body marker, so the grammar fell back to whole-text body.
pub fn strip_marker_echo(body: &str) -> String {
    MARKER_ECHO_RE.replace(body, "").into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
