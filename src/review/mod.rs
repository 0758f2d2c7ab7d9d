//! Review post-processing pipeline.
//!
//! Turns a raw model transcript into a publishable draft: marker
//! extraction, hashtag normalization, duplicate-title removal, and the
//! decoration pass for the platform that wants emojied one-sentence
//! paragraphs with a filled tag section.

pub mod emoji;
pub mod extract;
pub mod tags;
pub mod title;

use rand::Rng;

use crate::publish::Platform;

/// A publishable review draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewDraft {
    /// Display title, capped at [`title::DISPLAY_TITLE_MAX_CHARS`] chars.
    pub title: Option<String>,
    /// Body with the tag block embedded. Empty when the model gave nothing.
    pub body: String,
}

/// Run the full pipeline over a raw model transcript.
///
/// Canonical order: extract markers, collect tags (title before body so
/// title tags keep priority), strip tags from both, remove a body line
/// that duplicates the title, then the platform pass, and only then the
/// fallback display title. The display title never feeds back into the
/// body.
pub fn process(raw: &str, platform: Platform, rng: &mut impl Rng) -> ReviewDraft {
    let extracted = extract::extract(raw);
    let body = extract::strip_marker_echo(&extracted.body);

    let mut source_tags = match &extracted.title {
        Some(t) => tags::collect_tags(t),
        None => Vec::new(),
    };
    for tag in tags::collect_tags(&body) {
        if !tags::contains_tag(&source_tags, &tag) {
            source_tags.push(tag);
        }
    }

    let clean_title = extracted
        .title
        .as_deref()
        .map(tags::strip_tags)
        .filter(|t| !t.is_empty());
    let clean_body = tags::strip_tags(&body);

    let deduped = title::strip_duplicate_title(&clean_body, clean_title.as_deref());

    let final_body = if deduped.is_empty() && source_tags.is_empty() {
        deduped
    } else if platform == Platform::Xiaohongshu {
        decorate(&deduped, source_tags, rng)
    } else {
        tags::append_tags(&deduped, &source_tags, tags::TAG_CAP_DEFAULT)
    };

    let display = title::display_title(clean_title.as_deref(), &final_body);

    ReviewDraft {
        title: display,
        body: final_body,
    }
}

/// Decoration pass: every sentence gets an emoji and its own paragraph,
/// and the tag list is topped up from the pool to eight before landing
/// as the final paragraph. Source tags stay ahead of pool filler.
fn decorate(body: &str, mut tag_list: Vec<String>, rng: &mut impl Rng) -> String {
    let sentences = emoji::decorate_sentences(body, rng);
    let mut out = sentences.join("\n\n");

    tags::fill_from_pool(&mut tag_list, tags::TAG_CAP_XIAOHONGSHU);
    let block = tags::render_tags(&tag_list, tags::TAG_CAP_XIAOHONGSHU);
    if out.is_empty() {
        out = block;
    } else if !block.is_empty() {
        out = format!("{out}\n\n{block}");
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
