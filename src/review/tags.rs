//! Hashtag collection and normalization.
//!
//! Models sprinkle `#tags` through generated text. The pipeline collects
//! them (order-preserving, case-insensitive dedup), strips them from the
//! prose, and re-appends a capped block at the end so tags never interrupt
//! a sentence.

use std::sync::LazyLock;

use regex::Regex;

/// Tag cap for the default append step.
pub const TAG_CAP_DEFAULT: usize = 4;

/// Tag cap for the decorated platform's tag section.
pub const TAG_CAP_XIAOHONGSHU: usize = 8;

/// Filler pool for the decorated platform, in fill order.
pub const TAG_POOL: &[&str] = &[
    "JHU",
    "Baltimore",
    "Foodie",
    "探店",
    "小碗菜",
    "宝藏小店",
    "周末去哪儿",
    "打卡",
    "学生党",
    "午餐推荐",
    "打工人",
    "宝藏",
];

/// `#` followed by anything that is not whitespace, `#`, or common
/// CJK/Latin sentence punctuation.
static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([^\s#，。,!！?？]+)").expect("hashtag regex must compile"));

/// Runs of two or more spaces left behind by tag removal.
static SPACE_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("space run regex must compile"));

/// Collect hashtags from `text` in order of first appearance, deduplicated
/// case-insensitively. Returned without the leading `#`.
pub fn collect_tags(text: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for cap in HASHTAG_RE.captures_iter(text) {
        let tag = &cap[1];
        if !contains_tag(&tags, tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

pub(crate) fn contains_tag(tags: &[String], candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    tags.iter().any(|t| t.to_lowercase() == lower)
}

/// Remove all inline hashtags and collapse the double spaces they leave.
/// Newlines are preserved; only space runs collapse.
pub fn strip_tags(text: &str) -> String {
    let without = HASHTAG_RE.replace_all(text, "");
    SPACE_RUN_RE.replace_all(&without, " ").trim().to_string()
}

/// Append up to `cap` tags to `body`, space-separated with `#` restored.
pub fn append_tags(body: &str, tags: &[String], cap: usize) -> String {
    let block = render_tags(tags, cap);
    if block.is_empty() {
        return body.to_string();
    }
    if body.is_empty() {
        return block;
    }
    format!("{body} {block}")
}

/// Render up to `cap` tags as a `#a #b` block.
pub fn render_tags(tags: &[String], cap: usize) -> String {
    tags.iter()
        .take(cap)
        .map(|t| format!("#{t}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Top up `tags` from [`TAG_POOL`] until `cap` entries, skipping pool
/// entries already present (case-insensitive). Source tags keep their
/// position ahead of filler.
pub fn fill_from_pool(tags: &mut Vec<String>, cap: usize) {
    for candidate in TAG_POOL {
        if tags.len() >= cap {
            break;
        }
        if !contains_tag(tags, candidate) {
            tags.push((*candidate).to_string());
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
