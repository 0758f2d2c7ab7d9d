//! Per-sentence emoji injection for the decorated platform.
//!
//! Each sentence that carries no emoji gets exactly one: a contextual pick
//! when a keyword matches, otherwise a random draw from the pool. Position
//! is randomized (after a word for spaced text, at an interior character
//! for CJK) from an injectable RNG so tests can seed it.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;

/// Contextual emoji by keyword; the first matching row wins.
const KEYWORD_EMOJI: &[(&[&str], &str)] = &[
    (&["拍照", "照片", "出片", "合照"], "📸"),
    (&["牛肉", "红烧肉", "肉"], "🥩"),
    (&["麻", "麻将", "牌"], "🀄️"),
    (&["辛辣", "辣", "麻"], "🌶️"),
    (&["好吃", "美味", "赞", "满足"], "😋"),
    (&["学生", "上班", "打工"], "👭"),
    (&["位置", "地址", "JHU", "Baltimore"], "📍"),
    (&["推荐", "必点", "强烈推荐"], "✅"),
];

/// Fallback pool for sentences with no keyword match.
const EMOJI_POOL: &[&str] = &[
    "📸", "🧋", "🌶️", "🥬", "🍚", "💥", "🙋‍♀️", "🀄️", "😋", "💚", "🍜", "💰", "👭", "✨", "✅",
    "🔥", "👍", "😮",
];

/// Emoji presence test. The `Emoji` property also covers ASCII digits,
/// `#`, and `*` (keycap bases), so a sentence quoting a price counts as
/// already decorated. That looseness is intentional; it keeps decoration
/// sparse on number-heavy text.
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{Emoji}\u{2600}-\u{27BF}]").expect("emoji regex must compile")
});

/// A sentence: a run of non-terminators plus an optional terminator.
static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^。！？.!?]+[。！？.!?]?").expect("sentence regex must compile"));

/// Fallback chunking for terminator-free text.
static CHUNK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".{1,40}(\s|$)").expect("chunk regex must compile"));

/// Whether `text` already contains an emoji (per the class above).
pub fn has_emoji(text: &str) -> bool {
    EMOJI_RE.is_match(text)
}

/// Split text into trimmed, non-empty sentences. Text without any sentence
/// terminator falls back to ~40-char chunks.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut parts: Vec<String> = SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        parts = CHUNK_RE
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if parts.is_empty() && !text.trim().is_empty() {
        parts.push(text.trim().to_string());
    }
    parts
}

/// Ensure `sentence` carries at most one injected emoji. Sentences that
/// already have one come back trimmed and otherwise untouched.
pub fn inject_emoji(sentence: &str, rng: &mut impl Rng) -> String {
    let trimmed = sentence.trim();
    if trimmed.is_empty() || has_emoji(trimmed) {
        return trimmed.to_string();
    }

    let emoji = KEYWORD_EMOJI
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| trimmed.contains(k)))
        .map(|(_, e)| *e)
        .unwrap_or_else(|| EMOJI_POOL[rng.gen_range(0..EMOJI_POOL.len())]);

    insert_at_random(trimmed, emoji, rng)
}

/// Decorate every sentence of `body`, preserving sentence order.
pub fn decorate_sentences(body: &str, rng: &mut impl Rng) -> Vec<String> {
    split_sentences(body)
        .iter()
        .map(|s| inject_emoji(s, rng))
        .collect()
}

fn insert_at_random(sentence: &str, emoji: &str, rng: &mut impl Rng) -> String {
    if sentence.contains(char::is_whitespace) {
        // Spaced text: the emoji becomes its own word after a random one.
        let mut words: Vec<String> = sentence.split_whitespace().map(String::from).collect();
        let idx = rng.gen_range(0..words.len());
        words[idx] = format!("{} {}", words[idx], emoji);
        words.join(" ")
    } else {
        // CJK text: a random interior character position, never the ends.
        let n = sentence.chars().count();
        if n < 2 {
            return format!("{sentence}{emoji}");
        }
        let pos = rng.gen_range(0..n).clamp(1, n - 1);
        let byte = sentence
            .char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(sentence.len());
        format!("{}{}{}", &sentence[..byte], emoji, &sentence[byte..])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
