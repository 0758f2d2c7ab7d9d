/// Integration tests for the generation pipeline.
///
/// Unit tests for the stream decoder and the draft post-processing steps
/// live in each file's `#[cfg(test)]` block. These tests exercise the
/// pieces together: chunked SSE decoding into `read_stream`, transcript
/// processing through `review::process`, and the generator's fail-fast
/// guard when no API key is configured.
use std::io::{self, Cursor, Read};

use rand::SeedableRng;
use rand::rngs::StdRng;

use szk::ai::client::SilraClient;
use szk::ai::prompts::build_messages;
use szk::ai::stream::read_stream;
use szk::ai::{GenerationPhase, Generator};
use szk::config::schema::{AiConfig, ShopConfig};
use szk::i18n::Lang;
use szk::publish::Platform;
use szk::review::process;

/// Reader that yields at most `stride` bytes per `read` call, so chunk
/// boundaries land anywhere, including inside multi-byte characters.
struct SplitReader {
    data: Vec<u8>,
    pos: usize,
    stride: usize,
}

impl SplitReader {
    fn new(data: &str, stride: usize) -> Self {
        Self {
            data: data.as_bytes().to_vec(),
            pos: 0,
            stride,
        }
    }
}

impl Read for SplitReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.data.len() {
            return Ok(0);
        }
        let n = self.stride.min(buf.len()).min(self.data.len() - self.pos);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

// ---------------------------------------------------------------------------
// Stream decoding across chunk boundaries
// ---------------------------------------------------------------------------

#[test]
fn chunked_decode_matches_whole_input_at_any_split() {
    let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"麻将🀄️\"}}]}\n\
               data: {\"choices\":[{\"delta\":{\"content\":\"小碗菜，好吃\"}}]}\n\
               data: [DONE]\n";

    let whole = read_stream(Cursor::new(sse.as_bytes()), |_| {}).unwrap();
    assert_eq!(whole, "麻将🀄️小碗菜，好吃");

    for stride in 1..=7 {
        let mut deltas = String::new();
        let result = read_stream(SplitReader::new(sse, stride), |d| deltas.push_str(d)).unwrap();
        assert_eq!(result, whole, "stride {stride}");
        assert_eq!(deltas, whole, "stride {stride} deltas");
    }
}

#[test]
fn done_sentinel_terminates_even_when_split_across_chunks() {
    let sse = "data: {\"choices\":[{\"delta\":{\"content\":\"before\"}}]}\n\
               data: [DONE]\n\
               data: {\"choices\":[{\"delta\":{\"content\":\"after\"}}]}\n";

    for stride in [1, 2, 3, 5, 64] {
        let result = read_stream(SplitReader::new(sse, stride), |_| {}).unwrap();
        assert_eq!(result, "before", "stride {stride}");
    }
}

#[test]
fn plain_json_body_without_newline_is_parsed_at_eof() {
    let body = r#"{"choices":[{"message":{"content":"整段文案"}}]}"#;
    let result = read_stream(Cursor::new(body.as_bytes()), |_| {}).unwrap();
    assert_eq!(result, "整段文案");
}

// ---------------------------------------------------------------------------
// Transcript post-processing
// ---------------------------------------------------------------------------

#[test]
fn marked_transcript_yields_title_and_reappended_tags() {
    let mut rng = StdRng::seed_from_u64(7);
    let draft = process(
        "TITLE: Great food\n\nBODY: Loved it #yum #local",
        Platform::Instagram,
        &mut rng,
    );

    assert_eq!(draft.title.as_deref(), Some("Great food"));
    assert_eq!(draft.body, "Loved it #yum #local");
}

#[test]
fn body_line_repeating_the_title_is_dropped() {
    let mut rng = StdRng::seed_from_u64(7);
    let draft = process(
        "TITLE: Best bowls in town\n\nBODY: Best bowls in town!\nThe rest stays.",
        Platform::Douyin,
        &mut rng,
    );

    assert_eq!(draft.title.as_deref(), Some("Best bowls in town"));
    assert_eq!(draft.body, "The rest stays.");
}

#[test]
fn decorated_platform_caps_tag_block_at_eight_source_first() {
    let mut rng = StdRng::seed_from_u64(42);
    let raw = "标题：宝藏小店\n\n正文：今天来打卡。#t1 #t2 #t3 #t4 #t5 #t6 #t7 #t8 #t9 #t10";
    let draft = process(raw, Platform::Xiaohongshu, &mut rng);

    assert_eq!(draft.title.as_deref(), Some("宝藏小店"));

    let paragraphs: Vec<&str> = draft.body.split("\n\n").collect();
    assert!(paragraphs.len() >= 2);

    let tags: Vec<&str> = paragraphs.last().unwrap().split_whitespace().collect();
    assert_eq!(
        tags,
        ["#t1", "#t2", "#t3", "#t4", "#t5", "#t6", "#t7", "#t8"]
    );
}

// ---------------------------------------------------------------------------
// Generator fail-fast guard
// ---------------------------------------------------------------------------

#[test]
fn missing_api_key_aborts_idle_before_any_network() {
    // TEST-NET-3 address; a request here would hang, not fail fast.
    let ai = AiConfig {
        api_url: "http://203.0.113.1:9".into(),
        api_key: String::new(),
        ..AiConfig::default()
    };

    let mut rng = StdRng::seed_from_u64(1);
    let messages = build_messages(
        Platform::Douyin,
        Lang::En,
        Some("Write one sentence"),
        None,
        &ShopConfig::default(),
        &mut rng,
    );

    let mut generator = Generator::new(SilraClient::from_config(&ai));
    let err = generator
        .generate(&messages, Platform::Douyin, &mut rng, |_| {
            panic!("no delta should arrive")
        })
        .unwrap_err();

    assert!(err.to_string().contains("no AI API key"));
    assert!(!generator.is_busy());
    assert_eq!(generator.phase(), GenerationPhase::Idle);

    // The guard leaves the generator reusable; a retry hits the same
    // abort, not a busy error.
    let err = generator
        .generate(&messages, Platform::Douyin, &mut rng, |_| {})
        .unwrap_err();
    assert!(err.to_string().contains("no AI API key"));
}
