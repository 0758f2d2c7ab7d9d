//! Request construction for review generation.
//!
//! Per-platform prompt templates in two locales, persona and length
//! pools, rotating facebook styles, and the TITLE/BODY output-format
//! instruction for the decorated platform. The maps platform is always
//! prompted in English regardless of the interface language. Every
//! random pick draws from an injectable RNG so tests can seed it.

use rand::Rng;

use crate::ai::client::{ChatMessage, ContentPart};
use crate::config::schema::ShopConfig;
use crate::i18n::Lang;
use crate::publish::Platform;

/// Probability of attaching the location hint to a decorated-platform
/// prompt.
const LOCATION_HINT_PROBABILITY: f64 = 0.35;

// ---------------------------------------------------------------------------
// Prompt tables
// ---------------------------------------------------------------------------

const XIAOHONGSHU_TEMPLATE_EN: &str = "Write a warm, natural Rednote review (casual personal voice). Use emojis, short anecdotes, and sensory words. Length: medium-long (2-3 short sentences). Use only visible items from the photo or facts given; avoid inventing dishes.";
const XIAOHONGSHU_TEMPLATE_ZH: &str = "为小红书写一段贴近生活、口语化的评价，带 emoji 和简短小故事/感受。长度：中偏长（2-3 句）。仅使用图片或信息中可见的菜品/事实，不得杜撰。";

const DOUYIN_TEMPLATE_EN: &str = "Short punchy Douyin caption, energetic and casual. Max ~40 words. Use visible items only; avoid exaggeration.";
const DOUYIN_TEMPLATE_ZH: &str = "简短有力的抖音文案，轻快随性，约 40 字内。仅使用可见菜品和信息，不要夸张。";

const FACEBOOK_TEMPLATE_EN: &str = "Short friendly Facebook review. Concise, factual, avoid marketing language. Use visible items only.";
const FACEBOOK_TEMPLATE_ZH: &str = "简短友好的 Facebook 点评，事实为主，避免商业化用语，仅使用可见菜品和信息。";

const INSTAGRAM_TEMPLATE_EN: &str = "Instagram-style caption: concise, visual, include light emoji and one hashtag. Keep natural and truthful; use visible items only.";
const INSTAGRAM_TEMPLATE_ZH: &str = "Instagram 风格短文案，视觉化表达，带少量 emoji 和一个话题标签，真实简洁，仅使用可见菜品和信息。";

const GOOGLE_TEMPLATE: &str = "Very short factual Google Maps review. 1–2 short sentences. No marketing or exaggeration. Use visible items only.";

const FALLBACK_TEMPLATE_EN: &str = "Write a short review.";
const FALLBACK_TEMPLATE_ZH: &str = "写一段简短评价。";

const PREAMBLE_EN: &str = "You are a copywriter producing natural, realistic user reviews. Do not reveal you are AI; do not invent dishes that are not present.";
const PREAMBLE_ZH: &str = "你是文案写手，生成自然、真实且不过度夸张的用户评价。不要披露 AI 身份；不得杜撰菜品。";
const PREAMBLE_GOOGLE: &str = "Write a very short factual Google Maps review; 1-2 short sentences. No exaggeration or marketing.";

const DIRECTIVE_EN: &str = "Respond in English.";
const DIRECTIVE_ZH: &str = "请用中文回复。";

const GOOGLE_FACTUAL_PROMPT: &str = "Write a short, factual Google Maps review in English. Use 1-3 short sentences. Do NOT include emojis or hashtags. Keep it concise and objective.";

const LOCATION_HINT_EN: &str = "The shop is located in Baltimore near JHU.";
const LOCATION_HINT_ZH: &str = "店铺位于 Baltimore，靠近 JHU。";

const PERSONAS_EN: &[&str] = &[
    "a satisfied customer",
    "a student",
    "a working professional",
    "a foodie",
    "a passerby who tried it",
    "a regular",
];
const PERSONAS_ZH: &[&str] = &[
    "一位满意的顾客",
    "学生",
    "上班族",
    "美食爱好者",
    "路过试吃的顾客",
    "常客",
];

const LENGTHS_DECORATED: &[&str] = &["medium", "long", "long"];
const LENGTHS_DEFAULT: &[&str] = &["short", "short", "medium"];

const FACEBOOK_STYLES_EN: &[&str] = &[
    "Caption: Finally a decent spot right by campus! Tried Mahjong today—I'm usually picky about Asian food here but this hit the spot. Short paragraphs, casual tone. No emojis required.",
    "Caption: Solid 5 stars for Mahjong. It's right next to JHU and great for quick meals. Brief, local-neighbor tone, simple sentences.",
    "Caption: Best new bowl spot in Baltimore! Honest short review, practical and direct.",
];
const FACEBOOK_STYLES_ZH: &[&str] = &[
    "标题党：终于在校园附近有一家靠谱的店！像手写的随性点评，口语化，不用太正式。",
    "邻里口吻：评分简洁直接，强调效率和性价比，适合忙碌的上班族/学生。",
    "短评体：一两句直观感受，真实自然，像是临时写的。",
];

const EXAMPLE_EN: &str = "EXAMPLES:\n\
    TITLE: I declare 📣 this is the \"雀神\" of small-bowl dishes! 🀄️💥\n\n\
    BODY: 家人们！今天挖到宝了！這家店的麻将盒子太好拍照了📸，味道也在线，鸿运当头红烧肉超下饭🍚。#小碗菜宝藏店";
const EXAMPLE_ZH: &str = "示例：\n\
    标题: 我宣布📣这就是小碗菜界的“雀神”🀄️！\n\n\
    正文: 家人们！今天挖到宝了！麻将饭盒超出片📸，红烧肉咸香酥软，性价比超高💰。#宝藏小店";

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

/// Build the message list for one generation.
///
/// A photo (as a data URL) switches the user message to multi-part
/// content with the image attached. A non-empty `user_prompt` replaces
/// the platform template as the base text.
pub fn build_messages(
    platform: Platform,
    lang: Lang,
    user_prompt: Option<&str>,
    photo_data_url: Option<&str>,
    shop: &ShopConfig,
    rng: &mut impl Rng,
) -> Vec<ChatMessage> {
    let system = system_message(platform, lang, shop);

    let persona = pick(personas(lang), rng);
    let length = pick(length_pool(platform), rng);
    let user_text = user_prompt
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| template(platform, lang));

    if let Some(photo) = photo_data_url {
        let base_instruction = match lang {
            Lang::Zh => format!(
                "角色：{persona}。长度：{length}。请仅使用图片和上述信息中可见的菜品和事实，保持真实、不要夸张。"
            ),
            Lang::En => format!(
                "Persona: {persona}. Length: {length}. Use only visible dishes and facts from the image or brief. Keep it truthful and avoid exaggeration."
            ),
        };
        let mut parts = vec![
            ContentPart::text(user_text),
            ContentPart::image_url(photo),
            ContentPart::text(base_instruction),
        ];
        if platform == Platform::Xiaohongshu {
            parts.push(ContentPart::text(decorated_photo_instruction(
                lang, &shop.name,
            )));
        }
        return vec![system, ChatMessage::user_parts(parts)];
    }

    let user_message = match platform {
        Platform::Google => GOOGLE_FACTUAL_PROMPT.to_string(),
        Platform::Xiaohongshu => decorated_prompt(lang, &shop.name, rng),
        Platform::Facebook => pick(facebook_styles(lang), rng).to_string(),
        Platform::Instagram => match lang {
            Lang::Zh => format!("{user_text} 角色：{persona}。短句、视觉化，有少量 emoji 和一个 hashtag。"),
            Lang::En => format!(
                "{user_text} Persona: {persona}. Instagram-style caption: concise, visual, light emoji, one hashtag."
            ),
        },
        _ => match lang {
            Lang::Zh => format!("{user_text} 角色：{persona}。长度：{length}。请保持真实，不要杜撰菜品。"),
            Lang::En => format!(
                "{user_text} Persona: {persona}. Length: {length}. Keep it truthful and do not invent dishes."
            ),
        },
    };

    vec![system, ChatMessage::user(user_message)]
}

fn system_message(platform: Platform, lang: Lang, shop: &ShopConfig) -> ChatMessage {
    let preamble = if platform == Platform::Google {
        PREAMBLE_GOOGLE
    } else if lang == Lang::Zh {
        PREAMBLE_ZH
    } else {
        PREAMBLE_EN
    };
    let directive = if platform == Platform::Google || lang == Lang::En {
        DIRECTIVE_EN
    } else {
        DIRECTIVE_ZH
    };
    let brief = match lang {
        Lang::Zh => &shop.brief_zh,
        Lang::En => &shop.brief_en,
    };
    ChatMessage::system(format!("{preamble} {directive} {brief}"))
}

fn template(platform: Platform, lang: Lang) -> &'static str {
    match (platform, lang) {
        (Platform::Google, _) => GOOGLE_TEMPLATE,
        (Platform::Xiaohongshu, Lang::En) => XIAOHONGSHU_TEMPLATE_EN,
        (Platform::Xiaohongshu, Lang::Zh) => XIAOHONGSHU_TEMPLATE_ZH,
        (Platform::Douyin, Lang::En) => DOUYIN_TEMPLATE_EN,
        (Platform::Douyin, Lang::Zh) => DOUYIN_TEMPLATE_ZH,
        (Platform::Facebook, Lang::En) => FACEBOOK_TEMPLATE_EN,
        (Platform::Facebook, Lang::Zh) => FACEBOOK_TEMPLATE_ZH,
        (Platform::Instagram, Lang::En) => INSTAGRAM_TEMPLATE_EN,
        (Platform::Instagram, Lang::Zh) => INSTAGRAM_TEMPLATE_ZH,
        (Platform::Wechat, Lang::En) => FALLBACK_TEMPLATE_EN,
        (Platform::Wechat, Lang::Zh) => FALLBACK_TEMPLATE_ZH,
    }
}

fn personas(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::Zh => PERSONAS_ZH,
        Lang::En => PERSONAS_EN,
    }
}

fn length_pool(platform: Platform) -> &'static [&'static str] {
    if platform == Platform::Xiaohongshu {
        LENGTHS_DECORATED
    } else {
        LENGTHS_DEFAULT
    }
}

fn facebook_styles(lang: Lang) -> &'static [&'static str] {
    match lang {
        Lang::Zh => FACEBOOK_STYLES_ZH,
        Lang::En => FACEBOOK_STYLES_EN,
    }
}

fn pick<'a>(pool: &'a [&'a str], rng: &mut impl Rng) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

/// Extra instruction appended to a photo request on the decorated
/// platform: forces the TITLE/BODY output format.
fn decorated_photo_instruction(lang: Lang, shop_name: &str) -> String {
    match lang {
        Lang::En => format!(
            "Write a Rednote-style shop recommendation for {shop_name} (TITLE + BODY).\n\
             OUTPUT: one TITLE line prefixed by \"TITLE:\" (short; avoid hashtags in title), one blank line, then BODY.\n\
             Do not restrict length — let the model choose. Each generation MUST be different in persona and wording; vary narrative style. Emojis and tags optional; no photo-suggestion text. Do not invent dishes beyond visible items."
        ),
        Lang::Zh => "请写一篇小红书探店/种草（标题 + 正文）。\n\
             输出：一行标题，前缀为 \"标题:\"（简短，标题中尽量不要带话题标签），空一行，然后正文。\n\
             不要限制长度，让模型决定合适篇幅。每次生成必须不同（变换角色和叙事方式）。emoji 和话题可选。不要写拍照建议，不要杜撰图片中没有的菜品。"
            .to_string(),
    }
}

/// Text-only decorated prompt: template, optional location hint, the
/// TITLE/BODY format instruction, and a worked example.
fn decorated_prompt(lang: Lang, shop_name: &str, rng: &mut impl Rng) -> String {
    let hint = if rng.gen_range(0.0..1.0) < LOCATION_HINT_PROBABILITY {
        match lang {
            Lang::Zh => LOCATION_HINT_ZH,
            Lang::En => LOCATION_HINT_EN,
        }
    } else {
        ""
    };
    match lang {
        Lang::En => format!(
            "{XIAOHONGSHU_TEMPLATE_EN} {hint} Write a Rednote-style shop recommendation for {shop_name} (TITLE + BODY).\n\
             OUTPUT: one TITLE line prefixed by \"TITLE:\" (short; avoid hashtags in title), one blank line, then BODY.\n\
             Do not restrict length — let the model decide. Each generation MUST be different in persona and wording; vary narrative style. Emojis and tags optional; do not include any photo-suggestion text. Do not invent dishes beyond visible items. {EXAMPLE_EN}"
        ),
        Lang::Zh => format!(
            "{XIAOHONGSHU_TEMPLATE_ZH} {hint} 请写一篇小红书探店/种草（标题 + 正文）。\n\
             输出：一行标题，前缀为 \"标题:\"（简短，标题中尽量不要带话题标签），空一行，然后正文。\n\
             不要限制长度，让模型决定合适篇幅。每次生成必须不同（变换角色和叙事方式）。Emoji 和话题可选。不要写拍照建议，不要杜撰图片中没有的菜品。{EXAMPLE_ZH}"
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::MessageContent;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    fn shop() -> ShopConfig {
        ShopConfig::default()
    }

    fn text_of(msg: &ChatMessage) -> String {
        match &msg.content {
            MessageContent::Text(t) => t.clone(),
            MessageContent::Parts(_) => panic!("expected plain content"),
        }
    }

    #[test]
    fn maps_platform_forces_english() {
        let mut rng = StdRng::seed_from_u64(1);
        let msgs = build_messages(Platform::Google, Lang::Zh, None, None, &shop(), &mut rng);
        assert_eq!(msgs.len(), 2);
        let system = text_of(&msgs[0]);
        assert!(system.starts_with(PREAMBLE_GOOGLE));
        assert!(system.contains(DIRECTIVE_EN));
        // The interface language still picks the brief.
        assert!(system.contains(&shop().brief_zh));
        assert_eq!(text_of(&msgs[1]), GOOGLE_FACTUAL_PROMPT);
    }

    #[test]
    fn chinese_system_message_uses_chinese_preamble_and_brief() {
        let mut rng = StdRng::seed_from_u64(1);
        let msgs = build_messages(Platform::Douyin, Lang::Zh, None, None, &shop(), &mut rng);
        let system = text_of(&msgs[0]);
        assert!(system.starts_with(PREAMBLE_ZH));
        assert!(system.contains(DIRECTIVE_ZH));
        assert!(system.contains(&shop().brief_zh));
    }

    #[test]
    fn photo_request_is_multipart_with_image() {
        let mut rng = StdRng::seed_from_u64(2);
        let msgs = build_messages(
            Platform::Douyin,
            Lang::En,
            None,
            Some("data:image/jpeg;base64,AA"),
            &shop(),
            &mut rng,
        );
        let MessageContent::Parts(parts) = &msgs[1].content else {
            panic!("expected multi-part content");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[1], ContentPart::ImageUrl { .. }));
    }

    #[test]
    fn decorated_photo_request_gets_format_instruction() {
        let mut rng = StdRng::seed_from_u64(2);
        let msgs = build_messages(
            Platform::Xiaohongshu,
            Lang::En,
            None,
            Some("data:image/png;base64,AA"),
            &shop(),
            &mut rng,
        );
        let MessageContent::Parts(parts) = &msgs[1].content else {
            panic!("expected multi-part content");
        };
        assert_eq!(parts.len(), 4);
        let ContentPart::Text { text } = &parts[3] else {
            panic!("expected text instruction");
        };
        assert!(text.contains("TITLE:"));
        assert!(text.contains(&shop().name));
    }

    #[test]
    fn custom_prompt_replaces_template() {
        let mut rng = StdRng::seed_from_u64(3);
        let msgs = build_messages(
            Platform::Douyin,
            Lang::En,
            Some("  mention the milk tea  "),
            None,
            &shop(),
            &mut rng,
        );
        let user = text_of(&msgs[1]);
        assert!(user.starts_with("mention the milk tea"));
        assert!(!user.contains(DOUYIN_TEMPLATE_EN));
    }

    #[test]
    fn facebook_pick_comes_from_style_pool() {
        let mut rng = StdRng::seed_from_u64(4);
        let msgs = build_messages(Platform::Facebook, Lang::En, None, None, &shop(), &mut rng);
        let user = text_of(&msgs[1]);
        assert!(FACEBOOK_STYLES_EN.contains(&user.as_str()));
    }

    #[test]
    fn location_hint_follows_probability_draw() {
        // A zero draw is under the threshold; an all-ones draw is over it.
        let mut low = StepRng::new(0, 0);
        let with_hint = decorated_prompt(Lang::En, "Mahjong", &mut low);
        assert!(with_hint.contains(LOCATION_HINT_EN));

        let mut high = StepRng::new(u64::MAX, 0);
        let without = decorated_prompt(Lang::En, "Mahjong", &mut high);
        assert!(!without.contains(LOCATION_HINT_EN));
    }

    #[test]
    fn decorated_text_prompt_carries_example() {
        let mut rng = StdRng::seed_from_u64(5);
        let msgs = build_messages(Platform::Xiaohongshu, Lang::Zh, None, None, &shop(), &mut rng);
        let user = text_of(&msgs[1]);
        assert!(user.contains("示例："));
        assert!(user.contains("标题:"));
    }

    #[test]
    fn wechat_falls_back_to_generic_template() {
        let mut rng = StdRng::seed_from_u64(6);
        let msgs = build_messages(Platform::Wechat, Lang::Zh, None, None, &shop(), &mut rng);
        let user = text_of(&msgs[1]);
        assert!(user.starts_with(FALLBACK_TEMPLATE_ZH));
    }
}
