//! Canned responses for mock mode.
//!
//! Every backend call has a mock twin that returns plausible data
//! without touching the network, keyed off the same demo fixtures the
//! backend seeds itself with.

use anyhow::{Result, bail};
use chrono::Utc;
use rand::Rng;

use super::types::{
    BatchEncoded, CurrentUser, Health, MerchantCredential, MerchantDashboard, MerchantSummary,
    PublishReceipt, SavedContent, ShopRef, SocialAuth, TokenContent,
};
use crate::publish::Platform;

/// Demo admin accepted by the mock login.
pub const DEMO_EMAIL: &str = "admin@example.com";
pub const DEMO_PASSWORD: &str = "password123";

const HEX: &[u8] = b"0123456789abcdef";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn login(email: &str, password: &str) -> Result<super::types::TokenGrant> {
    if email == DEMO_EMAIL && password == DEMO_PASSWORD {
        Ok(super::types::TokenGrant {
            access_token: "mock-token".into(),
            token_type: "bearer".into(),
        })
    } else {
        bail!("invalid credentials (mock)");
    }
}

pub fn current_user() -> CurrentUser {
    CurrentUser {
        email: Some(DEMO_EMAIL.into()),
        is_admin: 1,
        shop_id: None,
    }
}

pub fn merchants() -> Vec<MerchantSummary> {
    vec![
        MerchantSummary {
            id: "shop-a".into(),
            name: "商家 A".into(),
            visits: 128,
            reviews: 12,
        },
        MerchantSummary {
            id: "shop-b".into(),
            name: "商家 B".into(),
            visits: 42,
            reviews: 3,
        },
    ]
}

pub fn merchant_dashboard(shop_id: &str) -> MerchantDashboard {
    let mut rng = rand::thread_rng();
    MerchantDashboard {
        shop: ShopRef {
            id: shop_id.into(),
            name: Some(format!("Mock Shop {shop_id}")),
        },
        visits: rng.gen_range(0..100),
        reviews: rng.gen_range(0..20),
        contents: vec![super::types::ContentSummary {
            id: "1".into(),
            title: Some("Sample Review".into()),
            token: Some("demo-token".into()),
            platform: Some("xiaohongshu".into()),
            created_at: Some(Utc::now().to_rfc3339()),
        }],
    }
}

/// Tokens are `<prefix>` plus 12 hex characters, the same shape the
/// backend mints.
pub fn batch_encode(count: usize, prefix: &str) -> BatchEncoded {
    let mut rng = rand::thread_rng();
    let tokens = (0..count)
        .map(|_| format!("{prefix}{}", random_string(&mut rng, HEX, 12)))
        .collect::<Vec<_>>();
    BatchEncoded { count: tokens.len(), tokens }
}

pub fn token_content() -> TokenContent {
    TokenContent {
        kind: Some("shop".into()),
        content_id: None,
        title: Some("Demo Shop".into()),
        body: Some("欢迎使用 Songzike Tool 的 NFC 页面".into()),
        shop: None,
    }
}

pub fn save_content(token_or_shop: &str, title: &str) -> SavedContent {
    let mut rng = rand::thread_rng();
    SavedContent {
        id: format!("mock-content-{}", random_string(&mut rng, BASE36, 6)),
        shop_id: Some(token_or_shop.into()),
        title: Some(title.into()),
    }
}

pub fn ai_generate() -> serde_json::Value {
    serde_json::json!({"raw": {"mock": true, "text": "这是模拟 AI 文案"}})
}

pub fn social_publish(platform: Platform) -> PublishReceipt {
    PublishReceipt {
        status: "mocked".into(),
        platform: platform.id().into(),
        result: None,
        publish_id: None,
    }
}

pub fn social_auth(platform: Platform) -> SocialAuth {
    SocialAuth {
        auth_url: format!(
            "https://mock.auth/{}?client_id=mock&redirect_uri=https://app.example.com/social/callback",
            platform.id()
        ),
    }
}

pub fn create_merchant() -> MerchantCredential {
    let mut rng = rand::thread_rng();
    let username = format!("merchant_{}", random_string(&mut rng, BASE36, 6));
    let email = format!("{username}@merchant.local");
    MerchantCredential {
        username,
        password: random_string(&mut rng, BASE36, 10),
        shop_id: format!("shop_{}", random_string(&mut rng, BASE36, 6)),
        email: Some(email),
    }
}

pub fn health() -> Health {
    Health {
        status: "ok".into(),
    }
}

fn random_string(rng: &mut impl Rng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
