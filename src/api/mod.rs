//! Backend REST client.
//!
//! One method per backend capability, each with a mock-mode
//! short-circuit that returns canned data before any network I/O. The
//! bearer token rides along from the session store on every real call;
//! a 401 clears it so the next command starts from a clean login.

pub mod mock;
pub mod types;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};

use crate::config::schema::SzkConfig;
use crate::publish::Platform;
use crate::session::SessionStore;
use types::{
    BatchEncoded, CurrentUser, Health, MerchantCredential, MerchantDashboard, MerchantSummary,
    PublishReceipt, SavedContent, SocialAuth, TokenContent, TokenGrant,
};

/// Count bounds accepted by the batch-encode endpoint.
pub const BATCH_COUNT_MIN: usize = 1;
pub const BATCH_COUNT_MAX: usize = 10_000;

pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    mock: bool,
    store: SessionStore,
}

impl ApiClient {
    pub fn new(config: &SzkConfig, store: SessionStore) -> Self {
        Self {
            base_url: config.backend.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(config.backend.timeout_ms),
            mock: config.backend.mock,
            store,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mock
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Capabilities
    // -----------------------------------------------------------------------

    /// Log in and persist the granted token.
    pub fn login(&self, email: &str, password: &str) -> Result<TokenGrant> {
        let grant: TokenGrant = if self.mock {
            mock::login(email, password)?
        } else {
            self.post_json("/api/auth/token", &json!({"email": email, "password": password}))?
                .into_json()
                .context("decoding login response")?
        };
        self.store.store_token(&grant.access_token)?;
        Ok(grant)
    }

    pub fn current_user(&self) -> Result<CurrentUser> {
        if self.mock {
            return Ok(mock::current_user());
        }
        self.get("/api/me")?
            .into_json()
            .context("decoding current user")
    }

    pub fn merchants(&self) -> Result<Vec<MerchantSummary>> {
        if self.mock {
            return Ok(mock::merchants());
        }
        self.get("/api/shops")?
            .into_json()
            .context("decoding merchant list")
    }

    pub fn merchant_dashboard(&self, shop_id: &str) -> Result<MerchantDashboard> {
        if self.mock {
            return Ok(mock::merchant_dashboard(shop_id));
        }
        self.get(&format!("/api/merchant/{shop_id}"))?
            .into_json()
            .context("decoding merchant dashboard")
    }

    /// Mint `count` tokens for a shop. The backend rejects counts outside
    /// 1..=10000; the same bound is enforced here to fail before I/O.
    pub fn batch_encode(&self, shop_id: &str, count: usize, prefix: &str) -> Result<BatchEncoded> {
        if !(BATCH_COUNT_MIN..=BATCH_COUNT_MAX).contains(&count) {
            bail!("count must be within {BATCH_COUNT_MIN}..={BATCH_COUNT_MAX}, got {count}");
        }
        if self.mock {
            return Ok(mock::batch_encode(count, prefix));
        }
        self.post_json(
            &format!("/api/shops/{shop_id}/tags/batch_encode"),
            &json!({"count": count, "prefix": prefix}),
        )?
        .into_json()
        .context("decoding batch encode response")
    }

    pub fn resolve_token(&self, token: &str) -> Result<TokenContent> {
        if self.mock {
            return Ok(mock::token_content());
        }
        self.get(&format!("/t/{token}"))?
            .into_json()
            .context("decoding token content")
    }

    /// Save generated content. A `demo-`-prefixed first argument is sent
    /// as `token`, anything else as `shop_id`.
    pub fn save_content(
        &self,
        token_or_shop: &str,
        title: &str,
        body: &str,
        created_by: Option<&str>,
    ) -> Result<SavedContent> {
        if self.mock {
            return Ok(mock::save_content(token_or_shop, title));
        }
        let mut payload = serde_json::Map::new();
        if token_or_shop.starts_with("demo-") {
            payload.insert("token".into(), json!(token_or_shop));
        } else {
            payload.insert("shop_id".into(), json!(token_or_shop));
        }
        payload.insert("title".into(), json!(title));
        payload.insert("body".into(), json!(body));
        if let Some(author) = created_by {
            payload.insert("created_by".into(), json!(author));
        }
        self.post_json("/content", &Value::Object(payload))?
            .into_json()
            .context("decoding save response")
    }

    pub fn social_publish(&self, platform: Platform, payload: &Value) -> Result<PublishReceipt> {
        if self.mock {
            return Ok(mock::social_publish(platform));
        }
        self.post_json(&format!("/api/social/{}/publish", platform.id()), payload)?
            .into_json()
            .context("decoding publish response")
    }

    pub fn social_auth_url(&self, platform: Platform) -> Result<SocialAuth> {
        if self.mock {
            return Ok(mock::social_auth(platform));
        }
        self.get(&format!("/api/social/{}/auth", platform.id()))?
            .into_json()
            .context("decoding social auth response")
    }

    /// Create a merchant account with a fresh shop. Admin only.
    pub fn create_merchant(&self) -> Result<MerchantCredential> {
        if self.mock {
            return Ok(mock::create_merchant());
        }
        self.post_empty("/api/admin/merchants")?
            .into_json()
            .context("decoding merchant credentials")
    }

    /// Backend-proxied generation; the payload passes through untouched.
    pub fn ai_generate(&self, payload: &Value) -> Result<Value> {
        if self.mock {
            return Ok(mock::ai_generate());
        }
        self.post_json("/ai/generate", payload)?
            .into_json()
            .context("decoding generation response")
    }

    pub fn health(&self) -> Result<Health> {
        if self.mock {
            return Ok(mock::health());
        }
        self.get("/health")?
            .into_json()
            .context("decoding health response")
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        match self.store.token() {
            Some(token) => request.set("Authorization", &format!("Bearer {token}")),
            None => request,
        }
    }

    fn get(&self, path: &str) -> Result<ureq::Response> {
        let request = self.authorized(ureq::get(&self.url(path)).timeout(self.timeout));
        self.finish(path, request.call())
    }

    fn post_json(&self, path: &str, body: &Value) -> Result<ureq::Response> {
        let request = self.authorized(ureq::post(&self.url(path)).timeout(self.timeout));
        self.finish(path, request.send_json(body))
    }

    fn post_empty(&self, path: &str) -> Result<ureq::Response> {
        let request = self.authorized(ureq::post(&self.url(path)).timeout(self.timeout));
        self.finish(path, request.call())
    }

    fn finish(
        &self,
        path: &str,
        outcome: Result<ureq::Response, ureq::Error>,
    ) -> Result<ureq::Response> {
        match outcome {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(401, _)) => {
                // Forced logout; the stale token would fail every call.
                let _ = self.store.clear_token();
                bail!("session expired (401 from {path}); run `szk login` again");
            }
            Err(ureq::Error::Status(code, response)) => {
                bail!(
                    "backend returned HTTP {code} for {path}{}",
                    http_detail(response)
                );
            }
            Err(err) => Err(err).with_context(|| format!("requesting {path}")),
        }
    }
}

/// FastAPI-style error bodies carry a `detail` field worth surfacing.
fn http_detail(response: ureq::Response) -> String {
    match response.into_json::<Value>() {
        Ok(body) => body
            .get("detail")
            .and_then(Value::as_str)
            .map(|detail| format!(": {detail}"))
            .unwrap_or_default(),
        Err(_) => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
