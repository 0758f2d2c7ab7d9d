//! Wire types for the backend REST surface.
//!
//! Fields the backend may omit or null out are `Option` with serde
//! defaults; content ids are tolerated as either strings or numbers.

use serde::{Deserialize, Deserializer, Serialize};

/// `POST /api/auth/token` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// `GET /api/me` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: i64,
    #[serde(default)]
    pub shop_id: Option<String>,
}

impl CurrentUser {
    pub fn admin(&self) -> bool {
        self.is_admin != 0
    }
}

/// One entry of `GET /api/shops`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub reviews: u64,
}

/// `GET /api/merchant/{shop_id}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantDashboard {
    pub shop: ShopRef,
    #[serde(default)]
    pub visits: u64,
    #[serde(default)]
    pub reviews: u64,
    #[serde(default)]
    pub contents: Vec<ContentSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopRef {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSummary {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `POST /api/shops/{id}/tags/batch_encode` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEncoded {
    pub tokens: Vec<String>,
    #[serde(default)]
    pub count: usize,
}

/// `GET /t/{token}` response. A token can resolve to saved content or to
/// a bare shop page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenContent {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "optional_id_string")]
    pub content_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub shop: Option<ShopRef>,
}

/// `POST /content` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedContent {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub shop_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// `POST /api/social/{platform}/publish` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishReceipt {
    pub status: String,
    pub platform: String,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub publish_id: Option<String>,
}

/// `GET /api/social/{platform}/auth` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialAuth {
    pub auth_url: String,
}

/// `POST /api/admin/merchants` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MerchantCredential {
    pub username: String,
    pub password: String,
    pub shop_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl MerchantCredential {
    /// Login email: as returned by the backend, or the conventional
    /// merchant mailbox derived from the username.
    pub fn login_email(&self) -> String {
        self.email
            .clone()
            .unwrap_or_else(|| format!("{}@merchant.local", self.username))
    }
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

fn optional_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }
    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_content_id_decodes_as_string() {
        let saved: SavedContent =
            serde_json::from_str(r#"{"id": 42, "shop_id": "s1", "title": "t"}"#).unwrap();
        assert_eq!(saved.id, "42");
        let saved: SavedContent = serde_json::from_str(r#"{"id": "abc"}"#).unwrap();
        assert_eq!(saved.id, "abc");
        assert_eq!(saved.shop_id, None);
    }

    #[test]
    fn token_content_tolerates_nulls() {
        let json = r#"{"type": "shop", "content_id": null, "title": null, "body": null,
                       "shop": {"id": "shop-1", "name": null}}"#;
        let content: TokenContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.kind.as_deref(), Some("shop"));
        assert_eq!(content.content_id, None);
        assert_eq!(content.shop.unwrap().id, "shop-1");
    }

    #[test]
    fn dashboard_defaults_missing_counters() {
        let json = r#"{"shop": {"id": "s"}, "contents": [{"id": 1, "created_at": null}]}"#;
        let dash: MerchantDashboard = serde_json::from_str(json).unwrap();
        assert_eq!(dash.visits, 0);
        assert_eq!(dash.contents[0].id, "1");
        assert_eq!(dash.contents[0].created_at, None);
    }

    #[test]
    fn merchant_credential_derives_login_email() {
        let cred: MerchantCredential = serde_json::from_str(
            r#"{"username": "ab12cd34", "password": "p", "shop_id": "s"}"#,
        )
        .unwrap();
        assert_eq!(cred.login_email(), "ab12cd34@merchant.local");
    }

    #[test]
    fn admin_flag_reads_from_integer() {
        let user: CurrentUser =
            serde_json::from_str(r#"{"email": "a@b.c", "is_admin": 1, "shop_id": null}"#).unwrap();
        assert!(user.admin());
        let user: CurrentUser = serde_json::from_str(r#"{"email": null}"#).unwrap();
        assert!(!user.admin());
    }
}
