//! Persisted session and preference store.
//!
//! The web console keeps `access_token`, `sz_lang`, and `sz_theme` in
//! localStorage and mutates them from whichever component happens to need
//! to; here all of that state lives in one struct persisted at
//! `~/.szk/session.toml`, and every mutation goes through [`SessionStore`].
//! The 401 handler in the API client and the `login`/`logout` commands are
//! the only token writers.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::i18n::Lang;

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Terminal color theme preference.
///
/// `light` disables ANSI color output entirely (the CLI analog of the
/// console's light page theme); `dark` leaves color on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Parse a theme name. Returns `None` for anything unknown.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dark => write!(f, "dark"),
            Self::Light => write!(f, "light"),
        }
    }
}

/// Persisted session state.
///
/// A missing file loads as the default: logged out, English, dark theme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Bearer token from the last successful login, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// UI language for prompts and messages.
    pub lang: Lang,
    /// Terminal color theme.
    pub theme: Theme,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// File-backed store for [`Session`].
///
/// Rooted at a directory rather than a fixed path so tests can point it at
/// a temp dir. Save failures are real errors; a missing or unreadable file
/// on load yields the empty session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Store rooted at `~/.szk`.
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        Ok(Self::in_dir(home.join(".szk")))
    }

    /// Store rooted at an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("session.toml")
    }

    /// Load the current session. Missing or malformed files yield the
    /// default session rather than an error.
    pub fn load(&self) -> Session {
        fs::read_to_string(self.path())
            .ok()
            .and_then(|content| toml::from_str(&content).ok())
            .unwrap_or_default()
    }

    /// Persist the given session.
    pub fn save(&self, session: &Session) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let content = toml::to_string_pretty(session).context("failed to serialize session")?;
        fs::write(self.path(), content)
            .with_context(|| format!("failed to write {}", self.path().display()))?;
        Ok(())
    }

    /// The stored bearer token, if logged in.
    pub fn token(&self) -> Option<String> {
        self.load().access_token
    }

    /// Record a fresh token after login.
    pub fn store_token(&self, token: &str) -> Result<()> {
        let mut session = self.load();
        session.access_token = Some(token.to_string());
        self.save(&session)
    }

    /// Drop the stored token. Used by `logout` and by the 401 handler.
    pub fn clear_token(&self) -> Result<()> {
        let mut session = self.load();
        session.access_token = None;
        self.save(&session)
    }

    /// Persist the language preference.
    pub fn set_lang(&self, lang: Lang) -> Result<()> {
        let mut session = self.load();
        session.lang = lang;
        self.save(&session)
    }

    /// Persist the theme preference.
    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        let mut session = self.load();
        session.theme = theme;
        self.save(&session)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_default_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());

        let session = store.load();
        assert!(session.access_token.is_none());
        assert_eq!(session.lang, Lang::En);
        assert_eq!(session.theme, Theme::Dark);
    }

    #[test]
    fn token_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());

        store.store_token("tok-123").unwrap();
        assert_eq!(store.token().as_deref(), Some("tok-123"));

        store.clear_token().unwrap();
        assert!(store.token().is_none());
    }

    #[test]
    fn clear_token_preserves_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::in_dir(dir.path());

        store.set_lang(Lang::Zh).unwrap();
        store.set_theme(Theme::Light).unwrap();
        store.store_token("tok").unwrap();
        store.clear_token().unwrap();

        let session = store.load();
        assert!(session.access_token.is_none());
        assert_eq!(session.lang, Lang::Zh);
        assert_eq!(session.theme, Theme::Light);
    }

    #[test]
    fn malformed_file_loads_default_session() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path()).unwrap();
        std::fs::write(dir.path().join("session.toml"), "not [valid toml").unwrap();

        let store = SessionStore::in_dir(dir.path());
        let session = store.load();
        assert!(session.access_token.is_none());
    }

    #[test]
    fn theme_parse_and_display() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("LIGHT"), Some(Theme::Light));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::Light.to_string(), "light");
    }
}
