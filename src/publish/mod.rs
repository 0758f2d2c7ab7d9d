//! Platform descriptors and the deep-link handoff heuristic.
//!
//! Publishing is a handoff, not an upload: the draft is copied for the
//! user and the target app is opened via its URI scheme, falling back to
//! the platform's web page when the app doesn't take over. The descriptor
//! table below is the single source of truth for scheme, fallback URL,
//! and accent color per platform.

use anyhow::{Context, Result};

use crate::i18n::{self, Lang};

// ---------------------------------------------------------------------------
// Handoff timing
// ---------------------------------------------------------------------------

/// How long to wait after firing the deep link before probing (ms).
pub const PROBE_WINDOW_MS: u64 = 900;

/// Elapsed-time bound for the fallback decision (ms). If the probe timer
/// fires with less than this much wall time elapsed, the environment never
/// got suspended by an app taking over.
pub const STALENESS_BOUND_MS: u64 = 1500;

/// Decide whether the web fallback should fire once the probe timer runs.
///
/// `elapsed_ms` is wall time measured from firing the deep link to the
/// probe callback running. When an app handles the link the process is
/// typically backgrounded and the timer fires late (elapsed well past the
/// bound); when nothing handled it, the timer fires on schedule and the
/// fallback opens.
///
/// This is a heuristic, not a protocol: there is no reliable app-open
/// signal, and a slow device can delay the timer past the bound without
/// any app having opened. Best effort is the contract.
pub fn should_fall_back(elapsed_ms: u64) -> bool {
    elapsed_ms < STALENESS_BOUND_MS
}

// ---------------------------------------------------------------------------
// Platforms
// ---------------------------------------------------------------------------

/// A publish target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Xiaohongshu,
    Douyin,
    Wechat,
    Instagram,
    Facebook,
    Google,
}

/// Static per-platform publish data.
#[derive(Debug, Clone, Copy)]
pub struct PlatformDescriptor {
    pub id: Platform,
    /// Native label shown in the publish sheet.
    pub name: &'static str,
    /// URI-scheme deep link. Google has no app scheme; its web URL sits in
    /// both slots.
    pub deep_link: &'static str,
    /// Web fallback URL.
    pub fallback: &'static str,
    /// Brand accent color (RGB) where the platform has one.
    pub accent: Option<(u8, u8, u8)>,
}

/// Descriptor table. Order matches the web console's platform picker.
pub const DESCRIPTORS: &[PlatformDescriptor] = &[
    PlatformDescriptor {
        id: Platform::Xiaohongshu,
        name: "小红书",
        deep_link: "xiaohongshu://post",
        fallback: "https://www.xiaohongshu.com",
        accent: Some((255, 59, 107)),
    },
    PlatformDescriptor {
        id: Platform::Douyin,
        name: "抖音",
        deep_link: "snssdk1128://publish",
        fallback: "https://www.douyin.com",
        accent: Some((255, 90, 0)),
    },
    PlatformDescriptor {
        id: Platform::Wechat,
        name: "微信",
        deep_link: "weixin://dl/officialaccounts",
        fallback: "https://weixin.qq.com",
        accent: Some((9, 187, 7)),
    },
    PlatformDescriptor {
        id: Platform::Instagram,
        name: "Instagram",
        deep_link: "instagram://camera",
        fallback: "https://www.instagram.com",
        accent: Some((214, 36, 159)),
    },
    PlatformDescriptor {
        id: Platform::Facebook,
        name: "Facebook",
        deep_link: "fb://profile",
        fallback: "https://www.facebook.com",
        accent: None,
    },
    PlatformDescriptor {
        id: Platform::Google,
        name: "Google Maps",
        deep_link: "https://maps.google.com",
        fallback: "https://maps.google.com",
        accent: None,
    },
];

impl Platform {
    /// Parse a platform id as used in URLs and CLI arguments.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "xiaohongshu" => Some(Self::Xiaohongshu),
            "douyin" => Some(Self::Douyin),
            "wechat" => Some(Self::Wechat),
            "instagram" => Some(Self::Instagram),
            "facebook" => Some(Self::Facebook),
            "google" => Some(Self::Google),
            _ => None,
        }
    }

    /// Stable id string (backend path segment, config key, history field).
    pub fn id(self) -> &'static str {
        match self {
            Self::Xiaohongshu => "xiaohongshu",
            Self::Douyin => "douyin",
            Self::Wechat => "wechat",
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Google => "google",
        }
    }

    /// All platforms in picker order.
    pub fn all() -> impl Iterator<Item = Platform> {
        DESCRIPTORS.iter().map(|d| d.id)
    }

    /// The descriptor row for this platform.
    pub fn descriptor(self) -> &'static PlatformDescriptor {
        // The table covers every variant.
        DESCRIPTORS
            .iter()
            .find(|d| d.id == self)
            .unwrap_or(&DESCRIPTORS[0])
    }

    /// Localized display label. Platforms without an i18n entry (wechat)
    /// keep their native name.
    pub fn label(self, lang: Lang) -> &'static str {
        let key: &'static str = match self {
            Self::Xiaohongshu => "platform_xiaohongshu",
            Self::Douyin => "platform_douyin",
            Self::Wechat => "platform_wechat",
            Self::Instagram => "platform_instagram",
            Self::Facebook => "platform_facebook",
            Self::Google => "platform_google",
        };
        let text = i18n::translate(lang, key);
        if text == key { self.descriptor().name } else { text }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

// ---------------------------------------------------------------------------
// Browser handoff
// ---------------------------------------------------------------------------

/// Open a URL in the system default browser.
pub fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
