//! szk — merchant review console for Songzike NFC pages.
//!
//! A customer taps an NFC tag, the tag token resolves to a shop, and a
//! vision-language model drafts a platform-shaped review from the shop
//! brief and an optional photo. The crate wraps that flow for the
//! terminal: backend REST client, SSE stream decoding, draft
//! post-processing (markers, hashtags, emoji decoration), platform
//! deep-link handoff, and the session/config plumbing around it.

pub mod ai;
pub mod api;
pub mod cli;
pub mod config;
pub mod history;
pub mod i18n;
pub mod publish;
pub mod review;
pub mod session;
