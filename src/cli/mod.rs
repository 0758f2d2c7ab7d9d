//! CLI command implementations for the szk merchant console.
//!
//! Provides subcommand handlers for:
//! - `szk login|logout|me` — session management against the backend
//! - `szk merchants` / `szk merchant <id>` — dashboard tables
//! - `szk tags <shop> --count N` — NFC token batch minting
//! - `szk review <token>` — streamed AI review generation
//! - `szk publish <platform>` — deep link and web fallback handoff
//! - `szk health` — backend, AI key, and session checks
//! - `szk config show|init|set|reset` — configuration management

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value;

use crate::ai::client::SilraClient;
use crate::ai::{Generator, prompts};
use crate::api::ApiClient;
use crate::api::types::{MerchantDashboard, MerchantSummary};
use crate::config::{self, SzkConfig};
use crate::history::{HistoryLog, HistoryRecord};
use crate::i18n::{Lang, translate};
use crate::publish::{self, Platform};
use crate::review::{self, ReviewDraft};
use crate::session::{SessionStore, Theme};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// szk login / logout / me
// ---------------------------------------------------------------------------

/// Log in and store the bearer token in the session file.
pub fn run_login(api: &ApiClient, email: &str, password: Option<&str>) -> Result<()> {
    let password = match password {
        Some(p) => p.to_string(),
        None => prompt_password()?,
    };
    if email.trim().is_empty() || password.is_empty() {
        bail!("email and password are both required");
    }

    api.login(email.trim(), &password)?;
    println!("{} Logged in as {}", "✓".green().bold(), email.trim().bold());

    // Post-login routing hint, like the in-app redirect. Best effort;
    // the login itself already succeeded.
    if let Ok(user) = api.current_user() {
        if user.admin() {
            println!(
                "  {}",
                "Admin account. Run `szk merchants` for the dashboard.".dimmed()
            );
        } else if let Some(shop) = &user.shop_id {
            println!(
                "  {}",
                format!("Merchant account. Run `szk merchant {shop}` for your dashboard.").dimmed()
            );
        }
    }

    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush().context("flushing stdout")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Drop the stored session token.
pub fn run_logout(api: &ApiClient) -> Result<()> {
    api.store().clear_token()?;
    println!("{} Logged out.", "✓".green().bold());
    Ok(())
}

/// Show the logged-in account.
pub fn run_me(api: &ApiClient) -> Result<()> {
    if api.store().token().is_none() {
        println!("{}", "Not logged in. Run `szk login <email>` first.".yellow());
        return Ok(());
    }

    let user = api.current_user()?;
    println!("{}", "Current Session".bold().cyan());
    println!("{}", "=".repeat(40));
    println!(
        "  {} {}",
        "Email:".bold(),
        user.email.as_deref().unwrap_or("-")
    );
    println!(
        "  {} {}",
        "Role: ".bold(),
        if user.admin() { "admin" } else { "merchant" }
    );
    if let Some(shop) = &user.shop_id {
        println!("  {} {}", "Shop: ".bold(), shop);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// szk merchants / szk merchant
// ---------------------------------------------------------------------------

/// List merchants with the dashboard totals.
pub fn run_merchants(api: &ApiClient, format: OutputFormat) -> Result<()> {
    let merchants = api.merchants()?;

    if merchants.is_empty() {
        println!("{}", "No merchants yet.".yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&merchants)?),
        OutputFormat::Csv => print_merchants_csv(&merchants),
        OutputFormat::Table => print_merchants_table(&merchants),
    }

    Ok(())
}

fn print_merchants_table(merchants: &[MerchantSummary]) {
    let total_visits: u64 = merchants.iter().map(|m| m.visits).sum();
    let total_reviews: u64 = merchants.iter().map(|m| m.reviews).sum();
    let avg_visits = total_visits as f64 / merchants.len() as f64;

    println!("{}", "Songzike Merchant Dashboard".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!(
        "  {} {}",
        "Total visits: ".bold(),
        format_number(total_visits as usize)
    );
    println!(
        "  {} {}",
        "Total reviews:".bold(),
        format_number(total_reviews as usize)
    );
    println!("  {} {:.1}", "Avg visits:   ".bold(), avg_visits);
    println!();

    println!(
        "  {:<12} {:<20} {:>8} {:>8}",
        "Shop", "Name", "Visits", "Reviews"
    );
    println!("  {}", "-".repeat(58));

    for (i, merchant) in merchants.iter().enumerate() {
        let line = format!(
            "  {:<12} {:<20} {:>8} {:>8}",
            truncate(&merchant.id, 12),
            truncate(&merchant.name, 20),
            format_number(merchant.visits as usize),
            format_number(merchant.reviews as usize),
        );

        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_merchants_csv(merchants: &[MerchantSummary]) {
    println!("id,name,visits,reviews");
    for m in merchants {
        println!("{},{},{},{}", m.id, m.name, m.visits, m.reviews);
    }
}

/// Show one merchant dashboard with its recent contents.
pub fn run_merchant(api: &ApiClient, shop_id: &str, format: OutputFormat) -> Result<()> {
    let dashboard = api.merchant_dashboard(shop_id)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&dashboard)?),
        OutputFormat::Csv => print_merchant_csv(&dashboard),
        OutputFormat::Table => print_merchant_table(&dashboard),
    }

    Ok(())
}

fn print_merchant_table(dashboard: &MerchantDashboard) {
    let name = dashboard.shop.name.as_deref().unwrap_or(&dashboard.shop.id);
    println!("{}", name.bold().cyan());
    println!("{}", "=".repeat(50));
    println!("  {} {}", "Shop id:".bold(), dashboard.shop.id);
    println!(
        "  {} {}",
        "Visits: ".bold(),
        format_number(dashboard.visits as usize)
    );
    println!(
        "  {} {}",
        "Reviews:".bold(),
        format_number(dashboard.reviews as usize)
    );

    if dashboard.contents.is_empty() {
        return;
    }

    println!();
    println!("{}", "Recent Contents".bold().cyan());
    println!("  {:<8} {:<14} {:<20} Title", "ID", "Platform", "Created");
    println!("  {}", "-".repeat(58));

    for (i, item) in dashboard.contents.iter().enumerate() {
        let line = format!(
            "  {:<8} {:<14} {:<20} {}",
            truncate(&item.id, 8),
            item.platform.as_deref().unwrap_or("-"),
            short_ts(item.created_at.as_deref().unwrap_or("-")),
            truncate(item.title.as_deref().unwrap_or("-"), 30),
        );

        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_merchant_csv(dashboard: &MerchantDashboard) {
    println!("id,platform,created_at,title");
    for item in &dashboard.contents {
        println!(
            "{},{},{},{}",
            item.id,
            item.platform.as_deref().unwrap_or(""),
            item.created_at.as_deref().unwrap_or(""),
            item.title.as_deref().unwrap_or(""),
        );
    }
}

// ---------------------------------------------------------------------------
// szk tags
// ---------------------------------------------------------------------------

/// Upper bound for one mint from the CLI. The backend itself accepts up
/// to 10000 per call.
pub const TAG_BATCH_MAX: usize = 2000;

/// Mint a batch of NFC tag tokens for a shop. With `--out`, tokens are
/// written to a file one per line; otherwise they go to stdout.
pub fn run_tags(
    api: &ApiClient,
    shop_id: &str,
    count: usize,
    prefix: &str,
    out: Option<&Path>,
) -> Result<()> {
    if count < 1 || count > TAG_BATCH_MAX {
        bail!("count must be within 1..={TAG_BATCH_MAX}");
    }

    let batch = api.batch_encode(shop_id, count, prefix)?;

    match out {
        Some(path) => {
            let mut csv = String::new();
            for token in &batch.tokens {
                csv.push_str(token);
                csv.push('\n');
            }
            fs::write(path, csv).with_context(|| format!("writing {}", path.display()))?;
            println!(
                "{} Minted {} tokens for {}, saved to {}",
                "✓".green().bold(),
                batch.tokens.len(),
                shop_id.bold(),
                path.display(),
            );
        }
        None => {
            for token in &batch.tokens {
                println!("{token}");
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// szk review
// ---------------------------------------------------------------------------

/// Arguments for `szk review`, parsed by the binary.
#[derive(Debug)]
pub struct ReviewArgs {
    pub token: String,
    pub platform: String,
    pub lang: Option<String>,
    pub prompt: Option<String>,
    pub photos: Vec<PathBuf>,
    pub seed: Option<u64>,
    pub save: bool,
    pub publish: bool,
    pub copy: bool,
}

/// Generate a review draft for a tag token, streaming model output as it
/// arrives, then optionally save, publish, and copy the result.
pub fn run_review(api: &ApiClient, cfg: &SzkConfig, args: &ReviewArgs) -> Result<()> {
    let Some(platform) = Platform::parse(&args.platform) else {
        bail!(
            "unknown platform {:?}; one of: xiaohongshu, douyin, wechat, instagram, facebook, google",
            args.platform
        );
    };
    let lang = match args.lang.as_deref() {
        Some(value) => {
            let Some(lang) = Lang::parse(value) else {
                bail!("unknown language {value:?}; use en or zh");
            };
            lang
        }
        None => api.store().load().lang,
    };

    // Resolve the token first; a dead tag fails before any model call.
    let content = api.resolve_token(&args.token)?;
    let shop_name = content
        .shop
        .as_ref()
        .and_then(|shop| shop.name.as_deref())
        .unwrap_or(&cfg.shop.name);
    println!(
        "{}",
        format!("{} {shop_name}", translate(lang, "welcome"))
            .bold()
            .cyan()
    );
    println!("{}", "=".repeat(50));

    // At most three photos are kept, and only the first rides along in
    // the request.
    if args.photos.len() > 3 {
        println!("{}", "Only the first 3 photos are kept.".yellow());
    }
    let photos = &args.photos[..args.photos.len().min(3)];
    let photo_data_url = photos
        .first()
        .map(|path| read_photo_data_url(path))
        .transpose()?;

    // Prompt chain: explicit text, else the tag's own title, else the
    // localized default.
    let user_prompt = args
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .or_else(|| {
            content
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| translate(lang, "ai_prompt_default"));

    let mut rng: StdRng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let messages = prompts::build_messages(
        platform,
        lang,
        Some(user_prompt),
        photo_data_url.as_deref(),
        &cfg.shop,
        &mut rng,
    );

    println!("{}", translate(lang, "ai_generating").dimmed());
    let started = Instant::now();

    let draft = if api.is_mock() {
        // Mock mode goes through the backend proxy shape instead of the
        // model endpoint, so no key and no network are needed.
        let reply = api.ai_generate(&serde_json::json!({
            "model": cfg.ai.model,
            "messages": messages,
            "stream": false,
            "temperature": cfg.ai.temperature,
        }))?;
        let text = proxy_reply_text(&reply);
        print!("{text}");
        let _ = io::stdout().flush();
        review::process(text, platform, &mut rng)
    } else {
        let client = SilraClient::from_config(&cfg.ai);
        let mut generator = Generator::new(client);
        generator
            .generate(&messages, platform, &mut rng, |delta| {
                print!("{delta}");
                let _ = io::stdout().flush();
            })
            .with_context(|| translate(lang, "ai_failed").to_string())?
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    let chars = draft.body.chars().count();
    println!();

    println!();
    println!(
        "{}",
        format!("--- {} ---", translate(lang, "ai_generated")).dimmed()
    );
    if let Some(title) = &draft.title {
        println!("{}", title.bold());
        println!();
    }
    println!("{}", draft.body);
    println!();
    println!(
        "{}",
        format!("{chars} chars in {duration_ms}ms via {}", cfg.ai.model).dimmed()
    );

    let mut saved_id = None;
    if args.save || args.publish {
        let title = save_title(&draft);
        let saved = api
            .save_content(&args.token, &title, &draft.body, Some("anonymous"))
            .with_context(|| translate(lang, "save_failed").to_string())?;
        println!(
            "{} {} ({})",
            "✓".green().bold(),
            translate(lang, "saved_draft"),
            saved.id
        );
        saved_id = Some(saved.id);
    }

    if args.publish {
        let payload = serde_json::json!({
            "content_id": saved_id,
            "token": args.token,
            "photo": photo_data_url.as_ref().map(|_| "data:image/base64"),
        });
        let receipt = api
            .social_publish(platform, &payload)
            .with_context(|| translate(lang, "publish_failed").to_string())?;
        println!(
            "{} {}{}",
            "✓".green().bold(),
            translate(lang, "saved_and_published_prefix"),
            platform.label(lang),
        );
        if let Some(id) = &receipt.publish_id {
            println!("  {}", format!("publish id {id}").dimmed());
        }
    }

    if args.copy {
        match copy_to_clipboard(&draft.body) {
            Ok(()) => println!("{} {}", "✓".green().bold(), translate(lang, "copied")),
            Err(_) => println!("{}", translate(lang, "copy_failed").yellow()),
        }
    }

    if let Some(log) = HistoryLog::open_default() {
        log.log(&HistoryRecord::now(
            &args.token,
            platform.id(),
            &lang.to_string(),
            &cfg.ai.model,
            chars,
            duration_ms,
            saved_id,
        ));
    }

    Ok(())
}

/// Title used when saving: the draft title, else the first 80 characters
/// of the body.
fn save_title(draft: &ReviewDraft) -> String {
    match &draft.title {
        Some(title) => title.clone(),
        None => draft.body.chars().take(80).collect(),
    }
}

/// Text of a backend-proxied generation reply: the keyless fallback shape
/// (`raw.text`) or a chat completion (`raw.choices[0].message.content`).
fn proxy_reply_text(reply: &Value) -> &str {
    let raw = reply.get("raw").unwrap_or(reply);
    raw.get("text")
        .and_then(Value::as_str)
        .or_else(|| {
            raw.pointer("/choices/0/message/content")
                .and_then(Value::as_str)
        })
        .unwrap_or_default()
}

/// Read a photo file and encode it as a base64 data URL.
fn read_photo_data_url(path: &Path) -> Result<String> {
    let bytes = fs::read(path).with_context(|| format!("reading photo {}", path.display()))?;
    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    };
    Ok(format!("data:{mime};base64,{}", STANDARD.encode(&bytes)))
}

/// Pipe text into the platform clipboard tool.
fn copy_to_clipboard(text: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = Command::new("clip");

    #[cfg(target_os = "macos")]
    let mut command = Command::new("pbcopy");

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = {
        let mut c = Command::new("xclip");
        c.args(["-selection", "clipboard"]);
        c
    };

    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()
        .context("spawning clipboard tool")?;
    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .context("writing to clipboard tool")?;
    }
    let status = child.wait().context("waiting for clipboard tool")?;
    if !status.success() {
        bail!("clipboard tool exited with {status}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// szk publish
// ---------------------------------------------------------------------------

/// Show a platform's deep link and web fallback, optionally opening the
/// fallback in the default browser.
pub fn run_publish(api: &ApiClient, platform: &str, open: bool) -> Result<()> {
    let Some(platform) = Platform::parse(platform) else {
        bail!(
            "unknown platform {platform:?}; one of: xiaohongshu, douyin, wechat, instagram, facebook, google"
        );
    };
    let lang = api.store().load().lang;
    let descriptor = platform.descriptor();

    let label = platform.label(lang);
    let heading = match descriptor.accent {
        Some((r, g, b)) => label.truecolor(r, g, b).bold(),
        None => label.bold().cyan(),
    };
    println!("{heading}");
    println!("{}", "=".repeat(40));
    println!("  {} {}", "Deep link:".bold(), descriptor.deep_link);
    println!("  {} {}", "Fallback: ".bold(), descriptor.fallback);

    // Mock OAuth entry point. Best effort; the links above stand alone.
    if let Ok(auth) = api.social_auth_url(platform) {
        println!("  {} {}", "Connect:  ".bold(), auth.auth_url);
    }

    println!();
    println!(
        "  {}",
        "Deep links only resolve where the app is installed; the fallback opens anywhere.".dimmed()
    );

    if open {
        publish::open_browser(descriptor.fallback)?;
        println!("{} Opened {}", "✓".green().bold(), descriptor.fallback);
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// szk merchant-new
// ---------------------------------------------------------------------------

/// Create a merchant account with a fresh shop. Admin only.
pub fn run_merchant_new(api: &ApiClient) -> Result<()> {
    let credential = api.create_merchant()?;

    println!("{}", "New Merchant Credentials".bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {} {}", "Username:".bold(), credential.username);
    println!("  {} {}", "Password:".bold(), credential.password);
    println!("  {} {}", "Shop id: ".bold(), credential.shop_id);
    println!("  {} {}", "Login as:".bold(), credential.login_email());
    println!();
    println!(
        "  {}",
        "Store the password now; it is not shown again.".dimmed()
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// szk health
// ---------------------------------------------------------------------------

/// Check system health: config files, backend, AI key, session, history.
pub fn run_health(api: &ApiClient, cfg: &SzkConfig) -> Result<()> {
    println!("{}", "SZK Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    // 0. Config file status
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.szk/config.toml found"
        } else {
            "not found (run `szk config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".szk.toml found"
        } else {
            "none (optional)"
        },
    );

    // 1. Backend reachability
    if api.is_mock() {
        print_health_item("Backend", true, "mock mode; no network traffic");
    } else {
        let health = api.health();
        let backend_ok = matches!(&health, Ok(h) if h.status == "ok");
        let detail = match &health {
            Ok(h) => format!("{} at {}", h.status, api.base_url()),
            Err(_) => format!("not reachable at {}", api.base_url()),
        };
        print_health_item("Backend", backend_ok, &detail);
    }

    // 2. AI endpoint
    let client = SilraClient::from_config(&cfg.ai);
    print_health_item(
        "AI key",
        client.has_key(),
        if client.has_key() {
            "configured"
        } else {
            "missing (set SILRA_API_KEY or [ai].api_key)"
        },
    );
    print_health_item("Model", true, client.model());

    // 3. Session
    let logged_in = api.store().token().is_some();
    print_health_item(
        "Session",
        logged_in,
        if logged_in {
            "token stored"
        } else {
            "not logged in (run `szk login <email>`)"
        },
    );

    // 4. History log
    let history = HistoryLog::open_default();
    let log_exists = history
        .as_ref()
        .map(|log| log.path().exists())
        .unwrap_or(false);
    let generations = if log_exists {
        history
            .as_ref()
            .map(|log| log.recent(usize::MAX).len())
            .unwrap_or(0)
    } else {
        0
    };
    print_health_item(
        "History",
        log_exists,
        &if log_exists {
            format!("{generations} generations")
        } else {
            "no generations yet".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<15} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// szk history
// ---------------------------------------------------------------------------

/// Show the most recent generations, oldest first.
pub fn run_history(limit: usize) -> Result<()> {
    let Some(log) = HistoryLog::open_default() else {
        println!("{}", "No home directory; history is unavailable.".yellow());
        return Ok(());
    };

    let records = log.recent(limit);
    if records.is_empty() {
        println!("{}", "No generations recorded yet.".yellow());
        return Ok(());
    }

    println!("{}", "Recent Generations".bold().cyan());
    println!("{}", "=".repeat(72));
    println!(
        "  {:<20} {:<14} {:<12} {:>6} {:>8} Saved",
        "When", "Token", "Platform", "Chars", "Time"
    );
    println!("  {}", "-".repeat(70));

    for (i, record) in records.iter().enumerate() {
        let line = format!(
            "  {:<20} {:<14} {:<12} {:>6} {:>6}ms {}",
            short_ts(&record.ts),
            truncate(&record.token, 14),
            truncate(&record.platform, 12),
            record.chars,
            record.duration_ms,
            record.saved_id.as_deref().unwrap_or("-"),
        );

        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// szk lang / szk theme
// ---------------------------------------------------------------------------

/// Persist the interface language.
pub fn run_lang(store: &SessionStore, value: &str) -> Result<()> {
    let Some(lang) = Lang::parse(value) else {
        bail!("unknown language {value:?}; use en or zh");
    };
    store.set_lang(lang)?;
    println!("{} Language set to {lang}", "✓".green().bold());
    Ok(())
}

/// Persist the color theme. `light` turns ANSI colors off.
pub fn run_theme(store: &SessionStore, value: &str) -> Result<()> {
    let Some(theme) = Theme::parse(value) else {
        bail!("unknown theme {value:?}; use dark or light");
    };
    store.set_theme(theme)?;
    println!("{} Theme set to {theme}", "✓".green().bold());
    Ok(())
}

// ---------------------------------------------------------------------------
// szk config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective SZK Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    // Show source info
    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    if global_exists {
        println!("  {} {}", "✓".green(), "~/.szk/config.toml".dimmed());
    } else {
        println!(
            "  {} {}",
            "·".dimmed(),
            "~/.szk/config.toml (not found)".dimmed()
        );
    }
    if project_exists {
        println!("  {} {}", "✓".green(), ".szk.toml".dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), ".szk.toml (not found)".dimmed());
    }
    println!(
        "  {} {}",
        "·".dimmed(),
        "SZK_* / SILRA_API_KEY environment variables".dimmed()
    );

    Ok(())
}

/// Initialize a default config file at `~/.szk/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!(
        "  {}",
        "Edit the file to set the shop brief and AI endpoint.".dimmed()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
/// Character-based so CJK names never split mid-codepoint.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_len.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

/// Shorten an RFC 3339 timestamp to date and time, dropping the zone and
/// any fractional seconds.
fn short_ts(ts: &str) -> String {
    ts.chars().take(19).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_truncate_is_character_aware() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("小碗菜宝藏小店", 4), "小碗菜…");
        assert_eq!(truncate("商家 A", 12), "商家 A");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(
            OutputFormat::from_str_opt(Some("unknown")),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_short_ts_drops_zone() {
        assert_eq!(short_ts("2026-03-01T09:30:00+00:00"), "2026-03-01T09:30:00");
        assert_eq!(short_ts("-"), "-");
    }

    #[test]
    fn save_title_prefers_draft_title() {
        let draft = ReviewDraft {
            title: Some("Hidden gem".into()),
            body: "Long body".into(),
        };
        assert_eq!(save_title(&draft), "Hidden gem");
    }

    #[test]
    fn save_title_falls_back_to_body_prefix() {
        let draft = ReviewDraft {
            title: None,
            body: "x".repeat(120),
        };
        assert_eq!(save_title(&draft), "x".repeat(80));
    }

    #[test]
    fn proxy_reply_text_reads_keyless_shape() {
        let reply = serde_json::json!({"raw": {"mock": true, "text": "这是模拟 AI 文案"}});
        assert_eq!(proxy_reply_text(&reply), "这是模拟 AI 文案");
    }

    #[test]
    fn proxy_reply_text_reads_chat_completion() {
        let reply = serde_json::json!({
            "raw": {"choices": [{"message": {"content": "generated"}}]}
        });
        assert_eq!(proxy_reply_text(&reply), "generated");
    }

    #[test]
    fn photo_data_url_carries_mime_and_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dish.png");
        fs::write(&path, b"not really a png").unwrap();

        let url = read_photo_data_url(&path).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(payload).unwrap(), b"not really a png");
    }

    #[test]
    fn photo_data_url_defaults_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dish");
        fs::write(&path, b"bytes").unwrap();

        let url = read_photo_data_url(&path).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }
}
