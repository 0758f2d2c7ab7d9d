use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use szk::api::ApiClient;
use szk::cli::{self, OutputFormat, ReviewArgs};
use szk::config;
use szk::session::{SessionStore, Theme};

#[derive(Debug, Parser)]
#[command(name = "szk")]
#[command(about = "Merchant review console for Songzike NFC pages")]
struct App {
    /// Backend base URL override
    #[arg(long, global = true)]
    backend: Option<String>,
    /// Run against built-in fixtures with no network traffic
    #[arg(long, global = true)]
    mock: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        email: String,
        /// Password; prompted from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Clear the stored session token
    Logout,
    /// Show the logged-in account
    Me,
    /// List merchants with dashboard totals
    Merchants {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show one merchant dashboard with recent contents
    Merchant {
        shop_id: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Mint a batch of NFC tag tokens for a shop
    Tags {
        shop_id: String,
        /// Number of tokens to mint (1..=2000)
        #[arg(long)]
        count: usize,
        /// Token prefix
        #[arg(long, default_value = "")]
        prefix: String,
        /// Write tokens to this file, one per line
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a review draft for a tag token
    Review {
        token: String,
        /// Target platform
        #[arg(long, default_value = "xiaohongshu")]
        platform: String,
        /// Language override: en or zh
        #[arg(long)]
        lang: Option<String>,
        /// Prompt text replacing the platform template
        #[arg(long)]
        prompt: Option<String>,
        /// Photo file; repeatable, at most 3 kept, first one attached
        #[arg(long)]
        photo: Vec<PathBuf>,
        /// Seed for deterministic persona and emoji choices
        #[arg(long)]
        seed: Option<u64>,
        /// Save the draft to the backend
        #[arg(long)]
        save: bool,
        /// Save the draft and publish it through the social mock
        #[arg(long)]
        publish: bool,
        /// Copy the draft body to the clipboard
        #[arg(long)]
        copy: bool,
    },
    /// Show a platform's deep link and web fallback
    Publish {
        platform: String,
        /// Open the web fallback in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Create merchant credentials with a fresh shop (admin)
    MerchantNew,
    /// Check backend, AI key, and session health
    Health,
    /// Show recent generations
    History {
        /// Number of records to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Set the interface language (en or zh)
    Lang { value: String },
    /// Set the color theme (dark or light)
    Theme { value: String },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective merged configuration
    Show,
    /// Write a default config file to ~/.szk/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one configuration value (e.g. ai.model)
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    let mut cfg = config::load();
    if let Some(backend) = &app.backend {
        cfg.backend.base_url = backend.clone();
    }
    if app.mock {
        cfg.backend.mock = true;
    }

    let store = SessionStore::open_default()?;
    if store.load().theme == Theme::Light {
        colored::control::set_override(false);
    }
    let api = ApiClient::new(&cfg, store);

    match app.command {
        Commands::Login { email, password } => cli::run_login(&api, &email, password.as_deref()),
        Commands::Logout => cli::run_logout(&api),
        Commands::Me => cli::run_me(&api),
        Commands::Merchants { format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_merchants(&api, fmt)
        }
        Commands::Merchant { shop_id, format } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_merchant(&api, &shop_id, fmt)
        }
        Commands::Tags {
            shop_id,
            count,
            prefix,
            out,
        } => cli::run_tags(&api, &shop_id, count, &prefix, out.as_deref()),
        Commands::Review {
            token,
            platform,
            lang,
            prompt,
            photo,
            seed,
            save,
            publish,
            copy,
        } => {
            let args = ReviewArgs {
                token,
                platform,
                lang,
                prompt,
                photos: photo,
                seed,
                save,
                publish,
                copy,
            };
            cli::run_review(&api, &cfg, &args)
        }
        Commands::Publish { platform, open } => cli::run_publish(&api, &platform, open),
        Commands::MerchantNew => cli::run_merchant_new(&api),
        Commands::Health => cli::run_health(&api, &cfg),
        Commands::History { limit } => cli::run_history(limit),
        Commands::Lang { value } => cli::run_lang(api.store(), &value),
        Commands::Theme { value } => cli::run_theme(api.store(), &value),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
