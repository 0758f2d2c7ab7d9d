/// Configuration system for szk.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::SzkConfig::default()`]
/// 2. **User global config** — `~/.szk/config.toml`
/// 3. **Project local config** — `.szk.toml` in the current working directory
/// 4. **Environment variables** — highest precedence
///
/// Missing or malformed TOML files are ignored silently; the tool must keep
/// working with nothing but its defaults.
///
/// # Usage
///
/// ```rust,ignore
/// use szk::config;
///
/// let cfg = config::load();
/// println!("backend: {}", cfg.backend.base_url);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::SzkConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved szk configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. This is the primary entry point for all modules that need
/// configuration.
pub fn load() -> SzkConfig {
    let mut config = SzkConfig::default();

    // Layer 2: user global config (~/.szk/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_config(&mut config, &global);
    }

    // Layer 3: project local config (.szk.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_config(&mut config, &project);
    }

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed. Malformed files are silently ignored — a broken
/// config must never take the CLI down.
fn load_toml_file(path: Option<PathBuf>) -> Option<SzkConfig> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge a loaded config layer into the base config.
///
/// Each TOML file deserializes with `serde(default)`, so unset keys already
/// carry the built-in defaults. The overlay therefore fully replaces the
/// base: explicitly-set values win, unset values match the base's defaults.
fn merge_config(base: &mut SzkConfig, overlay: &SzkConfig) {
    *base = overlay.clone();
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.szk/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".szk").join("config.toml"))
}

/// Path to the project local config: `.szk.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir().ok().map(|cwd| cwd.join(".szk.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `SZK_BACKEND_URL` — backend base URL
/// - `SZK_MOCK` — mock mode (`1`/`true`/`yes`/`on`)
/// - `SILRA_API_KEY` — AI bearer key (provider-named variant)
/// - `SZK_AI_KEY` — AI bearer key (checked after `SILRA_API_KEY`)
/// - `SZK_AI_URL` — AI endpoint URL
fn apply_env_overrides(config: &mut SzkConfig) {
    if let Ok(val) = std::env::var("SZK_BACKEND_URL")
        && !val.is_empty()
    {
        config.backend.base_url = val;
    }
    if let Ok(val) = std::env::var("SZK_MOCK") {
        config.backend.mock = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("SILRA_API_KEY")
        && !val.is_empty()
    {
        config.ai.api_key = val;
    } else if let Ok(val) = std::env::var("SZK_AI_KEY")
        && !val.is_empty()
    {
        config.ai.api_key = val;
    }
    if let Ok(val) = std::env::var("SZK_AI_URL")
        && !val.is_empty()
    {
        config.ai.api_url = val;
    }
}

/// Check if a string value represents a truthy boolean.
pub(crate) fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.szk/config.toml`.
///
/// Creates the `~/.szk/` directory if it doesn't exist. Returns an error
/// if the file already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.szk/ directory")?;
    }

    fs::write(&path, SzkConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `backend.base_url`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() {
        let content = fs::read_to_string(&path).context("failed to read config file")?;
        // Parse as toml::Value for surgical update
        let mut value_table: toml::Value =
            toml::from_str(&content).context("failed to parse config as TOML value")?;

        set_toml_value(&mut value_table, key, value)?;

        let toml_str =
            toml::to_string_pretty(&value_table).context("failed to serialize config")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        fs::write(&path, toml_str).context("failed to write config file")?;

        return Ok(());
    }

    // No existing file: serialize defaults, update, write
    let toml_str = toml::to_string_pretty(&SzkConfig::default())
        .context("failed to serialize default config")?;
    let mut value_table: toml::Value =
        toml::from_str(&toml_str).context("failed to parse serialized defaults")?;

    set_toml_value(&mut value_table, key, value)?;

    let output =
        toml::to_string_pretty(&value_table).context("failed to serialize updated config")?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    if parts.is_empty() {
        anyhow::bail!("empty config key");
    }

    // Navigate to the parent table
    let mut current = root;
    for &part in &parts[..parts.len() - 1] {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let leaf = parts[parts.len() - 1];

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    // Parse the raw value according to the existing value's type
    let existing = table.get(leaf);
    let new_value = match existing {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Float(_)) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("false"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn set_toml_value_updates_string() {
        let toml_str = r#"
[backend]
base_url = "http://localhost:8001"
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "backend.base_url", "https://admin.example.com").unwrap();

        let table = root.as_table().unwrap();
        let backend = table["backend"].as_table().unwrap();
        assert_eq!(
            backend["base_url"].as_str(),
            Some("https://admin.example.com")
        );
    }

    #[test]
    fn set_toml_value_updates_bool() {
        let toml_str = r#"
[backend]
mock = false
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "backend.mock", "true").unwrap();

        let table = root.as_table().unwrap();
        let backend = table["backend"].as_table().unwrap();
        assert_eq!(backend["mock"].as_bool(), Some(true));
    }

    #[test]
    fn set_toml_value_updates_integer() {
        let toml_str = r#"
[backend]
timeout_ms = 10000
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "backend.timeout_ms", "5000").unwrap();

        let table = root.as_table().unwrap();
        let backend = table["backend"].as_table().unwrap();
        assert_eq!(backend["timeout_ms"].as_integer(), Some(5000));
    }

    #[test]
    fn set_toml_value_updates_float() {
        let toml_str = r#"
[ai]
temperature = 0.7
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        set_toml_value(&mut root, "ai.temperature", "0.4").unwrap();

        let table = root.as_table().unwrap();
        let ai = table["ai"].as_table().unwrap();
        assert!((ai["temperature"].as_float().unwrap() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn set_toml_value_rejects_invalid_key() {
        let toml_str = r#"
[backend]
mock = false
"#;
        let mut root: toml::Value = toml::from_str(toml_str).unwrap();
        let result = set_toml_value(&mut root, "nonexistent.key", "value");
        assert!(result.is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let result = show_effective_config();
        assert!(result.is_ok());
        let toml_str = result.unwrap();
        // Should be parseable back
        let _: SzkConfig = toml::from_str(&toml_str).unwrap();
    }
}
