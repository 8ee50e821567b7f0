use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

// Bot routing lives in gmpa_core so the workflow and the config share one type
use gmpa_core::BotRoutes;

/// Environment variable overriding `interact.client_id`.
pub const CLIENT_ID_ENV: &str = "AI_CLIENT_ID";
/// Environment variable overriding `interact.client_secret`.
pub const CLIENT_SECRET_ENV: &str = "AI_CLIENT_SECRET";

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub interact: InteractConfig,
    pub bots: BotRoutes,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InteractConfig {
    #[serde(default = "InteractConfig::default_hostname")]
    pub hostname: String,
    #[serde(default = "InteractConfig::default_token_path")]
    pub token_path: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "InteractConfig::default_application_id")]
    pub application_id: String,
}

impl Default for InteractConfig {
    fn default() -> Self {
        Self {
            hostname: Self::default_hostname(),
            token_path: Self::default_token_path(),
            client_id: String::new(),
            client_secret: String::new(),
            application_id: Self::default_application_id(),
        }
    }
}

impl InteractConfig {
    fn default_hostname() -> String {
        "interact.interpublic.com".to_string()
    }

    fn default_token_path() -> String {
        "/api/token".to_string()
    }

    fn default_application_id() -> String {
        "test".to_string()
    }

    /// Base URL of the Interact service, e.g. `https://interact.interpublic.com`.
    #[must_use]
    pub fn base_url(&self) -> String {
        if self.hostname.starts_with("http://") || self.hostname.starts_with("https://") {
            self.hostname.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.hostname.trim_end_matches('/'))
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "AnalysisConfig::default_preview_rows")]
    pub preview_rows: usize,
    #[serde(default = "AnalysisConfig::default_driver_limit")]
    pub driver_limit: usize,
    /// JSON recommendation catalog; the built-in catalog is used when unset.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub catalog_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preview_rows: Self::default_preview_rows(),
            driver_limit: Self::default_driver_limit(),
            catalog_path: None,
        }
    }
}

impl AnalysisConfig {
    const fn default_preview_rows() -> usize {
        5
    }

    const fn default_driver_limit() -> usize {
        gmpa_core::DEFAULT_DRIVER_LIMIT
    }
}

/// Credential values written by `gmpa init`.
const PLACEHOLDERS: [&str; 2] = ["your-client-id-here", "your-client-secret-here"];

/// `~/gmpa`
pub fn config_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
        .join("gmpa"))
}

impl Config {
    /// Load `~/gmpa/config.json`, then apply credential overrides from the
    /// environment.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = config_dir()?.join(CONFIG_FILE);

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'gmpa init' to create config.",
                config_path.display()
            );
        }

        let mut config = Self::load_from(&config_path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace credentials with non-empty values returned by `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(id) = lookup(CLIENT_ID_ENV).filter(|v| !v.is_empty()) {
            info!("Using client id from {CLIENT_ID_ENV}");
            self.interact.client_id = id;
        }
        if let Some(secret) = lookup(CLIENT_SECRET_ENV).filter(|v| !v.is_empty()) {
            info!("Using client secret from {CLIENT_SECRET_ENV}");
            self.interact.client_secret = secret;
        }
    }

    /// Fail early when credentials were never filled in.
    pub fn ensure_credentials(&self) -> anyhow::Result<()> {
        let unset = |value: &str| value.is_empty() || PLACEHOLDERS.contains(&value);
        if unset(&self.interact.client_id) || unset(&self.interact.client_secret) {
            anyhow::bail!(
                "Interact credentials missing. Set interact.client_id / interact.client_secret in the config or {CLIENT_ID_ENV} / {CLIENT_SECRET_ENV}."
            );
        }
        Ok(())
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let dir = config_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = Self::create_config_in(&config_dir)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Add your Interact client id and secret (or export {CLIENT_ID_ENV} / {CLIENT_SECRET_ENV})");
        println!("   2. Fill in the bot ids for each analysis step");
        println!("   3. Run 'gmpa analyze <assessment.csv>'");
        println!();
        println!("🔧 Configuration options:");
        println!("   - analysis.preview_rows: rows shown after loading the CSV");
        println!("   - analysis.driver_limit: number of maturity drivers to report");
        println!("   - analysis.catalog_path: JSON file replacing the built-in recommendations");
        println!();
        Ok(())
    }

    /// Write the template into `dir`, refusing to overwrite an existing file.
    pub fn create_config_in(dir: &Path) -> anyhow::Result<PathBuf> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        let config_template = r#"{
  "interact": {
    "hostname": "interact.interpublic.com",
    "token_path": "/api/token",
    "client_id": "your-client-id-here",
    "client_secret": "your-client-secret-here",
    "application_id": "test"
  },
  "bots": {
    "category_summary": "be55b625-70c3-44cd-82e0-8c5de53ca0fd",
    "bullet_summary": "be55b625-70c3-44cd-82e0-8c5de53ca0fd",
    "maturity_gaps": "be55b625-70c3-44cd-82e0-8c5de53ca0fd"
  },
  "analysis": {
    "preview_rows": 5,
    "driver_limit": 5
  }
}"#;

        std::fs::write(&config_path, config_template)?;
        Ok(config_path)
    }
}
