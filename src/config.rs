//! Application configuration.
//!
//! Loads and validates `config.toml`. Every option has a working default, so
//! the file is optional — a bare `campus-card serve` runs with a local
//! SQLite file, an `uploads/` directory next to it, and the DejaVu system
//! fonts.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [server]
//! bind = "127.0.0.1:8080"                  # HTTP listen address
//! public_base_url = "http://127.0.0.1:8080" # Prefix baked into QR payloads
//!
//! [storage]
//! database_path = "students.db"            # SQLite file
//! upload_dir = "uploads"                   # Photos and QR PNGs
//!
//! [branding]
//! # logo_path = "static/school_logo.png"   # Optional header logo
//! # seal_path = "static/seal.png"          # Optional card seal
//!
//! [fonts]
//! bold_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"
//! regular_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//! ```
//!
//! Config files are sparse — override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Application configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database and upload directory locations.
    pub storage: StorageConfig,
    /// Optional card artwork (logo, seal).
    pub branding: BrandingConfig,
    /// TrueType fonts used by the card compositor.
    pub fonts: FontConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Listen address, e.g. `127.0.0.1:8080`.
    pub bind: String,
    /// URL prefix for QR payloads. A QR code scans to
    /// `{public_base_url}/student/{idno}`, so this must be reachable from
    /// the scanning device — not necessarily the bind address.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".into(),
            public_base_url: "http://127.0.0.1:8080".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory holding uploaded photos and generated QR PNGs. Created at
    /// startup if absent.
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("students.db"),
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Optional artwork pasted onto the card. A configured path that does not
/// exist at render time is skipped silently, matching the compositor's
/// optional-asset contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrandingConfig {
    pub logo_path: Option<PathBuf>,
    pub seal_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Bold face used for the title and labels.
    pub bold_path: PathBuf,
    /// Regular face used for values and the footer.
    pub regular_path: PathBuf,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            bold_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"),
            regular_path: PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Validation(format!("server.bind: {e}")))?;
        if self.server.public_base_url.is_empty() {
            return Err(ConfigError::Validation(
                "server.public_base_url must not be empty".into(),
            ));
        }
        if self.server.public_base_url.ends_with('/') {
            return Err(ConfigError::Validation(
                "server.public_base_url must not end with '/'".into(),
            ));
        }
        Ok(())
    }

    /// The fully-qualified public viewer URL for an external id. This is
    /// the string encoded into the student's QR code.
    pub fn viewer_url(&self, idno: &str) -> String {
        format!("{}/student/{}", self.server.public_base_url, idno)
    }
}

/// A documented stock `config.toml`, printed by the `gen-config` command.
pub fn stock_config_toml() -> String {
    let defaults = FontConfig::default();
    format!(
        r#"# campus-card configuration. All options are optional; defaults shown.

[server]
# HTTP listen address.
bind = "127.0.0.1:8080"
# URL prefix baked into QR payloads. Must be reachable from the phone
# scanning the card, so use the machine's LAN address in real deployments.
public_base_url = "http://127.0.0.1:8080"

[storage]
# SQLite database file. Created and migrated on startup.
database_path = "students.db"
# Uploaded photos and generated QR PNGs land here.
upload_dir = "uploads"

[branding]
# Optional artwork for the card. Missing files are skipped, not errors.
# logo_path = "static/school_logo.png"
# seal_path = "static/seal.png"

[fonts]
# Card text fonts. If either fails to load, the compositor falls back to a
# built-in bitmap face for all text.
bold_path = "{}"
regular_path = "{}"
"#,
        defaults.bold_path.display(),
        defaults.regular_path.display()
    )
}
