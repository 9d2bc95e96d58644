use std::path::PathBuf;

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the static site (index.html, css, js, images).
    pub public_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding the JSON collection files.
    pub data_dir: PathBuf,
    /// Directory receiving resized uploads. Served under `/uploads`.
    pub uploads_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
    /// Account that can never be removed or deactivated.
    pub protected_admin: String,
    /// When set and no admins exist yet, the protected admin is created with this password.
    pub bootstrap_password: Option<String>,
    #[serde(default)]
    pub secure_cookies: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Ceiling for a single decoded image.
    pub max_file_bytes: usize,
    /// Most files accepted in one gallery upload.
    pub max_files: usize,
    pub max_edge: u32,
    pub jpeg_quality: u8,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            max_files: 10,
            max_edge: 1920,
            jpeg_quality: 85,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecoveryConfig {
    pub required_approvals: usize,
    pub expiry_hours: i64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            required_approvals: 2,
            expiry_hours: 72,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    pub preview_chars: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self { preview_chars: 350 }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.public_dir", "public")?
            .set_default("storage.data_dir", "data")?
            .set_default("storage.uploads_dir", "uploads")?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("auth.protected_admin", "admin@school.local")?
            .set_default("auth.secure_cookies", false)?
            .set_default("uploads.max_file_bytes", 10 * 1024 * 1024)?
            .set_default("uploads.max_files", 10)?
            .set_default("uploads.max_edge", 1920)?
            .set_default("uploads.jpeg_quality", 85)?
            .set_default("recovery.required_approvals", 2)?
            .set_default("recovery.expiry_hours", 72)?
            .set_default("content.preview_chars", 350)?

            // Add config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // Add environment variables (with SCHOOLHOUSE__ prefix, double underscore separates levels)
            .add_source(Environment::with_prefix("SCHOOLHOUSE").separator("__"))

            .build()?;

        config.try_deserialize()
    }

}

/// Room for the non-image parts of a request (title, content, multipart framing).
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

impl UploadConfig {
    /// Body ceiling for announcement posts, which carry one image as a base64
    /// data URL (4 output bytes per 3 input bytes).
    pub fn announcement_body_limit(&self) -> usize {
        self.max_file_bytes.div_ceil(3) * 4 + FORM_OVERHEAD_BYTES
    }

    /// Body ceiling for gallery uploads: `max_files` full-size images.
    pub fn gallery_body_limit(&self) -> usize {
        self.max_file_bytes.saturating_mul(self.max_files.max(1)) + FORM_OVERHEAD_BYTES
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                public_dir: PathBuf::from("public"),
            },
            storage: StorageConfig {
                data_dir: PathBuf::from("data"),
                uploads_dir: PathBuf::from("uploads"),
            },
            auth: AuthConfig {
                session_duration_hours: 24,
                protected_admin: "admin@school.local".to_string(),
                bootstrap_password: None,
                secure_cookies: false,
            },
            uploads: UploadConfig::default(),
            recovery: RecoveryConfig::default(),
            content: ContentConfig::default(),
        }
    }
}
