use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use anyhow::Result;
use regex::Regex;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub translate: TranslateConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

/// How much of a transport failure is shown to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorDetail {
    /// Generic per-endpoint message only.
    Suppressed,
    /// The underlying error object is sent back as-is.
    Passthrough,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    #[serde(default = "default_translate_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_translate_error_detail")]
    pub error_detail: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    #[serde(default = "default_places_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_radius_meters")]
    pub radius_meters: u32,
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
    #[serde(default = "default_passthrough")]
    pub error_detail: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesConfig {
    #[serde(default = "default_favorites_collection")]
    pub collection: String,
    #[serde(default = "default_passthrough")]
    pub error_detail: ErrorDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Firestore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_backend")]
    pub backend: StoreBackend,
    /// JSON file of `{collection: {id: document}}` loaded into the memory backend.
    #[serde(default)]
    pub seed_path: Option<String>,
    #[serde(default)]
    pub firestore: FirestoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    #[serde(default = "default_firestore_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default = "default_firestore_database")]
    pub database: String,
    /// OAuth2 bearer token. Leave unset when talking to the emulator.
    #[serde(default)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JwtAlgorithm {
    HS256,
    RS256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_jwt_algorithm")]
    pub algorithm: JwtAlgorithm,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub public_key_path: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_filter() -> String {
    "places_bff=debug,tower_http=debug".to_string()
}

fn default_translate_endpoint() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_translate_error_detail() -> ErrorDetail {
    ErrorDetail::Suppressed
}

fn default_passthrough() -> ErrorDetail {
    ErrorDetail::Passthrough
}

fn default_places_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/place/nearbysearch/json".to_string()
}

fn default_radius_meters() -> u32 {
    50
}

fn default_latitude() -> f64 {
    35.6895
}

fn default_longitude() -> f64 {
    139.6917
}

fn default_favorites_collection() -> String {
    "favorite".to_string()
}

fn default_store_backend() -> StoreBackend {
    StoreBackend::Memory
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_firestore_database() -> String {
    "(default)".to_string()
}

fn default_jwt_algorithm() -> JwtAlgorithm {
    JwtAlgorithm::RS256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_filter: default_log_filter(),
        }
    }
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translate_endpoint(),
            api_key: None,
            source_language: default_source_language(),
            error_detail: default_translate_error_detail(),
        }
    }
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            endpoint: default_places_endpoint(),
            api_key: None,
            radius_meters: default_radius_meters(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
            error_detail: default_passthrough(),
        }
    }
}

impl Default for FavoritesConfig {
    fn default() -> Self {
        Self {
            collection: default_favorites_collection(),
            error_detail: default_passthrough(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: default_store_backend(),
            seed_path: None,
            firestore: FirestoreConfig::default(),
        }
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_firestore_base_url(),
            project_id: String::new(),
            database: default_firestore_database(),
            access_token: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            algorithm: default_jwt_algorithm(),
            secret: None,
            public_key_path: None,
            issuer: None,
            audience: None,
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }
        let content = fs::read_to_string(path)?;
        let content = substitute_env(&content)?;

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Try each candidate path in order and return the first config that loads.
    pub fn load_first(paths: &[String]) -> Result<(Self, String)> {
        for path in paths {
            match Self::load(path) {
                Ok(config) => return Ok((config, path.clone())),
                Err(e) => {
                    tracing::debug!("Failed to load config from {}: {}", path, e);
                }
            }
        }
        anyhow::bail!("Could not find config file. Tried: {:?}", paths)
    }
}

/// Replace `${VAR_NAME}` with the value of the environment variable.
/// Unset variables are left untouched.
pub fn substitute_env(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}

/// Treat an empty credential the same as a missing one.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty() && !v.starts_with("${"))
}
