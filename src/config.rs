// ============================================================================
// Configuration
// ============================================================================
// Lue depuis l'environnement au démarrage, avant le passage en mode TUI
// (une erreur de config s'affiche donc encore sur stderr)
//
// | Variable               | Défaut                          |
// |------------------------|---------------------------------|
// | DEEPCOIN_API_URL       | http://127.0.0.1:8000           |
// | DEEPCOIN_TIMEOUT_SECS  | 120                             |
// | DEEPCOIN_SAMPLE_TARGET | 30                              |
// | DEEPCOIN_LOG_DIR       | <data_local_dir>/deepcoin/logs  |
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::analysis::DEFAULT_SAMPLE_TARGET;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Les scrapers côté serveur sont lents : timeout large
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ENV_API_URL: &str = "DEEPCOIN_API_URL";
const ENV_TIMEOUT_SECS: &str = "DEEPCOIN_TIMEOUT_SECS";
const ENV_SAMPLE_TARGET: &str = "DEEPCOIN_SAMPLE_TARGET";
const ENV_LOG_DIR: &str = "DEEPCOIN_LOG_DIR";

/// Configuration de l'application
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// URL de base du service d'analyse (sans '/' final)
    pub api_url: String,

    /// Timeout par requête
    pub request_timeout: Duration,

    /// Nombre de points visé par le Sampler
    pub sample_target: usize,

    /// Répertoire des fichiers de log
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            sample_target: DEFAULT_SAMPLE_TARGET,
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Charge la configuration via une fonction de lecture arbitraire
    ///
    /// CONCEPT RUST : Closure en paramètre (impl Fn)
    /// - from_env() passe std::env::var
    /// - Les tests passent une HashMap, sans toucher à l'environnement du process
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = non_empty(lookup(ENV_API_URL)) {
            config.api_url = url.trim_end_matches('/').to_string();
        }

        if let Some(raw) = non_empty(lookup(ENV_TIMEOUT_SECS)) {
            let secs: u64 = raw
                .parse()
                .with_context(|| format!("{ENV_TIMEOUT_SECS} invalide : {raw:?}"))?;
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = non_empty(lookup(ENV_SAMPLE_TARGET)) {
            let target: usize = raw
                .parse()
                .with_context(|| format!("{ENV_SAMPLE_TARGET} invalide : {raw:?}"))?;
            if target == 0 {
                bail!("{ENV_SAMPLE_TARGET} doit être strictement positif");
            }
            config.sample_target = target;
        }

        if let Some(dir) = non_empty(lookup(ENV_LOG_DIR)) {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

/// Répertoire de logs par défaut
///
/// - Linux : ~/.local/share/deepcoin/logs
/// - macOS : ~/Library/Application Support/deepcoin/logs
/// - Sinon : ./logs
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("deepcoin").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ============================================================================
// Tests unitaires
// ============================================================================
