// ============================================================================
// Configuration
// ============================================================================
// Arguments de ligne de commande, chacun surchargeable par une variable
// d'environnement (GREENJOBS_*)
//
// CONCEPT RUST : clap derive
// - #[derive(Parser)] génère le parsing à partir de la struct
// - #[arg(long, env = "...")] : --flag ou variable d'environnement
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use crate::api::FetchOptions;
use crate::cache::IndicatorCache;

/// Dashboard climat & emploi dans le terminal
#[derive(Debug, Clone, Parser)]
#[command(name = "greenjobs", version, about)]
pub struct Config {
    /// Nombre maximum de lignes demandées par indicateur
    #[arg(long, env = "GREENJOBS_PAGE_SIZE", default_value_t = 20_000)]
    pub page_size: u32,

    /// Tentatives supplémentaires après un échec
    #[arg(long, env = "GREENJOBS_MAX_RETRIES", default_value_t = 2)]
    pub max_retries: u32,

    /// Délai de base entre deux tentatives (secondes, linéaire)
    #[arg(long, env = "GREENJOBS_BACKOFF_SECONDS", default_value_t = 1.0)]
    pub backoff_seconds: f64,

    /// Durée de validité du cache (secondes). Par défaut : toute la session
    #[arg(long, env = "GREENJOBS_CACHE_TTL")]
    pub cache_ttl_seconds: Option<u64>,

    /// N'appelle pas l'API : données synthétiques uniquement
    #[arg(long, env = "GREENJOBS_OFFLINE")]
    pub offline: bool,

    /// Répertoire des fichiers de log
    #[arg(long, env = "GREENJOBS_LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Répertoire des exports CSV (défaut : dossier Téléchargements, sinon ./exports)
    #[arg(long, env = "GREENJOBS_EXPORT_DIR")]
    pub export_dir: Option<PathBuf>,
}

impl Config {
    /// Vérifie la cohérence des valeurs
    pub fn validate(&self) -> Result<()> {
        self.fetch_options()
            .validate()
            .context("Options de fetch invalides")
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            page_size: self.page_size,
            max_retries: self.max_retries,
            backoff_seconds: self.backoff_seconds,
        }
    }

    pub fn build_cache(&self) -> IndicatorCache {
        IndicatorCache::new(self.cache_ttl_seconds.map(Duration::from_secs))
    }

    /// Répertoire effectif des exports
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .or_else(|| dirs::download_dir().map(|d| d.join("greenjobs")))
            .unwrap_or_else(|| PathBuf::from("./exports"))
    }
}
