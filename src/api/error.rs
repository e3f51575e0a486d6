// ============================================================================
// Erreurs de l'API World Bank
// ============================================================================
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère Display + std::error::Error
// - L'UI doit pouvoir distinguer l'échec du fetch (pour basculer sur les
//   données synthétiques), d'où une erreur typée plutôt qu'anyhow
// ============================================================================

use thiserror::Error;

/// Raison d'une tentative ratée (une requête HTTP)
#[derive(Debug, Error)]
pub enum AttemptError {
    /// Erreur réseau ou timeout
    #[error("erreur de transport : {0}")]
    Transport(String),

    /// Statut HTTP hors 2xx
    #[error("statut HTTP {0}")]
    Status(u16),

    /// Corps de réponse qui n'est pas l'enveloppe [metadata, records]
    #[error("enveloppe invalide : {0}")]
    MalformedEnvelope(String),
}

/// Échec d'un fetch d'indicateur
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// Toutes les tentatives ont échoué
    #[error("échec du fetch de {indicator_code} après {attempts} tentative(s) : {last_error}")]
    Exhausted {
        indicator_code: String,
        attempts: u32,
        #[source]
        last_error: AttemptError,
    },

    /// Paramètres refusés avant tout appel réseau
    #[error("requête invalide : {0}")]
    InvalidRequest(String),
}

impl FetchFailure {
    /// Nombre de requêtes HTTP effectuées avant l'échec
    pub fn attempts(&self) -> u32 {
        match self {
            FetchFailure::Exhausted { attempts, .. } => *attempts,
            FetchFailure::InvalidRequest(_) => 0,
        }
    }
}
