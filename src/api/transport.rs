// ============================================================================
// Transport HTTP et temporisation
// ============================================================================
// Deux coutures (traits) entre le fetcher et le monde extérieur :
// - HttpTransport : exécute un GET et rend statut + corps
// - Sleeper : attend entre deux tentatives
//
// CONCEPT RUST : async-trait
// - Les traits ne supportent pas directement les méthodes async "dyn-safe"
// - #[async_trait] transforme la méthode en Pin<Box<dyn Future>>
// - Permet d'injecter un faux transport dans les tests
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::error::AttemptError;

/// Timeout fixe d'une requête vers l'API
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Réponse HTTP brute (statut + corps texte)
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Exécute une requête GET
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, AttemptError>;
}

/// Attend une durée donnée entre deux tentatives
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

// ============================================================================
// Implémentation réelle : reqwest
// ============================================================================

/// Transport basé sur reqwest, timeout de 15 secondes par requête
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Crée le client HTTP
    ///
    /// Le User-Agent identifie l'application auprès de l'API.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("greenjobs/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, AttemptError> {
        debug!(url = %url, "Sending HTTP request to World Bank");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        // Le corps est lu même en cas d'erreur HTTP (utile pour les logs)
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "Received HTTP response");
        Ok(HttpResponse { status, body })
    }
}

/// Sleeper réel basé sur tokio::time
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
