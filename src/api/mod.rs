// ============================================================================
// Module : api
// ============================================================================
// Client de l'API World Bank : transport HTTP, retry, normalisation
// ============================================================================

pub mod error;      // FetchFailure, AttemptError
pub mod transport;  // Coutures HTTP / sleep
pub mod worldbank;  // Client API World Bank

// Re-export des éléments principaux
pub use error::{AttemptError, FetchFailure};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport, Sleeper, TokioSleeper};
pub use worldbank::{build_worldbank_url, FetchOptions, IndicatorFetcher};
