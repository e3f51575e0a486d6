// ============================================================================
// greenjobs - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;     // API World Bank (fetch + retry + normalisation)
pub mod app;     // État de l'application
pub mod cache;   // Cache des séries
pub mod config;  // Arguments / variables d'environnement
pub mod export;  // Export CSV
pub mod models;  // Structures de données
pub mod source;  // Stratégies de source (distant, synthétique, repli)
pub mod ui;      // Interface utilisateur
