// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod indicator; // Séries World Bank (IndicatorRecord, Indicator, IndicatorSeries)
pub mod sample;    // Tableaux statiques du dashboard

// Re-export des structures principales pour simplifier les imports
pub use indicator::{DataOrigin, Indicator, IndicatorRecord, IndicatorSeries};
pub use sample::{ClimateRow, CollegeRow, JobScore, YearRow};
