// ============================================================================
// Structures : IndicatorRecord, Indicator, IndicatorSeries
// ============================================================================
// Une série World Bank = une liste de lignes (pays, année, valeur)
//
// CONCEPTS RUST :
// 1. Option<T> pour chaque champ permissif (pas de valeurs sentinelles)
// 2. Implémentation manuelle de PartialEq/Eq/Hash (f64 n'est pas Eq)
// 3. BTreeMap pour une agrégation triée par année
// ============================================================================

use std::collections::{BTreeMap, HashSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

// ============================================================================
// IndicatorRecord
// ============================================================================

/// Une ligne normalisée d'une série d'indicateur
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorRecord {
    /// Code ISO3 du pays (ex: "KOR"), absent pour certains agrégats
    pub country_iso3: Option<String>,

    /// Nom affiché du pays (ex: "Korea, Rep.")
    pub country_name: Option<String>,

    /// Année civile, absente si la date source est illisible
    pub year: Option<i32>,

    /// Valeur de l'indicateur, absente si la source la marque manquante
    pub value: Option<f64>,

    /// Code de l'indicateur demandé (constant dans un fetch)
    pub indicator_code: String,
}

impl IndicatorRecord {
    /// Valeur comparable bit à bit
    ///
    /// CONCEPT RUST : f64::to_bits
    /// - f64 n'implémente pas Eq (NaN != NaN)
    /// - Comparer les bits donne une égalité totale et hashable
    fn value_bits(&self) -> Option<u64> {
        self.value.map(f64::to_bits)
    }
}

impl PartialEq for IndicatorRecord {
    fn eq(&self, other: &Self) -> bool {
        self.country_iso3 == other.country_iso3
            && self.country_name == other.country_name
            && self.year == other.year
            && self.value_bits() == other.value_bits()
            && self.indicator_code == other.indicator_code
    }
}

impl Eq for IndicatorRecord {}

impl Hash for IndicatorRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.country_iso3.hash(state);
        self.country_name.hash(state);
        self.year.hash(state);
        self.value_bits().hash(state);
        self.indicator_code.hash(state);
    }
}

/// Supprime les doublons exacts en gardant l'ordre de première apparition
pub fn dedup_records(records: Vec<IndicatorRecord>) -> Vec<IndicatorRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect()
}

// ============================================================================
// Indicator : les quatre séries affichées par le dashboard
// ============================================================================

/// Indicateurs World Bank suivis par le dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    /// Émissions de CO2 (tonnes métriques par habitant)
    Co2PerCapita,
    /// Part des énergies renouvelables dans la consommation finale
    RenewableShare,
    /// Chômage (% de la population active)
    Unemployment,
    /// Taux brut de scolarisation dans le supérieur
    TertiaryEnrollment,
}

impl Indicator {
    /// Les quatre indicateurs, dans l'ordre d'affichage
    pub const ALL: [Indicator; 4] = [
        Indicator::Co2PerCapita,
        Indicator::RenewableShare,
        Indicator::Unemployment,
        Indicator::TertiaryEnrollment,
    ];

    /// Code World Bank de l'indicateur
    pub fn code(&self) -> &'static str {
        match self {
            Indicator::Co2PerCapita => "EN.ATM.CO2E.PC",
            Indicator::RenewableShare => "EG.FEC.RNEW.ZS",
            Indicator::Unemployment => "SL.UEM.TOTL.ZS",
            Indicator::TertiaryEnrollment => "SE.TER.ENRR",
        }
    }

    /// Libellé affiché dans les graphiques
    pub fn label(&self) -> &'static str {
        match self {
            Indicator::Co2PerCapita => "CO2 emissions (t per capita)",
            Indicator::RenewableShare => "Renewable energy (% of final consumption)",
            Indicator::Unemployment => "Unemployment (% of labor force)",
            Indicator::TertiaryEnrollment => "Tertiary enrollment (% gross)",
        }
    }

    /// Profil (valeur de départ en 2000, pente annuelle, amplitude du bruit)
    /// utilisé pour générer une série synthétique plausible
    pub fn synthetic_profile(&self) -> (f64, f64, f64) {
        match self {
            Indicator::Co2PerCapita => (4.2, 0.02, 0.15),
            Indicator::RenewableShare => (17.5, 0.15, 0.6),
            Indicator::Unemployment => (6.4, -0.03, 0.5),
            Indicator::TertiaryEnrollment => (19.0, 0.85, 1.2),
        }
    }

    /// Retrouve un indicateur à partir de son code
    pub fn from_code(code: &str) -> Option<Indicator> {
        Indicator::ALL.into_iter().find(|i| i.code() == code)
    }
}

// ============================================================================
// IndicatorSeries
// ============================================================================

/// Provenance des données d'une série
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// API World Bank (ou cache)
    Remote,
    /// Série synthétique de secours
    Synthetic,
}

impl DataOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            DataOrigin::Remote => "World Bank",
            DataOrigin::Synthetic => "synthetic sample",
        }
    }
}

/// Série d'un indicateur prête à être affichée
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator: Indicator,
    pub origin: DataOrigin,
    pub records: Vec<IndicatorRecord>,
}

impl IndicatorSeries {
    pub fn new(indicator: Indicator, origin: DataOrigin, records: Vec<IndicatorRecord>) -> Self {
        Self {
            indicator,
            origin,
            records,
        }
    }

    /// Moyenne par année (tous pays confondus)
    ///
    /// Les lignes sans année ou sans valeur sont ignorées.
    /// Le résultat est trié par année croissante.
    pub fn yearly_means(&self) -> Vec<(i32, f64)> {
        let mut buckets: BTreeMap<i32, (f64, usize)> = BTreeMap::new();

        for record in &self.records {
            if let (Some(year), Some(value)) = (record.year, record.value) {
                let entry = buckets.entry(year).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
        }

        buckets
            .into_iter()
            .map(|(year, (sum, count))| (year, sum / count as f64))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
