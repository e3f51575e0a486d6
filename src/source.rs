// ============================================================================
// Sources de données du dashboard
// ============================================================================
// CONCEPT : Strategy pattern
// - trait DataSource : "donne-moi la série de cet indicateur"
// - RemoteSource : API World Bank (avec cache)
// - SyntheticSampleSource : série générée localement (2000-2023)
// - FallbackSource : essaie le distant, bascule sur le synthétique en cas d'échec
//
// Le fetcher reste responsable d'une seule chose (récupérer + normaliser),
// c'est l'appelant qui choisit la stratégie de repli
// ============================================================================

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::api::{FetchFailure, FetchOptions, HttpTransport, IndicatorFetcher, Sleeper};
use crate::api::{ReqwestTransport, TokioSleeper};
use crate::cache::{CacheKey, IndicatorCache};
use crate::models::{DataOrigin, Indicator, IndicatorRecord, IndicatorSeries};

/// Première et dernière année des séries synthétiques
pub const SYNTHETIC_FIRST_YEAR: i32 = 2000;
pub const SYNTHETIC_LAST_YEAR: i32 = 2023;

/// Graine par défaut du bruit synthétique
pub const DEFAULT_SEED: u64 = 42;

/// Fournit la série d'un indicateur
#[async_trait]
pub trait DataSource: Send {
    async fn load(&mut self, indicator: Indicator) -> Result<IndicatorSeries, FetchFailure>;

    /// Nom court de la source (logs)
    fn name(&self) -> &'static str;
}

// ============================================================================
// RemoteSource
// ============================================================================

/// Source distante : IndicatorFetcher + cache mémoire
pub struct RemoteSource<T = ReqwestTransport, S = TokioSleeper> {
    fetcher: IndicatorFetcher<T, S>,
    options: FetchOptions,
    cache: IndicatorCache,
}

impl<T: HttpTransport, S: Sleeper> RemoteSource<T, S> {
    pub fn new(
        fetcher: IndicatorFetcher<T, S>,
        options: FetchOptions,
        cache: IndicatorCache,
    ) -> Self {
        Self {
            fetcher,
            options,
            cache,
        }
    }

    /// Vide le cache (le prochain load rappelle l'API)
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &IndicatorCache {
        &self.cache
    }
}

#[async_trait]
impl<T: HttpTransport, S: Sleeper> DataSource for RemoteSource<T, S> {
    async fn load(&mut self, indicator: Indicator) -> Result<IndicatorSeries, FetchFailure> {
        let key = CacheKey::new(indicator.code(), &self.options);

        if let Some(records) = self.cache.get(&key) {
            debug!(indicator = %indicator.code(), records = records.len(), "Cache hit");
            return Ok(IndicatorSeries::new(indicator, DataOrigin::Remote, records.to_vec()));
        }

        let records = self.fetcher.fetch(indicator.code(), &self.options).await?;
        self.cache.insert(key, records.clone());
        Ok(IndicatorSeries::new(indicator, DataOrigin::Remote, records))
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

// ============================================================================
// SyntheticSampleSource
// ============================================================================

/// Source locale : tendance linéaire + bruit uniforme à graine fixe
///
/// Une ligne "World" par année de 2000 à 2023. Deux appels avec la même
/// graine produisent exactement la même série.
#[derive(Debug, Clone)]
pub struct SyntheticSampleSource {
    seed: u64,
}

impl SyntheticSampleSource {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Génère la série (sans passer par le trait, c'est infaillible)
    pub fn generate(&self, indicator: Indicator) -> IndicatorSeries {
        let (base, slope, noise) = indicator.synthetic_profile();

        // Une graine distincte par indicateur, stable d'une exécution à l'autre
        let offset = Indicator::ALL
            .iter()
            .position(|i| *i == indicator)
            .unwrap_or_default() as u64;
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(offset));

        let records = (SYNTHETIC_FIRST_YEAR..=SYNTHETIC_LAST_YEAR)
            .map(|year| {
                let trend = base + slope * f64::from(year - SYNTHETIC_FIRST_YEAR);
                let jitter = rng.gen_range(-noise..=noise);
                IndicatorRecord {
                    country_iso3: Some("WLD".to_string()),
                    country_name: Some("World".to_string()),
                    year: Some(year),
                    value: Some((trend + jitter).max(0.0)),
                    indicator_code: indicator.code().to_string(),
                }
            })
            .collect();

        IndicatorSeries::new(indicator, DataOrigin::Synthetic, records)
    }
}

impl Default for SyntheticSampleSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[async_trait]
impl DataSource for SyntheticSampleSource {
    async fn load(&mut self, indicator: Indicator) -> Result<IndicatorSeries, FetchFailure> {
        Ok(self.generate(indicator))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

// ============================================================================
// FallbackSource
// ============================================================================

/// Source distante avec repli synthétique
///
/// Sans source distante (mode offline), sert directement le synthétique.
/// Chaque repli est noté pour être affiché dans la barre de statut.
pub struct FallbackSource<T = ReqwestTransport, S = TokioSleeper> {
    remote: Option<RemoteSource<T, S>>,
    synthetic: SyntheticSampleSource,
    notes: Vec<String>,
}

impl<T: HttpTransport, S: Sleeper> FallbackSource<T, S> {
    pub fn new(remote: Option<RemoteSource<T, S>>, synthetic: SyntheticSampleSource) -> Self {
        Self {
            remote,
            synthetic,
            notes: Vec::new(),
        }
    }

    /// Vide le cache de la source distante
    pub fn clear_cache(&mut self) {
        if let Some(remote) = self.remote.as_mut() {
            remote.clear_cache();
        }
    }

    /// Récupère (et vide) les messages de repli accumulés
    pub fn take_notes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notes)
    }

    pub fn is_offline(&self) -> bool {
        self.remote.is_none()
    }
}

#[async_trait]
impl<T: HttpTransport, S: Sleeper> DataSource for FallbackSource<T, S> {
    async fn load(&mut self, indicator: Indicator) -> Result<IndicatorSeries, FetchFailure> {
        let Some(remote) = self.remote.as_mut() else {
            return Ok(self.synthetic.generate(indicator));
        };

        match remote.load(indicator).await {
            Ok(series) => Ok(series),
            Err(failure) => {
                warn!(
                    indicator = %indicator.code(),
                    error = %failure,
                    "Falling back to synthetic sample"
                );
                self.notes.push(format!(
                    "{} : données synthétiques ({})",
                    indicator.code(),
                    failure
                ));
                Ok(self.synthetic.generate(indicator))
            }
        }
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// Charge les quatre indicateurs, l'un après l'autre
///
/// Les indicateurs dont la source échoue sont absents du résultat.
pub async fn load_all_indicators(source: &mut dyn DataSource) -> Vec<IndicatorSeries> {
    let mut series = Vec::with_capacity(Indicator::ALL.len());

    for (i, indicator) in Indicator::ALL.into_iter().enumerate() {
        debug!(
            indicator = %indicator.code(),
            progress = i + 1,
            total = Indicator::ALL.len(),
            source = source.name(),
            "Loading indicator"
        );

        match source.load(indicator).await {
            Ok(loaded) => {
                info!(
                    indicator = %indicator.code(),
                    origin = loaded.origin.label(),
                    records = loaded.len(),
                    "Indicator loaded"
                );
                series.push(loaded);
            }
            Err(e) => {
                warn!(indicator = %indicator.code(), error = %e, "Indicator unavailable");
            }
        }
    }

    series
}
