// ============================================================================
// Cache des séries d'indicateurs
// ============================================================================
// Mémorise le dernier résultat réussi par jeu d'arguments de fetch,
// pour éviter de rappeler l'API à chaque interaction
//
// - Clé : (code indicateur, page_size, max_retries, backoff_seconds)
// - Durée de vie : celle du processus, ou un TTL optionnel
// - Invalidation manuelle : clear() ou invalidate(code)
// ============================================================================

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::api::FetchOptions;
use crate::models::IndicatorRecord;

/// Clé du cache
///
/// CONCEPT RUST : f64 dans une clé de HashMap
/// - f64 n'est ni Eq ni Hash
/// - On stocke ses bits (u64) à la place
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    indicator_code: String,
    page_size: u32,
    max_retries: u32,
    backoff_bits: u64,
}

impl CacheKey {
    pub fn new(indicator_code: &str, options: &FetchOptions) -> Self {
        Self {
            indicator_code: indicator_code.to_string(),
            page_size: options.page_size,
            max_retries: options.max_retries,
            backoff_bits: options.backoff_seconds.to_bits(),
        }
    }

    pub fn indicator_code(&self) -> &str {
        &self.indicator_code
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    records: Vec<IndicatorRecord>,
    stored_at: Instant,
}

/// Cache mémoire des séries récupérées
#[derive(Debug, Default)]
pub struct IndicatorCache {
    entries: HashMap<CacheKey, CacheEntry>,
    /// None = valide jusqu'à la fin du processus
    ttl: Option<Duration>,
}

impl IndicatorCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Retourne l'entrée si elle existe et n'a pas expiré
    pub fn get(&self, key: &CacheKey) -> Option<&[IndicatorRecord]> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &CacheKey, now: Instant) -> Option<&[IndicatorRecord]> {
        let entry = self.entries.get(key)?;

        if let Some(ttl) = self.ttl {
            if now.saturating_duration_since(entry.stored_at) > ttl {
                debug!(indicator = %key.indicator_code, "Cache entry expired");
                return None;
            }
        }

        Some(&entry.records)
    }

    /// Enregistre le résultat d'un fetch réussi (remplace l'ancien)
    pub fn insert(&mut self, key: CacheKey, records: Vec<IndicatorRecord>) {
        self.insert_at(key, records, Instant::now());
    }

    fn insert_at(&mut self, key: CacheKey, records: Vec<IndicatorRecord>, now: Instant) {
        debug!(
            indicator = %key.indicator_code,
            records = records.len(),
            "Caching indicator series"
        );
        self.entries.insert(
            key,
            CacheEntry {
                records,
                stored_at: now,
            },
        );
    }

    /// Supprime toutes les entrées d'un indicateur
    pub fn invalidate(&mut self, indicator_code: &str) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|key, _| key.indicator_code != indicator_code);
        before - self.entries.len()
    }

    /// Vide le cache
    pub fn clear(&mut self) {
        debug!(entries = self.entries.len(), "Clearing indicator cache");
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(code: &str) -> Vec<IndicatorRecord> {
        vec![IndicatorRecord {
            country_iso3: Some("KOR".to_string()),
            country_name: Some("Korea, Rep.".to_string()),
            year: Some(2022),
            value: Some(11.6),
            indicator_code: code.to_string(),
        }]
    }

    #[test]
    fn test_key_includes_every_fetch_argument() {
        let defaults = FetchOptions::default();
        let key = CacheKey::new("EN.ATM.CO2E.PC", &defaults);

        let other_page = FetchOptions { page_size: 100, ..defaults };
        let other_retries = FetchOptions { max_retries: 5, ..defaults };
        let other_backoff = FetchOptions { backoff_seconds: 2.0, ..defaults };

        assert_eq!(key, CacheKey::new("EN.ATM.CO2E.PC", &defaults));
        assert_ne!(key, CacheKey::new("SL.UEM.TOTL.ZS", &defaults));
        assert_ne!(key, CacheKey::new("EN.ATM.CO2E.PC", &other_page));
        assert_ne!(key, CacheKey::new("EN.ATM.CO2E.PC", &other_retries));
        assert_ne!(key, CacheKey::new("EN.ATM.CO2E.PC", &other_backoff));
    }

    #[test]
    fn test_without_ttl_entries_never_expire() {
        let mut cache = IndicatorCache::new(None);
        let key = CacheKey::new("EN.ATM.CO2E.PC", &FetchOptions::default());
        let stored_at = Instant::now();
        cache.insert_at(key.clone(), records("EN.ATM.CO2E.PC"), stored_at);

        let much_later = stored_at + Duration::from_secs(86_400);
        assert_eq!(cache.get_at(&key, much_later).map(|r| r.len()), Some(1));
    }

    #[test]
    fn test_ttl_expiry() {
        let mut cache = IndicatorCache::new(Some(Duration::from_secs(60)));
        let key = CacheKey::new("EN.ATM.CO2E.PC", &FetchOptions::default());
        let stored_at = Instant::now();
        cache.insert_at(key.clone(), records("EN.ATM.CO2E.PC"), stored_at);

        assert!(cache.get_at(&key, stored_at + Duration::from_secs(30)).is_some());
        assert!(cache.get_at(&key, stored_at + Duration::from_secs(61)).is_none());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let mut cache = IndicatorCache::new(None);
        let defaults = FetchOptions::default();
        let small = FetchOptions { page_size: 50, ..defaults };

        cache.insert(CacheKey::new("EN.ATM.CO2E.PC", &defaults), records("EN.ATM.CO2E.PC"));
        cache.insert(CacheKey::new("EN.ATM.CO2E.PC", &small), records("EN.ATM.CO2E.PC"));
        cache.insert(CacheKey::new("SL.UEM.TOTL.ZS", &defaults), records("SL.UEM.TOTL.ZS"));
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.invalidate("EN.ATM.CO2E.PC"), 2);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
