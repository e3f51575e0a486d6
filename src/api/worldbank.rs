// ============================================================================
// API Client : World Bank Indicators (v2)
// ============================================================================
// Récupère une série d'indicateur depuis l'API World Bank, réessaie en cas
// d'échec (backoff linéaire) puis normalise la réponse en IndicatorRecord
//
// CONCEPTS RUST :
// 1. Générics avec traits (HttpTransport, Sleeper) : injection de dépendances
// 2. Serde : désérialisation tolérante (Option + serde_json::Value)
// 3. Boucle de retry explicite avec loop / match
// ============================================================================

use std::time::Duration;

use chrono::Datelike;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::error::{AttemptError, FetchFailure};
use super::transport::{HttpTransport, ReqwestTransport, Sleeper, TokioSleeper};
use crate::models::indicator::{dedup_records, IndicatorRecord};

/// Racine de l'API World Bank v2
pub const WORLD_BANK_BASE_URL: &str = "https://api.worldbank.org/v2";

// ============================================================================
// Options de fetch
// ============================================================================

/// Paramètres d'un fetch
///
/// Les valeurs par défaut : 20000 lignes, 2 retries, 1 seconde de backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FetchOptions {
    /// Nombre maximum de lignes demandées (doit être > 0)
    pub page_size: u32,

    /// Tentatives supplémentaires après le premier échec (0 = pas de retry)
    pub max_retries: u32,

    /// Multiplicateur du délai : le retry N attend backoff_seconds * N
    pub backoff_seconds: f64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: 20_000,
            max_retries: 2,
            backoff_seconds: 1.0,
        }
    }
}

impl FetchOptions {
    /// Vérifie les options avant tout appel réseau
    pub fn validate(&self) -> Result<(), FetchFailure> {
        if self.page_size == 0 {
            return Err(FetchFailure::InvalidRequest(
                "page_size doit être positif".to_string(),
            ));
        }
        if !self.backoff_seconds.is_finite() || self.backoff_seconds < 0.0 {
            return Err(FetchFailure::InvalidRequest(format!(
                "backoff_seconds invalide : {}",
                self.backoff_seconds
            )));
        }
        // Le plus long délai possible doit tenir dans une Duration
        self.backoff_for(self.max_retries)?;
        Ok(())
    }

    /// Délai avant le retry numéro `retry_number` (1, 2, ...)
    ///
    /// Backoff linéaire : backoff_seconds × retry_number. Échoue si le
    /// délai ne tient pas dans une Duration.
    pub fn backoff_for(&self, retry_number: u32) -> Result<Duration, FetchFailure> {
        let seconds = self.backoff_seconds * f64::from(retry_number);
        Duration::try_from_secs_f64(seconds).map_err(|e| {
            FetchFailure::InvalidRequest(format!(
                "backoff de {} s pour le retry {} : {}",
                seconds, retry_number, e
            ))
        })
    }
}

// ============================================================================
// Structures pour parser la réponse JSON
// ============================================================================
// L'API retourne une enveloppe à deux éléments :
//   [ { "page": 1, "pages": 1, "per_page": 20000, "total": 17024, ... },
//     [ { "indicator": {...}, "country": {...}, "countryiso3code": "KOR",
//         "date": "2023", "value": 11.6, ... }, ... ] ]
//
// Tous les champs sont optionnels : une ligne incomplète ne fait pas
// échouer tout le fetch
// ============================================================================

/// Ligne brute de la réponse World Bank
#[derive(Debug, Deserialize)]
pub(crate) struct RawRecord {
    #[serde(default)]
    date: Option<Value>,

    #[serde(default)]
    value: Option<Value>,

    /// Objet {"id": ..., "value": ...}
    #[serde(default)]
    country: Option<Value>,

    #[serde(default, rename = "countryiso3code")]
    country_iso3_code: Option<Value>,
}

/// Construit l'URL de l'API pour un indicateur
pub fn build_worldbank_url(indicator_code: &str, page_size: u32) -> String {
    format!(
        "{}/country/all/indicator/{}?format=json&per_page={}",
        WORLD_BANK_BASE_URL, indicator_code, page_size
    )
}

/// Découpe l'enveloppe [metadata, records] et retourne les lignes brutes
///
/// Un second élément `null` correspond à une série sans aucune donnée
/// (l'API répond ainsi quand total = 0) : c'est un résultat vide valide.
pub(crate) fn parse_envelope(body: &str) -> Result<Vec<RawRecord>, AttemptError> {
    let envelope: Value = serde_json::from_str(body)
        .map_err(|e| AttemptError::MalformedEnvelope(format!("JSON illisible : {}", e)))?;

    let parts = envelope
        .as_array()
        .ok_or_else(|| {
            AttemptError::MalformedEnvelope("la racine n'est pas un tableau".to_string())
        })?;

    if parts.len() != 2 {
        return Err(AttemptError::MalformedEnvelope(format!(
            "{} élément(s) au lieu de 2",
            parts.len()
        )));
    }

    let raw_records = match &parts[1] {
        Value::Null => return Ok(Vec::new()),
        Value::Array(items) => items,
        _ => {
            return Err(AttemptError::MalformedEnvelope(
                "le second élément n'est pas un tableau".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(raw_records.len());
    let mut skipped = 0;
    for item in raw_records {
        // Un tableau se désérialiserait en struct par position : on exige un objet
        if !item.is_object() {
            skipped += 1;
            continue;
        }
        match RawRecord::deserialize(item) {
            Ok(record) => records.push(record),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, total = raw_records.len(), "Skipped non-object records in envelope");
    }

    Ok(records)
}

/// Année à partir du champ `date` ("2023" ou 2023)
fn parse_year(date: Option<&Value>) -> Option<i32> {
    match date? {
        Value::String(s) => s.trim().parse::<i32>().ok(),
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        _ => None,
    }
}

/// Valeur numérique (null => None)
fn parse_value(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Nom du pays, lu dans {"id": ..., "value": "Korea, Rep."}
fn parse_country_name(country: Option<&Value>) -> Option<String> {
    country?.get("value")?.as_str().map(str::to_string)
}

/// Code ISO3 : une chaîne non vide (les agrégats régionaux ont "")
fn parse_iso3(code: Option<&Value>) -> Option<String> {
    code?.as_str().filter(|c| !c.is_empty()).map(str::to_string)
}

/// Convertit les lignes brutes en IndicatorRecord
///
/// - Les lignes datées après `current_year` sont supprimées
/// - Les doublons exacts sont retirés (ordre de première apparition)
pub(crate) fn normalize_records(
    raw_records: Vec<RawRecord>,
    indicator_code: &str,
    current_year: i32,
) -> Vec<IndicatorRecord> {
    let total = raw_records.len();
    let mut future_count = 0;

    let records: Vec<IndicatorRecord> = raw_records
        .into_iter()
        .filter_map(|raw| {
            let year = parse_year(raw.date.as_ref());
            if matches!(year, Some(y) if y > current_year) {
                future_count += 1;
                return None;
            }

            Some(IndicatorRecord {
                country_iso3: parse_iso3(raw.country_iso3_code.as_ref()),
                country_name: parse_country_name(raw.country.as_ref()),
                year,
                value: parse_value(raw.value.as_ref()),
                indicator_code: indicator_code.to_string(),
            })
        })
        .collect();

    let records = dedup_records(records);

    debug!(
        total,
        future = future_count,
        kept = records.len(),
        "Normalized World Bank records"
    );

    records
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

// ============================================================================
// IndicatorFetcher
// ============================================================================

/// Client World Bank avec retry et normalisation
///
/// CONCEPT RUST : paramètres de type par défaut
/// - IndicatorFetcher (sans paramètre) = IndicatorFetcher<ReqwestTransport, TokioSleeper>
/// - Les tests fournissent leurs propres implémentations
pub struct IndicatorFetcher<T = ReqwestTransport, S = TokioSleeper> {
    transport: T,
    sleeper: S,
    /// Année "courante" imposée (sinon l'horloge système)
    year_override: Option<i32>,
}

impl IndicatorFetcher {
    /// Fetcher réel (reqwest + tokio)
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_parts(ReqwestTransport::new()?, TokioSleeper))
    }
}

impl<T: HttpTransport, S: Sleeper> IndicatorFetcher<T, S> {
    pub fn with_parts(transport: T, sleeper: S) -> Self {
        Self {
            transport,
            sleeper,
            year_override: None,
        }
    }

    /// Fixe l'année utilisée pour filtrer les données futures
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.year_override = Some(year);
        self
    }

    fn reference_year(&self) -> i32 {
        self.year_override.unwrap_or_else(current_year)
    }

    /// Récupère une série d'indicateur
    ///
    /// Fait au plus `max_retries + 1` requêtes. Entre deux tentatives,
    /// attend `backoff_seconds × numéro du retry`. Retourne
    /// `FetchFailure::Exhausted` quand toutes les tentatives ont échoué.
    ///
    /// # Exemple
    /// let records = fetcher.fetch("EN.ATM.CO2E.PC", &FetchOptions::default()).await?;
    #[instrument(
        skip(self, options),
        fields(page_size = options.page_size, max_retries = options.max_retries)
    )]
    pub async fn fetch(
        &self,
        indicator_code: &str,
        options: &FetchOptions,
    ) -> Result<Vec<IndicatorRecord>, FetchFailure> {
        options.validate()?;

        let url = build_worldbank_url(indicator_code, options.page_size);
        debug!(url = %url, "Built World Bank API URL");

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;

            match self.attempt(&url).await {
                Ok(raw_records) => {
                    let records =
                        normalize_records(raw_records, indicator_code, self.reference_year());
                    info!(attempts, records = records.len(), "Successfully fetched indicator");
                    return Ok(records);
                }
                Err(err) => {
                    // Le nombre de retries déjà faits = attempts - 1
                    if attempts > options.max_retries {
                        error!(attempts, error = %err, "Giving up on indicator fetch");
                        return Err(FetchFailure::Exhausted {
                            indicator_code: indicator_code.to_string(),
                            attempts,
                            last_error: err,
                        });
                    }

                    let delay = options.backoff_for(attempts)?;
                    warn!(
                        attempt = attempts,
                        delay_secs = delay.as_secs_f64(),
                        error = %err,
                        "Indicator fetch attempt failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                }
            }
        }
    }

    /// Une seule tentative : GET + contrôle du statut + enveloppe
    async fn attempt(&self, url: &str) -> Result<Vec<RawRecord>, AttemptError> {
        let response = self.transport.get(url).await?;

        if !response.is_success() {
            return Err(AttemptError::Status(response.status));
        }

        parse_envelope(&response.body)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::transport::HttpResponse;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::{HashSet, VecDeque};
    use std::sync::{Arc, Mutex};

    /// Transport qui rejoue une liste de réponses et compte les appels
    #[derive(Clone, Default)]
    struct ScriptedTransport {
        responses: Arc<Mutex<VecDeque<Result<HttpResponse, AttemptError>>>>,
        urls: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<HttpResponse, AttemptError>>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
                urls: Arc::default(),
            }
        }

        fn calls(&self) -> usize {
            self.urls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, AttemptError> {
            self.urls.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AttemptError::Transport("connection refused".to_string())))
        }
    }

    /// Sleeper qui enregistre les délais sans attendre
    #[derive(Clone, Default)]
    struct RecordingSleeper {
        delays: Arc<Mutex<Vec<Duration>>>,
    }

    impl RecordingSleeper {
        fn total(&self) -> Duration {
            self.delays.lock().unwrap().iter().sum()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.delays.lock().unwrap().push(duration);
        }
    }

    fn ok(body: &str) -> Result<HttpResponse, AttemptError> {
        Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    fn status(code: u16) -> Result<HttpResponse, AttemptError> {
        Ok(HttpResponse {
            status: code,
            body: "<html>error</html>".to_string(),
        })
    }

    const META: &str = r#"{"page":1,"pages":1,"per_page":20000,"total":2}"#;

    fn raw(iso3: &str, name: &str, date: &str, value: &str) -> String {
        format!(
            r#"{{"indicator":{{"id":"EN.ATM.CO2E.PC","value":"CO2 emissions (metric tons per capita)"}},"country":{{"id":"XX","value":"{}"}},"countryiso3code":"{}","date":"{}","value":{},"unit":"","obs_status":"","decimal":1}}"#,
            name, iso3, date, value
        )
    }

    fn envelope(records: &[String]) -> String {
        format!("[{},[{}]]", META, records.join(","))
    }

    fn fetcher(
        transport: &ScriptedTransport,
        sleeper: &RecordingSleeper,
    ) -> IndicatorFetcher<ScriptedTransport, RecordingSleeper> {
        IndicatorFetcher::with_parts(transport.clone(), sleeper.clone()).with_current_year(2024)
    }

    #[test]
    fn test_build_worldbank_url() {
        let url = build_worldbank_url("EN.ATM.CO2E.PC", 20000);
        assert_eq!(
            url,
            "https://api.worldbank.org/v2/country/all/indicator/EN.ATM.CO2E.PC?format=json&per_page=20000"
        );
    }

    #[test]
    fn test_backoff_is_linear() {
        let options = FetchOptions {
            backoff_seconds: 1.5,
            ..FetchOptions::default()
        };
        assert_eq!(options.backoff_for(1).unwrap(), Duration::from_millis(1500));
        assert_eq!(options.backoff_for(2).unwrap(), Duration::from_millis(3000));
        assert_eq!(options.backoff_for(3).unwrap(), Duration::from_millis(4500));
    }

    #[tokio::test]
    async fn test_future_records_are_dropped() {
        let body = envelope(&[
            raw("KOR", "Korea, Rep.", "2025", "4.9"),
            raw("KOR", "Korea, Rep.", "2023", "4.5"),
        ]);
        let transport = ScriptedTransport::new(vec![ok(&body)]);
        let sleeper = RecordingSleeper::default();

        let records = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(
            records,
            vec![IndicatorRecord {
                country_iso3: Some("KOR".to_string()),
                country_name: Some("Korea, Rep.".to_string()),
                year: Some(2023),
                value: Some(4.5),
                indicator_code: "EN.ATM.CO2E.PC".to_string(),
            }]
        );
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_permissive_fields_and_dedup() {
        let body = envelope(&[
            raw("KOR", "Korea, Rep.", "2020", "null"),
            raw("", "World", "2020", "4.3"),
            raw("FRA", "France", "not-a-year", "4.6"),
            raw("KOR", "Korea, Rep.", "2020", "null"),
            raw("", "World", "2020", "4.3"),
        ]);
        let transport = ScriptedTransport::new(vec![ok(&body)]);
        let sleeper = RecordingSleeper::default();

        let records = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value, None);
        assert_eq!(records[1].country_iso3, None);
        assert_eq!(records[1].country_name.as_deref(), Some("World"));
        assert_eq!(records[2].year, None);
        assert_eq!(records[2].value, Some(4.6));

        let unique: HashSet<_> = records.iter().collect();
        assert_eq!(unique.len(), records.len());
        assert!(records.iter().all(|r| r.year.map_or(true, |y| y <= 2024)));
    }

    #[tokio::test]
    async fn test_exhausted_after_max_retries_plus_one_attempts() {
        let transport = ScriptedTransport::new(vec![status(500), status(502), status(503)]);
        let sleeper = RecordingSleeper::default();
        let options = FetchOptions {
            max_retries: 2,
            backoff_seconds: 1.0,
            ..FetchOptions::default()
        };

        let err = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &options)
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 3);
        assert_eq!(err.attempts(), 3);
        assert!(matches!(
            err,
            FetchFailure::Exhausted { last_error: AttemptError::Status(503), .. }
        ));
        assert_eq!(
            *sleeper.delays.lock().unwrap(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
        assert_eq!(sleeper.total(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_no_retry_when_max_retries_is_zero() {
        let transport = ScriptedTransport::new(vec![]);
        let sleeper = RecordingSleeper::default();
        let options = FetchOptions {
            max_retries: 0,
            ..FetchOptions::default()
        };

        let err = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &options)
            .await
            .unwrap_err();

        assert_eq!(transport.calls(), 1);
        assert_eq!(err.attempts(), 1);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fail_once_then_succeed() {
        let body = envelope(&[raw("KOR", "Korea, Rep.", "2022", "11.6")]);
        let transport = ScriptedTransport::new(vec![
            Err(AttemptError::Transport("timeout".to_string())),
            ok(&body),
        ]);
        let sleeper = RecordingSleeper::default();

        let records = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(transport.calls(), 2);
        assert_eq!(records.len(), 1);
        assert_eq!(sleeper.total(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_envelope_without_records_element_is_retried() {
        let body = envelope(&[raw("KOR", "Korea, Rep.", "2022", "11.6")]);
        let transport = ScriptedTransport::new(vec![
            ok(&format!("[{}]", META)),
            ok(r#"[{"message":[{"id":"120","key":"Invalid value"}]}]"#),
            ok(&body),
        ]);
        let sleeper = RecordingSleeper::default();

        let records = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &FetchOptions::default())
            .await
            .unwrap();

        assert_eq!(transport.calls(), 3);
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_series_is_not_an_error() {
        let transport = ScriptedTransport::new(vec![ok(&format!("[{},null]", META))]);
        let sleeper = RecordingSleeper::default();

        let records = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &FetchOptions::default())
            .await
            .unwrap();

        assert!(records.is_empty());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_page_size_is_rejected_without_request() {
        let transport = ScriptedTransport::new(vec![]);
        let sleeper = RecordingSleeper::default();
        let options = FetchOptions {
            page_size: 0,
            ..FetchOptions::default()
        };

        let err = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &options)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchFailure::InvalidRequest(_)));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_oversized_backoff_is_rejected_without_request() {
        let transport = ScriptedTransport::new(vec![status(500)]);
        let sleeper = RecordingSleeper::default();
        let options = FetchOptions {
            backoff_seconds: 1e20,
            ..FetchOptions::default()
        };

        assert!(options.backoff_for(1).is_err());

        let err = fetcher(&transport, &sleeper)
            .fetch("EN.ATM.CO2E.PC", &options)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchFailure::InvalidRequest(_)));
        assert_eq!(transport.calls(), 0);
        assert!(sleeper.delays.lock().unwrap().is_empty());
    }

    #[test]
    fn test_validate_checks_longest_backoff() {
        // 1e19 s tient dans une Duration (u64 secondes), 2e19 s non
        let options = FetchOptions {
            max_retries: 2,
            backoff_seconds: 1e19,
            ..FetchOptions::default()
        };
        assert!(options.backoff_for(1).is_ok());
        assert!(matches!(options.validate(), Err(FetchFailure::InvalidRequest(_))));

        let no_retry = FetchOptions {
            max_retries: 0,
            ..options
        };
        assert!(no_retry.validate().is_ok());
    }

    #[test]
    fn test_badly_typed_country_fields_keep_the_record() {
        let body = format!(
            "[{},[{},{},42]]",
            META,
            r#"{"country":"Korea","countryiso3code":7,"date":"2020","value":1.0}"#,
            r#"{"country":{"id":"FR","value":"France"},"countryiso3code":"FRA","date":"2020","value":2.0}"#
        );

        let records = normalize_records(parse_envelope(&body).unwrap(), "SL.UEM.TOTL.ZS", 2024);

        assert_eq!(
            records,
            vec![
                IndicatorRecord {
                    country_iso3: None,
                    country_name: None,
                    year: Some(2020),
                    value: Some(1.0),
                    indicator_code: "SL.UEM.TOTL.ZS".to_string(),
                },
                IndicatorRecord {
                    country_iso3: Some("FRA".to_string()),
                    country_name: Some("France".to_string()),
                    year: Some(2020),
                    value: Some(2.0),
                    indicator_code: "SL.UEM.TOTL.ZS".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_envelope_rejects_non_array_root() {
        assert!(matches!(
            parse_envelope(r#"{"page":1}"#),
            Err(AttemptError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            parse_envelope("not json"),
            Err(AttemptError::MalformedEnvelope(_))
        ));
        assert!(matches!(
            parse_envelope(r#"[{}, {"date":"2020"}]"#),
            Err(AttemptError::MalformedEnvelope(_))
        ));
    }

    #[test]
    fn test_parse_year_accepts_numbers_and_strings() {
        assert_eq!(parse_year(Some(&Value::from("2021"))), Some(2021));
        assert_eq!(parse_year(Some(&Value::from(2019))), Some(2019));
        assert_eq!(parse_year(Some(&Value::from("2021M01"))), None);
        assert_eq!(parse_year(Some(&Value::Null)), None);
        assert_eq!(parse_year(None), None);
    }
}
