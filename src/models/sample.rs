// ============================================================================
// Tableaux statiques du dashboard
// ============================================================================
// Données d'exemple affichées sur les pages 1 à 3 :
// - 4 indicateurs climatiques (1990-2023)
// - taux d'entrée à l'université et d'emploi après diplôme (2018-2023)
// - métiers verts en croissance / métiers menacés (scores)
//
// CONCEPT RUST : trait avec méthode requise
// - YearRow permet d'écrire une seule fois le filtrage par année
//   pour tous les tableaux qui ont une colonne "year"
// ============================================================================

use serde::Serialize;

/// Ligne d'un tableau indexé par année
pub trait YearRow {
    fn year(&self) -> i32;
}

/// Indicateurs climatiques
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateRow {
    pub year: i32,
    /// Concentration de gaz à effet de serre (ppm)
    #[serde(rename = "ghg_concentration_ppm")]
    pub ghg_ppm: f64,
    /// Montée du niveau de la mer (mm)
    #[serde(rename = "sea_level_rise_mm")]
    pub sea_level_mm: f64,
    /// Température de surface de la mer (°C)
    #[serde(rename = "sea_temperature_c")]
    pub sea_temp_c: f64,
    /// Acidité de l'océan (pH)
    pub ocean_ph: f64,
}

impl YearRow for ClimateRow {
    fn year(&self) -> i32 {
        self.year
    }
}

/// Entrée à l'université / emploi après diplôme (%)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollegeRow {
    pub year: i32,
    pub college_entry_rate: f64,
    pub employment_rate: f64,
}

impl YearRow for CollegeRow {
    fn year(&self) -> i32 {
        self.year
    }
}

/// Métier et score (potentiel de croissance ou niveau de risque)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobScore {
    pub job: &'static str,
    pub score: u64,
}

/// Noms des colonnes (hors année) du tableau climatique, dans l'ordre
pub const CLIMATE_SERIES: [&str; 4] = [
    "GHG concentration (ppm)",
    "Sea level rise (mm)",
    "Sea temperature (°C)",
    "Ocean acidity (pH)",
];

impl ClimateRow {
    /// Valeurs dans l'ordre de CLIMATE_SERIES
    pub fn values(&self) -> [f64; 4] {
        [self.ghg_ppm, self.sea_level_mm, self.sea_temp_c, self.ocean_ph]
    }
}

/// Noms des colonnes (hors année) du tableau éducation/emploi
pub const COLLEGE_SERIES: [&str; 2] = ["College entry rate (%)", "Employment after graduation (%)"];

impl CollegeRow {
    pub fn values(&self) -> [f64; 2] {
        [self.college_entry_rate, self.employment_rate]
    }
}

pub fn climate_indicators() -> Vec<ClimateRow> {
    [
        (1990, 354.0, 0.0, 14.0, 8.2),
        (2000, 370.0, 2.0, 14.3, 8.15),
        (2010, 390.0, 6.0, 14.7, 8.1),
        (2020, 412.0, 12.0, 15.0, 8.05),
        (2023, 419.0, 15.0, 15.1, 8.03),
    ]
    .into_iter()
    .map(|(year, ghg_ppm, sea_level_mm, sea_temp_c, ocean_ph)| ClimateRow {
        year,
        ghg_ppm,
        sea_level_mm,
        sea_temp_c,
        ocean_ph,
    })
    .collect()
}

pub fn college_employment() -> Vec<CollegeRow> {
    [
        (2018, 70.1, 65.0),
        (2019, 71.3, 66.2),
        (2020, 72.5, 65.8),
        (2021, 73.0, 67.1),
        (2022, 73.8, 68.0),
        (2023, 74.6, 70.3),
    ]
    .into_iter()
    .map(|(year, college_entry_rate, employment_rate)| CollegeRow {
        year,
        college_entry_rate,
        employment_rate,
    })
    .collect()
}

/// Métiers verts à fort potentiel
pub fn green_opportunities() -> Vec<JobScore> {
    vec![
        JobScore { job: "Climate data analyst", score: 95 },
        JobScore { job: "Carbon credit specialist", score: 90 },
        JobScore { job: "Renewable energy developer", score: 88 },
        JobScore { job: "ESG consultant", score: 85 },
    ]
}

/// Métiers menacés par la transition
pub fn green_risks() -> Vec<JobScore> {
    vec![
        JobScore { job: "Thermal power plant technician", score: 90 },
        JobScore { job: "Combustion engine engineer", score: 85 },
        JobScore { job: "Petrochemical plant operator", score: 80 },
    ]
}

// ============================================================================
// Filtres sur les années
// ============================================================================

/// Retire les lignes datées après l'année courante
pub fn remove_future_rows<R: YearRow>(rows: Vec<R>, current_year: i32) -> Vec<R> {
    rows.into_iter()
        .filter(|row| row.year() <= current_year)
        .collect()
}

/// Lignes dont l'année est dans [start, end]
pub fn rows_in_range<R: YearRow>(rows: &[R], start: i32, end: i32) -> Vec<&R> {
    rows.iter()
        .filter(|row| (start..=end).contains(&row.year()))
        .collect()
}

/// Première et dernière année d'un tableau (None si vide)
pub fn year_span<R: YearRow>(rows: &[R]) -> Option<(i32, i32)> {
    let min = rows.iter().map(YearRow::year).min()?;
    let max = rows.iter().map(YearRow::year).max()?;
    Some((min, max))
}
