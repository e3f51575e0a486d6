// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global du dashboard TUI
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// ============================================================================

use crate::models::sample::{
    climate_indicators, college_employment, green_opportunities, green_risks, remove_future_rows,
    rows_in_range, year_span,
};
use crate::models::{ClimateRow, CollegeRow, IndicatorSeries, JobScore};

// ============================================================================
// Enum : Page
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Une seule page active à la fois (menu latéral)
// ============================================================================

/// Pages du dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    /// Indicateurs climatiques (tableau statique)
    #[default]
    Climate,
    /// Éducation et emploi (tableau statique)
    Education,
    /// Métiers verts : opportunités vs risques
    Jobs,
    /// Séries World Bank (API ou repli synthétique)
    WorldBank,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Climate, Page::Education, Page::Jobs, Page::WorldBank];

    /// Titre affiché dans le menu
    pub fn title(&self) -> &'static str {
        match self {
            Page::Climate => "Climate indicators",
            Page::Education => "Education & employment",
            Page::Jobs => "Green jobs: opportunity vs risk",
            Page::WorldBank => "World Bank indicators",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::Climate => 0,
            Page::Education => 1,
            Page::Jobs => 2,
            Page::WorldBank => 3,
        }
    }

    /// Page associée à une touche '1'..'4'
    pub fn from_digit(c: char) -> Option<Page> {
        let index = c.to_digit(10)? as usize;
        index.checked_sub(1).and_then(|i| Page::ALL.get(i).copied())
    }

    /// Page suivante (cycle)
    pub fn next(&self) -> Page {
        Page::ALL[(self.index() + 1) % Page::ALL.len()]
    }

    /// Page précédente (cycle)
    pub fn previous(&self) -> Page {
        Page::ALL[(self.index() + Page::ALL.len() - 1) % Page::ALL.len()]
    }
}

// ============================================================================
// YearRange : filtre d'années (équivalent d'un slider à deux poignées)
// ============================================================================

/// Plage d'années sélectionnée dans [min, max]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    /// Plage complète
    pub fn full(min: i32, max: i32) -> Self {
        Self {
            min,
            max,
            start: min,
            end: max,
        }
    }

    /// Déplace le début ; reste dans [min, end]
    pub fn shift_start(&mut self, delta: i32) {
        self.start = (self.start + delta).clamp(self.min, self.end);
    }

    /// Déplace la fin ; reste dans [start, max]
    pub fn shift_end(&mut self, delta: i32) {
        self.end = (self.end + delta).clamp(self.start, self.max);
    }

    pub fn label(&self) -> String {
        format!("{}-{}", self.start, self.end)
    }
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Page affichée
    pub current_page: Page,

    /// Tableaux statiques (lignes futures déjà retirées)
    pub climate: Vec<ClimateRow>,
    pub college: Vec<CollegeRow>,
    pub opportunities: Vec<JobScore>,
    pub risks: Vec<JobScore>,

    /// Filtres d'années des pages 1 et 2
    pub climate_range: YearRange,
    pub college_range: YearRange,

    /// Séries World Bank chargées
    pub indicators: Vec<IndicatorSeries>,

    /// Confirmation de sortie en deux temps ('q' deux fois)
    pub confirm_quit: bool,

    /// Dernier message de statut (export, rechargement, repli)
    pub status_message: Option<String>,
}

impl App {
    /// Crée l'état initial
    ///
    /// `current_year` sert à retirer les lignes futures des tableaux statiques.
    pub fn new(current_year: i32) -> Self {
        let climate = remove_future_rows(climate_indicators(), current_year);
        let college = remove_future_rows(college_employment(), current_year);

        let climate_range = range_for(year_span(&climate), current_year);
        let college_range = range_for(year_span(&college), current_year);

        Self {
            running: true,
            current_page: Page::default(),
            climate,
            college,
            opportunities: green_opportunities(),
            risks: green_risks(),
            climate_range,
            college_range,
            indicators: Vec::new(),
            confirm_quit: false,
            status_message: None,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn select_page(&mut self, page: Page) {
        self.current_page = page;
    }

    // ========================================================================
    // Filtres d'années
    // ========================================================================

    /// Plage de la page courante (None pour les pages sans filtre)
    pub fn active_range_mut(&mut self) -> Option<&mut YearRange> {
        match self.current_page {
            Page::Climate => Some(&mut self.climate_range),
            Page::Education => Some(&mut self.college_range),
            Page::Jobs | Page::WorldBank => None,
        }
    }

    pub fn active_range(&self) -> Option<&YearRange> {
        match self.current_page {
            Page::Climate => Some(&self.climate_range),
            Page::Education => Some(&self.college_range),
            Page::Jobs | Page::WorldBank => None,
        }
    }

    pub fn visible_climate(&self) -> Vec<&ClimateRow> {
        rows_in_range(&self.climate, self.climate_range.start, self.climate_range.end)
    }

    pub fn visible_college(&self) -> Vec<&CollegeRow> {
        rows_in_range(&self.college, self.college_range.start, self.college_range.end)
    }

    // ========================================================================
    // Données et statut
    // ========================================================================

    pub fn set_indicators(&mut self, indicators: Vec<IndicatorSeries>) {
        self.indicators = indicators;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    // ========================================================================
    // Confirmation de sortie
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

/// Plage complète d'un tableau, ou l'année courante seule s'il est vide
fn range_for(span: Option<(i32, i32)>, current_year: i32) -> YearRange {
    let (min, max) = span.unwrap_or((current_year, current_year));
    YearRange::full(min, max)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataOrigin, Indicator};

    #[test]
    fn test_app_creation() {
        let app = App::new(2024);
        assert!(app.is_running());
        assert_eq!(app.current_page, Page::Climate);
        assert_eq!(app.climate_range, YearRange::full(1990, 2023));
        assert_eq!(app.college_range, YearRange::full(2018, 2023));
        assert!(app.indicators.is_empty());
    }

    #[test]
    fn test_future_rows_removed_at_startup() {
        let app = App::new(2020);
        assert_eq!(app.climate.last().map(|r| r.year), Some(2020));
        assert_eq!(app.college.last().map(|r| r.year), Some(2020));
        assert_eq!(app.college_range.max, 2020);
    }

    #[test]
    fn test_page_cycle() {
        let mut app = App::new(2024);

        app.next_page();
        assert_eq!(app.current_page, Page::Education);
        app.previous_page();
        app.previous_page();
        assert_eq!(app.current_page, Page::WorldBank);
        app.next_page();
        assert_eq!(app.current_page, Page::Climate);
    }

    #[test]
    fn test_page_from_digit() {
        assert_eq!(Page::from_digit('1'), Some(Page::Climate));
        assert_eq!(Page::from_digit('4'), Some(Page::WorldBank));
        assert_eq!(Page::from_digit('0'), None);
        assert_eq!(Page::from_digit('5'), None);
        assert_eq!(Page::from_digit('x'), None);
    }

    #[test]
    fn test_year_range_stays_ordered_and_clamped() {
        let mut range = YearRange::full(2018, 2023);

        range.shift_start(-3);
        assert_eq!(range.start, 2018);

        range.shift_end(-4);
        assert_eq!((range.start, range.end), (2018, 2019));

        range.shift_start(5);
        assert_eq!(range.start, 2019, "start cannot pass end");

        range.shift_end(10);
        assert_eq!(range.end, 2023);
        assert_eq!(range.label(), "2019-2023");
    }

    #[test]
    fn test_visible_rows_follow_active_range() {
        let mut app = App::new(2024);
        app.select_page(Page::Education);

        if let Some(range) = app.active_range_mut() {
            range.shift_start(2);
            range.shift_end(-1);
        }

        let years: Vec<i32> = app.visible_college().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);

        app.select_page(Page::Jobs);
        assert!(app.active_range().is_none());
    }

    #[test]
    fn test_quit_confirmation() {
        let mut app = App::new(2024);
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_set_indicators_and_status() {
        let mut app = App::new(2024);
        app.set_indicators(vec![IndicatorSeries::new(
            Indicator::Unemployment,
            DataOrigin::Synthetic,
            Vec::new(),
        )]);
        app.set_status("exported");

        assert_eq!(app.indicators.len(), 1);
        assert_eq!(app.status_message.as_deref(), Some("exported"));
    }
}
