// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'interface TUI : header, menu latéral, page courante, footer
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones (vertical + horizontal)
// 3. Widgets : Block, Paragraph, List, Chart, BarChart
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, Page};
use crate::models::sample::{CLIMATE_SERIES, COLLEGE_SERIES};
use crate::models::{DataOrigin, IndicatorSeries};
use crate::ui::chart::{render_job_bars, render_line_chart, render_no_data, LineSeries, PALETTE};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Menu + page
            Constraint::Length(4), // Footer (raccourcis + statut)
        ])
        .split(frame.size());

    render_header(frame, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)])
        .split(chunks[1]);

    render_menu(frame, app, body[0]);

    // CONCEPT RUST : Match sur enum pour router
    match app.current_page {
        Page::Climate => render_climate_page(frame, app, body[1]),
        Page::Education => render_education_page(frame, app, body[1]),
        Page::Jobs => render_jobs_page(frame, app, body[1]),
        Page::WorldBank => render_worldbank_page(frame, app, body[1]),
    }

    render_footer(frame, app, chunks[2]);
}

/// Dessine le header avec le titre
fn render_header(frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" greenjobs ")
        .title_alignment(Alignment::Center);

    let text = Line::from(Span::styled(
        "🌍 Climate change & jobs: opportunities and risks of the green transition",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Menu latéral : une entrée par page, la page courante en surbrillance
fn render_menu(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Menu ");

    let items: Vec<ListItem> = Page::ALL
        .iter()
        .map(|page| {
            let line = format!(" {}. {}", page.index() + 1, page.title());
            if *page == app.current_page {
                ListItem::new(line).style(
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD)
                        .add_modifier(Modifier::REVERSED),
                )
            } else {
                ListItem::new(line)
            }
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Découpe une zone en grille 2x2
fn grid_2x2(area: Rect) -> Vec<Rect> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    rows.iter()
        .flat_map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row)
                .to_vec()
        })
        .collect()
}

// ============================================================================
// Conversion des données en séries à tracer
// ============================================================================

/// Une série par indicateur climatique, limitée à la plage d'années
pub fn climate_series(app: &App) -> Vec<LineSeries> {
    let rows = app.visible_climate();

    CLIMATE_SERIES
        .iter()
        .enumerate()
        .map(|(i, name)| LineSeries {
            name: name.to_string(),
            color: PALETTE[i % PALETTE.len()],
            points: rows.iter().map(|r| (f64::from(r.year), r.values()[i])).collect(),
        })
        .collect()
}

/// Taux d'entrée à l'université et d'emploi, limités à la plage d'années
pub fn college_series(app: &App) -> Vec<LineSeries> {
    let rows = app.visible_college();

    COLLEGE_SERIES
        .iter()
        .enumerate()
        .map(|(i, name)| LineSeries {
            name: name.to_string(),
            color: PALETTE[i % PALETTE.len()],
            points: rows.iter().map(|r| (f64::from(r.year), r.values()[i])).collect(),
        })
        .collect()
}

/// Moyenne annuelle d'une série World Bank
pub fn indicator_line(series: &IndicatorSeries, color: Color) -> LineSeries {
    LineSeries {
        name: series.indicator.code().to_string(),
        color,
        points: series
            .yearly_means()
            .into_iter()
            .map(|(year, mean)| (f64::from(year), mean))
            .collect(),
    }
}

// ============================================================================
// Pages
// ============================================================================

fn render_climate_page(frame: &mut Frame, app: &App, area: Rect) {
    let series = climate_series(app);
    for (cell, one) in grid_2x2(area).into_iter().zip(series) {
        let title = format!("{} ({})", one.name, app.climate_range.label());
        let y_title = one.name.clone();
        render_line_chart(frame, cell, &title, &y_title, &[one]);
    }
}

fn render_education_page(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(
        "College entry rate vs employment after graduation ({})",
        app.college_range.label()
    );
    render_line_chart(frame, area, &title, "Rate (%)", &college_series(app));
}

fn render_jobs_page(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    render_job_bars(
        frame,
        columns[0],
        "Emerging green jobs (growth score)",
        &app.opportunities,
        Color::Green,
    );
    render_job_bars(
        frame,
        columns[1],
        "Jobs at risk (risk score)",
        &app.risks,
        Color::Red,
    );
}

fn render_worldbank_page(frame: &mut Frame, app: &App, area: Rect) {
    if app.indicators.is_empty() {
        render_no_data(frame, area, "Aucune série chargée (appuyez sur [r])");
        return;
    }

    for (i, (cell, series)) in grid_2x2(area).into_iter().zip(&app.indicators).enumerate() {
        let origin = match series.origin {
            DataOrigin::Remote => series.origin.label().to_string(),
            DataOrigin::Synthetic => format!("⚠ {}", series.origin.label()),
        };
        let title = format!("{} [{}]", series.indicator.label(), origin);
        let line = indicator_line(series, PALETTE[i % PALETTE.len()]);
        render_line_chart(frame, cell, &title, "Mean", &[line]);
    }
}

// ============================================================================
// Footer : raccourcis + statut
// ============================================================================

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", key_style),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                key_style,
            ),
        ])
    } else {
        let mut spans = vec![
            Span::styled("[q]", key_style),
            Span::raw(" Quit  "),
            Span::styled("[Tab/1-4]", key_style),
            Span::raw(" Page  "),
            Span::styled("[e]", key_style),
            Span::raw(" Export CSV  "),
            Span::styled("[r]", key_style),
            Span::raw(" Reload"),
        ];
        if let Some(range) = app.active_range() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled("[ ] { }", key_style));
            spans.push(Span::raw(format!(" Years {}", range.label())));
        }
        Line::from(spans)
    };

    let status = Line::from(Span::styled(
        app.status_message.clone().unwrap_or_default(),
        Style::default().fg(Color::Gray),
    ));

    let paragraph = Paragraph::new(vec![shortcuts, status])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Indicator, IndicatorRecord};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_climate_series_follow_range() {
        let mut app = App::new(2024);
        app.climate_range.shift_start(20); // 1990 -> 2010

        let series = climate_series(&app);
        assert_eq!(series.len(), 4);
        assert_eq!(series[0].points, vec![(2010.0, 390.0), (2020.0, 412.0), (2023.0, 419.0)]);
        assert_eq!(series[3].points[0], (2010.0, 8.1));
    }

    #[test]
    fn test_indicator_line_uses_yearly_means() {
        let record = |iso3: &str, year: i32, value: f64| IndicatorRecord {
            country_iso3: Some(iso3.to_string()),
            country_name: None,
            year: Some(year),
            value: Some(value),
            indicator_code: "SL.UEM.TOTL.ZS".to_string(),
        };
        let series = IndicatorSeries::new(
            Indicator::Unemployment,
            DataOrigin::Remote,
            vec![record("KOR", 2021, 3.0), record("FRA", 2021, 7.0), record("KOR", 2022, 2.9)],
        );

        let line = indicator_line(&series, Color::Cyan);
        assert_eq!(line.points, vec![(2021.0, 5.0), (2022.0, 2.9)]);
    }

    #[test]
    fn test_render_every_page_on_test_backend() {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        let mut app = App::new(2024);
        app.set_indicators(vec![IndicatorSeries::new(
            Indicator::Co2PerCapita,
            DataOrigin::Synthetic,
            Vec::new(),
        )]);

        for page in Page::ALL {
            app.select_page(page);
            terminal.draw(|frame| render(frame, &app)).unwrap();
        }
    }
}
