// ============================================================================
// Chart - Graphiques ligne et barres
// ============================================================================
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne (plusieurs Dataset)
// 2. BarChart widget : barres verticales
// 3. Axis : configuration des axes X et Y
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::models::JobScore;

/// Une série à tracer : nom, couleur, points (année, valeur)
pub struct LineSeries {
    pub name: String,
    pub color: Color,
    pub points: Vec<(f64, f64)>,
}

/// Couleurs utilisées pour les séries successives
pub const PALETTE: [Color; 4] = [Color::Cyan, Color::Yellow, Color::Magenta, Color::Green];

/// Bornes des axes (x_min, x_max, y_min, y_max)
///
/// Ajoute une marge de 5% en Y pour que le graphique respire.
/// Retourne None s'il n'y a aucun point.
pub fn chart_bounds(series: &[LineSeries]) -> Option<[f64; 4]> {
    let mut points = series.iter().flat_map(|s| s.points.iter());
    let &(x0, y0) = points.next()?;

    let (x_min, x_max, y_min, y_max) = points.fold(
        (x0, x0, y0, y0),
        |(x_min, x_max, y_min, y_max), &(x, y)| {
            (x_min.min(x), x_max.max(x), y_min.min(y), y_max.max(y))
        },
    );

    // Une seule valeur : on élargit artificiellement pour éviter un axe vide
    let margin = if y_max > y_min { (y_max - y_min) * 0.05 } else { y_max.abs().max(1.0) * 0.05 };
    let (x_min, x_max) = if x_max > x_min { (x_min, x_max) } else { (x_min - 1.0, x_max + 1.0) };

    Some([x_min, x_max, y_min - margin, y_max + margin])
}

/// Dessine un graphique ligne multi-séries
pub fn render_line_chart(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    y_title: &str,
    series: &[LineSeries],
) {
    let Some([x_min, x_max, y_min, y_max]) = chart_bounds(series) else {
        render_no_data(frame, area, "Pas de données à afficher");
        return;
    };

    // CONCEPT RATATUI : Dataset
    // - Braille : tracé fin, plusieurs points par cellule
    let datasets = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.name.as_str())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(s.color))
                .data(&s.points)
        })
        .collect::<Vec<_>>();

    let x_axis = Axis::default()
        .title("Year")
        .style(Style::default().fg(Color::Gray))
        .bounds([x_min, x_max])
        .labels(vec![
            Span::raw(format!("{:.0}", x_min)),
            Span::raw(format!("{:.0}", (x_min + x_max) / 2.0)),
            Span::raw(format!("{:.0}", x_max)),
        ]);

    let y_axis = Axis::default()
        .title(y_title)
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{:.2}", y_min)),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{:.2}", y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" {} ", title)),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

/// Dessine un histogramme de scores de métiers
pub fn render_job_bars(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    jobs: &[JobScore],
    color: Color,
) {
    if jobs.is_empty() {
        render_no_data(frame, area, "Pas de métiers à afficher");
        return;
    }

    let bars: Vec<Bar> = jobs
        .iter()
        .map(|job| {
            Bar::default()
                .value(job.score)
                .label(Line::from(job.job))
                .style(Style::default().fg(color))
                .value_style(
                    Style::default()
                        .fg(Color::Black)
                        .bg(color)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    // Largeur des barres : l'espace intérieur réparti entre les métiers
    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / jobs.len() as u16).saturating_sub(1).max(3);

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", title)),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .max(100);

    frame.render_widget(chart, area);
}

/// Affiche un message quand il n'y a pas de données à afficher
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message, Style::default().fg(Color::Red))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
