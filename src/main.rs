// ============================================================================
// greenjobs - Dashboard climat & emploi dans le terminal
// ============================================================================
// Charge les séries World Bank (avec repli synthétique), puis affiche
// les pages du dashboard dans une interface TUI
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : tokio::runtime::Runtime + block_on pour les appels API
// ============================================================================

use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Runtime;
use tracing::{debug, error, info, warn};

use greenjobs::api::IndicatorFetcher;
use greenjobs::app::{App, Page};
use greenjobs::config::Config;
use greenjobs::export::export_page;
use greenjobs::source::{load_all_indicators, FallbackSource, RemoteSource, SyntheticSampleSource};
use greenjobs::ui::events::{
    is_export_event, is_next_page_event, is_previous_page_event, is_quit_event, is_reload_event,
    page_digit, range_action, Event, RangeAction,
};
use greenjobs::ui::{render, EventHandler};

/// Actions qui nécessitent le runtime ou la source de données
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Vider le cache et recharger les quatre séries
    Reload,
    /// Exporter les tableaux de la page courante
    Export,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ./logs/greenjobs.log
/// RUST_LOG=greenjobs=trace cargo run
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "greenjobs.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour greenjobs, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greenjobs=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::parse();
    config.validate()?;

    // Si init échoue, on affiche l'erreur et on continue quand même
    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(?config, "greenjobs starting up");

    let runtime = Runtime::new().context("Échec de la création du runtime tokio")?;
    let mut source = build_source(&config)?;
    let mut app = App::new(chrono::Local::now().year());

    println!("📊 Chargement des indicateurs World Bank...\n");
    load_indicators(&runtime, &mut source, &mut app);
    println!("✅ Données chargées !\n");

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;
    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &runtime, &mut source, &config);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Construit la source de données selon la configuration
fn build_source(config: &Config) -> Result<FallbackSource> {
    let synthetic = SyntheticSampleSource::default();

    if config.offline {
        info!("Offline mode: synthetic samples only");
        return Ok(FallbackSource::new(None, synthetic));
    }

    let fetcher = IndicatorFetcher::new().context("Échec de la création du client HTTP")?;
    let remote = RemoteSource::new(fetcher, config.fetch_options(), config.build_cache());
    Ok(FallbackSource::new(Some(remote), synthetic))
}

/// Charge les quatre séries (séquentiellement) et met à jour le statut
fn load_indicators(runtime: &Runtime, source: &mut FallbackSource, app: &mut App) {
    let series = runtime.block_on(load_all_indicators(source));
    let notes = source.take_notes();

    for note in &notes {
        warn!(note = %note, "Fallback used");
    }

    let status = if notes.is_empty() {
        format!("{} série(s) World Bank chargée(s)", series.len())
    } else {
        format!(
            "{} série(s) chargée(s), {} en données synthétiques : {}",
            series.len(),
            notes.len(),
            notes.join(" | ")
        )
    };

    info!(series = series.len(), fallbacks = notes.len(), "Indicators loaded");
    app.set_indicators(series);
    app.set_status(status);
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   1. Dessiner l'interface (render)
//   2. Traiter les événements (input)
//   3. Exécuter la commande éventuelle (reload / export)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    runtime: &Runtime,
    source: &mut FallbackSource,
    config: &Config,
) -> Result<()> {
    while app.is_running() {
        terminal.draw(|frame| render(frame, app))?;

        let event = match events.next() {
            Ok(event) => event,
            Err(e) => {
                warn!(error = ?e, "Failed to read terminal event");
                continue;
            }
        };

        match handle_event(app, &event) {
            Some(Command::Reload) => {
                info!("User requested reload");
                app.set_status("Rechargement...");
                terminal.draw(|frame| render(frame, app))?;

                source.clear_cache();
                load_indicators(runtime, source, app);
            }
            Some(Command::Export) => {
                let dir = config.export_dir();
                match export_page(app, &dir) {
                    Ok(paths) => {
                        let names: Vec<String> =
                            paths.iter().map(|p| p.display().to_string()).collect();
                        app.set_status(format!("Exporté : {}", names.join(", ")));
                    }
                    Err(e) => {
                        error!(error = ?e, "CSV export failed");
                        app.set_status(format!("Échec de l'export : {:#}", e));
                    }
                }
            }
            None => {}
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// Retourne une commande quand l'action dépasse l'état de App
/// (appel réseau, écriture de fichiers).
fn handle_event(app: &mut App, event: &Event) -> Option<Command> {
    if let Event::Tick = event {
        return None;
    }

    // Two-step quit : première pression = confirmation, seconde = sortie
    if is_quit_event(event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return None;
    }

    // Toute autre touche annule la confirmation
    app.cancel_quit();

    if is_next_page_event(event) {
        app.next_page();
        debug!(page = app.current_page.title(), "User changed page");
    } else if is_previous_page_event(event) {
        app.previous_page();
        debug!(page = app.current_page.title(), "User changed page");
    } else if let Some(page) = page_digit(event).and_then(Page::from_digit) {
        app.select_page(page);
        debug!(page = page.title(), "User selected page");
    } else if let Some(action) = range_action(event) {
        if let Some(range) = app.active_range_mut() {
            match action {
                RangeAction::StartEarlier => range.shift_start(-1),
                RangeAction::StartLater => range.shift_start(1),
                RangeAction::EndEarlier => range.shift_end(-1),
                RangeAction::EndLater => range.shift_end(1),
            }
            debug!(range = %range.label(), "User changed year range");
        }
    } else if is_export_event(event) {
        return Some(Command::Export);
    } else if is_reload_event(event) {
        return Some(Command::Reload);
    }

    None
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty()))
    }

    #[test]
    fn test_quit_needs_two_presses() {
        let mut app = App::new(2024);

        handle_event(&mut app, &key('q'));
        assert!(app.is_running());
        handle_event(&mut app, &key('q'));
        assert!(!app.is_running());
    }

    #[test]
    fn test_other_key_cancels_quit() {
        let mut app = App::new(2024);

        handle_event(&mut app, &key('q'));
        handle_event(&mut app, &key('2'));
        assert!(!app.is_awaiting_quit_confirmation());
        assert_eq!(app.current_page, Page::Education);

        handle_event(&mut app, &key('q'));
        assert!(app.is_running());
    }

    #[test]
    fn test_commands() {
        let mut app = App::new(2024);
        assert_eq!(handle_event(&mut app, &key('e')), Some(Command::Export));
        assert_eq!(handle_event(&mut app, &key('r')), Some(Command::Reload));
        assert_eq!(handle_event(&mut app, &Event::Tick), None);
    }

    #[test]
    fn test_range_keys_only_affect_active_page() {
        let mut app = App::new(2024);

        handle_event(&mut app, &key(']'));
        assert_eq!(app.climate_range.start, 1991);

        handle_event(&mut app, &key('3'));
        handle_event(&mut app, &key('{'));
        assert_eq!(app.climate_range.end, 2023);
        assert_eq!(app.college_range.end, 2023);
    }
}
