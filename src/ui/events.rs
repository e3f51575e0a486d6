// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching avec matches! pour identifier les touches
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (rafraîchissement)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// - poll(timeout) attend max 250ms
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Déplacement d'une borne du filtre d'années
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeAction {
    StartEarlier,
    StartLater,
    EndEarlier,
    EndLater,
}

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Tab, → ou 'l' : page suivante
pub fn is_next_page_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Tab | KeyCode::Right | KeyCode::Char('l'))
    )
}

/// Shift-Tab, ← ou 'h' : page précédente
pub fn is_previous_page_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h'))
    )
}

/// '1'..'4' : accès direct à une page
pub fn page_digit(event: &Event) -> Option<char> {
    match key_code(event) {
        Some(KeyCode::Char(c)) if ('1'..='4').contains(&c) => Some(c),
        _ => None,
    }
}

/// 'e' : export CSV de la page courante
pub fn is_export_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('e') | KeyCode::Char('E')))
}

/// 'r' : vider le cache et recharger les séries World Bank
pub fn is_reload_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// '[' ']' déplacent le début, '{' '}' la fin
pub fn range_action(event: &Event) -> Option<RangeAction> {
    match key_code(event)? {
        KeyCode::Char('[') => Some(RangeAction::StartEarlier),
        KeyCode::Char(']') => Some(RangeAction::StartLater),
        KeyCode::Char('{') => Some(RangeAction::EndEarlier),
        KeyCode::Char('}') => Some(RangeAction::EndLater),
        _ => None,
    }
}
