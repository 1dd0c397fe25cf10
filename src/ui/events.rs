// ============================================================================
// Gestion des événements
// ============================================================================
// Lecture des touches clavier + ticks réguliers
//
// Le tick sert aussi de cadence pour appliquer les résultats de fetch
// arrivés entre deux frappes (voir la boucle dans main.rs).
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::Lane;

/// Intervalle de poll : borne la latence d'affichage d'un résultat
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Aucun événement pendant POLL_INTERVAL
    Tick,
}

/// Gestionnaire d'événements (stateless)
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        Self
    }

    /// Lit le prochain événement (bloquant au plus POLL_INTERVAL)
    ///
    /// CONCEPT : Filter sur KeyEventKind
    /// - Sur certains OS, on reçoit Press ET Release
    /// - Seul Press est gardé, le reste devient un Tick
    pub fn next(&self) -> Result<Event> {
        if !event::poll(POLL_INTERVAL)? {
            return Ok(Event::Tick);
        }

        match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
            _ => Ok(Event::Tick),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : KeyEvent → intention
// ============================================================================

fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// 'q' : quitter (deux pressions)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

pub fn is_enter_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Enter))
}

pub fn is_backspace_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Backspace))
}

/// '/' ou 'i' : saisir un nouveau sujet
pub fn is_input_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('/') | KeyCode::Char('i')))
}

/// Flèche haut ou 'k' (vim)
pub fn is_up_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Up | KeyCode::Char('k')))
}

/// Flèche bas ou 'j' (vim)
pub fn is_down_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Down | KeyCode::Char('j')))
}

/// Tab, flèche droite ou 'l' : onglet suivant
pub fn is_next_lane_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Tab | KeyCode::Right | KeyCode::Char('l'))
    )
}

/// Shift+Tab, flèche gauche ou 'h' : onglet précédent
pub fn is_previous_lane_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h'))
    )
}

/// '1'..'6' : accès direct à un onglet
///
/// CONCEPT RUST : Option chaining
/// - to_digit() échoue pour un non-chiffre, checked_sub() pour '0'
pub fn lane_shortcut(event: &Event) -> Option<Lane> {
    match key_code(event)? {
        KeyCode::Char(c) => c
            .to_digit(10)
            .and_then(|d| (d as usize).checked_sub(1))
            .and_then(Lane::from_index),
        _ => None,
    }
}

/// Caractère acceptable dans un nom de crypto-monnaie
pub fn is_subject_char_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Char(c)) if c.is_alphanumeric() || matches!(c, '-' | '.' | ' ')
    )
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key_code(event)? {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
