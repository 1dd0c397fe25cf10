// ============================================================================
// Structure : App
// ============================================================================
// État de l'interface TUI (pas des données : celles-ci vivent dans LaneStore)
//
// CONCEPTS RUST :
// 1. State Management : tout l'état d'affichage dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
//
// PATTERN : séparation UI / données
// - App : mode de saisie, buffer, confirmation de quit, défilement
// - LaneStore (via LaneOrchestrator) : sujet, lanes, sentiment
// - Le rendu lit les deux, sans jamais les modifier
// ============================================================================

use crate::analysis::DEFAULT_SAMPLE_TARGET;

// ============================================================================
// Enum : Mode
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Browse : navigation entre onglets, défilement
// - Input : les touches alimentent le buffer du sujet
// ============================================================================

/// Mode d'interaction courant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,

    /// Saisie modale (Vim-like) : Enter valide, Esc annule
    Input,
}

pub const SUBJECT_PROMPT: &str = "Coin: ";

/// État de l'interface
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    pub mode: Mode,

    /// Texte en cours de saisie (vidé après validation ou annulation)
    pub input_buffer: String,

    pub input_prompt: String,

    /// Two-step quit : première pression de 'q' arme, deuxième quitte
    pub confirm_quit: bool,

    /// Décalage vertical du contenu de la lane affichée
    pub scroll: u16,

    /// Nombre de points visé par le Sampler pour les graphiques
    pub sample_target: usize,
}

impl App {
    pub fn new() -> Self {
        Self::with_sample_target(DEFAULT_SAMPLE_TARGET)
    }

    /// Crée une App avec une cible d'échantillonnage issue de la config
    pub fn with_sample_target(sample_target: usize) -> Self {
        Self {
            running: true,
            mode: Mode::Browse,
            input_buffer: String::new(),
            input_prompt: String::new(),
            confirm_quit: false,
            scroll: 0,
            sample_target,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Quit confirmation
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

    // ========================================================================
    // Défilement
    // ========================================================================

    /// CONCEPT RUST : Saturating arithmetic
    /// - saturating_sub() ne descend pas sous 0 (pas de panic sur u16)
    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll = self.scroll.saturating_add(1);
    }

    /// Remis à zéro à chaque changement d'onglet ou de sujet
    pub fn reset_scroll(&mut self) {
        self.scroll = 0;
    }

    // ========================================================================
    // Input Mode Management
    // ========================================================================

    /// Entre en mode saisie du sujet
    ///
    /// Le buffer est pré-rempli avec le sujet courant pour faciliter
    /// une correction.
    pub fn start_input(&mut self, current_subject: &str) {
        self.mode = Mode::Input;
        self.input_buffer = current_subject.to_string();
        self.input_prompt = SUBJECT_PROMPT.to_string();
    }

    pub fn cancel_input(&mut self) {
        self.mode = Mode::Browse;
        self.input_buffer.clear();
        self.input_prompt.clear();
    }

    /// Récupère la valeur saisie et revient en navigation
    ///
    /// CONCEPT RUST : std::mem::take
    /// - Déplace le String hors du buffer et laisse un String vide
    /// - Pas de clone
    pub fn submit_input(&mut self) -> String {
        self.mode = Mode::Browse;
        self.input_prompt.clear();
        std::mem::take(&mut self.input_buffer)
    }

    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        self.input_buffer.pop();
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.mode == Mode::Input
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_creation() {
        let app = App::new();
        assert!(app.is_running());
        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.scroll, 0);
        assert_eq!(app.sample_target, 30);
    }

    #[test]
    fn test_app_quit_two_steps() {
        let mut app = App::new();

        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        assert!(app.is_running());

        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());

        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_scroll_saturates() {
        let mut app = App::new();

        app.scroll_up();
        assert_eq!(app.scroll, 0);

        app.scroll_down();
        app.scroll_down();
        assert_eq!(app.scroll, 2);

        app.reset_scroll();
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_input_submit() {
        let mut app = App::new();
        app.start_input("");
        assert!(app.is_in_input_mode());
        assert_eq!(app.input_prompt, SUBJECT_PROMPT);

        for c in "bitcoinx".chars() {
            app.append_char(c);
        }
        app.backspace();

        assert_eq!(app.submit_input(), "bitcoin");
        assert!(!app.is_in_input_mode());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_input_prefilled_then_cancelled() {
        let mut app = App::new();
        app.start_input("ethereum");
        assert_eq!(app.input_buffer, "ethereum");

        app.cancel_input();
        assert_eq!(app.mode, Mode::Browse);
        assert!(app.input_buffer.is_empty());
    }
}
