// ============================================================================
// Module : ui
// ============================================================================
// Rendu TUI (ratatui) et lecture du clavier (crossterm)
// ============================================================================

pub mod chart;     // Lanes graphiques : indicateurs, prévision
pub mod dashboard; // Layout principal : header, onglets, contenu, footer
pub mod events;    // Gestion des événements clavier
pub mod lanes;     // Lanes textuelles : synthèse, vidéos, posts, articles

pub use dashboard::render;
pub use events::{Event, EventHandler};
