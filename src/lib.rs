// ============================================================================
// DeepCoin - Bibliothèque
// ============================================================================
// Client terminal d'un service d'analyse de crypto-monnaies : six lanes
// (synthèse, vidéos, Reddit, articles, indicateurs, prévision) chargées
// indépendamment et mises en cache par sujet.
//
// Le binaire (main.rs) ne fait que brancher le terminal sur ces modules.
// ============================================================================

pub mod analysis;     // Sampler, fusion de séries, sentiment, statistiques
pub mod api;          // Client HTTP du service d'analyse
pub mod app;          // État de l'interface
pub mod config;       // Configuration (variables d'environnement)
pub mod models;       // Types de données
pub mod orchestrator; // Tâches de fetch par lane
pub mod store;        // Cache + statut par lane
pub mod ui;           // Rendu TUI
