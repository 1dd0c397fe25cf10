// ============================================================================
// Module : api
// ============================================================================
// Ce module contient le client du service d'analyse : appel HTTP par lane,
// classification des erreurs et normalisation des réponses
// ============================================================================

pub mod client;    // Client HTTP (un endpoint par lane)
pub mod error;     // Taxonomie des erreurs de fetch
pub mod normalize; // Corps JSON → LanePayload

// Re-export des types principaux
pub use client::AnalysisClient;
pub use error::{FetchError, FetchErrorKind};
