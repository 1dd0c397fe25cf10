// ============================================================================
// Erreurs de fetch
// ============================================================================
// Trois familles, toutes réduites à un message lisible stocké dans la lane :
// - Transport : réponse HTTP non-2xx
// - Upstream  : réponse dont le corps porte un champ "error" explicite
// - Unknown   : exception pendant l'appel ou le parsing
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] implémente std::error::Error
// - #[error("...")] génère Display
// ============================================================================

use thiserror::Error;

/// Message générique pour les erreurs inattendues
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Famille d'erreur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Transport,
    Upstream,
    Unknown,
}

/// Erreur d'un fetch de lane
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Failed to fetch data: {status}")]
    Transport { status: u16 },

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Unknown(String),
}

impl FetchError {
    /// Erreur inattendue avec le message générique
    pub fn unknown() -> Self {
        FetchError::Unknown(UNKNOWN_ERROR_MESSAGE.to_string())
    }

    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport { .. } => FetchErrorKind::Transport,
            FetchError::Upstream(_) => FetchErrorKind::Upstream,
            FetchError::Unknown(_) => FetchErrorKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            FetchError::Transport { status: 503 }.to_string(),
            "Failed to fetch data: 503"
        );
        assert_eq!(FetchError::Upstream("rate limited".into()).to_string(), "rate limited");
        assert_eq!(FetchError::unknown().to_string(), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(FetchError::unknown().kind(), FetchErrorKind::Unknown);
    }
}
