// ============================================================================
// Structures : Lane, LaneStatus, LaneState
// ============================================================================
// Une "lane" est une catégorie de données chargée et mise en cache
// indépendamment des autres (résumé, vidéos, réseaux sociaux, etc.)
//
// CONCEPTS RUST :
// 1. Enum fermé : l'ensemble des lanes est fixe, le compilateur vérifie
//    l'exhaustivité de chaque match
// 2. Champs privés : les invariants de LaneState ne peuvent être cassés
//    que depuis ce module
// ============================================================================

use std::fmt;

use crate::models::LanePayload;

// ============================================================================
// Enum : Lane
// ============================================================================

/// Les six lanes d'analyse, dans l'ordre d'affichage des onglets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lane {
    /// Synthèse générée par le service d'analyse
    Summary,
    /// Vidéos YouTube commentées
    Video,
    /// Posts Reddit (porte aussi le score de sentiment)
    Social,
    /// Articles de presse
    Articles,
    /// Indicateurs techniques historiques
    Indicators,
    /// Prévision de prix
    Forecast,
}

impl Lane {
    /// Nombre de lanes
    pub const COUNT: usize = 6;

    /// Toutes les lanes, dans l'ordre des onglets
    ///
    /// CONCEPT RUST : const array
    /// - Évalué à la compilation, aucune allocation
    pub const ALL: [Lane; Lane::COUNT] = [
        Lane::Summary,
        Lane::Video,
        Lane::Social,
        Lane::Articles,
        Lane::Indicators,
        Lane::Forecast,
    ];

    /// Position de la lane dans l'ordre des onglets (0..6)
    pub fn index(self) -> usize {
        match self {
            Lane::Summary => 0,
            Lane::Video => 1,
            Lane::Social => 2,
            Lane::Articles => 3,
            Lane::Indicators => 4,
            Lane::Forecast => 5,
        }
    }

    /// Lane à une position donnée (None si hors limites)
    pub fn from_index(index: usize) -> Option<Lane> {
        Lane::ALL.get(index).copied()
    }

    /// Chemin de l'endpoint du service d'analyse pour cette lane
    ///
    /// CONCEPT RUST : &'static str
    /// - String littérale stockée dans le binaire, pas d'allocation
    pub fn endpoint_path(self) -> &'static str {
        match self {
            Lane::Summary => "/v1/analyzeCoin",
            Lane::Video => "/v1/scrapeYoutube",
            Lane::Social => "/v1/scrapeReddit",
            Lane::Articles => "/v1/scrapeArticles",
            Lane::Indicators => "/v1/scrapeCoinGecko",
            Lane::Forecast => "/v1/predictPrice",
        }
    }

    /// Label court pour les onglets
    pub fn label(self) -> &'static str {
        match self {
            Lane::Summary => "Summary",
            Lane::Video => "Youtube",
            Lane::Social => "Reddit",
            Lane::Articles => "Articles",
            Lane::Indicators => "Technical Indicators",
            Lane::Forecast => "Prediction",
        }
    }

    /// Lane suivante (cycle : Forecast → Summary)
    pub fn next(self) -> Lane {
        Lane::ALL[(self.index() + 1) % Lane::COUNT]
    }

    /// Lane précédente (cycle : Summary → Forecast)
    pub fn previous(self) -> Lane {
        Lane::ALL[(self.index() + Lane::COUNT - 1) % Lane::COUNT]
    }
}

/// La première lane est l'onglet affiché au démarrage
impl Default for Lane {
    fn default() -> Self {
        Lane::Summary
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Enum : LaneStatus
// ============================================================================
// CONCEPT : State machine
// - Idle → Loading → Loaded
// - Idle → Loading → Failed → Loading → ...
// - Loading est exclusif : au plus un fetch en vol par lane
// ============================================================================

/// Statut de chargement d'une lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaneStatus {
    /// Jamais chargée pour le sujet courant
    #[default]
    Idle,
    /// Un fetch est en vol
    Loading,
    /// Données disponibles
    Loaded,
    /// Dernier fetch en échec
    Failed,
}

// ============================================================================
// Structure : LaneState
// ============================================================================

/// État d'une lane pour le sujet courant
///
/// Invariants garantis par les constructeurs :
/// - `Loaded` ⇒ données présentes, pas de message d'erreur
/// - `Failed` ⇒ message d'erreur présent, pas de données
/// - `Idle` / `Loading` ⇒ ni données ni erreur
#[derive(Debug, Clone, Default)]
pub struct LaneState {
    status: LaneStatus,
    data: Option<LanePayload>,
    error_message: Option<String>,
}

impl LaneState {
    /// Lane vierge (statut Idle)
    pub fn idle() -> Self {
        Self::default()
    }

    /// Lane en cours de chargement (l'erreur précédente est effacée)
    pub fn loading() -> Self {
        Self {
            status: LaneStatus::Loading,
            data: None,
            error_message: None,
        }
    }

    /// Lane chargée avec ses données normalisées
    pub fn loaded(data: LanePayload) -> Self {
        Self {
            status: LaneStatus::Loaded,
            data: Some(data),
            error_message: None,
        }
    }

    /// Lane en échec avec un message lisible
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: LaneStatus::Failed,
            data: None,
            error_message: Some(message.into()),
        }
    }

    pub fn status(&self) -> LaneStatus {
        self.status
    }

    /// Données de la lane (Some seulement si Loaded)
    pub fn data(&self) -> Option<&LanePayload> {
        self.data.as_ref()
    }

    /// Message d'erreur (Some seulement si Failed)
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == LaneStatus::Loading
    }

    pub fn is_loaded(&self) -> bool {
        self.status == LaneStatus::Loaded
    }
}

// ============================================================================
// Tests
// ============================================================================
