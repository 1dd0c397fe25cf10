// ============================================================================
// Enum : LanePayload
// ============================================================================
// Données normalisées d'une lane : un variant par lane
//
// CONCEPT RUST : Sum type fermé
// - Chaque lane a sa propre forme de données
// - Le match sur LanePayload est exhaustif : ajouter une lane force
//   à traiter sa normalisation et son rendu partout
// ============================================================================

use serde_json::Value;

use crate::models::{Lane, PredictedPoint, RawPoint};

/// Données normalisées d'une lane chargée
#[derive(Debug, Clone, PartialEq)]
pub enum LanePayload {
    Summary(Analysis),
    Video(Vec<VideoItem>),
    Social(SocialFeed),
    Articles(Vec<ArticleItem>),
    Indicators(Vec<RawPoint>),
    Forecast(Vec<PredictedPoint>),
}

impl LanePayload {
    /// Lane à laquelle appartiennent ces données
    pub fn lane(&self) -> Lane {
        match self {
            LanePayload::Summary(_) => Lane::Summary,
            LanePayload::Video(_) => Lane::Video,
            LanePayload::Social(_) => Lane::Social,
            LanePayload::Articles(_) => Lane::Articles,
            LanePayload::Indicators(_) => Lane::Indicators,
            LanePayload::Forecast(_) => Lane::Forecast,
        }
    }

    /// Nombre d'éléments (pour les logs)
    pub fn len(&self) -> usize {
        match self {
            LanePayload::Summary(_) => 1,
            LanePayload::Video(items) => items.len(),
            LanePayload::Social(feed) => feed.posts.len(),
            LanePayload::Articles(items) => items.len(),
            LanePayload::Indicators(points) => points.len(),
            LanePayload::Forecast(points) => points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Score de sentiment porté par la lane Social
    pub fn sentiment(&self) -> Option<f64> {
        match self {
            LanePayload::Social(feed) => feed.sentiment,
            _ => None,
        }
    }
}

/// Synthèse : texte libre ou valeur structurée
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    Text(String),
    Structured(Value),
}

impl Analysis {
    /// Texte affichable (JSON indenté pour une valeur structurée)
    pub fn as_text(&self) -> String {
        match self {
            Analysis::Text(text) => text.clone(),
            Analysis::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// Une vidéo YouTube analysée
#[derive(Debug, Clone, PartialEq)]
pub struct VideoItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub transcript: Option<String>,
    /// Rétention moyenne en % (None si inconnue : -1 côté service)
    pub average_retention: Option<f64>,
    /// Erreur de scraping partielle pour cette vidéo
    pub scrape_error: Option<String>,
}

/// Posts Reddit + sentiment global
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SocialFeed {
    pub posts: Vec<SocialPost>,
    pub sentiment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocialPost {
    pub id: String,
    pub title: String,
    pub url: String,
    pub upvote_ratio: f64,
    pub description: Option<String>,
    pub comments: Vec<SocialComment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SocialComment {
    pub text: String,
    /// Label du service : "Positive", "Negative", "Neutral"
    pub sentiment: Option<String>,
    pub upvotes: i64,
}

/// Un article de presse
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub summary: Option<String>,
    pub text: Option<String>,
    pub keywords: Vec<String>,
}
