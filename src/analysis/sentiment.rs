// ============================================================================
// SentimentClassifier : score signé → catégorie + magnitude bornée
// ============================================================================

use std::fmt;

/// Catégorie de sentiment selon le signe du score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        };
        f.write_str(label)
    }
}

/// Résultat de la classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentClass {
    pub label: SentimentLabel,
    /// Taille de la jauge, dans [0, 100]
    pub magnitude_percent: f64,
}

/// Classe un score : signe → label, min(|score| * 10, 100) → magnitude
pub fn classify(score: f64) -> SentimentClass {
    let label = if score > 0.0 {
        SentimentLabel::Positive
    } else if score < 0.0 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    };

    SentimentClass {
        label,
        magnitude_percent: (score.abs() * 10.0).min(100.0),
    }
}
