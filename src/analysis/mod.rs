// ============================================================================
// Module : analysis
// ============================================================================
// Algorithmes purs (sans état) qui préparent les séries pour le rendu :
// échantillonnage, fusion historique / prévision, sentiment, statistiques
// ============================================================================

pub mod merger;    // Fusion historique + prévision
pub mod sampler;   // Sous-échantillonnage déterministe
pub mod sentiment; // Score → catégorie + magnitude
pub mod stats;     // Valeurs courantes et synthèse de prévision

pub use merger::{merge, start_of_day, MergedTimeline};
pub use sampler::{sample, sample_indices, sample_step, DEFAULT_SAMPLE_TARGET};
pub use sentiment::{classify, SentimentClass, SentimentLabel};
pub use stats::{ForecastSummary, IndicatorSnapshot, ReturnDistribution};

use chrono::NaiveDateTime;

use crate::models::{PredictedPoint, RawPoint};

/// Timeline du graphique de prévision
///
/// L'historique (lane Indicators, si chargée) est échantillonné avant la
/// fusion, la prévision est prise telle quelle.
pub fn forecast_timeline(
    history: Option<&[RawPoint]>,
    forecast: &[PredictedPoint],
    now: NaiveDateTime,
    sample_target: usize,
) -> MergedTimeline {
    let sampled = history
        .map(|points| sample(points, sample_target))
        .unwrap_or_default();
    merge(&sampled, forecast, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PRICE_FIELD;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn test_forecast_timeline_samples_history_and_keeps_last() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let today = start_of_day(now);

        // 365 jours d'historique jusqu'à hier
        let history: Vec<RawPoint> = (1..=365)
            .rev()
            .map(|d| RawPoint::new(today - Duration::days(d)).with_field(PRICE_FIELD, d as f64))
            .collect();
        let forecast: Vec<PredictedPoint> = (1..=7)
            .map(|d| PredictedPoint::new(today + Duration::days(d), 1000.0 + d as f64))
            .collect();

        let timeline = forecast_timeline(Some(&history), &forecast, now, DEFAULT_SAMPLE_TARGET);
        let sampled_len = sample_indices(history.len(), DEFAULT_SAMPLE_TARGET).len();

        assert_eq!(timeline.split_index, Some(sampled_len));
        // Le bridge de la série prévue est le prix d'hier (d = 1)
        assert_eq!(timeline.predicted[sampled_len - 1], Some(1.0));
    }

    #[test]
    fn test_forecast_timeline_without_history() {
        let now = NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        let forecast = vec![PredictedPoint::new(now + Duration::days(1), 1.0)];

        let timeline = forecast_timeline(None, &forecast, now, DEFAULT_SAMPLE_TARGET);
        assert_eq!(timeline.split_index, Some(0));
    }
}
