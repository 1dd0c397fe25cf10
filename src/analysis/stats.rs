// ============================================================================
// Statistiques de synthèse pour les lanes graphiques
// ============================================================================
// IndicatorSnapshot  : valeurs courantes lues sur le DERNIER point brut
// ReturnDistribution : jours de hausse / baisse sur la série brute complète
// ForecastSummary   : prix courant, plus haut / moyenne prévus, croissance
// ============================================================================

use chrono::NaiveDateTime;

use crate::analysis::merger::start_of_day;
use crate::models::{PredictedPoint, RawPoint};

/// Noms des champs produits par le service d'indicateurs
pub mod fields {
    pub const PERCENT_CHANGE_24H: &str = "Percent_Change_24h";
    pub const MARKET_CAP: &str = "Market_Cap";
    pub const VOLUME_24H: &str = "Volume_24h";
    pub const RSI: &str = "RSI";
    pub const MACD: &str = "MACD";
    pub const MACD_SIGNAL: &str = "MACD_Signal";
    pub const SMA_20: &str = "SMA_20";
    pub const SMA_50: &str = "SMA_50";
    pub const EMA_20: &str = "EMA_20";
    pub const EMA_50: &str = "EMA_50";
}

/// Valeurs courantes des indicateurs
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub timestamp: NaiveDateTime,
    pub price: Option<f64>,
    pub percent_change_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_20: Option<f64>,
    pub ema_50: Option<f64>,
}

impl IndicatorSnapshot {
    /// Lit le dernier point de la série brute (pas de l'échantillon)
    pub fn from_latest(points: &[RawPoint]) -> Option<Self> {
        let latest = points.last()?;
        Some(Self {
            timestamp: latest.timestamp,
            price: latest.price(),
            percent_change_24h: latest.field(fields::PERCENT_CHANGE_24H),
            market_cap: latest.field(fields::MARKET_CAP),
            volume_24h: latest.field(fields::VOLUME_24H),
            rsi: latest.field(fields::RSI),
            macd: latest.field(fields::MACD),
            macd_signal: latest.field(fields::MACD_SIGNAL),
            sma_20: latest.field(fields::SMA_20),
            sma_50: latest.field(fields::SMA_50),
            ema_20: latest.field(fields::EMA_20),
            ema_50: latest.field(fields::EMA_50),
        })
    }

    /// Zone RSI classique : > 70 suracheté, < 30 survendu
    pub fn rsi_zone(&self) -> Option<&'static str> {
        self.rsi.map(|rsi| {
            if rsi > 70.0 {
                "Overbought"
            } else if rsi < 30.0 {
                "Oversold"
            } else {
                "Neutral"
            }
        })
    }
}

/// Répartition des variations d'un point au suivant
///
/// Un prix inchangé compte comme une baisse. Les paires dont un des deux
/// points n'a pas de prix sont ignorées.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReturnDistribution {
    pub positive_days: usize,
    pub negative_days: usize,
}

impl ReturnDistribution {
    pub fn from_points(points: &[RawPoint]) -> Self {
        points
            .windows(2)
            .filter_map(|pair| Some((pair[0].price()?, pair[1].price()?)))
            .fold(Self::default(), |mut acc, (previous, current)| {
                if current > previous {
                    acc.positive_days += 1;
                } else {
                    acc.negative_days += 1;
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.positive_days + self.negative_days
    }

    /// Part des jours de hausse, en % (None sans aucune paire)
    pub fn positive_percent(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| self.positive_days as f64 / total as f64 * 100.0)
    }

    pub fn negative_percent(&self) -> Option<f64> {
        self.positive_percent().map(|p| 100.0 - p)
    }
}

/// Synthèse de la prévision
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub current_price: f64,
    pub highest_prediction: f64,
    pub average_prediction: f64,
    /// (plus haut - courant) / courant * 100, 0 si le prix courant est nul
    pub potential_growth_percent: f64,
    /// Nombre de prévisions strictement après le début du jour
    pub future_predictions: usize,
}

impl ForecastSummary {
    /// Calcule la synthèse (None si la prévision est vide)
    ///
    /// Le prix courant est le dernier prix historique connu, sinon le
    /// premier prix prévu.
    pub fn compute(
        forecast: &[PredictedPoint],
        history: Option<&[RawPoint]>,
        now: NaiveDateTime,
    ) -> Option<Self> {
        let first = forecast.first()?;

        let current_price = history
            .and_then(|points| points.last())
            .and_then(RawPoint::price)
            .filter(|price| *price != 0.0)
            .unwrap_or(first.price);

        let highest_prediction = forecast
            .iter()
            .map(|p| p.price)
            .fold(f64::NEG_INFINITY, f64::max);
        let average_prediction =
            forecast.iter().map(|p| p.price).sum::<f64>() / forecast.len() as f64;

        let potential_growth_percent = if current_price != 0.0 {
            (highest_prediction - current_price) / current_price * 100.0
        } else {
            0.0
        };

        let today = start_of_day(now);
        let future_predictions = forecast.iter().filter(|p| p.date > today).count();

        Some(Self {
            current_price,
            highest_prediction,
            average_prediction,
            potential_growth_percent,
            future_predictions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PRICE_FIELD;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_snapshot_reads_last_point() {
        let t = now();
        let points = vec![
            RawPoint::new(t - Duration::days(1)).with_field(PRICE_FIELD, 1.0),
            RawPoint::new(t)
                .with_field(PRICE_FIELD, 2.0)
                .with_field(fields::RSI, 75.0)
                .with_field(fields::MARKET_CAP, 3.0e9),
        ];

        let snapshot = IndicatorSnapshot::from_latest(&points).unwrap();
        assert_eq!(snapshot.price, Some(2.0));
        assert_eq!(snapshot.market_cap, Some(3.0e9));
        assert_eq!(snapshot.rsi_zone(), Some("Overbought"));
        assert_eq!(snapshot.macd, None);

        assert!(IndicatorSnapshot::from_latest(&[]).is_none());
    }

    #[test]
    fn test_return_distribution_counts_flat_days_as_negative() {
        let t = now();
        let prices = [Some(10.0), Some(12.0), Some(12.0), Some(11.0), None, Some(15.0), Some(16.0)];
        let points: Vec<RawPoint> = prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                let point = RawPoint::new(t + Duration::days(i as i64));
                match price {
                    Some(p) => point.with_field(PRICE_FIELD, *p),
                    None => point,
                }
            })
            .collect();

        // 10→12 hausse, 12→12 et 12→11 baisse, paires autour du trou ignorées, 15→16 hausse
        let distribution = ReturnDistribution::from_points(&points);
        assert_eq!(distribution, ReturnDistribution { positive_days: 2, negative_days: 2 });
        assert_eq!(distribution.positive_percent(), Some(50.0));
        assert_eq!(distribution.negative_percent(), Some(50.0));

        let empty = ReturnDistribution::from_points(&points[..1]);
        assert_eq!(empty.total(), 0);
        assert_eq!(empty.positive_percent(), None);
    }

    #[test]
    fn test_forecast_summary_with_history() {
        let today = start_of_day(now());
        let forecast = vec![
            PredictedPoint::new(today - Duration::days(1), 90.0),
            PredictedPoint::new(today + Duration::days(1), 110.0),
            PredictedPoint::new(today + Duration::days(2), 130.0),
        ];
        let history = vec![RawPoint::new(today - Duration::days(1)).with_field(PRICE_FIELD, 100.0)];

        let summary = ForecastSummary::compute(&forecast, Some(&history), now()).unwrap();
        assert_eq!(summary.current_price, 100.0);
        assert_eq!(summary.highest_prediction, 130.0);
        assert!((summary.average_prediction - 110.0).abs() < 1e-9);
        assert!((summary.potential_growth_percent - 30.0).abs() < 1e-9);
        assert_eq!(summary.future_predictions, 2);
    }

    #[test]
    fn test_forecast_summary_without_history_uses_first_prediction() {
        let today = start_of_day(now());
        let forecast = vec![PredictedPoint::new(today + Duration::days(1), 50.0)];

        let summary = ForecastSummary::compute(&forecast, None, now()).unwrap();
        assert_eq!(summary.current_price, 50.0);
        assert_eq!(summary.potential_growth_percent, 0.0);
        assert!(ForecastSummary::compute(&[], None, now()).is_none());
    }
}
