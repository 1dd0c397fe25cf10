// ============================================================================
// SeriesMerger : fusion historique + prévision en une seule timeline
// ============================================================================
// 1. Tague chaque point (Historical / Predicted)
// 2. Concatène puis trie par date (tri stable : à date égale, l'historique
//    reste devant la prévision)
// 3. Cherche split_index : premier point Predicted dont la date est
//    strictement après le début du jour de `now`
// 4. Construit deux séries parallèles alignées sur le même axe de dates,
//    qui partagent un "bridge point" à la frontière pour que les deux
//    lignes se touchent
// ============================================================================

use chrono::{NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::models::{PredictedPoint, SampledPoint, Segment, TimelinePoint};

/// Timeline fusionnée prête pour le rendu
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedTimeline {
    /// Points triés par date croissante
    pub points: Vec<TimelinePoint>,

    /// Frontière observé / prévu (None : aucune prévision future)
    pub split_index: Option<usize>,

    /// Série "historique", alignée sur `points`
    pub historical: Vec<Option<f64>>,

    /// Série "prévue", alignée sur `points`
    pub predicted: Vec<Option<f64>>,
}

impl MergedTimeline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vrai si un segment prévu doit être dessiné
    pub fn has_predicted_segment(&self) -> bool {
        self.split_index.is_some()
    }
}

/// Début du jour d'un instant (00:00:00)
pub fn start_of_day(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_time(NaiveTime::MIN)
}

/// Fusionne une série historique échantillonnée et une série prévue
///
/// Les points historiques sans prix sont ignorés.
pub fn merge(
    historical: &[SampledPoint],
    predicted: &[PredictedPoint],
    now: NaiveDateTime,
) -> MergedTimeline {
    // Étapes 1 et 2 : tag + concaténation (historique d'abord) + tri stable
    let mut points: Vec<TimelinePoint> = historical
        .iter()
        .filter_map(|point| {
            point.price().map(|price| TimelinePoint {
                date: point.timestamp,
                price,
                segment: Segment::Historical,
            })
        })
        .chain(predicted.iter().map(|point| TimelinePoint {
            date: point.date,
            price: point.price,
            segment: Segment::Predicted,
        }))
        .collect();

    // CONCEPT RUST : sort_by_key est stable
    points.sort_by_key(|point| point.date);

    // Étape 3 : frontière
    let today = start_of_day(now);
    let split_index = points
        .iter()
        .position(|point| point.segment == Segment::Predicted && point.date > today);

    // Étape 4 : séries parallèles
    let (historical_series, predicted_series) = split_series(&points, split_index);

    debug!(
        points = points.len(),
        split_index = ?split_index,
        "Merged historical and predicted series"
    );

    MergedTimeline {
        points,
        split_index,
        historical: historical_series,
        predicted: predicted_series,
    }
}

/// Construit les deux séries de valeurs autour de la frontière
///
/// Avec split = s :
/// - historique : prix pour i <= s (i == s est le bridge), rien après
/// - prévue     : prix de s-1 (bridge) puis prix pour i >= s
///
/// Sans frontière, tout est historique. Avec s == 0, il n'y a rien avant
/// la prévision : la série prévue n'a pas de bridge, l'historique ne garde
/// que le premier point.
fn split_series(
    points: &[TimelinePoint],
    split_index: Option<usize>,
) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
    let Some(split) = split_index else {
        let historical = points.iter().map(|p| Some(p.price)).collect();
        return (historical, vec![None; points.len()]);
    };

    let historical = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i <= split).then_some(p.price))
        .collect();

    let predicted = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i + 1 >= split).then_some(p.price))
        .collect();

    (historical, predicted)
}

// ============================================================================
// Tests
// ============================================================================
