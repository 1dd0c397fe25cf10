// ============================================================================
// Structures : séries temporelles (historique, prévision, timeline fusionnée)
// ============================================================================
// RawPoint       : une observation historique (timestamp + champs numériques)
// PredictedPoint : une prévision (date + prix)
// TimelinePoint  : unité fusionnée, taguée Historical / Predicted
//
// CONCEPTS RUST :
// 1. NaiveDateTime : le service renvoie des dates sans fuseau horaire
// 2. BTreeMap : champs nommés (price, RSI, MACD...) triés par nom
// ============================================================================

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

/// Nom du champ prix dans les observations historiques
pub const PRICE_FIELD: &str = "price";

/// Une observation historique brute
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub timestamp: NaiveDateTime,

    /// Champs numériques nommés (price, Volume_24h, RSI, ...)
    /// Les valeurs nulles de la source ne sont pas conservées
    pub fields: BTreeMap<String, f64>,
}

/// Point retenu par l'échantillonneur : même timestamp, mêmes champs
pub type SampledPoint = RawPoint;

impl RawPoint {
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            fields: BTreeMap::new(),
        }
    }

    /// Builder : ajoute un champ
    pub fn with_field(mut self, name: &str, value: f64) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    /// Valeur d'un champ (None si absent ou nul dans la source)
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    pub fn price(&self) -> Option<f64> {
        self.field(PRICE_FIELD)
    }
}

/// Une observation prévue (jamais historique)
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedPoint {
    pub date: NaiveDateTime,
    pub price: f64,
}

impl PredictedPoint {
    pub fn new(date: NaiveDateTime, price: f64) -> Self {
        Self { date, price }
    }
}

/// Segment d'un point de la timeline fusionnée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Historical,
    Predicted,
}

/// Unité de la timeline fusionnée, produite uniquement par le merger
#[derive(Debug, Clone, PartialEq)]
pub struct TimelinePoint {
    pub date: NaiveDateTime,
    pub price: f64,
    pub segment: Segment,
}

// ============================================================================
// Parsing des timestamps
// ============================================================================
// Le service produit plusieurs formats selon l'endpoint :
// - pandas str()         : "2025-01-31 00:00:00"
// - pandas to_json(iso)  : "2025-01-31T00:00:00.000"
// - RFC 3339             : "2025-01-31T00:00:00Z"
// - date seule           : "2025-01-31"
// - epoch millisecondes  : 1738281600000
// ============================================================================

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse un timestamp depuis une chaîne
///
/// Les dates avec fuseau sont ramenées en UTC puis rendues naïves.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(dt);
        }
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Timestamp invalide : {raw:?}"))?;
    Ok(date.and_time(NaiveTime::MIN))
}

/// Parse un timestamp depuis une valeur JSON (chaîne ou epoch ms)
pub fn parse_timestamp_value(value: &Value) -> Result<NaiveDateTime> {
    match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => {
            let millis = n.as_i64().context("Timestamp numérique hors limites")?;
            DateTime::from_timestamp_millis(millis)
                .map(|dt| dt.naive_utc())
                .context("Timestamp epoch invalide")
        }
        other => bail!("Timestamp de type inattendu : {other}"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = day(2025, 1, 31);
        assert_eq!(parse_timestamp("2025-01-31 00:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-31T00:00:00.000").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-31T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2025-01-31").unwrap(), expected);
        assert!(parse_timestamp("not a date").is_err());
    }

    #[test]
    fn test_parse_timestamp_value() {
        let expected = day(2025, 1, 31);
        assert_eq!(parse_timestamp_value(&json!(1738281600000_i64)).unwrap(), expected);
        assert_eq!(parse_timestamp_value(&json!("2025-01-31")).unwrap(), expected);
        assert!(parse_timestamp_value(&json!(null)).is_err());
    }

    #[test]
    fn test_raw_point_fields() {
        let point = RawPoint::new(day(2025, 1, 1))
            .with_field(PRICE_FIELD, 42.0)
            .with_field("RSI", 55.5);
        assert_eq!(point.price(), Some(42.0));
        assert_eq!(point.field("RSI"), Some(55.5));
        assert_eq!(point.field("MACD"), None);
    }
}
