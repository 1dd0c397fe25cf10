// ============================================================================
// Normalisation des réponses du service d'analyse
// ============================================================================
// Transforme le corps JSON (non typé) d'une lane en son variant LanePayload
//
// Formes acceptées :
// - mapping id → objet (ordre de la source conservé : preserve_order)
// - tableau d'objets (le service d'indicateurs renvoie des "records")
// Les entrées qui ne sont pas des objets sont ignorées : le service mélange
// par exemple le score "sentiment" (nombre) aux posts Reddit.
// ============================================================================

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::models::{
    parse_timestamp_value, Analysis, ArticleItem, Lane, LanePayload, PredictedPoint, RawPoint,
    SocialComment, SocialFeed, SocialPost, VideoItem,
};

/// Champ d'erreur explicite au premier niveau du corps
const ERROR_FIELD: &str = "error";

/// Extrait le champ "error" d'un corps de réponse
///
/// Seules les valeurs "vraies" comptent : null, false, 0 et "" ne sont pas
/// des erreurs. Une valeur non textuelle est rendue en JSON.
pub fn upstream_error(body: &Value) -> Option<String> {
    match body.get(ERROR_FIELD)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Normalise le corps d'une réponse réussie en données de lane
pub fn normalize(lane: Lane, body: Value) -> Result<LanePayload> {
    let payload = match lane {
        Lane::Summary => LanePayload::Summary(normalize_summary(body)?),
        Lane::Video => LanePayload::Video(normalize_videos(&body)?),
        Lane::Social => LanePayload::Social(normalize_social(&body)?),
        Lane::Articles => LanePayload::Articles(normalize_articles(&body)?),
        Lane::Indicators => LanePayload::Indicators(normalize_indicators(&body)?),
        Lane::Forecast => LanePayload::Forecast(normalize_forecast(&body)?),
    };

    debug!(%lane, items = payload.len(), "Normalized lane payload");
    Ok(payload)
}

// ============================================================================
// Helpers
// ============================================================================

/// Entrées (id, objet) d'un mapping ou d'un tableau, dans l'ordre source
fn entries(body: &Value) -> Result<Vec<(String, &Map<String, Value>)>> {
    let entries: Vec<(String, &Value)> = match body {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        other => bail!("Corps inattendu (ni objet ni tableau) : {}", type_name(other)),
    };

    let total = entries.len();
    let objects: Vec<(String, &Map<String, Value>)> = entries
        .into_iter()
        .filter_map(|(id, value)| value.as_object().map(|obj| (id, obj)))
        .collect();

    if objects.len() < total {
        debug!(skipped = total - objects.len(), "Skipped non-object entries");
    }

    Ok(objects)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Chaîne non vide
fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn title(obj: &Map<String, Value>) -> String {
    text(obj, "title").unwrap_or_else(|| "Untitled".to_string())
}

// ============================================================================
// Normalisation par lane
// ============================================================================

/// Summary : seul le champ "analysis" est conservé
fn normalize_summary(body: Value) -> Result<Analysis> {
    let Value::Object(mut map) = body else {
        bail!("Réponse de synthèse inattendue");
    };

    match map.remove("analysis") {
        Some(Value::String(text)) => Ok(Analysis::Text(text)),
        Some(Value::Null) | None => bail!("Champ \"analysis\" manquant"),
        Some(structured) => Ok(Analysis::Structured(structured)),
    }
}

fn normalize_videos(body: &Value) -> Result<Vec<VideoItem>> {
    let videos = entries(body)?
        .into_iter()
        .map(|(id, obj)| VideoItem {
            id,
            title: title(obj),
            url: text(obj, "url").unwrap_or_default(),
            description: text(obj, "Description"),
            transcript: text(obj, "Transcript"),
            // -1 signifie "rétention inconnue"
            average_retention: obj
                .get("Average Retention")
                .and_then(Value::as_f64)
                .filter(|r| *r >= 0.0),
            scrape_error: text(obj, "scrape_error"),
        })
        .collect();

    Ok(videos)
}

fn normalize_social(body: &Value) -> Result<SocialFeed> {
    let sentiment = body.get("sentiment").and_then(Value::as_f64);

    let posts = entries(body)?
        .into_iter()
        .map(|(id, obj)| SocialPost {
            id,
            title: title(obj),
            url: text(obj, "url").unwrap_or_default(),
            upvote_ratio: obj.get("upvote_ratio").and_then(Value::as_f64).unwrap_or(0.0),
            description: text(obj, "description"),
            comments: obj.get("comments").map(normalize_comments).unwrap_or_default(),
        })
        .collect();

    Ok(SocialFeed { posts, sentiment })
}

/// Commentaires d'un post : les entrées sans texte sont ignorées
fn normalize_comments(value: &Value) -> Vec<SocialComment> {
    let Ok(comments) = entries(value) else {
        return Vec::new();
    };

    comments
        .into_iter()
        .filter_map(|(_, obj)| {
            Some(SocialComment {
                text: text(obj, "text")?,
                sentiment: text(obj, "sentiment"),
                upvotes: obj.get("upvotes").and_then(Value::as_i64).unwrap_or(0),
            })
        })
        .collect()
}

fn normalize_articles(body: &Value) -> Result<Vec<ArticleItem>> {
    let articles = entries(body)?
        .into_iter()
        .map(|(id, obj)| ArticleItem {
            id,
            title: title(obj),
            link: text(obj, "link").unwrap_or_default(),
            summary: text(obj, "summary"),
            text: text(obj, "text"),
            keywords: obj
                .get("keywords")
                .and_then(Value::as_array)
                .map(|words| {
                    words
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        })
        .collect();

    Ok(articles)
}

/// Indicators : chaque record devient un RawPoint
///
/// Tous les champs numériques sont conservés, les nulls sont ignorés.
fn normalize_indicators(body: &Value) -> Result<Vec<RawPoint>> {
    entries(body)?
        .into_iter()
        .map(|(id, obj)| {
            let timestamp = obj
                .get("timestamp")
                .context("Champ \"timestamp\" manquant")
                .and_then(parse_timestamp_value)
                .with_context(|| format!("Point d'indicateur {id} invalide"))?;

            let mut point = RawPoint::new(timestamp);
            for (name, value) in obj {
                if let Some(number) = value.as_f64() {
                    if name != "timestamp" {
                        point.fields.insert(name.clone(), number);
                    }
                }
            }
            Ok(point)
        })
        .collect()
}

fn normalize_forecast(body: &Value) -> Result<Vec<PredictedPoint>> {
    let points = entries(body)?
        .into_iter()
        .map(|(id, obj)| {
            let date = obj
                .get("date")
                .context("Champ \"date\" manquant")
                .and_then(parse_timestamp_value)
                .with_context(|| format!("Prévision {id} invalide"))?;
            let price = obj
                .get("price")
                .and_then(Value::as_f64)
                .with_context(|| format!("Prix manquant pour la prévision {id}"))?;
            Ok(PredictedPoint::new(date, price))
        })
        .collect::<Result<Vec<_>>>()?;

    if points.is_empty() {
        warn!("Forecast body contained no points");
    }

    Ok(points)
}

// ============================================================================
// Tests
// ============================================================================
