// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod lane;    // Lanes, statuts et état par lane
pub mod payload; // Données normalisées par lane
pub mod series;  // Séries temporelles (historique, prévision, timeline)

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use deepcoin::models::lane::Lane;
// On peut faire : use deepcoin::models::Lane;
pub use lane::{Lane, LaneState, LaneStatus};
pub use payload::{
    Analysis, ArticleItem, LanePayload, SocialComment, SocialFeed, SocialPost, VideoItem,
};
pub use series::{
    parse_timestamp, parse_timestamp_value, PredictedPoint, RawPoint, SampledPoint, Segment,
    TimelinePoint, PRICE_FIELD,
};
