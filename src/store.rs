// ============================================================================
// Structure : LaneStore
// ============================================================================
// Cache + suivi de statut par lane, scopé au sujet courant
//
// PATTERN : explicit owned store
// - Une instance possède le sujet et les six LaneState
// - Toutes les transitions passent par ses méthodes
// - Aucun état global : les tests construisent autant d'instances que voulu
//
// CONCEPT : tickets de fetch
// - begin_fetch() passe la lane en Loading et rend un FetchTicket
// - complete() applique le résultat seulement si le ticket correspond
//   encore au sujet courant (compteur de génération)
// - Une réponse tardive pour un ancien sujet est ignorée
// ============================================================================

use tracing::{debug, info, warn};

use crate::api::FetchError;
use crate::models::{Lane, LanePayload, LaneState, LaneStatus, RawPoint};

/// Autorisation de lancer UN fetch pour une lane et un sujet donnés
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub lane: Lane,
    pub subject: String,
    pub generation: u64,
}

/// État de toutes les lanes pour le sujet courant
#[derive(Debug, Clone, Default)]
pub struct LaneStore {
    subject: String,

    /// Incrémenté à chaque changement de sujet
    generation: u64,

    /// Une entrée par lane, indexée par Lane::index()
    lanes: [LaneState; Lane::COUNT],

    /// Lane actuellement affichée
    active_lane: Lane,

    /// Dernier score publié par la lane Social pour ce sujet
    social_sentiment: Option<f64>,
}

impl LaneStore {
    /// Store vide : pas de sujet, toutes les lanes Idle, onglet Summary
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn has_subject(&self) -> bool {
        !self.subject.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Change le sujet analysé
    ///
    /// Si le sujet change, toutes les lanes repartent de Idle et le score
    /// de sentiment est oublié. Retourne true si le sujet a changé.
    pub fn set_subject(&mut self, subject: impl Into<String>) -> bool {
        let subject = subject.into();
        if subject == self.subject {
            return false;
        }

        info!(from = %self.subject, to = %subject, "Subject changed, resetting lanes");
        self.subject = subject;
        self.generation += 1;
        self.lanes = Default::default();
        self.social_sentiment = None;
        true
    }

    /// Lecture pure de l'état d'une lane
    pub fn state(&self, lane: Lane) -> &LaneState {
        &self.lanes[lane.index()]
    }

    pub fn status(&self, lane: Lane) -> LaneStatus {
        self.state(lane).status()
    }

    /// Partie synchrone de ensureLoaded
    ///
    /// - Loaded  : cache hit, rien à faire
    /// - Loading : un fetch est déjà en vol, rien à faire
    /// - Idle / Failed : passe en Loading (erreur effacée) et rend un ticket
    ///
    /// Sans sujet, aucune lane n'est chargée.
    pub fn begin_fetch(&mut self, lane: Lane) -> Option<FetchTicket> {
        if !self.has_subject() {
            debug!(%lane, "No subject yet, skipping fetch");
            return None;
        }

        match self.status(lane) {
            LaneStatus::Loaded => {
                debug!(%lane, "Lane cached, skipping fetch");
                None
            }
            LaneStatus::Loading => {
                debug!(%lane, "Lane already loading, skipping fetch");
                None
            }
            LaneStatus::Idle | LaneStatus::Failed => {
                self.lanes[lane.index()] = LaneState::loading();
                debug!(%lane, subject = %self.subject, generation = self.generation, "Lane loading");
                Some(FetchTicket {
                    lane,
                    subject: self.subject.clone(),
                    generation: self.generation,
                })
            }
        }
    }

    /// Applique le résultat d'un fetch
    ///
    /// Retourne false (et ne touche à rien) si le ticket date d'un ancien
    /// sujet ou si la lane n'attend plus de résultat.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<LanePayload, FetchError>,
    ) -> bool {
        if ticket.generation != self.generation {
            warn!(
                lane = %ticket.lane,
                stale_subject = %ticket.subject,
                subject = %self.subject,
                "Discarding response for a previous subject"
            );
            return false;
        }

        if !self.state(ticket.lane).is_loading() {
            warn!(lane = %ticket.lane, "Discarding response for a lane that is not loading");
            return false;
        }

        let lane = ticket.lane;
        self.lanes[lane.index()] = match result {
            Ok(payload) if payload.lane() != lane => {
                warn!(%lane, got = %payload.lane(), "Payload does not belong to lane");
                LaneState::failed(FetchError::unknown().to_string())
            }
            Ok(payload) => {
                if let Some(score) = payload.sentiment() {
                    debug!(score, "Storing social sentiment");
                    self.social_sentiment = Some(score);
                }
                info!(%lane, items = payload.len(), "Lane loaded");
                LaneState::loaded(payload)
            }
            Err(e) => {
                warn!(%lane, error = %e, "Lane failed");
                LaneState::failed(e.to_string())
            }
        };

        true
    }

    pub fn active_lane(&self) -> Lane {
        self.active_lane
    }

    /// Change la vue active (ne charge rien : voir LaneOrchestrator::activate)
    pub fn set_active_lane(&mut self, lane: Lane) {
        self.active_lane = lane;
    }

    /// Score de sentiment visible : seulement quand Social est affichée
    ///
    /// Le score n'est pas détruit en quittant l'onglet, il est juste masqué.
    pub fn visible_sentiment(&self) -> Option<f64> {
        match self.active_lane {
            Lane::Social => self.social_sentiment,
            _ => None,
        }
    }

    /// Données brutes de la lane Indicators, si chargée
    pub fn indicator_points(&self) -> Option<&[RawPoint]> {
        match self.state(Lane::Indicators).data() {
            Some(LanePayload::Indicators(points)) => Some(points.as_slice()),
            _ => None,
        }
    }

    /// Nombre de lanes en cours de chargement
    pub fn loading_count(&self) -> usize {
        self.lanes.iter().filter(|s| s.is_loading()).count()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Analysis, SocialFeed};

    fn summary(text: &str) -> LanePayload {
        LanePayload::Summary(Analysis::Text(text.to_string()))
    }

    fn social(score: f64) -> LanePayload {
        LanePayload::Social(SocialFeed {
            posts: Vec::new(),
            sentiment: Some(score),
        })
    }

    #[test]
    fn test_new_store_is_idle() {
        let store = LaneStore::new();
        assert!(!store.has_subject());
        assert_eq!(store.active_lane(), Lane::Summary);
        for lane in Lane::ALL {
            assert_eq!(store.status(lane), LaneStatus::Idle);
        }
    }

    #[test]
    fn test_no_fetch_without_subject() {
        let mut store = LaneStore::new();
        assert!(store.begin_fetch(Lane::Summary).is_none());
        assert_eq!(store.status(Lane::Summary), LaneStatus::Idle);
    }

    #[test]
    fn test_loading_is_exclusive_and_loaded_is_cached() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");

        let ticket = store.begin_fetch(Lane::Summary).unwrap();
        assert_eq!(store.status(Lane::Summary), LaneStatus::Loading);
        assert!(store.begin_fetch(Lane::Summary).is_none());

        assert!(store.complete(&ticket, Ok(summary("ok"))));
        assert_eq!(store.status(Lane::Summary), LaneStatus::Loaded);
        assert!(store.begin_fetch(Lane::Summary).is_none());
    }

    #[test]
    fn test_lanes_are_independent() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");

        let summary_ticket = store.begin_fetch(Lane::Summary).unwrap();
        let video_ticket = store.begin_fetch(Lane::Video).unwrap();
        assert_eq!(store.loading_count(), 2);

        store.complete(&video_ticket, Err(FetchError::Transport { status: 500 }));
        assert_eq!(store.status(Lane::Video), LaneStatus::Failed);
        assert_eq!(store.status(Lane::Summary), LaneStatus::Loading);
        assert_eq!(store.subject(), "bitcoin");

        store.complete(&summary_ticket, Ok(summary("fine")));
        assert_eq!(store.status(Lane::Summary), LaneStatus::Loaded);
        assert_eq!(store.status(Lane::Video), LaneStatus::Failed);
    }

    #[test]
    fn test_upstream_failure_then_retry() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");

        let ticket = store.begin_fetch(Lane::Social).unwrap();
        store.complete(&ticket, Err(FetchError::Upstream("rate limited".into())));

        let state = store.state(Lane::Social);
        assert_eq!(state.status(), LaneStatus::Failed);
        assert_eq!(state.error_message(), Some("rate limited"));
        assert!(state.data().is_none());

        // Réactiver une lane en échec relance le fetch et efface l'erreur
        let retry = store.begin_fetch(Lane::Social).unwrap();
        assert!(store.state(Lane::Social).error_message().is_none());
        store.complete(&retry, Ok(social(2.0)));
        assert!(store.state(Lane::Social).is_loaded());
    }

    #[test]
    fn test_subject_change_resets_every_lane() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");
        for lane in Lane::ALL {
            let ticket = store.begin_fetch(lane).unwrap();
            store.complete(&ticket, Err(FetchError::unknown()));
        }
        let ticket = store.begin_fetch(Lane::Summary).unwrap();
        store.complete(&ticket, Ok(summary("btc")));

        assert!(store.set_subject("ethereum"));
        for lane in Lane::ALL {
            let state = store.state(lane);
            assert_eq!(state.status(), LaneStatus::Idle);
            assert!(state.data().is_none());
            assert!(state.error_message().is_none());
        }
    }

    #[test]
    fn test_same_subject_is_noop() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");
        let ticket = store.begin_fetch(Lane::Summary).unwrap();
        store.complete(&ticket, Ok(summary("btc")));

        assert!(!store.set_subject("bitcoin"));
        assert!(store.state(Lane::Summary).is_loaded());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");
        let stale = store.begin_fetch(Lane::Summary).unwrap();

        store.set_subject("ethereum");
        let fresh = store.begin_fetch(Lane::Summary).unwrap();

        assert!(!store.complete(&stale, Ok(summary("btc"))));
        assert!(store.state(Lane::Summary).is_loading());

        assert!(store.complete(&fresh, Ok(summary("eth"))));
        assert_eq!(
            store.state(Lane::Summary).data(),
            Some(&summary("eth"))
        );
    }

    #[test]
    fn test_sentiment_visible_only_on_social() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");
        let ticket = store.begin_fetch(Lane::Social).unwrap();
        store.complete(&ticket, Ok(social(-4.0)));

        assert_eq!(store.visible_sentiment(), None);

        store.set_active_lane(Lane::Social);
        assert_eq!(store.visible_sentiment(), Some(-4.0));

        store.set_active_lane(Lane::Articles);
        assert_eq!(store.visible_sentiment(), None);

        store.set_active_lane(Lane::Social);
        assert_eq!(store.visible_sentiment(), Some(-4.0));

        store.set_subject("ethereum");
        assert_eq!(store.visible_sentiment(), None);
    }

    #[test]
    fn test_mismatched_payload_fails_lane() {
        let mut store = LaneStore::new();
        store.set_subject("bitcoin");
        let ticket = store.begin_fetch(Lane::Forecast).unwrap();
        store.complete(&ticket, Ok(summary("wrong lane")));
        assert_eq!(store.status(Lane::Forecast), LaneStatus::Failed);
    }
}
