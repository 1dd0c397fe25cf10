// ============================================================================
// Structure : LaneOrchestrator
// ============================================================================
// Relie le LaneStore (état) au LaneFetcher (appels réseau)
//
// CONCEPTS RUST :
// 1. tokio::spawn : une tâche async par lane en vol (au plus six)
// 2. JoinHandle::abort : annulation des tâches d'un ancien sujet
// 3. mpsc unbounded : les tâches renvoient leur résultat au thread UI,
//    seul à muter le store (comme le worker et son channel de résultats)
//
// Le store reste l'unique arbitre : un résultat déjà envoyé par une tâche
// annulée trop tard est rejeté par son numéro de génération.
// ============================================================================

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::FetchError;
use crate::models::{Lane, LanePayload};
use crate::store::{FetchTicket, LaneStore};

/// Source des données d'une lane (le client HTTP en production)
///
/// CONCEPT RUST : async_trait
/// - Permet des méthodes async dans un trait utilisable via Arc<dyn ...>
/// - Send + Sync : l'implémentation est partagée entre tâches tokio
#[async_trait]
pub trait LaneFetcher: Send + Sync + 'static {
    async fn fetch(&self, lane: Lane, subject: &str) -> Result<LanePayload, FetchError>;
}

/// Résultat renvoyé par une tâche de fetch
#[derive(Debug)]
struct Completion {
    ticket: FetchTicket,
    result: Result<LanePayload, FetchError>,
}

/// Orchestration des fetchs par lane
pub struct LaneOrchestrator {
    fetcher: Arc<dyn LaneFetcher>,
    store: LaneStore,
    tasks: HashMap<Lane, JoinHandle<()>>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl LaneOrchestrator {
    pub fn new(fetcher: Arc<dyn LaneFetcher>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            fetcher,
            store: LaneStore::new(),
            tasks: HashMap::new(),
            completion_tx,
            completion_rx,
        }
    }

    /// Lecture de l'état (rendu, tests)
    pub fn store(&self) -> &LaneStore {
        &self.store
    }

    /// Nombre de tâches de fetch en vol
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Change le sujet ; annule les fetchs de l'ancien sujet
    pub fn set_subject(&mut self, subject: &str) -> bool {
        if !self.store.set_subject(subject) {
            return false;
        }

        for (lane, handle) in self.tasks.drain() {
            debug!(%lane, "Aborting fetch for previous subject");
            handle.abort();
        }
        true
    }

    /// ensureLoaded : lance le fetch de la lane si nécessaire
    ///
    /// Doit être appelé dans un contexte runtime tokio.
    /// Retourne true si un fetch a été lancé.
    pub fn ensure_loaded(&mut self, lane: Lane) -> bool {
        let Some(ticket) = self.store.begin_fetch(lane) else {
            return false;
        };

        info!(%lane, subject = %ticket.subject, "Spawning lane fetch");

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.completion_tx.clone();

        let handle = tokio::spawn(async move {
            let result = fetcher.fetch(ticket.lane, &ticket.subject).await;
            // Le receiver vit aussi longtemps que l'orchestrateur
            if tx.send(Completion { ticket, result }).is_err() {
                debug!("Orchestrator dropped before fetch completed");
            }
        });

        self.tasks.insert(lane, handle);
        true
    }

    /// Activation d'un onglet : change la vue, charge si un sujet existe
    pub fn activate(&mut self, lane: Lane) -> bool {
        self.store.set_active_lane(lane);
        self.ensure_loaded(lane)
    }

    /// Soumission du champ de saisie
    ///
    /// Entrée vide ignorée ; sinon change de sujet (si différent) puis
    /// charge la lane active. Retourne true si l'entrée a été acceptée.
    pub fn submit(&mut self, input: &str) -> bool {
        let subject = input.trim();
        if subject.is_empty() {
            debug!("Empty subject, ignoring submit");
            return false;
        }

        self.set_subject(subject);
        let lane = self.store.active_lane();
        self.ensure_loaded(lane);
        true
    }

    /// Applique les résultats arrivés, sans bloquer
    ///
    /// Retourne le nombre de résultats appliqués au store.
    pub fn drain_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Attend le prochain résultat et l'applique
    ///
    /// Retourne la lane concernée, ou None si le résultat était périmé.
    pub async fn next_completion(&mut self) -> Option<Lane> {
        let completion = self.completion_rx.recv().await?;
        let lane = completion.ticket.lane;
        self.apply(completion).then_some(lane)
    }

    fn apply(&mut self, completion: Completion) -> bool {
        let Completion { ticket, result } = completion;

        let applied = self.store.complete(&ticket, result);
        if applied {
            self.tasks.remove(&ticket.lane);
        } else {
            warn!(lane = %ticket.lane, generation = ticket.generation, "Completion ignored");
        }
        applied
    }
}

impl Drop for LaneOrchestrator {
    fn drop(&mut self) {
        for handle in self.tasks.values() {
            handle.abort();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Analysis, LaneStatus, SocialFeed};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Semaphore;

    /// Fetcher de test : compte les appels, bloque tant que la porte est fermée
    struct FakeFetcher {
        calls: AtomicUsize,
        gate: Semaphore,
        fail_lane: Option<Lane>,
    }

    impl FakeFetcher {
        fn open() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Semaphore::new(Semaphore::MAX_PERMITS),
                fail_lane: None,
            })
        }

        fn closed() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Semaphore::new(0),
                fail_lane: None,
            })
        }

        fn failing(lane: Lane) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                gate: Semaphore::new(Semaphore::MAX_PERMITS),
                fail_lane: Some(lane),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LaneFetcher for FakeFetcher {
        async fn fetch(&self, lane: Lane, subject: &str) -> Result<LanePayload, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _permit = self.gate.acquire().await.map_err(|_| FetchError::unknown())?;

            if self.fail_lane == Some(lane) {
                return Err(FetchError::Upstream("rate limited".into()));
            }

            Ok(match lane {
                Lane::Social => LanePayload::Social(SocialFeed {
                    posts: Vec::new(),
                    sentiment: Some(7.0),
                }),
                Lane::Video => LanePayload::Video(Vec::new()),
                Lane::Articles => LanePayload::Articles(Vec::new()),
                Lane::Indicators => LanePayload::Indicators(Vec::new()),
                Lane::Forecast => LanePayload::Forecast(Vec::new()),
                Lane::Summary => LanePayload::Summary(Analysis::Text(subject.to_string())),
            })
        }
    }

    fn summary_text(orchestrator: &LaneOrchestrator) -> Option<String> {
        match orchestrator.store().state(Lane::Summary).data() {
            Some(LanePayload::Summary(analysis)) => Some(analysis.as_text()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_ensure_loaded_twice_calls_once() {
        let fetcher = FakeFetcher::open();
        let mut orchestrator = LaneOrchestrator::new(fetcher.clone());
        orchestrator.set_subject("bitcoin");

        assert!(orchestrator.ensure_loaded(Lane::Summary));
        assert!(!orchestrator.ensure_loaded(Lane::Summary));
        assert_eq!(orchestrator.next_completion().await, Some(Lane::Summary));

        assert!(!orchestrator.ensure_loaded(Lane::Summary));
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(orchestrator.in_flight(), 0);
        assert_eq!(summary_text(&orchestrator).as_deref(), Some("bitcoin"));
    }

    #[tokio::test]
    async fn test_lanes_fetch_concurrently() {
        let fetcher = FakeFetcher::closed();
        let mut orchestrator = LaneOrchestrator::new(fetcher.clone());
        orchestrator.set_subject("bitcoin");

        for lane in Lane::ALL {
            assert!(orchestrator.ensure_loaded(lane));
        }
        assert_eq!(orchestrator.in_flight(), Lane::COUNT);
        assert_eq!(orchestrator.store().loading_count(), Lane::COUNT);

        fetcher.gate.add_permits(Lane::COUNT);
        for _ in Lane::ALL {
            assert!(orchestrator.next_completion().await.is_some());
        }
        for lane in Lane::ALL {
            assert_eq!(orchestrator.store().status(lane), LaneStatus::Loaded);
        }
        assert_eq!(fetcher.calls(), Lane::COUNT);
    }

    #[tokio::test]
    async fn test_subject_change_cancels_in_flight_fetch() {
        let fetcher = FakeFetcher::closed();
        let mut orchestrator = LaneOrchestrator::new(fetcher.clone());

        orchestrator.set_subject("bitcoin");
        orchestrator.ensure_loaded(Lane::Summary);
        tokio::task::yield_now().await;

        assert!(orchestrator.set_subject("ethereum"));
        assert_eq!(orchestrator.store().status(Lane::Summary), LaneStatus::Idle);
        assert_eq!(orchestrator.in_flight(), 0);

        orchestrator.ensure_loaded(Lane::Summary);
        fetcher.gate.add_permits(2);

        assert_eq!(orchestrator.next_completion().await, Some(Lane::Summary));
        assert_eq!(summary_text(&orchestrator).as_deref(), Some("ethereum"));
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_retry_refetches() {
        let fetcher = FakeFetcher::failing(Lane::Social);
        let mut orchestrator = LaneOrchestrator::new(fetcher.clone());
        orchestrator.set_subject("bitcoin");

        orchestrator.ensure_loaded(Lane::Social);
        orchestrator.ensure_loaded(Lane::Summary);
        orchestrator.next_completion().await;
        orchestrator.next_completion().await;

        let social = orchestrator.store().state(Lane::Social);
        assert_eq!(social.status(), LaneStatus::Failed);
        assert_eq!(social.error_message(), Some("rate limited"));
        assert!(orchestrator.store().state(Lane::Summary).is_loaded());
        assert_eq!(orchestrator.store().subject(), "bitcoin");

        // Réactiver la lane relance le fetch
        assert!(orchestrator.activate(Lane::Social));
        orchestrator.next_completion().await;
        assert_eq!(fetcher.calls(), 3);
    }

    #[tokio::test]
    async fn test_submit_and_activate() {
        let fetcher = FakeFetcher::open();
        let mut orchestrator = LaneOrchestrator::new(fetcher.clone());

        // Pas de sujet : l'activation ne charge rien
        assert!(!orchestrator.activate(Lane::Social));
        assert!(!orchestrator.submit("   "));
        assert_eq!(fetcher.calls(), 0);

        assert!(orchestrator.submit("  solana "));
        assert_eq!(orchestrator.store().subject(), "solana");
        orchestrator.next_completion().await;

        assert_eq!(orchestrator.store().status(Lane::Social), LaneStatus::Loaded);
        assert_eq!(orchestrator.store().visible_sentiment(), Some(7.0));

        // Même sujet re-soumis : cache conservé
        assert!(orchestrator.submit("solana"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_drain_completions_applies_ready_results() {
        let fetcher = FakeFetcher::open();
        let mut orchestrator = LaneOrchestrator::new(fetcher.clone());
        orchestrator.set_subject("bitcoin");
        orchestrator.ensure_loaded(Lane::Video);
        orchestrator.ensure_loaded(Lane::Articles);

        let mut applied = 0;
        while applied < 2 {
            tokio::task::yield_now().await;
            applied += orchestrator.drain_completions();
        }
        assert!(orchestrator.store().state(Lane::Video).is_loaded());
        assert!(orchestrator.store().state(Lane::Articles).is_loaded());
    }
}
