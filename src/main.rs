// ============================================================================
// DeepCoin - Point d'entrée
// ============================================================================
// TUI d'analyse de crypto-monnaies : un sujet, six lanes chargées à la
// demande et en parallèle depuis le service d'analyse
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : render → input → application des résultats
// 3. Async dans sync : runtime tokio multi-thread, main() reste synchrone
//    et entre dans son contexte pour pouvoir spawner les fetchs
// ============================================================================

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use deepcoin::api::AnalysisClient;
use deepcoin::app::App;
use deepcoin::config::Config;
use deepcoin::orchestrator::LaneOrchestrator;
use deepcoin::ui::{events::EventHandler, render, Event};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - stdout appartient au TUI : on log vers un fichier
// - Rotation quotidienne automatique
// ============================================================================

/// Initialise le logging vers fichier
///
/// Les logs sont écrits dans `<log_dir>/deepcoin.log.<date>`.
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/deepcoin/logs/deepcoin.log.*
/// RUST_LOG=deepcoin=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = config.log_dir.clone();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "deepcoin.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true) // Les fetchs tournent sur les workers tokio
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour deepcoin, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deepcoin=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du subscriber tracing")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

fn main() -> Result<()> {
    // Config d'abord : une erreur ici s'affiche encore dans le terminal normal
    let config = Config::from_env().context("Configuration invalide")?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {e:#}");
        eprintln!("   Continuing without logging...");
    });

    info!(api_url = %config.api_url, timeout = ?config.request_timeout, "DeepCoin starting up");

    // CONCEPT RUST : Runtime + guard
    // - Runtime::new() : runtime multi-thread (les fetchs tournent sur ses workers)
    // - enter() : tokio::spawn devient utilisable depuis ce thread synchrone
    // - Le guard doit vivre aussi longtemps que la boucle
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let _runtime_guard = runtime.enter();

    let client = AnalysisClient::from_config(&config)?;
    let mut orchestrator = LaneOrchestrator::new(Arc::new(client));
    let mut app = App::with_sample_target(config.sample_target);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &mut orchestrator, &events);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   1. Applique les résultats de fetch arrivés (non bloquant)
//   2. Dessine l'interface
//   3. Attend un événement clavier (au plus 100 ms) et le traite
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    orchestrator: &mut LaneOrchestrator,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        let applied = orchestrator.drain_completions();
        if applied > 0 {
            debug!(applied, "Applied lane completions");
        }

        terminal.draw(|frame| render(frame, app, orchestrator.store()))?;

        match events.next() {
            Ok(event) => handle_event(app, orchestrator, event),
            Err(e) => error!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement : transitions UI + actions sur les lanes
///
/// CONCEPT RUST : Pattern matching avec guards
/// - Le mode saisie est traité en premier : il capture toutes les touches
fn handle_event(app: &mut App, orchestrator: &mut LaneOrchestrator, event: Event) {
    use deepcoin::ui::events::{
        get_char_from_event, is_backspace_event, is_down_event, is_enter_event, is_escape_event,
        is_input_event, is_next_lane_event, is_previous_lane_event, is_quit_event,
        is_subject_char_event, is_up_event, lane_shortcut,
    };

    if matches!(event, Event::Tick) {
        return;
    }

    // ========================================
    // Mode saisie
    // ========================================
    if app.is_in_input_mode() {
        if is_escape_event(&event) {
            debug!("User cancelled input");
            app.cancel_input();
        } else if is_enter_event(&event) {
            let input = app.submit_input();
            if orchestrator.submit(&input) {
                info!(subject = %orchestrator.store().subject(), "User submitted subject");
                app.reset_scroll();
            } else {
                debug!("Empty subject, ignoring");
            }
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_subject_char_event(&event) {
            if let Some(c) = get_char_from_event(&event) {
                app.append_char(c);
            }
        }
        return;
    }

    // ========================================
    // Mode navigation
    // ========================================
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    // Toute autre touche annule la confirmation de quit
    app.cancel_quit();

    let current = orchestrator.store().active_lane();
    let target = if is_next_lane_event(&event) {
        Some(current.next())
    } else if is_previous_lane_event(&event) {
        Some(current.previous())
    } else {
        lane_shortcut(&event)
    };

    if let Some(lane) = target {
        debug!(%lane, "User activated lane");
        orchestrator.activate(lane);
        app.reset_scroll();
    } else if is_input_event(&event) {
        app.start_input(orchestrator.store().subject());
    } else if is_up_event(&event) {
        app.scroll_up();
    } else if is_down_event(&event) {
        app.scroll_down();
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
