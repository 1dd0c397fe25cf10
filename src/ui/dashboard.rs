// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Découpage vertical :
//   1. Header  : sujet courant + jauge de sentiment (onglet Reddit seulement)
//   2. Tabs    : les six lanes, avec leur statut
//   3. Contenu : lane active (message d'état ou données)
//   4. Footer  : raccourcis, confirmation de quit, ou ligne de saisie
//
// CONCEPT : rendu pur
// - Lit App (UI) et LaneStore (données) par référence partagée
// - Aucune transition d'état ici : tout passe par main.rs
// ============================================================================

use chrono::{Local, NaiveDateTime};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Tabs},
    Frame,
};

use crate::analysis::{classify, SentimentLabel};
use crate::app::App;
use crate::models::{Lane, LanePayload, LaneStatus};
use crate::store::LaneStore;
use crate::ui::{chart, lanes};

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App, store: &LaneStore) {
    render_at(frame, app, store, Local::now().naive_local());
}

/// Même rendu avec une horloge explicite (tests)
pub fn render_at(frame: &mut Frame, app: &App, store: &LaneStore, now: NaiveDateTime) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Contenu
            Constraint::Length(4), // Footer
        ])
        .split(frame.size());

    render_header(frame, store, chunks[0]);
    render_tabs(frame, store, chunks[1]);
    render_lane(frame, app, store, now, chunks[2]);

    if app.is_in_input_mode() {
        render_input_footer(frame, app, chunks[3]);
    } else {
        render_footer(frame, app, store, chunks[3]);
    }
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, store: &LaneStore, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" DeepCoin ")
        .title_alignment(Alignment::Center);

    let Some(score) = store.visible_sentiment() else {
        frame.render_widget(subject_line(store).block(block), area);
        return;
    };

    // Onglet Reddit avec score : sujet à gauche, jauge à droite
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(inner);

    frame.render_widget(subject_line(store), halves[0]);

    let class = classify(score);
    let color = match class.label {
        SentimentLabel::Positive => Color::Green,
        SentimentLabel::Negative => Color::Red,
        SentimentLabel::Neutral => Color::Gray,
    };

    // CONCEPT : magnitude_percent est déjà bornée à [0, 100]
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .percent(class.magnitude_percent.round() as u16)
        .label(format!("{} sentiment ({score:+.1})", class.label));

    frame.render_widget(gauge, halves[1]);
}

fn subject_line(store: &LaneStore) -> Paragraph<'static> {
    let line = if store.has_subject() {
        Line::from(vec![
            Span::raw("Coin: "),
            Span::styled(
                store.subject().to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(Span::styled(
            "No coin selected. Press [/] to enter one",
            Style::default().fg(Color::Gray),
        ))
    };

    Paragraph::new(line)
}

// ============================================================================
// Tabs
// ============================================================================

/// Marqueur de statut accolé au nom de l'onglet
fn status_marker(status: LaneStatus) -> &'static str {
    match status {
        LaneStatus::Idle => "",
        LaneStatus::Loading => " …",
        LaneStatus::Loaded => " ✓",
        LaneStatus::Failed => " ✗",
    }
}

fn render_tabs(frame: &mut Frame, store: &LaneStore, area: Rect) {
    let titles: Vec<Line> = Lane::ALL
        .iter()
        .map(|&lane| {
            let status = store.status(lane);
            let color = match status {
                LaneStatus::Failed => Color::Red,
                LaneStatus::Loading => Color::Yellow,
                _ => Color::White,
            };
            Line::from(Span::styled(
                format!("{} {}{}", lane.index() + 1, lane.label(), status_marker(status)),
                Style::default().fg(color),
            ))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Lanes "))
        .select(store.active_lane().index())
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::REVERSED),
        )
        .divider("|");

    frame.render_widget(tabs, area);
}

// ============================================================================
// Contenu de la lane active
// ============================================================================

/// CONCEPT RUST : Match exhaustif sur (statut, payload)
/// - Chaque état de la machine a son rendu
/// - Un payload chargé est routé vers son renderer
fn render_lane(frame: &mut Frame, app: &App, store: &LaneStore, now: NaiveDateTime, area: Rect) {
    let lane = store.active_lane();
    let state = store.state(lane);
    let title = lane.label();

    match state.status() {
        LaneStatus::Idle if !store.has_subject() => {
            lanes::render_message(frame, area, title, "Enter a coin name to start the analysis", Color::Gray);
        }
        LaneStatus::Idle => {
            lanes::render_message(frame, area, title, "Not loaded yet", Color::Gray);
        }
        LaneStatus::Loading => {
            let message = format!("Loading {} for {}...", title, store.subject());
            lanes::render_message(frame, area, title, &message, Color::Yellow);
        }
        LaneStatus::Failed => {
            let message = state.error_message().unwrap_or_default();
            lanes::render_message(frame, area, title, message, Color::Red);
        }
        LaneStatus::Loaded => match state.data() {
            Some(payload) if payload.is_empty() => {
                lanes::render_message(frame, area, title, "Nothing found for this coin", Color::Gray);
            }
            Some(payload) => render_payload(frame, app, store, payload, now, area),
            None => {
                lanes::render_message(frame, area, title, "No data", Color::Gray);
            }
        },
    }
}

fn render_payload(
    frame: &mut Frame,
    app: &App,
    store: &LaneStore,
    payload: &LanePayload,
    now: NaiveDateTime,
    area: Rect,
) {
    let title = payload.lane().label();
    match payload {
        LanePayload::Summary(analysis) => {
            lanes::render_scrollable(frame, app, area, title, lanes::summary_lines(analysis));
        }
        LanePayload::Video(videos) => {
            lanes::render_scrollable(frame, app, area, title, lanes::video_lines(videos));
        }
        LanePayload::Social(feed) => {
            lanes::render_scrollable(frame, app, area, title, lanes::social_lines(feed));
        }
        LanePayload::Articles(articles) => {
            lanes::render_scrollable(frame, app, area, title, lanes::article_lines(articles));
        }
        LanePayload::Indicators(points) => {
            chart::render_indicators(frame, app, points, area);
        }
        LanePayload::Forecast(forecast) => {
            chart::render_forecast(frame, app, forecast, store.indicator_points(), now, area);
        }
    }
}

// ============================================================================
// Footer
// ============================================================================

fn key(label: &'static str) -> Span<'static> {
    Span::styled(label, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
}

fn render_footer(frame: &mut Frame, app: &App, store: &LaneStore, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let first_line = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Press ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " again to quit, any other key to cancel ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            key("[/]"),
            Span::raw(" Coin  "),
            key("[Tab ←→ h l]"),
            Span::raw(" Lane  "),
            key("[1-6]"),
            Span::raw(" Jump  "),
            key("[↑↓ j k]"),
            Span::raw(" Scroll  "),
            key("[q]"),
            Span::raw(" Quit"),
        ])
    };

    let loading = store.loading_count();
    let status_line = if loading > 0 {
        Line::from(Span::styled(
            format!("{loading} lane(s) loading"),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from("")
    };

    let paragraph = Paragraph::new(vec![first_line, status_line])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

/// Footer en mode saisie : prompt + buffer + curseur
fn render_input_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let input_line = Line::from(vec![
        Span::styled(
            app.input_prompt.as_str(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(app.input_buffer.as_str(), Style::default().fg(Color::White)),
        Span::styled(
            "█",
            Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK),
        ),
    ]);

    let help_line = Line::from(vec![
        Span::styled("[Enter]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::raw(" Analyze  "),
        Span::styled("[Esc]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw(" Cancel"),
    ]);

    let paragraph = Paragraph::new(vec![input_line, help_line])
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Tests
// ============================================================================
