// ============================================================================
// Chart - Lanes graphiques (Technical Indicators, Prediction)
// ============================================================================
// Indicators : valeurs courantes, prix avec SMA/EMA, RSI, MACD et volume
//              sur la série échantillonnée ; répartition hausse / baisse
//              sur la série brute complète
// Prediction : synthèse + timeline fusionnée historique / prévision,
//              deux datasets qui se rejoignent au point de jonction
//
// CONCEPTS RATATUI :
// 1. Chart widget : plusieurs Dataset sur les mêmes axes
// 2. Axis : bornes + labels
// 3. x = index du point : les dates ne sont que des labels
// ============================================================================

use chrono::NaiveDateTime;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, Gauge, GraphType, Paragraph},
    Frame,
};

use crate::analysis::stats::fields;
use crate::analysis::{
    forecast_timeline, sample, ForecastSummary, IndicatorSnapshot, MergedTimeline, ReturnDistribution,
};
use crate::app::App;
use crate::models::{PredictedPoint, RawPoint, PRICE_FIELD};
use crate::ui::lanes::render_message;

const DATE_LABEL: &str = "%Y-%m-%d";

// ============================================================================
// Helpers purs : séries → points (x, y)
// ============================================================================

/// Points (index, valeur) d'un champ ; les points sans valeur sont sautés
pub fn field_points(points: &[RawPoint], field: &str) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.field(field).map(|v| (i as f64, v)))
        .collect()
}

/// Points (index, valeur) d'une série alignée de la timeline
pub fn series_points(values: &[Option<f64>]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect()
}

/// Bornes Y communes à plusieurs séries, avec 5% de marge
///
/// CONCEPT RUST : fold() pour min/max en une passe
pub fn y_bounds<S: AsRef<[(f64, f64)]>>(series: &[S]) -> Option<(f64, f64)> {
    let (min, max) = series
        .iter()
        .flat_map(|s| s.as_ref().iter())
        .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| (min.min(y), max.max(y)));

    if min > max {
        return None;
    }

    // Série plate : marge arbitraire pour garder une hauteur non nulle
    let margin = if max > min { (max - min) * 0.05 } else { max.abs().max(1.0) * 0.05 };
    Some((min - margin, max + margin))
}

fn x_upper(len: usize) -> f64 {
    len.saturating_sub(1).max(1) as f64
}

fn price_label(value: f64) -> String {
    if value.abs() >= 100.0 {
        format!("${value:.0}")
    } else {
        format!("${value:.4}")
    }
}

fn date_labels(first: NaiveDateTime, middle: Option<NaiveDateTime>, last: NaiveDateTime) -> Vec<Span<'static>> {
    vec![
        Span::raw(first.format(DATE_LABEL).to_string()),
        Span::raw(middle.map(|d| d.format(DATE_LABEL).to_string()).unwrap_or_default()),
        Span::raw(last.format(DATE_LABEL).to_string()),
    ]
}

/// Grand nombre abrégé : 1.25B, 3.4M, 12.0K
fn compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{value:.0}")
    }
}

fn optional(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| "N/A".to_string())
}

// ============================================================================
// Lane Technical Indicators
// ============================================================================

/// Dessine la lane Indicators à partir des points bruts
pub fn render_indicators(frame: &mut Frame, app: &App, points: &[RawPoint], area: Rect) {
    let Some(snapshot) = IndicatorSnapshot::from_latest(points) else {
        render_message(frame, area, "Technical Indicators", "No indicator data", Color::Gray);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),      // Valeurs courantes
            Constraint::Percentage(40), // Prix + moyennes mobiles
            Constraint::Percentage(30), // RSI | MACD
            Constraint::Min(6),         // Volume | hausse / baisse
        ])
        .split(area);

    let halves = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(row)
    };
    let oscillators = halves(chunks[2]);
    let activity = halves(chunks[3]);

    render_snapshot(frame, &snapshot, chunks[0]);

    let sampled = sample(points, app.sample_target);
    render_price_chart(frame, &sampled, chunks[1]);
    render_rsi_chart(frame, &sampled, oscillators[0]);
    render_macd_chart(frame, &sampled, oscillators[1]);
    render_volume_chart(frame, &sampled, activity[0]);

    // Sur la série brute : l'échantillon fausserait le décompte
    render_return_distribution(frame, &ReturnDistribution::from_points(points), activity[1]);
}

fn render_snapshot(frame: &mut Frame, snapshot: &IndicatorSnapshot, area: Rect) {
    let change_color = match snapshot.percent_change_24h {
        Some(c) if c >= 0.0 => Color::Green,
        Some(_) => Color::Red,
        None => Color::Gray,
    };

    let rsi_zone = snapshot.rsi_zone().unwrap_or("N/A");

    let lines = vec![
        Line::from(vec![
            Span::raw("Price: "),
            Span::styled(
                snapshot.price.map(price_label).unwrap_or_else(|| "N/A".into()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  24h: "),
            Span::styled(
                format!("{}%", optional(snapshot.percent_change_24h, 2)),
                Style::default().fg(change_color),
            ),
            Span::raw(format!(
                "  Market cap: {}  Volume 24h: {}",
                optional(snapshot.market_cap, 0),
                optional(snapshot.volume_24h, 0)
            )),
        ]),
        Line::from(format!(
            "RSI: {} ({rsi_zone})  MACD: {}  Signal: {}  SMA20/50: {} / {}  EMA20/50: {} / {}",
            optional(snapshot.rsi, 1),
            optional(snapshot.macd, 2),
            optional(snapshot.macd_signal, 2),
            optional(snapshot.sma_20, 2),
            optional(snapshot.sma_50, 2),
            optional(snapshot.ema_20, 2),
            optional(snapshot.ema_50, 2),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Latest · {} ", snapshot.timestamp.format("%Y-%m-%d %H:%M")));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_price_chart(frame: &mut Frame, sampled: &[RawPoint], area: Rect) {
    let price = field_points(sampled, PRICE_FIELD);
    let sma_20 = field_points(sampled, fields::SMA_20);
    let sma_50 = field_points(sampled, fields::SMA_50);
    let ema_20 = field_points(sampled, fields::EMA_20);
    let ema_50 = field_points(sampled, fields::EMA_50);

    let Some((y_min, y_max)) = y_bounds(&[&price, &sma_20, &sma_50, &ema_20, &ema_50]) else {
        render_message(frame, area, "Price", "No price data", Color::Gray);
        return;
    };

    let overlays = [
        ("SMA 20", &sma_20, Color::Yellow),
        ("SMA 50", &sma_50, Color::Magenta),
        ("EMA 20", &ema_20, Color::LightBlue),
        ("EMA 50", &ema_50, Color::LightRed),
    ];

    let mut datasets = vec![Dataset::default()
        .name("Price")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&price)];

    for (name, data, color) in overlays {
        if !data.is_empty() {
            datasets.push(
                Dataset::default()
                    .name(name)
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(color))
                    .data(data),
            );
        }
    }

    let (Some(first), Some(last)) = (sampled.first(), sampled.last()) else {
        return;
    };

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_upper(sampled.len())])
        .labels(date_labels(first.timestamp, None, last.timestamp));

    let y_axis = Axis::default()
        .title("Price ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(price_label(y_min)),
            Span::raw(price_label((y_min + y_max) / 2.0)),
            Span::raw(price_label(y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Price · {} samples ", sampled.len())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

fn render_rsi_chart(frame: &mut Frame, sampled: &[RawPoint], area: Rect) {
    let rsi = field_points(sampled, fields::RSI);
    if rsi.is_empty() {
        render_message(frame, area, "RSI", "No RSI data", Color::Gray);
        return;
    }

    // Lignes de repère 30 / 70
    let upper = x_upper(sampled.len());
    let overbought = [(0.0, 70.0), (upper, 70.0)];
    let oversold = [(0.0, 30.0), (upper, 30.0)];

    let datasets = vec![
        Dataset::default()
            .name("RSI")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&rsi),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&overbought),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&oversold),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" RSI "))
        .x_axis(Axis::default().bounds([0.0, upper]))
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, 100.0])
                .labels(vec![Span::raw("0"), Span::raw("50"), Span::raw("100")]),
        );

    frame.render_widget(chart, area);
}

fn render_macd_chart(frame: &mut Frame, sampled: &[RawPoint], area: Rect) {
    let macd = field_points(sampled, fields::MACD);
    let signal = field_points(sampled, fields::MACD_SIGNAL);

    let Some((y_min, y_max)) = y_bounds(&[&macd, &signal]) else {
        render_message(frame, area, "MACD", "No MACD data", Color::Gray);
        return;
    };

    let datasets = vec![
        Dataset::default()
            .name("MACD")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::LightBlue))
            .data(&macd),
        Dataset::default()
            .name("Signal")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::LightRed))
            .data(&signal),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" MACD "))
        .x_axis(Axis::default().bounds([0.0, x_upper(sampled.len())]))
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format!("{y_min:.2}")),
                    Span::raw(format!("{y_max:.2}")),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Volume 24h en barres verticales
fn render_volume_chart(frame: &mut Frame, sampled: &[RawPoint], area: Rect) {
    let volume = field_points(sampled, fields::VOLUME_24H);

    let Some((_, y_max)) = y_bounds(&[&volume]) else {
        render_message(frame, area, "Volume (24h)", "No volume data", Color::Gray);
        return;
    };

    let datasets = vec![Dataset::default()
        .marker(symbols::Marker::HalfBlock)
        .graph_type(GraphType::Bar)
        .style(Style::default().fg(Color::Blue))
        .data(&volume)];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Volume (24h) "))
        .x_axis(Axis::default().bounds([0.0, x_upper(sampled.len())]))
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(vec![Span::raw("0"), Span::raw(compact(y_max))]),
        );

    frame.render_widget(chart, area);
}

/// Jours de hausse / baisse : compteurs + jauge de la part de hausse
fn render_return_distribution(frame: &mut Frame, distribution: &ReturnDistribution, area: Rect) {
    let (Some(positive), Some(negative)) =
        (distribution.positive_percent(), distribution.negative_percent())
    else {
        render_message(frame, area, "Daily returns", "Not enough price data", Color::Gray);
        return;
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Daily returns · {} days ", distribution.total()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(1)])
        .split(inner);

    let counts = vec![
        Line::from(Span::styled(
            format!("Positive days: {} ({positive:.1}%)", distribution.positive_days),
            Style::default().fg(Color::Green),
        )),
        Line::from(Span::styled(
            format!("Negative days: {} ({negative:.1}%)", distribution.negative_days),
            Style::default().fg(Color::Red),
        )),
    ];
    frame.render_widget(Paragraph::new(counts), rows[0]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Red))
        .percent(positive.round().clamp(0.0, 100.0) as u16)
        .label("");
    frame.render_widget(gauge, rows[1]);
}

// ============================================================================
// Lane Prediction
// ============================================================================

/// Dessine la lane Prediction
///
/// L'historique vient de la lane Indicators si elle est chargée ; sinon
/// seule la prévision est tracée.
pub fn render_forecast(
    frame: &mut Frame,
    app: &App,
    forecast: &[PredictedPoint],
    history: Option<&[RawPoint]>,
    now: NaiveDateTime,
    area: Rect,
) {
    let Some(summary) = ForecastSummary::compute(forecast, history, now) else {
        render_message(frame, area, "Prediction", "No prediction data", Color::Gray);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    render_forecast_summary(frame, &summary, history.is_some(), chunks[0]);

    let timeline = forecast_timeline(history, forecast, now, app.sample_target);
    render_timeline(frame, &timeline, chunks[1]);
}

fn render_forecast_summary(frame: &mut Frame, summary: &ForecastSummary, has_history: bool, area: Rect) {
    let growth_color = if summary.potential_growth_percent >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };

    let mut lines = vec![Line::from(vec![
        Span::raw("Current: "),
        Span::styled(price_label(summary.current_price), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "  Highest: {}  Average: {}  Potential growth: ",
            price_label(summary.highest_prediction),
            price_label(summary.average_prediction)
        )),
        Span::styled(
            format!("{:+.2}%", summary.potential_growth_percent),
            Style::default().fg(growth_color).add_modifier(Modifier::BOLD),
        ),
    ])];

    let history_note = if has_history {
        ""
    } else {
        "  (open Technical Indicators to overlay history)"
    };
    lines.push(Line::from(Span::styled(
        format!("Future predictions: {}{history_note}", summary.future_predictions),
        Style::default().fg(Color::Gray),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Forecast summary ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_timeline(frame: &mut Frame, timeline: &MergedTimeline, area: Rect) {
    let historical = series_points(&timeline.historical);
    let predicted = series_points(&timeline.predicted);

    let Some((y_min, y_max)) = y_bounds(&[&historical, &predicted]) else {
        render_message(frame, area, "Prediction", "No points to plot", Color::Gray);
        return;
    };

    let datasets = vec![
        Dataset::default()
            .name("Historical")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&historical),
        Dataset::default()
            .name("Predicted")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Magenta))
            .data(&predicted),
    ];

    let (Some(first), Some(last)) = (timeline.points.first(), timeline.points.last()) else {
        return;
    };
    let split_date = timeline
        .split_index
        .and_then(|i| timeline.points.get(i))
        .map(|p| p.date);

    let x_axis = Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, x_upper(timeline.len())])
        .labels(date_labels(first.date, split_date, last.date));

    let y_axis = Axis::default()
        .title("Price ($)")
        .style(Style::default().fg(Color::Gray))
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(price_label(y_min)),
            Span::raw(price_label((y_min + y_max) / 2.0)),
            Span::raw(price_label(y_max)),
        ]);

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Price forecast · {} points ", timeline.len())),
        )
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_field_points_skip_missing_values() {
        let points = vec![
            RawPoint::new(day(1)).with_field(fields::RSI, 40.0),
            RawPoint::new(day(2)),
            RawPoint::new(day(3)).with_field(fields::RSI, 60.0),
        ];
        assert_eq!(field_points(&points, fields::RSI), vec![(0.0, 40.0), (2.0, 60.0)]);
    }

    #[test]
    fn test_series_points_keep_timeline_index() {
        let values = [None, None, Some(3.0), Some(4.0)];
        assert_eq!(series_points(&values), vec![(2.0, 3.0), (3.0, 4.0)]);
    }

    #[test]
    fn test_y_bounds_with_margin() {
        let a = vec![(0.0, 100.0), (1.0, 200.0)];
        let b = vec![(0.0, 150.0)];
        let (min, max) = y_bounds(&[a, b]).unwrap();
        assert!((min - 95.0).abs() < 1e-9);
        assert!((max - 205.0).abs() < 1e-9);
    }

    #[test]
    fn test_y_bounds_flat_and_empty() {
        let flat = vec![(0.0, 10.0), (1.0, 10.0)];
        let (min, max) = y_bounds(&[flat]).unwrap();
        assert!(min < 10.0 && max > 10.0);

        let empty: Vec<(f64, f64)> = Vec::new();
        assert_eq!(y_bounds(&[empty]), None);
    }

    #[test]
    fn test_compact_volume_labels() {
        assert_eq!(compact(2_345_000_000.0), "2.35B");
        assert_eq!(compact(4_500_000.0), "4.5M");
        assert_eq!(compact(12_000.0), "12.0K");
        assert_eq!(compact(42.0), "42");
    }

    #[test]
    fn test_price_label_precision() {
        assert_eq!(price_label(64250.4), "$64250");
        assert_eq!(price_label(0.12345), "$0.1235");
    }
}
