// ============================================================================
// Lanes textuelles : Summary, Youtube, Reddit, Articles
// ============================================================================
// Chaque lane chargée est convertie en Vec<Line> puis affichée dans un
// Paragraph défilant (app.scroll). Les builders de lignes sont purs :
// testables sans terminal.
// ============================================================================

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::models::{Analysis, ArticleItem, SocialFeed, VideoItem};

/// Nombre max de caractères d'un texte long (transcript, article)
const EXCERPT_CHARS: usize = 400;

/// Commentaires affichés par post
const COMMENTS_PER_POST: usize = 3;

/// Affiche des lignes dans un bloc titré, avec défilement
pub fn render_scrollable(frame: &mut Frame, app: &App, area: Rect, title: &str, lines: Vec<Line<'static>>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {title} "));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.scroll, 0));

    frame.render_widget(paragraph, area);
}

/// Message centré (chargement, erreur, vide)
pub fn render_message(frame: &mut Frame, area: Rect, title: &str, message: &str, color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(format!(" {title} "));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(color))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Builders de lignes
// ============================================================================

fn heading(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn link(url: &str) -> Line<'static> {
    Line::from(Span::styled(
        url.to_string(),
        Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
    ))
}

fn dim(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(Color::Gray)))
}

/// Tronque sur une frontière de caractère, avec "…" si coupé
fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Texte de synthèse, affiché tel quel ligne par ligne
pub fn summary_lines(analysis: &Analysis) -> Vec<Line<'static>> {
    analysis
        .as_text()
        .lines()
        .map(|line| Line::from(line.to_string()))
        .collect()
}

pub fn video_lines(videos: &[VideoItem]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, video) in videos.iter().enumerate() {
        lines.push(heading(format!("{}. {}", i + 1, video.title)));
        lines.push(link(&video.url));

        let retention = video
            .average_retention
            .map(|r| format!("{r:.1}%"))
            .unwrap_or_else(|| "unknown".to_string());
        lines.push(dim(format!("Average retention: {retention}")));

        if let Some(error) = &video.scrape_error {
            lines.push(Line::from(Span::styled(
                format!("Scrape error: {error}"),
                Style::default().fg(Color::Red),
            )));
        }
        if let Some(description) = &video.description {
            lines.push(Line::from(excerpt(description, EXCERPT_CHARS)));
        }
        if let Some(transcript) = &video.transcript {
            lines.push(dim(format!("Transcript: {}", excerpt(transcript, EXCERPT_CHARS))));
        }
        lines.push(Line::from(""));
    }

    lines
}

pub fn social_lines(feed: &SocialFeed) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, post) in feed.posts.iter().enumerate() {
        lines.push(heading(format!("{}. {}", i + 1, post.title)));
        lines.push(link(&post.url));
        lines.push(dim(format!(
            "Upvote ratio: {:.0}%  ·  {} comments",
            post.upvote_ratio * 100.0,
            post.comments.len()
        )));

        if let Some(description) = &post.description {
            lines.push(Line::from(excerpt(description, EXCERPT_CHARS)));
        }

        for comment in post.comments.iter().take(COMMENTS_PER_POST) {
            let color = match comment.sentiment.as_deref() {
                Some("Positive") => Color::Green,
                Some("Negative") => Color::Red,
                _ => Color::Gray,
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  [{:+}] ", comment.upvotes),
                    Style::default().fg(color),
                ),
                Span::raw(excerpt(&comment.text, EXCERPT_CHARS / 2)),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines
}

pub fn article_lines(articles: &[ArticleItem]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (i, article) in articles.iter().enumerate() {
        lines.push(heading(format!("{}. {}", i + 1, article.title)));
        lines.push(link(&article.link));

        if !article.keywords.is_empty() {
            lines.push(dim(format!("Keywords: {}", article.keywords.join(", "))));
        }

        let body = article.summary.as_deref().or(article.text.as_deref());
        if let Some(body) = body {
            lines.push(Line::from(excerpt(body, EXCERPT_CHARS)));
        }
        lines.push(Line::from(""));
    }

    lines
}

// ============================================================================
// Tests
// ============================================================================
