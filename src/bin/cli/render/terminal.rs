use chrono::{DateTime, Local, Utc};

use recall_lib::flashcards::{Card, CardStatus, Rating, ReviewStats};

/// ANSI color codes
pub struct Color;

impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
}

pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn status_label(status: CardStatus, use_color: bool) -> String {
    let color = match status {
        CardStatus::New => Color::BLUE,
        CardStatus::Learning | CardStatus::Relearning => Color::YELLOW,
        CardStatus::Review => Color::GREEN,
    };
    paint(&status.to_string(), color, use_color)
}

pub fn rating_label(rating: Rating, use_color: bool) -> String {
    let color = match rating {
        Rating::Again => Color::RED,
        Rating::Hard => Color::YELLOW,
        Rating::Good => Color::GREEN,
        Rating::Easy => Color::CYAN,
    };
    paint(&rating.to_string(), color, use_color)
}

pub fn format_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_tags(card: &Card) -> String {
    card.tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Truncate to `max` characters with an ellipsis
pub fn truncate(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or("");
    if first_line.chars().count() <= max && !text.contains('\n') {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max.saturating_sub(1)).collect();
        format!("{}\u{2026}", cut)
    }
}

/// Multi-line card view
pub fn render_card(card: &Card, use_color: bool) -> String {
    let mut lines = vec![
        paint(&card.front, Color::BOLD, use_color),
        String::new(),
        card.back.clone(),
        String::new(),
    ];

    let state = &card.state;
    lines.push(format!(
        "  {} | due {} | reps {} | lapses {}",
        status_label(state.status, use_color),
        format_time(state.due),
        state.reps,
        state.lapses
    ));
    if state.status != CardStatus::New {
        lines.push(paint(
            &format!(
                "  stability {:.2} | difficulty {:.2} | interval {}d",
                state.stability, state.difficulty, state.scheduled_days
            ),
            Color::DIM,
            use_color,
        ));
    }
    if !card.tags.is_empty() {
        lines.push(format!("  Tags: {}", format_tags(card)));
    }
    lines.push(paint(&format!("  ID: {}", card.id), Color::DIM, use_color));
    lines.join("\n")
}

pub fn render_stats(stats: &ReviewStats, use_color: bool) -> String {
    [
        format!("Cards:         {}", stats.total_cards),
        format!(
            "Due now:       {}",
            paint(&stats.due_cards.to_string(), Color::BOLD, use_color)
        ),
        format!(
            "  new {} | learning {} | review {}",
            stats.new_cards, stats.learning_cards, stats.review_cards
        ),
        format!("Reviews today: {}", stats.reviews_today),
        format!("Retention:     {:.1}%", stats.retention_rate),
    ]
    .join("\n")
}
