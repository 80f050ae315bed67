use anyhow::Result;

use recall_lib::commands::{self, CommandError};
use recall_lib::flashcards::ErrorKind;

use crate::app::App;
use crate::render::terminal::{
    format_time, paint, rating_label, render_stats, status_label, Color,
};
use crate::OutputFormat;

pub fn run_next(app: &App, tags: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let due = match commands::get_due_card(&app.state, App::parse_tags(tags)) {
        Ok(due) => due,
        Err(err) if matches!(err.kind, ErrorKind::NoCardsDue | ErrorKind::NoTagMatch) => {
            return print_nothing_due(&err, format, use_color);
        }
        Err(err) => return Err(err.into()),
    };

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&due)?);
        }
        OutputFormat::Plain => {
            let card = &due.card;
            println!("{}", paint(&card.front, Color::BOLD, use_color));
            println!();
            println!(
                "  {} | {} due | ID: {}",
                status_label(card.state.status, use_color),
                due.stats.due_cards,
                card.id
            );
            println!("  Rate with: recall-cli review {} <again|hard|good|easy>", card.id);
        }
    }

    Ok(())
}

fn print_nothing_due(err: &CommandError, format: &OutputFormat, use_color: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(err)?);
        }
        OutputFormat::Plain => {
            println!("{}", err.message);
            if let Some(stats) = &err.stats {
                println!();
                println!("{}", render_stats(stats, use_color));
            }
        }
    }
    Ok(())
}

pub fn run_review(
    app: &App,
    id: &str,
    rating: &str,
    answer: Option<String>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let card = commands::submit_review(&app.state, id.to_string(), App::parse_rating(rating), answer)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!(
                "{} -> due {}",
                status_label(card.state.status, use_color),
                format_time(card.state.due)
            );
        }
    }

    Ok(())
}

pub fn run_history(app: &App, id: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let reviews = commands::get_card_reviews(&app.state, id.to_string())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reviews)?);
        }
        OutputFormat::Plain => {
            if reviews.is_empty() {
                println!("No reviews yet.");
                return Ok(());
            }

            for review in &reviews {
                let answer = review
                    .answer
                    .as_deref()
                    .map(|a| format!("  \"{}\"", a))
                    .unwrap_or_default();
                println!(
                    "{}  {:<6} {:<12} {}d{}",
                    format_time(review.reviewed_at),
                    rating_label(review.rating, use_color),
                    status_label(review.status, use_color),
                    review.scheduled_days,
                    answer
                );
            }

            println!("\n{} reviews", reviews.len());
        }
    }

    Ok(())
}

pub fn run_stats(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let stats = commands::get_review_stats(&app.state)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            println!("{}", render_stats(&stats, use_color));
            println!(
                "{}",
                paint(
                    &format!("Model:         {}", app.state.reviews.model().name()),
                    Color::DIM,
                    use_color
                )
            );
        }
    }

    Ok(())
}
