use anyhow::Result;

use recall_lib::commands;

use crate::app::App;
use crate::render::terminal::{
    format_tags, format_time, paint, rating_label, render_card, status_label, truncate, Color,
};
use crate::OutputFormat;

pub fn run_add(
    app: &App,
    front: String,
    back: String,
    tags: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let card = commands::create_card(&app.state, front, back, App::parse_tags(tags))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Created card: {}", paint(&truncate(&card.front, 60), Color::BOLD, use_color));
            if !card.tags.is_empty() {
                println!("  Tags: {}", format_tags(&card));
            }
            println!("  ID: {}", card.id);
        }
    }

    Ok(())
}

pub fn run_show(app: &App, id: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let card = commands::get_card(&app.state, id.to_string())?;
    let preview = commands::preview_review_intervals(&app.state, id.to_string())?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "card": card,
                "preview": preview,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", render_card(&card, use_color));
            println!();
            let options: Vec<String> = preview
                .iter()
                .map(|p| format!("{} {}", rating_label(p.rating, use_color), p.interval))
                .collect();
            println!("  Next: {}", options.join(" | "));
        }
    }

    Ok(())
}

pub fn run_edit(
    app: &App,
    id: &str,
    front: Option<String>,
    back: Option<String>,
    tags: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let card = commands::update_card(&app.state, id.to_string(), front, back, App::parse_tags(tags))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card)?);
        }
        OutputFormat::Plain => {
            println!("Updated card:\n");
            println!("{}", render_card(&card, use_color));
        }
    }

    Ok(())
}

pub fn run_rm(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    commands::delete_card(&app.state, id.to_string())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "deleted": id }));
        }
        OutputFormat::Plain => {
            println!("Deleted card {}", id);
        }
    }

    Ok(())
}

pub fn run_list(app: &App, tags: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let cards = commands::list_cards(&app.state, App::parse_tags(tags))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards found.");
                return Ok(());
            }

            for card in &cards {
                let id = card.id.to_string();
                println!(
                    "{}  {:<12} {}  {}",
                    paint(&id[..8], Color::DIM, use_color),
                    status_label(card.state.status, use_color),
                    format_time(card.state.due),
                    truncate(&card.front, 50)
                );
            }

            println!("\n{} cards", cards.len());
        }
    }

    Ok(())
}
