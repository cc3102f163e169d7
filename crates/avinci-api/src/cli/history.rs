//! Conversation history CLI commands: show, clear.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use avinci_types::chat::ConversationTurn;

use crate::state::AppState;

/// Print the stored conversation between `caller` and `agent_id`.
pub async fn show_history(state: &AppState, agent_id: &str, caller: &str, json: bool) -> Result<()> {
    let turns = state.chat_engine.history(agent_id, caller).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "conversation": turns }))?
        );
        return Ok(());
    }

    if turns.is_empty() {
        println!();
        println!(
            "  No conversation stored for {} (caller {}).",
            style(agent_id).cyan(),
            style(caller).dim()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("{}", render_table(&turns));
    println!();
    Ok(())
}

fn render_table(turns: &[ConversationTurn]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("From").fg(Color::White),
        Cell::new("Message").fg(Color::White),
        Cell::new("Model").fg(Color::White),
    ]);

    for turn in turns {
        let from = if turn.is_user {
            Cell::new("you").fg(Color::Green)
        } else {
            Cell::new("agent").fg(Color::Cyan)
        };
        let model = turn
            .metadata
            .as_ref()
            .map(|m| m.model.clone())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(turn.timestamp.format("%H:%M:%S").to_string()).fg(Color::DarkGrey),
            from,
            Cell::new(&turn.text),
            Cell::new(model).fg(Color::DarkGrey),
        ]);
    }

    table
}

/// Drop the stored conversation between `caller` and `agent_id`.
pub async fn clear_history(
    state: &AppState,
    agent_id: &str,
    caller: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Clear the conversation with '{}'?",
                style(agent_id).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.chat_engine.clear_history(agent_id, caller).await?;

    if json {
        println!("{}", serde_json::json!({ "success": true }));
        return Ok(());
    }

    println!();
    println!("  {} Conversation cleared.", style("✓").green().bold());
    println!();
    Ok(())
}
