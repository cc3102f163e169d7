//! One-shot chat turn from the command line.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use avinci_types::chat::{ChatTurnRequest, ImageAttachment};

use crate::state::AppState;

/// Send `text` to `agent_id` and print the persona's reply.
///
/// # Examples
///
/// ```bash
/// avinci chat agent-42 "What do you make of this checkout page?" --image checkout.png
/// ```
pub async fn send_message(
    state: &AppState,
    agent_id: String,
    text: String,
    image: Option<&Path>,
    caller: &str,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let image = match image {
        Some(path) => Some(load_image(path).await?),
        None => None,
    };

    let spinner = if json || quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.set_message(if image.is_some() {
        "Looking at the image..."
    } else {
        "Thinking..."
    });
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let request = ChatTurnRequest {
        agent_id,
        text,
        conversation_history: Vec::new(),
        image,
    };
    let result = state.chat_engine.chat_turn(request, caller).await;
    spinner.finish_and_clear();
    let response = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!();
    println!("  {}", response.message.text);
    if !quiet {
        println!();
        let model = response
            .message
            .metadata
            .as_ref()
            .map(|m| m.model.as_str())
            .unwrap_or("unknown");
        println!(
            "  {}",
            style(format!(
                "{model} · {} tokens · {} ms",
                response.tokens, response.processing_time
            ))
            .dim()
        );
    }
    println!();

    Ok(())
}

async fn load_image(path: &Path) -> Result<ImageAttachment> {
    let mime_type = mime_from_extension(path).with_context(|| {
        format!(
            "cannot tell the image type of {}; use a .png, .jpg, .gif or .webp file",
            path.display()
        )
    })?;
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(ImageAttachment::new(data, mime_type))
}

fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
