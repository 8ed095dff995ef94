//! The `flashdeck info` command.

use std::path::PathBuf;

use anyhow::Result;

use super::Session;

pub async fn execute(
    deck: String,
    format: String,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let key = session.deck_key(&deck)?;

    let info = session.service.deck_info(&session.caller, &key).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&info)?),
        _ => {
            println!("Deck: {}/{}", info.owner, info.name);
            println!(
                "Visibility: {}",
                if info.public { "public" } else { "private" }
            );
            println!("Cards: {}", info.card_count);
            if !info.color.is_empty() {
                println!("Color: {}", info.color);
            }
            if !info.description.trim().is_empty() {
                println!("Description: {}", info.description.trim());
            }
        }
    }
    Ok(())
}
