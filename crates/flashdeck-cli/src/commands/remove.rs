//! The `flashdeck remove` command.

use std::path::PathBuf;

use anyhow::Result;

use super::Session;

pub async fn execute(
    deck: String,
    config_path: Option<PathBuf>,
    user: Option<String>,
) -> Result<()> {
    let session = Session::open(config_path, user)?;
    let key = session.deck_key(&deck)?;
    session.service.remove_deck(&session.caller, &key).await?;
    println!("Removed deck {key}");
    Ok(())
}
