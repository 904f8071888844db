//! `chinwag history` — Inspect or clear the persisted exchange log.

use chinwag_config::AppConfig;
use chinwag_core::history::HistoryStore;
use chinwag_core::message::Role;
use chinwag_history::JsonFileStore;

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let path = config.history.effective_path();
    let store = JsonFileStore::new(&path);

    let messages = store.load().await?;
    if messages.is_empty() {
        println!("No history at {}", path.display());
        return Ok(());
    }

    println!("History: {} messages ({})", messages.len(), path.display());
    println!();
    for message in &messages {
        let who = match message.role {
            Role::User => "you",
            Role::Assistant => "chinwag",
            Role::System => "system",
        };
        println!(
            "[{}] {} > {}",
            message.timestamp.format("%Y-%m-%d %H:%M:%S"),
            who,
            message.content.display_text()
        );
    }

    Ok(())
}

pub async fn clear() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = JsonFileStore::new(config.history.effective_path())
        .with_backup_on_clear(config.history.backup_on_clear);

    // Sync the revision counter before overwriting
    store.load().await?;

    match store.clear().await? {
        Some(backup) => println!("History cleared. Backup: {}", backup.display()),
        None => println!("History cleared."),
    }

    Ok(())
}
