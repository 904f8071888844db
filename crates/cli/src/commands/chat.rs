//! `chinwag chat` — Interactive or single-message chat mode.

use chinwag_config::AppConfig;
use chinwag_core::attachment::UploadedFile;
use chinwag_history::JsonFileStore;
use chinwag_ingest::IngestPolicy;
use chinwag_providers::OpenAiCompatProvider;
use chinwag_session::{ChatSession, WindowPolicy};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(
    message: Option<String>,
    attach: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    CHINWAG_API_KEY = 'sk-...'   (generic)");
        eprintln!("    OPENAI_API_KEY  = 'sk-...'   (for OpenAI direct)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    // Optional password gate, one prompt per process
    if let Some(expected) = &config.app_password {
        print!("  Password: ");
        std::io::stdout().flush()?;
        let mut entered = String::new();
        std::io::stdin().read_line(&mut entered)?;
        if entered.trim_end_matches(['\r', '\n']) != expected {
            return Err("Incorrect password.".into());
        }
    }

    let mut session = build_session(&config, &api_key).await?;

    // Normalize attachment paths into uploads up front
    let uploads = read_uploads(&attach).await?;

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let result = session.turn(&msg, &uploads).await;
        eprint!("\r              \r");
        let reply = result?;
        println!("{reply}");
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Chinwag — Interactive Chat");
    println!("  Model:       {}", config.default_model);
    println!("  History:     {} messages loaded", session.messages().len());
    if !uploads.is_empty() {
        println!("  Attachments: {} (sent with your first message)", uploads.len());
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' to quit, 'clear' to reset the history.");
    println!();

    let stdin = std::io::stdin();
    let mut first_turn = true;
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" {
            break;
        }
        if line == "clear" {
            match session.reset().await {
                Ok(Some(backup)) => println!("  History cleared (backup: {})", backup.display()),
                Ok(None) => println!("  History cleared."),
                Err(e) => eprintln!("  Failed to clear history: {e}"),
            }
            continue;
        }

        let turn_uploads = if first_turn { uploads.as_slice() } else { &[] };
        first_turn = false;

        eprint!("  ...");
        let result = session.turn(line, turn_uploads).await;
        eprint!("\r    \r");

        match result {
            Ok(reply) => println!("  Chinwag > {reply}\n"),
            Err(e) => eprintln!("  Error: {e}\n"),
        }
    }

    Ok(())
}

async fn build_session(
    config: &AppConfig,
    api_key: &str,
) -> Result<ChatSession, Box<dyn std::error::Error>> {
    let provider = Arc::new(OpenAiCompatProvider::new(
        "openai",
        config.api_url.clone(),
        api_key,
    ));

    let store = Arc::new(
        JsonFileStore::new(config.history.effective_path())
            .with_backup_on_clear(config.history.backup_on_clear),
    );

    let registry = chinwag_ingest::default_registry(IngestPolicy {
        max_bytes: config.attachments.max_bytes,
        max_image_dim: config.attachments.max_image_dim,
    });

    let mut session = ChatSession::open(
        provider,
        store,
        registry,
        config.default_model.clone(),
        config.default_temperature,
    )
    .await?;

    if let Some(cap) = config.context.window.cap() {
        session = session.with_window(WindowPolicy::LastN(cap));
    }
    if let Some(preamble) = &config.context.system_preamble {
        session = session.with_preamble(preamble.clone());
    }
    if let Some(max_tokens) = config.default_max_tokens {
        session = session.with_max_tokens(max_tokens);
    }

    Ok(session)
}

async fn read_uploads(
    paths: &[PathBuf],
) -> Result<Vec<UploadedFile>, Box<dyn std::error::Error>> {
    let mut uploads = Vec::with_capacity(paths.len());
    for path in paths {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read attachment {}: {e}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| format!("Attachment path has no file name: {}", path.display()))?;
        let media_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
        uploads.push(UploadedFile::new(name, media_type, bytes));
    }
    Ok(uploads)
}
