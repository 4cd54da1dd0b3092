use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lovenote::app::{input_channel, spawn_input_thread, CardApp};
use lovenote::config::Config;
use lovenote::store::{LetterStore, NewLetter, SupabaseStore};
use lovenote::ui::TerminalSurface;
use lovenote::utils::logger;
use lovenote::{letters, share};
use std::io::{stdout, IsTerminal};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "lovenote")]
#[command(about = "Terminal valentine card with an animated envelope", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the card (default). Pass a share link or letter id to view a
    /// shared letter instead of a random greeting.
    View {
        /// Letter id or full share URL (?letter=<id>)
        #[arg(long)]
        letter: Option<String>,

        /// Skip the ambient heart animation
        #[arg(long)]
        reduced_motion: bool,
    },

    /// Author a letter and print its share link
    Send {
        /// Recipient's name
        #[arg(long)]
        to: String,

        /// Your name
        #[arg(long)]
        from: String,

        /// The letter body
        #[arg(long)]
        message: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    if let Err(e) = logger::init_global_logger() {
        eprintln!("warning: file logging unavailable: {}", e);
    }

    let cli = Cli::parse();
    let config = Config::load_or_default();

    match cli.command.unwrap_or(Commands::View {
        letter: None,
        reduced_motion: false,
    }) {
        Commands::View {
            letter,
            reduced_motion,
        } => run_view(config, letter, reduced_motion).await,
        Commands::Send { to, from, message } => run_send(config, to, from, message).await,
    }
}

fn open_store(config: &Config) -> Option<Arc<dyn LetterStore>> {
    let store_config = config.store.as_ref()?;
    match SupabaseStore::new(store_config) {
        Ok(store) => Some(Arc::new(store)),
        Err(e) => {
            logger::warn(&format!("letter store client failed to initialize: {}", e));
            None
        }
    }
}

async fn run_view(config: Config, letter: Option<String>, reduced_motion: bool) -> Result<()> {
    // Accept either a bare id or a pasted share link.
    let letter_id = letter
        .as_deref()
        .map(|raw| share::extract_letter_id(raw).unwrap_or_else(|| raw.to_string()));

    let letter = letters::resolve(letter_id.as_deref(), open_store(&config)).await;

    if !stdout().is_terminal() {
        // Piped output: print the letter, skip the animation.
        println!("{}", letter.title);
        println!();
        for paragraph in &letter.paragraphs {
            println!("{}", paragraph);
            println!();
        }
        println!("{}", letter.signoff.0);
        println!("{}", letter.signoff.1);
        return Ok(());
    }

    let surface = TerminalSurface::new(!letter.is_remote());
    let app = CardApp::new(
        surface,
        letter,
        reduced_motion || config.reduced_motion,
    );

    let (tx, rx) = input_channel();
    spawn_input_thread(tx);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, Hide)?;

    let result = app.run(rx).await;

    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, Show);

    result
}

async fn run_send(config: Config, to: String, from: String, message: String) -> Result<()> {
    if to.trim().is_empty() || from.trim().is_empty() || message.trim().is_empty() {
        bail!("--to, --from, and --message must all be non-empty");
    }

    let Some(store_config) = config.store.as_ref() else {
        bail!(
            "letter store is not configured; add a `store` section to {} \
             or set LOVENOTE_SUPABASE_URL / LOVENOTE_SUPABASE_KEY",
            Config::get_config_path().display()
        );
    };

    let store = SupabaseStore::new(store_config)?;
    let letter_id = store
        .insert(NewLetter {
            sender_name: from.trim().to_string(),
            recipient_name: to.trim().to_string(),
            message: message.trim().to_string(),
        })
        .await
        .context("could not save the letter")?;

    println!("Letter sent! Share it with this link:");
    println!("  {}", share::build_share_url(&config.share_base_url, &letter_id));
    Ok(())
}
