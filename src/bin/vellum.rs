use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::{Input, Select};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::time::Duration;
use vellum::{
    config::Config,
    extractor::{self, ContentSource},
    llm::GeminiClient,
    session::ChatSession,
};

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "Chat about a document, web page or YouTube video through Gemini")]
#[command(version)]
struct Cli {
    /// Load this file (txt, pdf, docx) before the first question
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Load this web page before the first question
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Load this YouTube link before the first question
    #[arg(long, value_name = "LINK")]
    video: Option<String>,

    /// Model name (overrides config)
    #[arg(long)]
    model: Option<String>,
}

/// What the user picked in the input-selection step
enum InputPick {
    File(PathBuf),
    Page(String),
    Video(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().unwrap_or_default();
    if let Some(model) = cli.model.clone() {
        config.gemini.model = model;
    }

    let picked = [cli.file.is_some(), cli.url.is_some(), cli.video.is_some()]
        .iter()
        .filter(|set| **set)
        .count();
    if picked > 1 {
        anyhow::bail!("use only one of --file, --url or --video");
    }

    let gemini = GeminiClient::from_config(&config);
    if !gemini.has_credential() {
        println!("⚠️  No API key found. Set GEMINI_API_KEY or add [gemini].api_key to settings.toml.");
        println!("   Questions will fail until a key is configured.\n");
    }

    let http = extractor::http_client(&config.http);
    let mut session = ChatSession::new();

    println!("vellum: ask questions about your content (model: {})", gemini.model());

    // Preload from flags so `vellum --file notes.pdf` drops straight into the conversation
    let initial_pick = if let Some(path) = cli.file {
        Some(InputPick::File(path))
    } else if let Some(url) = cli.url {
        Some(InputPick::Page(url))
    } else {
        cli.video.map(InputPick::Video)
    };
    if let Some(pick) = initial_pick {
        load_pick(&http, &mut session, pick).await;
    }

    loop {
        if !session.has_context() {
            match choose_source()? {
                Some(pick) => {
                    load_pick(&http, &mut session, pick).await;
                    continue;
                }
                None => break,
            }
        }

        let line: String = Input::new()
            .with_prompt("❓ Question")
            .allow_empty(true)
            .interact_text()
            .context("Failed to read user input")?;

        match line.trim() {
            "" => continue,
            "/quit" | "/q" | "/exit" => break,
            "/load" => {
                if let Some(pick) = choose_source()? {
                    load_pick(&http, &mut session, pick).await;
                } else {
                    break;
                }
            }
            "/history" => render_history(&session),
            "/models" => list_models(&gemini).await,
            question => ask(&gemini, &mut session, question).await,
        }
    }

    println!("Bye!");
    Ok(())
}

/// Input-selection step: pick one of the three source kinds, or quit
fn choose_source() -> Result<Option<InputPick>> {
    let choice = Select::new()
        .with_prompt("What do you want to talk about?")
        .items(&[
            "📄 Local file (txt, pdf, docx)",
            "🌐 Web page",
            "▶️  YouTube video",
            "Quit",
        ])
        .default(0)
        .interact()
        .context("Failed to read selection")?;

    let pick = match choice {
        0 => {
            let path: String = Input::new()
                .with_prompt("File path")
                .interact_text()
                .context("Failed to read file path")?;
            let expanded = shellexpand::tilde(path.trim()).into_owned();
            InputPick::File(PathBuf::from(expanded))
        }
        1 => {
            let url: String = Input::new()
                .with_prompt("Page URL")
                .interact_text()
                .context("Failed to read URL")?;
            InputPick::Page(url.trim().to_string())
        }
        2 => {
            let link: String = Input::new()
                .with_prompt("Video link")
                .interact_text()
                .context("Failed to read video link")?;
            InputPick::Video(link.trim().to_string())
        }
        _ => return Ok(None),
    };

    Ok(Some(pick))
}

/// Run one extractor and replace the session context with its output.
/// Failures are reported and leave the previous context and history intact.
async fn load_pick(http: &reqwest::Client, session: &mut ChatSession, pick: InputPick) {
    let spinner = spinner("Extracting text...");

    let result = match build_source(pick) {
        Ok(source) => extractor::extract(http, source)
            .await
            .map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };

    spinner.finish_and_clear();

    match result {
        Ok(text) => {
            let chars = text.chars().count();
            match session.load_context(text) {
                Ok(()) => {
                    println!("✓ Loaded {} characters of context.", chars);
                    println!("  Commands: /load  /history  /models  /quit\n");
                }
                Err(e) => println!("⚠️  {}", e),
            }
        }
        Err(e) => println!("⚠️  {:#}", e),
    }
}

/// Turn a user pick into an extractable source, reading file bytes for documents
fn build_source(pick: InputPick) -> Result<ContentSource> {
    match pick {
        InputPick::File(path) => ContentSource::from_path(&path)
            .with_context(|| format!("Cannot load {}", path.display())),
        InputPick::Page(url) => Ok(ContentSource::Page { url }),
        InputPick::Video(link) => Ok(ContentSource::Video { link }),
    }
}

/// One question, one outbound call, one rendered reply
async fn ask(gemini: &GeminiClient, session: &mut ChatSession, question: &str) {
    let spinner = spinner("Thinking...");
    let result = session.ask(gemini, question).await;
    spinner.finish_and_clear();

    match result {
        Ok(turn) => println!("\n💬 {}\n", turn.answer),
        Err(e) => println!("⚠️  {}", e),
    }
}

fn render_history(session: &ChatSession) {
    if session.turn_count() == 0 {
        println!("No questions asked yet.");
        return;
    }
    for (i, turn) in session.history().iter().enumerate() {
        println!("{}. ❓ {}", i + 1, turn.question);
        println!("   💬 {}", turn.answer);
    }
}

async fn list_models(gemini: &GeminiClient) {
    let spinner = spinner("Fetching model list...");
    let result = gemini.list_models().await;
    spinner.finish_and_clear();

    match result {
        Ok(models) if models.is_empty() => println!("The endpoint advertises no models."),
        Ok(models) => {
            println!("Available models:");
            for model in models {
                match model.display_name {
                    Some(display) => println!("  - {} ({})", model.name, display),
                    None => println!("  - {}", model.name),
                }
                if let Some(description) = model.description {
                    println!("      {}", description);
                }
            }
        }
        Err(e) => println!("⚠️  {}", e),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
