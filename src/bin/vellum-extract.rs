use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use vellum::{
    config::Config,
    extractor::{self, ContentSource},
};

#[derive(Parser)]
#[command(name = "vellum-extract")]
#[command(about = "Extract plain text from a file, web page or YouTube video")]
#[command(version)]
struct Cli {
    /// File to extract (txt, pdf, docx)
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Web page to extract
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// YouTube link to extract a transcript from
    #[arg(long, value_name = "LINK")]
    video: Option<String>,
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
    let config = Config::load().unwrap_or_default();
    let client = extractor::http_client(&config.http);

    let source = match (cli.file, cli.url, cli.video) {
        (Some(path), None, None) => ContentSource::from_path(&path)?,
        (None, Some(url), None) => ContentSource::Page { url },
        (None, None, Some(link)) => ContentSource::Video { link },
        _ => anyhow::bail!("provide exactly one of --file, --url or --video"),
    };

    let text = extractor::extract(&client, source).await?;
    println!("{}", text);

    Ok(())
}
