//! Gist CLI - layered summaries with counter-arguments and steelmen
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use gist::{server, ui, Config, ContentExtractor, GistRequest, LazyReasoning, Summarizer};
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gist")]
#[command(author, version, about = "Layered summaries with counter-arguments and steelmen", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a URL (article, YouTube video or PDF) or pasted text
    Summarise {
        /// URL to summarise
        url: Option<String>,
        /// Text to summarise instead of a URL (stdin is read when neither is given)
        #[arg(long, conflicts_with = "url")]
        text: Option<String>,
        /// Print the gist as JSON
        #[arg(long)]
        json: bool,
        /// Show raw extracted text instead of summary
        #[arg(long, conflicts_with = "json")]
        raw: bool,
    },
    /// Serve the HTTP API
    Serve {
        /// Address to bind, overrides the config file
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gist=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Summarise {
            url,
            text,
            json,
            raw,
        }) => {
            let config = Config::load()?;
            let text = match (&url, text) {
                (None, None) if !atty::is(atty::Stream::Stdin) => {
                    let mut buffer = String::new();
                    std::io::stdin().read_to_string(&mut buffer)?;
                    Some(buffer)
                }
                (_, text) => text,
            };
            let request = GistRequest { url, text };
            request.validate()?;

            let extractor = ContentExtractor::new(&config.extractor)?;

            if raw {
                let content = extractor.extract(&request).await?;
                println!("\n=== {} ===\n", content.title());
                println!("{}", content.text());
                println!("\n--- Extracted {} words ---", content.word_count());
                return Ok(());
            }

            // Fail on missing credentials before fetching anything
            let reasoning = LazyReasoning::new(config.clone()).get().await?;

            let content = extractor.extract(&request).await?;
            eprintln!(
                "Summarising {} ({} words)...",
                content.title(),
                content.word_count()
            );
            let gist = Summarizer::new(reasoning).summarize(&content).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&gist)?);
            } else {
                println!("{}", ui::render(&gist));
            }
        }
        Some(Commands::Serve { addr }) => {
            let config = Config::load()?;
            let addr = addr.unwrap_or_else(|| config.server.addr.clone());
            server::serve(&config, &addr).await?;
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
