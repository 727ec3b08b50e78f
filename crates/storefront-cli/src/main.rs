mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Normalize stored product rows (a JSON object or array) into canonical products.
    Normalize {
        /// Input file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Fail on rows that do not pass strict validation.
        #[arg(long)]
        strict: bool,
    },
    /// Forward a revalidation event to the storefront webhook.
    Revalidate {
        #[arg(long = "type", value_enum, default_value_t = EventKind::Update)]
        event_type: EventKind,
        /// Slug of the product after the change.
        #[arg(long)]
        slug: Option<String>,
        /// Slug before the change (renames and deletes).
        #[arg(long)]
        old_slug: Option<String>,
        /// The product is featured after the change.
        #[arg(long)]
        featured: bool,
        /// The product was featured before the change.
        #[arg(long)]
        was_featured: bool,
    },
    /// Fetch products by id from the database and print them normalized.
    Compare {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EventKind {
    Insert,
    Update,
    Delete,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Normalize { file, strict } => commands::normalize(file.as_deref(), strict),
        Commands::Revalidate {
            event_type,
            slug,
            old_slug,
            featured,
            was_featured,
        } => {
            let event = commands::build_event(
                event_type.into(),
                slug.as_deref(),
                old_slug.as_deref(),
                featured,
                was_featured,
            );
            commands::revalidate(&event).await
        }
        Commands::Compare { ids } => commands::compare(&ids).await,
    }
}

impl From<EventKind> for storefront_core::EventType {
    fn from(kind: EventKind) -> Self {
        match kind {
            EventKind::Insert => Self::Insert,
            EventKind::Update => Self::Update,
            EventKind::Delete => Self::Delete,
        }
    }
}
