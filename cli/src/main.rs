//! CLI entrypoint for hustings
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use hustings_application::{
    AskQuestionUseCase, GetQuestionUseCase, ListQuestionsUseCase, PartyRepository,
};
use hustings_infrastructure::{
    ConfigLoader, FileConfig, HustingsDb, OpenAiGenerationGateway, SqliteAnswerRepository,
    SqlitePartyRepository, SqliteQuestionRepository, SqliteSessionGateway,
};
use hustings_presentation::{router, AppState, Cli, Command, PartyCommand};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("config error: {}", e))?
    };
    config.validate()?;

    let db = HustingsDb::open_at(&config.database.path)
        .with_context(|| format!("opening database at {}", config.database.path))?;
    let parties = Arc::new(SqlitePartyRepository::new(db.connection()));

    match cli.command {
        Command::Serve => serve(config, db, parties).await,
        Command::Party { command } => party_admin(command, parties).await,
    }
}

async fn serve(
    config: FileConfig,
    db: HustingsDb,
    parties: Arc<SqlitePartyRepository>,
) -> Result<()> {
    let Some(api_key) = config.openai.resolve_api_key() else {
        bail!("No API key configured. Set openai.api_key or OPENAI_API_KEY.");
    };

    // === Dependency Injection ===
    let mut gateway = OpenAiGenerationGateway::new(api_key);
    if let Some(base_url) = &config.openai.base_url {
        gateway = gateway.with_base_url(base_url);
    }
    let gateway = Arc::new(gateway);

    let questions = Arc::new(SqliteQuestionRepository::new(db.connection()));
    let answers = Arc::new(SqliteAnswerRepository::new(db.connection()));
    let sessions = Arc::new(SqliteSessionGateway::new(db.connection()));

    let state = AppState {
        sessions,
        parties: parties.clone(),
        ask: Arc::new(AskQuestionUseCase::new(
            gateway,
            parties,
            questions.clone(),
            answers,
        )),
        list_questions: Arc::new(ListQuestionsUseCase::new(questions.clone())),
        get_question: Arc::new(GetQuestionUseCase::new(questions)),
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn party_admin(command: PartyCommand, parties: Arc<SqlitePartyRepository>) -> Result<()> {
    match command {
        PartyCommand::Upsert {
            slug,
            name,
            url,
            logo_image_url,
            manifesto_url,
        } => {
            let party = parties
                .upsert(
                    &slug,
                    name.as_deref(),
                    url.as_deref(),
                    logo_image_url.as_deref(),
                    manifesto_url.as_deref(),
                )
                .await?;
            println!("Saved party '{}' ({})", party.slug, party.display_name());
        }
        PartyCommand::SetAssistant { slug, assistant_id } => {
            parties.set_default_assistant(&slug, &assistant_id).await?;
            println!("Bound '{}' to assistant {}", slug, assistant_id);
        }
        PartyCommand::List => {
            let all = parties.list().await?;
            if all.is_empty() {
                println!("No parties registered.");
            }
            for party in all {
                let assistant = match party.default_assistant_id {
                    Some(_) => "assistant bound",
                    None => "no assistant",
                };
                println!("{:<16} {} ({})", party.slug, party.display_name(), assistant);
            }
        }
    }
    Ok(())
}
