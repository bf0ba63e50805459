use std::io::{stdin, stdout};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use sql_assistant::config::Config;
use sql_assistant::database;
use sql_assistant::llm::{self, ChatModel, OllamaChat};
use sql_assistant::repl::Repl;
use sql_assistant::{Assistant, PipelineOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BANNER_RULE: &str = "==================================================";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::parse();
    config.validate()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting sql-assistant...");

    let model: Arc<dyn ChatModel> =
        Arc::new(OllamaChat::new(config.ollama_url()?, config.model.clone()));

    if config.check {
        let reply = llm::ping(model.as_ref())
            .await
            .with_context(|| format!("model `{}` did not answer", config.model))?;
        println!("{}", reply);
        return Ok(());
    }

    let database_url = config.require_database_url()?;

    println!("{}", BANNER_RULE);
    println!("SQL Assistant");
    println!("Model: {}", config.model);
    println!("Database: {}", config.database_label());
    println!("{}", BANNER_RULE);

    let db = database::connect(database_url)
        .await
        .with_context(|| format!("failed to connect to {}", config.database_label()))?;
    println!("Connected to {}", config.database_label());

    println!("\nReading database schema...");
    let assistant = Assistant::initialize(db, model, PipelineOptions::from(&config))
        .await
        .context("failed to read database schema")?;
    println!("\n{}\n", assistant.schema());
    println!("{}", BANNER_RULE);

    let mut repl = Repl::new(stdin().lock(), stdout());
    repl.run(&assistant).await?;

    Ok(())
}
