use std::sync::Arc;

use tracing::info;

use crate::config::{Config, DEFAULT_LANGUAGE, DEFAULT_LIMIT, DEFAULT_PREVIEW_ROWS};
use crate::database::Database;
use crate::error::Result;
use crate::llm::ChatModel;
use crate::narrator::NarrationChain;
use crate::query::QueryOutcome;
use crate::schema::SchemaDescription;
use crate::translator::TextToSqlChain;

/// Knobs shared by the two model calls.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub default_limit: u32,
    pub preview_rows: usize,
    pub language: String,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions {
            default_limit: DEFAULT_LIMIT,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        PipelineOptions {
            default_limit: config.default_limit,
            preview_rows: config.preview_rows,
            language: config.language.clone(),
        }
    }
}

/// The open connection, the schema snapshot and both model chains.
///
/// The schema is read once in [`Assistant::initialize`] and never refreshed.
pub struct Assistant {
    db: Box<dyn Database>,
    schema: SchemaDescription,
    translator: TextToSqlChain,
    narrator: NarrationChain,
}

impl Assistant {
    pub async fn initialize(
        db: Box<dyn Database>,
        model: Arc<dyn ChatModel>,
        options: PipelineOptions,
    ) -> Result<Self> {
        let schema = db.describe_schema().await?;
        info!(
            tables = schema.tables().len(),
            model = model.name(),
            "assistant ready"
        );

        let translator = TextToSqlChain::new(model.clone(), db.dialect(), options.default_limit);
        let narrator = NarrationChain::new(model, options.preview_rows, options.language);

        Ok(Assistant {
            db,
            schema,
            translator,
            narrator,
        })
    }

    pub fn schema(&self) -> &SchemaDescription {
        &self.schema
    }

    pub async fn to_sql(&self, question: &str) -> Result<String> {
        self.translator.translate(question, &self.schema).await
    }

    pub async fn execute(&self, sql: &str) -> QueryOutcome {
        self.db.execute(sql).await
    }

    pub async fn narrate(&self, question: &str, sql: &str, outcome: &QueryOutcome) -> Result<String> {
        self.narrator.narrate(question, sql, outcome).await
    }
}
