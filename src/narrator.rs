use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;
use crate::llm::ChatModel;
use crate::query::QueryOutcome;

/// Asks the model to restate a query result in plain language.
pub struct NarrationChain {
    model: Arc<dyn ChatModel>,
    preview_rows: usize,
    language: String,
}

impl NarrationChain {
    pub fn new(model: Arc<dyn ChatModel>, preview_rows: usize, language: impl Into<String>) -> Self {
        NarrationChain {
            model,
            preview_rows,
            language: language.into(),
        }
    }

    pub fn construct_prompt(&self, question: &str, sql: &str, outcome: &QueryOutcome) -> String {
        let result = match outcome {
            QueryOutcome::Error(message) => format!("Error: {}", message),
            QueryOutcome::Rows {
                columns,
                rows,
                count,
            } => format!(
                "Result ({} rows):\nColumns: {}\nData: {}",
                count,
                Value::from(columns.clone()),
                preview(rows, self.preview_rows),
            ),
            QueryOutcome::Affected(affected) => format!("Result: {} rows affected", affected),
        };

        format!(
            "The user asked this question: \"{question}\"\n\
             \n\
             I ran this SQL query: {sql}\n\
             \n\
             {result}\n\
             \n\
             Restate this result naturally and concisely in {language}.\n\
             If there are many results, summarize them.",
            language = self.language,
        )
    }

    pub async fn narrate(&self, question: &str, sql: &str, outcome: &QueryOutcome) -> Result<String> {
        // Failed statements are reported verbatim, the model never sees them.
        if let QueryOutcome::Error(message) = outcome {
            return Ok(format!("SQL error: {}", message));
        }

        let prompt = self.construct_prompt(question, sql, outcome);
        let reply = self.model.chat(&prompt).await?;

        Ok(reply.trim().to_string())
    }
}

/// JSON rendering of at most `limit` rows.
fn preview(rows: &[Vec<Value>], limit: usize) -> String {
    let shown: Vec<Value> = rows
        .iter()
        .take(limit)
        .map(|row| Value::Array(row.clone()))
        .collect();

    Value::Array(shown).to_string()
}
