//! Ask natural-language questions about a SQL database.
//!
//! Each question goes through the same four steps: the schema captured at
//! startup and the question are turned into SQL by a chat model, the SQL is
//! run (after confirmation when it is not a `SELECT`), and the result is
//! handed back to the model to be restated in plain language.

pub mod assistant;
pub mod config;
pub mod database;
pub mod error;
pub mod llm;
pub mod narrator;
pub mod query;
pub mod repl;
pub mod schema;
pub mod translator;

pub use assistant::{Assistant, PipelineOptions};
pub use error::{AssistantError, Result};
