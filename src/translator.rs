use std::sync::Arc;

use tracing::debug;

use crate::database::Dialect;
use crate::error::Result;
use crate::llm::ChatModel;
use crate::schema::SchemaDescription;

/// Turns a natural-language question into one SQL statement.
pub struct TextToSqlChain {
    model: Arc<dyn ChatModel>,
    dialect: Dialect,
    default_limit: u32,
}

impl TextToSqlChain {
    pub fn new(model: Arc<dyn ChatModel>, dialect: Dialect, default_limit: u32) -> Self {
        TextToSqlChain {
            model,
            dialect,
            default_limit,
        }
    }

    pub fn construct_prompt(&self, question: &str, schema: &SchemaDescription) -> String {
        let quote = self.dialect.identifier_quote();

        format!(
            "You are a {dialect} expert. Convert the user's question into a SQL query.\n\
             \n\
             DATABASE SCHEMA:\n\
             {schema}\n\
             \n\
             RULES:\n\
             - Output ONLY the SQL query, nothing else\n\
             - No explanation, no markdown, just the SQL\n\
             - Quote table and column names with {quote}\n\
             - Add LIMIT {limit} if the question does not ask for a specific number of rows\n\
             \n\
             QUESTION: {question}\n\
             \n\
             SQL:",
            dialect = self.dialect.name(),
            schema = schema,
            quote = quote,
            limit = self.default_limit,
            question = question,
        )
    }

    pub async fn translate(&self, question: &str, schema: &SchemaDescription) -> Result<String> {
        let prompt = self.construct_prompt(question, schema);
        let reply = self.model.chat(&prompt).await?;

        let sql = clean_sql(&reply);
        debug!(%sql, "generated SQL");

        Ok(sql)
    }
}

/// Strips markdown code fences the model may wrap around its answer.
pub fn clean_sql(reply: &str) -> String {
    reply
        .trim()
        .replace("```sql", "")
        .replace("```", "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedModel;
    use crate::schema::{ColumnSchema, TableSchema};

    fn shop_schema() -> SchemaDescription {
        SchemaDescription::new(vec![TableSchema {
            name: "products".to_string(),
            columns: vec![
                ColumnSchema {
                    name: "id".to_string(),
                    data_type: "int".to_string(),
                },
                ColumnSchema {
                    name: "price".to_string(),
                    data_type: "decimal(10,2)".to_string(),
                },
            ],
        }])
    }

    #[test]
    fn test_clean_sql_strips_fences() {
        assert_eq!(clean_sql("```sql\nSELECT 1;\n```"), "SELECT 1;");
        assert_eq!(clean_sql("```\nSELECT 1\n```\n"), "SELECT 1");
        assert_eq!(clean_sql("  SELECT 1  "), "SELECT 1");
    }

    #[test]
    fn test_prompt_contains_schema_rules_and_question() {
        let model = Arc::new(ScriptedModel::default());
        let chain = TextToSqlChain::new(model, Dialect::MySql, 50);
        let prompt = chain.construct_prompt("cheapest product", &shop_schema());

        assert!(prompt.starts_with("You are a MySQL expert."));
        assert!(prompt.contains("Table `products`: id (int), price (decimal(10,2))"));
        assert!(prompt.contains("Quote table and column names with `"));
        assert!(prompt.contains("LIMIT 50"));
        assert!(prompt.contains("QUESTION: cheapest product"));
        assert!(prompt.ends_with("SQL:"));
    }

    #[test]
    fn test_prompt_follows_dialect() {
        let model = Arc::new(ScriptedModel::default());
        let chain = TextToSqlChain::new(model, Dialect::Postgres, 20);
        let prompt = chain.construct_prompt("all products", &shop_schema());

        assert!(prompt.contains("PostgreSQL expert"));
        assert!(prompt.contains("names with \""));
        assert!(prompt.contains("LIMIT 20"));
    }

    #[tokio::test]
    async fn test_translate_returns_clean_sql() {
        let model = Arc::new(ScriptedModel::new([
            "```sql\nSELECT `id` FROM `products` ORDER BY `price` LIMIT 1\n```",
        ]));
        let chain = TextToSqlChain::new(model.clone(), Dialect::MySql, 50);

        let sql = chain
            .translate("cheapest product", &shop_schema())
            .await
            .unwrap();

        assert_eq!(sql, "SELECT `id` FROM `products` ORDER BY `price` LIMIT 1");
        assert_eq!(model.prompts().len(), 1);
        assert!(model.prompts()[0].contains("cheapest product"));
    }
}
