use async_trait::async_trait;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::Ollama;
use tracing::debug;
use url::Url;

use crate::error::{AssistantError, Result};

const PING_PROMPT: &str = "Reply with one short sentence: why is the sky blue?";

/// A chat endpoint answering one user message at a time.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Sends `prompt` as a single user message and returns the reply text.
    async fn chat(&self, prompt: &str) -> Result<String>;

    fn name(&self) -> &str;
}

/// Chat model served by a local Ollama instance.
pub struct OllamaChat {
    client: Ollama,
    model: String,
}

impl OllamaChat {
    /// `url` is the server base URL with its port, see [`Config::ollama_url`].
    ///
    /// [`Config::ollama_url`]: crate::config::Config::ollama_url
    pub fn new(url: Url, model: impl Into<String>) -> Self {
        OllamaChat {
            client: Ollama::from_url(url),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ChatModel for OllamaChat {
    async fn chat(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt, "sending chat request");

        let request =
            ChatMessageRequest::new(self.model.clone(), vec![ChatMessage::user(prompt.to_string())]);

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|err| AssistantError::Model(format!("{} ({})", err, self.model)))?;

        debug!(reply = %response.message.content, "received chat reply");

        Ok(response.message.content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Round-trips a fixed prompt to check the model server is up.
pub async fn ping(model: &dyn ChatModel) -> Result<String> {
    model.chat(PING_PROMPT).await
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned replies in order and records every prompt it receives.
    #[derive(Default)]
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<String>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            ScriptedModel {
                replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn chat(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| AssistantError::Model("no scripted reply left".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;

    #[tokio::test]
    async fn test_ping_sends_fixed_prompt() {
        let model = ScriptedModel::new(["Rayleigh scattering."]);
        let reply = ping(&model).await.unwrap();

        assert_eq!(reply, "Rayleigh scattering.");
        assert_eq!(model.prompts(), vec![PING_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn test_exhausted_model_is_model_error() {
        let model = ScriptedModel::new(Vec::<String>::new());
        let err = model.chat("anything").await.unwrap_err();
        assert!(matches!(err, AssistantError::Model(_)));
    }

    #[test]
    fn test_ollama_chat_keeps_model_name() {
        let url = Url::parse("http://localhost:11434").unwrap();
        let model = OllamaChat::new(url, "llama3.2:latest");
        assert_eq!(model.name(), "llama3.2:latest");
    }
}
