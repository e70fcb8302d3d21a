//! Completion model trait for generating text from role-tagged messages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The role of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Behavioral policy for the model.
    System,
    /// End-user payload.
    User,
}

/// One role-tagged message in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The message role.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// Build a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Build a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }
}

/// A model capable of producing a single text completion.
///
/// Completion is slower than embedding; implementations carry a longer
/// request timeout and distinguish model misconfiguration
/// ([`RagError::ModelMisconfigured`](crate::RagError::ModelMisconfigured))
/// from transient upstream failure
/// ([`RagError::CompletionUnavailable`](crate::RagError::CompletionUnavailable))
/// from generic HTTP failure
/// ([`RagError::Completion`](crate::RagError::Completion)).
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// The configured model id, for diagnostics.
    fn model_id(&self) -> &str;

    /// Generate the single best completion for the given messages.
    ///
    /// Returns the completion text as-is; callers trim it.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        max_output_tokens: u32,
    ) -> Result<String>;
}
