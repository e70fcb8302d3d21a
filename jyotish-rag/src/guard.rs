//! Generation guard: constrains the completion call to the supplied evidence.

use std::sync::Arc;

use tracing::debug;

use crate::completion::{ChatMessage, CompletionModel};
use crate::error::Result;

/// Fixed behavioral policy sent as the system message on every call.
pub const SYSTEM_PROMPT: &str =
    "You are a Retrieval-Augmented Vedic Astrology Knowledge Assistant.\n\
     - You answer based ONLY on provided context.\n\
     - You avoid medical/political/legal predictions.\n\
     - If context is missing, say so honestly.\n\
     - Be clear and human, not robotic.";

/// Builds the constrained prompt and invokes the completion capability.
///
/// The guard is prompt-level enforcement: the system policy plus a user turn
/// that embeds the assembled evidence verbatim ahead of the literal question.
/// An empty context is still sent — the policy's "say so if evidence is
/// insufficient" clause is the defense in that case, not a code short-circuit.
pub struct GenerationGuard {
    model: Arc<dyn CompletionModel>,
    temperature: f32,
    max_output_tokens: u32,
}

impl GenerationGuard {
    /// Create a guard over the given completion model.
    ///
    /// `temperature` should be low — the guard favors determinism and
    /// factuality over creativity.
    pub fn new(model: Arc<dyn CompletionModel>, temperature: f32, max_output_tokens: u32) -> Self {
        Self { model, temperature, max_output_tokens }
    }

    /// Render the user-turn payload: evidence first, question last.
    fn user_payload(question: &str, context: &str) -> String {
        format!(
            "You are an expert Vedic Astrology assistant.\n\
             You must answer ONLY using the provided 'CONTEXT' below.\n\
             If the user asks for personal predictions (like marriage date, health forecast, \
             etc.), political opinion, medical treatment, or anything not covered in CONTEXT, \
             politely say you cannot answer.\n\n\
             CONTEXT:\n{context}\n\n\
             USER QUESTION:\n{question}"
        )
    }

    /// Generate the answer for `question` grounded in `context`.
    ///
    /// Returns the trimmed text of the model's single best completion.
    pub async fn generate(&self, question: &str, context: &str) -> Result<String> {
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(Self::user_payload(question, context)),
        ];

        debug!(
            model = self.model.model_id(),
            context_chars = context.len(),
            "requesting grounded completion"
        );

        let answer =
            self.model.complete(&messages, self.temperature, self.max_output_tokens).await?;
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingModel {
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    #[async_trait]
    impl CompletionModel for RecordingModel {
        fn model_id(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            messages: &[ChatMessage],
            _temperature: f32,
            _max_output_tokens: u32,
        ) -> Result<String> {
            self.calls.lock().unwrap().push(messages.to_vec());
            Ok("  the answer  ".to_string())
        }
    }

    #[tokio::test]
    async fn empty_context_is_still_sent_to_the_model() {
        let model = Arc::new(RecordingModel { calls: Mutex::new(Vec::new()) });
        let guard = GenerationGuard::new(model.clone(), 0.4, 600);

        let answer = guard.generate("What rules the 7th house?", "").await.unwrap();
        assert_eq!(answer, "the answer");

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1, "generation must be invoked even with empty evidence");
        let user_turn = &calls[0][1];
        assert!(user_turn.content.contains("CONTEXT:\n\n"));
        assert!(user_turn.content.contains("What rules the 7th house?"));
    }
}
