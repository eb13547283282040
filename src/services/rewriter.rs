// Rewrite Service
// Pluggable rewrite capability used by the refinement loop. A real LLM
// paraphraser plugs in as another variant; the contract makes no promise
// that the rewritten text scores lower.

use crate::models::Segment;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("rewrite backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub enum Rewriter {
    /// Appends a marker so the iteration history shows the text changed.
    #[default]
    MockSuffix,
}

impl Rewriter {
    pub async fn rewrite(&self, text: &str, flagged: &[Segment]) -> Result<String, RewriteError> {
        match self {
            Rewriter::MockSuffix => {
                debug!(flagged = flagged.len(), "mock rewrite pass");
                Ok(format!("{} (refined)", text))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_rewrite_changes_text() {
        let rewritten = Rewriter::MockSuffix.rewrite("hello", &[]).await.unwrap();
        assert_eq!(rewritten, "hello (refined)");
    }
}
