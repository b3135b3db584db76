use crate::hf::HfError;
use crate::knowledge::StoreError;
use crate::lang::DetectError;

pub const NOT_READY: &str = "⚠️ System not ready. Try again later.";
pub const TRANSLATION_FAILED: &str = "⚠️ Translation failed. Try in English.";
pub const GENERATION_FAILED: &str = "⚠️ Sorry, generation failed.";
pub const BACK_TRANSLATION_FAILED: &str = "\n(⚠️ Back translation failed.)";
pub const UNEXPECTED: &str = "⚠️ Unexpected error. Try again.";

/// A failure that ends the turn. The attempt is still recorded in history,
/// with [`TurnError::user_message`] as the bot reply.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("knowledge base unavailable")]
    NotReady,

    #[error("language detection failed: {0}")]
    Detection(#[from] DetectError),

    #[error("inbound translation failed: {0}")]
    Translation(#[source] HfError),

    #[error("embedding failed: {0}")]
    Embedding(#[source] HfError),

    #[error("retrieval failed: {0}")]
    Retrieval(#[from] StoreError),
}

impl TurnError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TurnError::NotReady | TurnError::Retrieval(StoreError::NotReady) => NOT_READY,
            TurnError::Translation(_) => TRANSLATION_FAILED,
            TurnError::Detection(_) | TurnError::Embedding(_) | TurnError::Retrieval(_) => {
                UNEXPECTED
            }
        }
    }
}

/// A failure the turn absorbs: the answer is substituted or annotated and the
/// turn still completes.
#[derive(Debug, thiserror::Error)]
pub enum Degradation {
    #[error("generation failed: {0}")]
    Generation(#[source] HfError),

    #[error("back-translation failed: {0}")]
    BackTranslation(#[source] HfError),
}
