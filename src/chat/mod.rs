//! Per-turn orchestration: detect, translate in, retrieve, generate, translate out.

mod errors;

pub use errors::{
    BACK_TRANSLATION_FAILED, Degradation, GENERATION_FAILED, NOT_READY, TRANSLATION_FAILED,
    TurnError, UNEXPECTED,
};

use tracing::{debug, info, warn};

use crate::hf::{Embedder, Generator, Translator};
use crate::knowledge::KnowledgeStore;
use crate::lang::{LanguageDetector, LocaleTag, PIVOT_LANGUAGE, locale_for};
use crate::prompt::build_rag_prompt;

pub const GREETING_USER: &str = "🤖";
pub const GREETING: &str = "Hi! How can I help you today?";
/// Passages retrieved per question.
pub const TOP_K: usize = 3;
pub const MAX_NEW_TOKENS: u32 = 200;
const DEFAULT_PRODUCT: &str = "GUVI";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub user: String,
    pub bot: String,
}

impl Turn {
    pub fn new(user: impl Into<String>, bot: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            bot: bot.into(),
        }
    }
}

/// State owned by one conversation. Passed into [`Chatbot::send`] and handed
/// back updated; nothing is kept on the chatbot itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub history: Vec<Turn>,
    /// Language answers are translated into. Pinned by the first detected
    /// language unless already set.
    pub pinned_locale: Option<LocaleTag>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            history: vec![Turn::new(GREETING_USER, GREETING)],
            pinned_locale: None,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct Answer {
    text: String,
    degradations: Vec<Degradation>,
}

pub struct Chatbot<D, E, T, G> {
    store: KnowledgeStore,
    detector: D,
    embedder: E,
    translator: T,
    generator: G,
    product: String,
}

impl<D, E, T, G> Chatbot<D, E, T, G>
where
    D: LanguageDetector,
    E: Embedder,
    T: Translator,
    G: Generator,
{
    pub fn new(
        store: KnowledgeStore,
        detector: D,
        embedder: E,
        translator: T,
        generator: G,
    ) -> Self {
        Self {
            store,
            detector,
            embedder,
            translator,
            generator,
            product: DEFAULT_PRODUCT.to_string(),
        }
    }

    /// Product name used in the prompt persona.
    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = product.into();
        self
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn is_ready(&self) -> bool {
        self.store.is_ready()
    }

    /// Runs one turn and appends exactly one `(input, reply)` entry. Failures
    /// never escape; they become the reply.
    pub async fn send(&self, input: &str, mut session: Session) -> Session {
        let reply = match self.answer(input, &mut session.pinned_locale).await {
            Ok(answer) => {
                for d in &answer.degradations {
                    warn!(error = %d, "turn completed degraded");
                }
                answer.text
            }
            Err(e) => {
                warn!(error = %e, "turn failed");
                e.user_message().to_string()
            }
        };
        session.history.push(Turn::new(input, reply));
        session
    }

    async fn answer(
        &self,
        input: &str,
        pinned: &mut Option<LocaleTag>,
    ) -> Result<Answer, TurnError> {
        if !self.store.is_ready() {
            return Err(TurnError::NotReady);
        }

        let lang = self.detector.detect(input)?;
        let source = locale_for(lang);
        let target = *pinned.get_or_insert(source);
        info!(lang, %source, %target, "turn started");

        let question = if lang != PIVOT_LANGUAGE {
            self.translator
                .translate(input, source, LocaleTag::PIVOT)
                .await
                .map_err(TurnError::Translation)?
        } else {
            input.to_string()
        };

        let query = self
            .embedder
            .embed(&question)
            .await
            .map_err(TurnError::Embedding)?;
        let context = self.store.retrieve(&query, TOP_K)?;
        debug!(retrieved = context.len(), "context retrieved");

        let prompt = build_rag_prompt(&self.product, &context, &question);
        let mut degradations = Vec::new();

        let mut text = match self.generator.generate(&prompt, MAX_NEW_TOKENS).await {
            Ok(generated) => generated.trim().to_string(),
            Err(e) => {
                degradations.push(Degradation::Generation(e));
                GENERATION_FAILED.to_string()
            }
        };

        if !target.is_pivot() {
            match self.translator.translate(&text, LocaleTag::PIVOT, target).await {
                Ok(translated) => text = translated,
                Err(e) => {
                    degradations.push(Degradation::BackTranslation(e));
                    text.push_str(BACK_TRANSLATION_FAILED);
                }
            }
        }

        Ok(Answer { text, degradations })
    }
}
