//! Hugging Face Inference API client: embeddings, translation, and answer generation.

mod client;
mod extract;
mod types;

pub use client::{Embedder, Generator, HfClient, HfError, Translator};
