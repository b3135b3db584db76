use std::path::PathBuf;

use clap::Parser;

/// Multilingual question answering over a precomputed knowledge base.
///
/// Model access is configured through the environment: `HF_TOKEN` (required),
/// `HF_INFERENCE_URL`, `EMBEDDING_MODEL`, `GENERATION_MODEL`, `TRANSLATION_MODEL`.
#[derive(Debug, Parser)]
#[command(name = "polyglot-rag", version)]
pub struct Args {
    /// FAISS flat index (IndexFlatL2 / IndexFlatIP) over the passage embeddings
    #[arg(long, default_value = "guvi_faiss.index")]
    pub index: PathBuf,

    /// Passage file, one passage per line, in index order
    #[arg(long, default_value = "chunks.txt")]
    pub passages: PathBuf,

    /// Product the assistant answers questions about
    #[arg(long, default_value = "GUVI")]
    pub product: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_bundled_file_names() {
        let args = Args::try_parse_from(["polyglot-rag"]).unwrap();
        assert_eq!(args.index, PathBuf::from("guvi_faiss.index"));
        assert_eq!(args.passages, PathBuf::from("chunks.txt"));
        assert_eq!(args.product, "GUVI");
    }

    #[test]
    fn paths_and_product_can_be_overridden() {
        let args = Args::try_parse_from([
            "polyglot-rag",
            "--index",
            "/data/kb.index",
            "--passages",
            "/data/kb.txt",
            "--product",
            "Acme",
        ])
        .unwrap();
        assert_eq!(args.index, PathBuf::from("/data/kb.index"));
        assert_eq!(args.passages, PathBuf::from("/data/kb.txt"));
        assert_eq!(args.product, "Acme");
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
