//! Read-only knowledge base: passages plus a parallel flat vector index.

pub(crate) mod flat;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use flat::{FlatIndex, IndexError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("index file: {0}")]
    Index(#[from] IndexError),

    #[error("index holds {vectors} vectors but passage file has {passages} lines")]
    CountMismatch { vectors: usize, passages: usize },

    #[error("knowledge base not loaded")]
    NotReady,
}

/// Loaded once at startup. A failed load leaves the store `Degraded` for the
/// lifetime of the process; no reload is attempted.
#[derive(Debug)]
pub enum KnowledgeStore {
    Ready {
        index: FlatIndex,
        passages: Vec<String>,
    },
    Degraded {
        reason: String,
    },
}

impl KnowledgeStore {
    pub fn load(index_path: &Path, passages_path: &Path) -> Self {
        match Self::try_load(index_path, passages_path) {
            Ok(store) => {
                info!(
                    passages = store.len(),
                    index = %index_path.display(),
                    "knowledge base loaded"
                );
                store
            }
            Err(e) => {
                warn!(error = %e, "knowledge base load failed; running degraded");
                Self::Degraded {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_load(index_path: &Path, passages_path: &Path) -> Result<Self, StoreError> {
        let bytes = fs::read(index_path).map_err(|source| StoreError::Io {
            path: index_path.to_path_buf(),
            source,
        })?;
        let index = FlatIndex::from_bytes(&bytes)?;
        debug!(
            dim = index.dim(),
            metric = ?index.metric(),
            vectors = index.len(),
            "index parsed"
        );

        let text = fs::read_to_string(passages_path).map_err(|source| StoreError::Io {
            path: passages_path.to_path_buf(),
            source,
        })?;
        let passages = text.lines().map(|l| l.trim().to_string()).collect();

        Self::from_parts(index, passages)
    }

    pub fn from_parts(index: FlatIndex, passages: Vec<String>) -> Result<Self, StoreError> {
        if index.len() != passages.len() {
            return Err(StoreError::CountMismatch {
                vectors: index.len(),
                passages: passages.len(),
            });
        }
        if passages.is_empty() {
            return Err(StoreError::NotReady);
        }
        Ok(Self::Ready { index, passages })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Ready { passages, .. } => passages.len(),
            Self::Degraded { .. } => 0,
        }
    }

    /// Up to `k` passages nearest to `query`, nearest first. A store with
    /// fewer than `k` passages returns all of them.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<&str>, StoreError> {
        let Self::Ready { index, passages } = self else {
            return Err(StoreError::NotReady);
        };
        let hits = index.search(query, k)?;
        Ok(hits
            .iter()
            .filter_map(|hit| passages.get(hit.position).map(String::as_str))
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::flat::{FlatIndex, Metric, encode_flat};
    use super::KnowledgeStore;

    /// A ready store whose passage `i` sits at `vectors[i]` under L2.
    pub(crate) fn store_with(passages: &[&str], vectors: &[Vec<f32>]) -> KnowledgeStore {
        let dim = vectors.first().map_or(1, Vec::len);
        let index = FlatIndex::from_bytes(&encode_flat(Metric::L2, dim, vectors)).unwrap();
        KnowledgeStore::from_parts(index, passages.iter().map(|p| p.to_string()).collect())
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::flat::{Metric, encode_flat};
    use super::test_support::store_with;
    use super::*;
    use std::io::Write;

    fn write_fixture(
        vectors: &[Vec<f32>],
        passages: &str,
    ) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let index_path = dir.path().join("kb.index");
        let passages_path = dir.path().join("chunks.txt");
        fs::write(&index_path, encode_flat(Metric::L2, 2, vectors)).unwrap();
        let mut f = fs::File::create(&passages_path).unwrap();
        f.write_all(passages.as_bytes()).unwrap();
        (dir, index_path, passages_path)
    }

    #[test]
    fn loads_matching_files() {
        let (_dir, idx, txt) = write_fixture(
            &[vec![0.0, 0.0], vec![1.0, 1.0]],
            "  GUVI is an ed-tech platform.  \nCourses are offered in Tamil.\n",
        );
        let store = KnowledgeStore::load(&idx, &txt);
        assert!(store.is_ready());
        assert_eq!(store.len(), 2);
        let hits = store.retrieve(&[0.0, 0.1], 1).unwrap();
        assert_eq!(hits, vec!["GUVI is an ed-tech platform."]);
    }

    #[test]
    fn blank_lines_keep_their_position() {
        let (_dir, idx, txt) = write_fixture(
            &[vec![0.0, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]],
            "first\n\nthird\n",
        );
        let store = KnowledgeStore::load(&idx, &txt);
        assert_eq!(store.retrieve(&[2.0, 2.0], 1).unwrap(), vec!["third"]);
    }

    #[test]
    fn missing_index_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("chunks.txt");
        fs::write(&txt, "a\n").unwrap();
        let store = KnowledgeStore::load(&dir.path().join("absent.index"), &txt);
        assert!(!store.is_ready());
        assert_eq!(store.len(), 0);
        assert!(matches!(store.retrieve(&[0.0], 3), Err(StoreError::NotReady)));
    }

    #[test]
    fn missing_passages_degrades() {
        let (dir, idx, _txt) = write_fixture(&[vec![0.0, 0.0]], "a\n");
        let store = KnowledgeStore::load(&idx, &dir.path().join("absent.txt"));
        match store {
            KnowledgeStore::Degraded { reason } => assert!(reason.contains("absent.txt")),
            other => panic!("expected degraded store, got: {other:?}"),
        }
    }

    #[test]
    fn corrupt_index_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let idx = dir.path().join("kb.index");
        let txt = dir.path().join("chunks.txt");
        fs::write(&idx, b"garbage").unwrap();
        fs::write(&txt, "a\n").unwrap();
        assert!(!KnowledgeStore::load(&idx, &txt).is_ready());
    }

    #[test]
    fn count_mismatch_degrades() {
        let (_dir, idx, txt) = write_fixture(&[vec![0.0, 0.0], vec![1.0, 1.0]], "only one\n");
        let store = KnowledgeStore::load(&idx, &txt);
        match store {
            KnowledgeStore::Degraded { reason } => assert!(reason.contains("2 vectors")),
            other => panic!("expected degraded store, got: {other:?}"),
        }
    }

    #[test]
    fn retrieve_returns_top_k_in_order() {
        let store = store_with(
            &["far", "near", "middle", "farthest"],
            &[
                vec![3.0, 0.0],
                vec![0.1, 0.0],
                vec![1.0, 0.0],
                vec![9.0, 0.0],
            ],
        );
        assert_eq!(
            store.retrieve(&[0.0, 0.0], 3).unwrap(),
            vec!["near", "middle", "far"]
        );
    }

    #[test]
    fn retrieve_with_fewer_passages_than_k_returns_all() {
        let store = store_with(&["one", "two"], &[vec![0.0], vec![1.0]]);
        assert_eq!(store.retrieve(&[0.9], 3).unwrap(), vec!["two", "one"]);
    }

    #[test]
    fn retrieve_rejects_wrong_dimension() {
        let store = store_with(&["one"], &[vec![0.0, 0.0]]);
        assert!(matches!(
            store.retrieve(&[0.0, 0.0, 0.0], 3),
            Err(StoreError::Index(IndexError::DimensionMismatch { .. }))
        ));
    }
}
