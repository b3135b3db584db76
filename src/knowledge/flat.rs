//! Reader and exact search for FAISS flat indexes (`IndexFlatL2` / `IndexFlatIP`).
//!
//! On-disk layout, little-endian, as produced by `faiss.write_index`:
//! fourcc, `i32 d`, `i64 ntotal`, two `i64` placeholders, `u8 is_trained`,
//! `i32 metric_type`, `f32 metric_arg` (only when metric_type > 1),
//! `u64` float count, then `ntotal * d` `f32` values.

use std::cmp::Ordering;

const METRIC_INNER_PRODUCT: i32 = 0;
const METRIC_L2: i32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("index file truncated at byte {0}")]
    Truncated(usize),

    #[error("unsupported index type '{0}' (expected a flat IxF2/IxFI index)")]
    UnsupportedType(String),

    #[error("unsupported metric type {0}")]
    UnsupportedMetric(i32),

    #[error("invalid index header: {0}")]
    InvalidHeader(String),

    #[error("query has dimension {got}, index expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    L2,
    InnerProduct,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    /// Squared L2 distance, or inner product, depending on the index metric.
    pub score: f32,
}

#[derive(Debug)]
pub struct FlatIndex {
    dim: usize,
    metric: Metric,
    vectors: Vec<f32>,
}

impl FlatIndex {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        let mut r = Reader::new(bytes);

        let fourcc = r.take(4)?;
        if !matches!(fourcc, b"IxF2" | b"IxFI" | b"IxFl") {
            return Err(IndexError::UnsupportedType(
                String::from_utf8_lossy(fourcc).into_owned(),
            ));
        }

        let dim = r.i32()?;
        let ntotal = r.i64()?;
        let _ = r.i64()?;
        let _ = r.i64()?;
        let _is_trained = r.u8()?;
        let metric = match r.i32()? {
            METRIC_L2 => Metric::L2,
            METRIC_INNER_PRODUCT => Metric::InnerProduct,
            other => return Err(IndexError::UnsupportedMetric(other)),
        };

        let dim = usize::try_from(dim)
            .ok()
            .filter(|&d| d > 0)
            .ok_or_else(|| IndexError::InvalidHeader(format!("dimension {dim}")))?;
        let ntotal = usize::try_from(ntotal)
            .map_err(|_| IndexError::InvalidHeader(format!("vector count {ntotal}")))?;
        let expected = ntotal
            .checked_mul(dim)
            .ok_or_else(|| IndexError::InvalidHeader("vector count overflows".into()))?;

        let count = r.u64()?;
        if count != expected as u64 {
            return Err(IndexError::InvalidHeader(format!(
                "payload holds {count} floats, header implies {expected}"
            )));
        }

        let vectors = r.f32s(expected)?;
        Ok(Self {
            dim,
            metric,
            vectors,
        })
    }

    pub fn len(&self) -> usize {
        self.vectors.len() / self.dim
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Exact k-nearest search, nearest first; ties go to the lower position.
    /// Returns at most `min(k, len)` neighbours.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                got: query.len(),
            });
        }

        let mut scored: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, v)| Neighbor {
                position,
                score: match self.metric {
                    Metric::L2 => squared_l2(query, v),
                    Metric::InnerProduct => dot(query, v),
                },
            })
            .collect();

        let metric = self.metric;
        scored.sort_by(|a, b| {
            let by_score = match metric {
                Metric::L2 => a.score.total_cmp(&b.score),
                Metric::InnerProduct => b.score.total_cmp(&a.score),
            };
            match by_score {
                Ordering::Equal => a.position.cmp(&b.position),
                other => other,
            }
        });
        scored.truncate(k);
        Ok(scored)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], IndexError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(IndexError::Truncated(self.pos))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], IndexError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8, IndexError> {
        Ok(self.array::<1>()?[0])
    }

    fn i32(&mut self) -> Result<i32, IndexError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    fn i64(&mut self) -> Result<i64, IndexError> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    fn u64(&mut self) -> Result<u64, IndexError> {
        Ok(u64::from_le_bytes(self.array()?))
    }

    fn f32s(&mut self, n: usize) -> Result<Vec<f32>, IndexError> {
        let bytes = n
            .checked_mul(4)
            .ok_or(IndexError::Truncated(self.pos))
            .and_then(|len| self.take(len))?;
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }
}

/// Serializes vectors in the FAISS flat layout, for building fixtures in tests.
#[cfg(test)]
pub(crate) fn encode_flat(metric: Metric, dim: usize, vectors: &[Vec<f32>]) -> Vec<u8> {
    let (fourcc, metric_type) = match metric {
        Metric::L2 => (b"IxF2", METRIC_L2),
        Metric::InnerProduct => (b"IxFI", METRIC_INNER_PRODUCT),
    };
    let mut out = Vec::new();
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(dim as i32).to_le_bytes());
    out.extend_from_slice(&(vectors.len() as i64).to_le_bytes());
    out.extend_from_slice(&(1i64 << 20).to_le_bytes());
    out.extend_from_slice(&(1i64 << 20).to_le_bytes());
    out.push(1);
    out.extend_from_slice(&metric_type.to_le_bytes());
    out.extend_from_slice(&((vectors.len() * dim) as u64).to_le_bytes());
    for v in vectors {
        for x in v {
            out.extend_from_slice(&x.to_le_bytes());
        }
    }
    out
}
