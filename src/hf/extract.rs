use tracing::warn;

use super::client::HfError;
use super::types::{EmbeddingResponse, GenerationOutput, TranslationOutput};

pub fn extract_embedding(response: EmbeddingResponse) -> Result<Vec<f32>, HfError> {
    let vector = match response {
        EmbeddingResponse::Flat(v) => v,
        EmbeddingResponse::Nested(rows) => rows.into_iter().next().unwrap_or_default(),
    };

    if vector.is_empty() {
        warn!("feature extraction returned no vector");
        return Err(HfError::EmptyResponse);
    }
    Ok(vector)
}

pub fn extract_translation(outputs: Vec<TranslationOutput>) -> Result<String, HfError> {
    outputs
        .into_iter()
        .next()
        .map(|o| o.translation_text)
        .ok_or_else(|| {
            warn!("translation returned no candidates");
            HfError::EmptyResponse
        })
}

pub fn extract_generation(outputs: Vec<GenerationOutput>) -> Result<String, HfError> {
    outputs
        .into_iter()
        .next()
        .map(|o| o.generated_text)
        .ok_or_else(|| {
            warn!("generation returned no candidates");
            HfError::EmptyResponse
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_embedding_is_returned_as_is() {
        let v = extract_embedding(EmbeddingResponse::Flat(vec![0.1, 0.2])).unwrap();
        assert_eq!(v, vec![0.1, 0.2]);
    }

    #[test]
    fn nested_embedding_takes_first_row() {
        let v = extract_embedding(EmbeddingResponse::Nested(vec![
            vec![1.0, 2.0],
            vec![3.0, 4.0],
        ]))
        .unwrap();
        assert_eq!(v, vec![1.0, 2.0]);
    }

    #[test]
    fn empty_embedding_is_an_error() {
        assert!(matches!(
            extract_embedding(EmbeddingResponse::Nested(vec![])),
            Err(HfError::EmptyResponse)
        ));
        assert!(matches!(
            extract_embedding(EmbeddingResponse::Flat(vec![])),
            Err(HfError::EmptyResponse)
        ));
    }

    #[test]
    fn translation_takes_first_candidate() {
        let text = extract_translation(vec![
            TranslationOutput {
                translation_text: "bonjour".into(),
            },
            TranslationOutput {
                translation_text: "salut".into(),
            },
        ])
        .unwrap();
        assert_eq!(text, "bonjour");
    }

    #[test]
    fn empty_generation_is_an_error() {
        assert!(matches!(
            extract_generation(vec![]),
            Err(HfError::EmptyResponse)
        ));
    }
}
