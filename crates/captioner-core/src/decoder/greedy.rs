//! Greedy autoregressive caption decoding.

use crate::config::SequencePadding;
use crate::error::PipelineError;
use crate::math::argmax;
use crate::vocabulary::Vocabulary;

use super::NextTokenModel;

/// Output of one decoding run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCaption {
    /// Token indices, start marker first, end marker last if it was produced
    pub tokens: Vec<u32>,
    /// Caption text without markers
    pub text: String,
    /// Whether decoding stopped on the end marker
    pub finished: bool,
}

/// Drives a [`NextTokenModel`] one token at a time, always taking the most
/// probable next word.
#[derive(Debug, Clone, Copy)]
pub struct GreedyDecoder {
    max_length: usize,
    padding: SequencePadding,
}

impl GreedyDecoder {
    pub fn new(max_length: usize, padding: SequencePadding) -> Self {
        Self {
            max_length,
            padding,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn padding(&self) -> SequencePadding {
        self.padding
    }

    /// Decode a caption for one feature vector.
    ///
    /// The token sequence never grows past `max_length`, so the model is
    /// queried at most `max_length - 1` times. Decoding also stops on the end
    /// marker or on an index with no word (0 or out of range).
    pub fn decode(
        &self,
        model: &dyn NextTokenModel,
        vocabulary: &Vocabulary,
        features: &[f32],
    ) -> Result<DecodedCaption, PipelineError> {
        let mut tokens = vec![vocabulary.start_id()];
        let mut words: Vec<&str> = Vec::new();
        let mut finished = false;

        while tokens.len() < self.max_length {
            let padded = pad_sequence(&tokens, self.max_length, self.padding);
            let probs = model.predict(features, &padded)?;

            if probs.len() != vocabulary.cardinality() {
                return Err(PipelineError::Decoder {
                    message: format!(
                        "decoder produced {} probabilities, vocabulary has {} indices",
                        probs.len(),
                        vocabulary.cardinality()
                    ),
                });
            }

            let next = argmax(&probs).ok_or_else(|| PipelineError::Decoder {
                message: "decoder produced no usable probabilities".to_string(),
            })? as u32;

            let Some(word) = vocabulary.word(next) else {
                tracing::trace!("Decoder selected index {} with no word, stopping", next);
                break;
            };

            tokens.push(next);
            if next == vocabulary.end_id() {
                finished = true;
                break;
            }
            words.push(word);
        }

        tracing::trace!("Decoded {} tokens (finished: {})", tokens.len(), finished);

        Ok(DecodedCaption {
            text: words.join(" "),
            tokens,
            finished,
        })
    }
}

/// Zero-pad (or left-truncate) a token sequence to exactly `max_length`.
pub fn pad_sequence(tokens: &[u32], max_length: usize, padding: SequencePadding) -> Vec<i64> {
    let kept = &tokens[tokens.len().saturating_sub(max_length)..];
    let mut padded = vec![0i64; max_length];
    let offset = match padding {
        SequencePadding::Post => 0,
        SequencePadding::Pre => max_length - kept.len(),
    };
    for (slot, &token) in padded[offset..].iter_mut().zip(kept) {
        *slot = token as i64;
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{small_vocabulary, FailingDecoder, ScriptedDecoder};

    // small_vocabulary: startseq=1, dog=2, endseq=3, runs=4, on=5, grass=6
    const FEATURES: [f32; 4] = [0.1, 0.2, 0.3, 0.4];

    fn greedy(max_length: usize) -> GreedyDecoder {
        GreedyDecoder::new(max_length, SequencePadding::Post)
    }

    #[test]
    fn test_decodes_until_end_marker() {
        let vocab = small_vocabulary();
        let model = ScriptedDecoder::new(vec![2, 4, 5, 6, 3], vocab.cardinality());

        let out = greedy(35).decode(&model, &vocab, &FEATURES).unwrap();
        assert_eq!(out.text, "dog runs on grass");
        assert_eq!(out.tokens, vec![1, 2, 4, 5, 6, 3]);
        assert!(out.finished);
    }

    #[test]
    fn test_immediate_end_marker_gives_empty_caption() {
        let vocab = small_vocabulary();
        let model = ScriptedDecoder::new(vec![vocab.end_id()], vocab.cardinality());

        let out = greedy(35).decode(&model, &vocab, &FEATURES).unwrap();
        assert_eq!(out.text, "");
        assert!(out.finished);
        assert_eq!(model.seen().lock().unwrap().len(), 1);
    }

    #[test]
    fn test_never_exceeds_max_length() {
        let vocab = small_vocabulary();
        // Never emits the end marker.
        let model = ScriptedDecoder::new(vec![2], vocab.cardinality());

        for max_length in [2, 3, 10, 35] {
            let out = greedy(max_length).decode(&model, &vocab, &FEATURES).unwrap();
            assert_eq!(out.tokens.len(), max_length);
            assert!(!out.finished);
            assert_eq!(out.text.split_whitespace().count(), max_length - 1);
        }
    }

    #[test]
    fn test_deterministic() {
        let vocab = small_vocabulary();
        let model = ScriptedDecoder::new(vec![2, 4, 3], vocab.cardinality());
        let decoder = greedy(35);

        let first = decoder.decode(&model, &vocab, &FEATURES).unwrap();
        for _ in 0..5 {
            assert_eq!(decoder.decode(&model, &vocab, &FEATURES).unwrap(), first);
        }
    }

    #[test]
    fn test_padding_index_stops_decoding() {
        let vocab = small_vocabulary();
        let model = ScriptedDecoder::new(vec![2, 0, 4], vocab.cardinality());

        let out = greedy(35).decode(&model, &vocab, &FEATURES).unwrap();
        assert_eq!(out.text, "dog");
        assert_eq!(out.tokens, vec![1, 2]);
        assert!(!out.finished);
    }

    #[test]
    fn test_width_mismatch_is_error() {
        let vocab = small_vocabulary();
        let model = ScriptedDecoder::new(vec![2], vocab.cardinality() + 5);

        let err = greedy(35).decode(&model, &vocab, &FEATURES).unwrap_err();
        assert!(matches!(err, PipelineError::Decoder { .. }));
    }

    #[test]
    fn test_model_failure_propagates() {
        let vocab = small_vocabulary();
        let err = greedy(35)
            .decode(&FailingDecoder, &vocab, &FEATURES)
            .unwrap_err();
        assert!(err.to_string().contains("out of memory"));
    }

    #[test]
    fn test_model_sees_post_padded_sequences() {
        let vocab = small_vocabulary();
        let model = ScriptedDecoder::new(vec![2, 4, 3], vocab.cardinality());
        greedy(5).decode(&model, &vocab, &FEATURES).unwrap();

        let seen = model.seen();
        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                vec![1, 0, 0, 0, 0],
                vec![1, 2, 0, 0, 0],
                vec![1, 2, 4, 0, 0],
            ]
        );
    }

    #[test]
    fn test_pad_sequence_pre() {
        assert_eq!(
            pad_sequence(&[1, 2], 4, SequencePadding::Pre),
            vec![0, 0, 1, 2]
        );
    }

    #[test]
    fn test_pad_sequence_truncates_from_front() {
        assert_eq!(
            pad_sequence(&[1, 2, 3, 4], 3, SequencePadding::Post),
            vec![2, 3, 4]
        );
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        struct Flat(usize);
        impl NextTokenModel for Flat {
            fn predict(&self, _: &[f32], _: &[i64]) -> Result<Vec<f32>, PipelineError> {
                let mut probs = vec![0.1; self.0];
                probs[0] = 0.0;
                Ok(probs)
            }
        }

        let vocab = small_vocabulary();
        // Indices 1..=6 tie; index 1 is the start marker, which is a real word.
        let out = greedy(3)
            .decode(&Flat(vocab.cardinality()), &vocab, &FEATURES)
            .unwrap();
        assert_eq!(out.tokens, vec![1, 1, 1]);
        assert_eq!(out.text, "startseq startseq");
    }
}
