use crate::corpus::Sentence;
use crate::errors::{HinshiError, Result};
use crate::feature::{extract_sentence_features, FeatureMap};

/// Flat sequence of feature maps, paired positionally with labels when they are required.
#[derive(Debug, Clone, Default)]
pub struct Dataset<'a> {
    pub(crate) features: Vec<FeatureMap<'a>>,
    pub(crate) labels: Vec<&'a str>,
}

impl<'a> Dataset<'a> {
    /// Builds a dataset from every token of `sentences`, in order.
    ///
    /// If `with_labels` is `false`, labels are ignored and [`Dataset::labels()`] is empty.
    ///
    /// # Errors
    ///
    /// If `with_labels` is `true` and a token has no label or an empty one,
    /// [`HinshiError::MissingLabel`] will be returned.
    pub fn from_sentences(sentences: &'a [Sentence], with_labels: bool) -> Result<Self> {
        let mut features = vec![];
        let mut labels = vec![];
        for (i, sentence) in sentences.iter().enumerate() {
            features.extend(extract_sentence_features(sentence.tokens()));
            if !with_labels {
                continue;
            }
            for (j, tag) in sentence.tags().iter().enumerate() {
                match tag.as_deref() {
                    Some(tag) if !tag.is_empty() => labels.push(tag),
                    _ => return Err(HinshiError::missing_label(i, j)),
                }
            }
        }
        Ok(Self { features, labels })
    }

    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[FeatureMap<'a>] {
        &self.features
    }

    pub fn labels(&self) -> &[&'a str] {
        &self.labels
    }
}
