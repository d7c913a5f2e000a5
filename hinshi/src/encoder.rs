use std::collections::BTreeMap;

use bincode::{Decode, Encode};

use crate::errors::Result;
use crate::feature::{FeatureMap, FeatureValue};

/// Sparse feature vector: `(dimension, value)` pairs sorted by dimension. Dimensions start at 1.
pub type FeatureVector = Vec<(u32, f64)>;

/// Encoder from [`FeatureMap`]s to sparse vectors.
///
/// String features are one-hot encoded as `name=value`, boolean features use the dimension
/// `name` with the value `1.0` or `0.0`. Zero entries are not stored.
#[derive(Debug, Default, Clone, PartialEq, Decode, Encode)]
pub struct VectorEncoder {
    // Uses BTreeMap to improve compression ratio.
    feature_ids: BTreeMap<String, u32>,
}

impl VectorEncoder {
    /// Creates an encoder with an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the number of dimensions.
    pub fn n_features(&self) -> usize {
        self.feature_ids.len()
    }

    /// Gets the vocabulary.
    pub fn feature_ids(&self) -> &BTreeMap<String, u32> {
        &self.feature_ids
    }

    /// Builds the vocabulary from `features` and encodes them.
    ///
    /// Dimensions are assigned in the order features are first seen.
    ///
    /// # Errors
    ///
    /// [`HinshiError::CastError`](crate::errors::HinshiError::CastError) will be returned if the
    /// vocabulary outgrows the dimension type.
    pub fn fit_transform<'a, 'b, I>(&mut self, features: I) -> Result<Vec<FeatureVector>>
    where
        'a: 'b,
        I: IntoIterator<Item = &'b FeatureMap<'a>>,
    {
        let mut key = String::new();
        features
            .into_iter()
            .map(|feature_map| -> Result<FeatureVector> {
                let mut xs = vec![];
                for (name, value) in feature_map.iter() {
                    let value = make_key(&mut key, name, value);
                    let id = match self.feature_ids.get(key.as_str()) {
                        Some(&id) => id,
                        None => {
                            let new_id = u32::try_from(self.feature_ids.len() + 1)?;
                            self.feature_ids.insert(key.clone(), new_id);
                            new_id
                        }
                    };
                    if value != 0.0 {
                        xs.push((id, value));
                    }
                }
                xs.sort_unstable_by_key(|&(id, _)| id);
                Ok(xs)
            })
            .collect()
    }

    /// Encodes `features` using the fitted vocabulary. Unknown features are dropped.
    pub fn transform<'a, 'b, I>(&self, features: I) -> Vec<FeatureVector>
    where
        'a: 'b,
        I: IntoIterator<Item = &'b FeatureMap<'a>>,
    {
        let mut key = String::new();
        features
            .into_iter()
            .map(|feature_map| {
                let mut xs = vec![];
                for (name, value) in feature_map.iter() {
                    let value = make_key(&mut key, name, value);
                    if let Some(&id) = self.feature_ids.get(key.as_str()) {
                        if value != 0.0 {
                            xs.push((id, value));
                        }
                    }
                }
                xs.sort_unstable_by_key(|&(id, _)| id);
                xs
            })
            .collect()
    }
}

/// Writes the vocabulary key of a feature into `key` and returns its value.
fn make_key(key: &mut String, name: &str, value: FeatureValue) -> f64 {
    key.clear();
    key.push_str(name);
    match value {
        FeatureValue::Bool(b) => f64::from(u8::from(b)),
        FeatureValue::Str(s) => {
            key.push('=');
            key.push_str(s);
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::feature::extract_sentence_features;

    #[test]
    fn test_fit_transform_vocabulary() {
        let sent = ["Dogs", "bark"];
        let features: Vec<_> = extract_sentence_features(&sent).collect();
        let mut encoder = VectorEncoder::new();
        let xs = encoder.fit_transform(&features).unwrap();

        assert_eq!(2, xs.len());
        assert_eq!(Some(&1), encoder.feature_ids().get("token=Dogs"));
        assert_eq!(Some(&2), encoder.feature_ids().get("is_first"));
        assert!(encoder.feature_ids().contains_key("token=bark"));
        assert!(encoder.feature_ids().contains_key("prev-token=Dogs"));

        // All 15 features of "Dogs" plus 7 string features of "bark" not seen before.
        assert_eq!(15 + 7, encoder.n_features());
    }

    #[test]
    fn test_fit_transform_sorted_and_sparse() {
        let sent = ["Dogs", "bark"];
        let features: Vec<_> = extract_sentence_features(&sent).collect();
        let mut encoder = VectorEncoder::new();
        let xs = encoder.fit_transform(&features).unwrap();

        for x in &xs {
            assert!(x.windows(2).all(|w| w[0].0 < w[1].0));
            assert!(x.iter().all(|&(_, v)| v == 1.0));
        }
        let is_first = encoder.feature_ids()["is_first"];
        assert!(xs[0].contains(&(is_first, 1.0)));
        assert!(!xs[1].iter().any(|&(id, _)| id == is_first));
    }

    #[test]
    fn test_transform_drops_unknown() {
        let train = ["Dogs", "bark"];
        let train_features: Vec<_> = extract_sentence_features(&train).collect();
        let mut encoder = VectorEncoder::new();
        let fitted = encoder.fit_transform(&train_features).unwrap();
        let n_features = encoder.n_features();

        let test = ["Cats", "bark"];
        let test_features: Vec<_> = extract_sentence_features(&test).collect();
        let xs = encoder.transform(&test_features);

        assert_eq!(n_features, encoder.n_features());
        assert!(!encoder.feature_ids().contains_key("token=Cats"));
        assert_eq!(2, xs.len());
        assert!(xs[0].len() < fitted[0].len());
        assert!(xs[0].iter().all(|&(id, _)| id as usize <= n_features));
    }

    #[test]
    fn test_transform_matches_fit_transform() {
        let sent = ["I", "do", "n't", "think", "it", "matters"];
        let features: Vec<_> = extract_sentence_features(&sent).collect();
        let mut encoder = VectorEncoder::new();
        let fitted = encoder.fit_transform(&features).unwrap();

        assert_eq!(fitted, encoder.transform(&features));
    }

    #[test]
    fn test_transform_unfitted() {
        let sent = ["Dogs"];
        let features: Vec<_> = extract_sentence_features(&sent).collect();
        let encoder = VectorEncoder::new();

        assert_eq!(vec![FeatureVector::new()], encoder.transform(&features));
    }
}
