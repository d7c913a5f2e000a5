use std::io::{Read, Write};
use std::time::Instant;

use bincode::{Decode, Encode};

use crate::classifier::{LinearClassifier, TrainParams};
use crate::corpus::Sentence;
use crate::dataset::Dataset;
use crate::encoder::VectorEncoder;
use crate::errors::{HinshiError, Result};
use crate::feature::extract_sentence_features;
use crate::metrics::{accuracy, TestReport};

const MODEL_MAGIC: &[u8; 8] = b"HINSHIPT";
const FORMAT_VERSION: u32 = 1;

/// Trained tagger: a fitted encoder and the classifier trained on its vectors.
#[derive(Debug, Clone, PartialEq, Decode, Encode)]
pub struct Model {
    encoder: VectorEncoder,
    classifier: LinearClassifier,
}

impl Model {
    /// Trains a model on labeled sentences.
    ///
    /// # Returns
    ///
    /// The model and its accuracy on the training data.
    ///
    /// # Errors
    ///
    /// - [`HinshiError::MissingLabel`] if a token has no label.
    /// - [`HinshiError::InvalidArgument`] if `sentences` contains no tokens or `params` is invalid.
    pub fn train(sentences: &[Sentence], params: &TrainParams) -> Result<(Self, f64)> {
        let dataset = Dataset::from_sentences(sentences, true)?;
        if dataset.is_empty() {
            return Err(HinshiError::invalid_argument(
                "sentences",
                "contains no tokens",
            ));
        }
        log::info!("Extracting features from {} tokens", dataset.len());
        let start = Instant::now();
        let mut encoder = VectorEncoder::new();
        let xs = encoder.fit_transform(dataset.features())?;
        log::info!(
            "{} features are extracted in {:.3} secs",
            encoder.n_features(),
            start.elapsed().as_secs_f64()
        );

        let mut classifier = LinearClassifier::new();
        classifier.fit(&xs, dataset.labels(), params)?;
        let train_accuracy = accuracy(dataset.labels(), &classifier.predict(&xs)?);
        log::info!("Training accuracy: {train_accuracy}");

        Ok((
            Self {
                encoder,
                classifier,
            },
            train_accuracy,
        ))
    }

    pub fn encoder(&self) -> &VectorEncoder {
        &self.encoder
    }

    pub fn classifier(&self) -> &LinearClassifier {
        &self.classifier
    }

    /// Predicts a label for each token of `dataset`.
    pub fn predict<'m>(&'m self, dataset: &Dataset) -> Result<Vec<&'m str>> {
        let xs = self.encoder.transform(dataset.features());
        self.classifier.predict(&xs)
    }

    /// Computes the tagging accuracy on labeled sentences.
    ///
    /// # Errors
    ///
    /// [`HinshiError::MissingLabel`] will be returned if a token has no label.
    pub fn evaluate(&self, sentences: &[Sentence]) -> Result<f64> {
        let dataset = Dataset::from_sentences(sentences, true)?;
        let pred = self.predict(&dataset)?;
        Ok(accuracy(dataset.labels(), &pred))
    }

    /// Computes micro-averaged scores and the confusion matrix on labeled sentences.
    ///
    /// # Errors
    ///
    /// [`HinshiError::MissingLabel`] will be returned if a token has no label.
    pub fn test(&self, sentences: &[Sentence]) -> Result<TestReport> {
        let dataset = Dataset::from_sentences(sentences, true)?;
        let pred = self.predict(&dataset)?;
        Ok(TestReport::new(dataset.labels(), &pred))
    }

    /// Tags a tokenized sentence. An empty sentence gives an empty result.
    pub fn tag<S>(&self, tokens: &[S]) -> Result<Vec<(String, String)>>
    where
        S: AsRef<str>,
    {
        if tokens.is_empty() {
            return Ok(vec![]);
        }
        let features: Vec<_> = extract_sentence_features(tokens).collect();
        let xs = self.encoder.transform(&features);
        let tags = self.classifier.predict(&xs)?;
        Ok(tokens
            .iter()
            .zip(tags)
            .map(|(token, tag)| (token.as_ref().to_string(), tag.to_string()))
            .collect())
    }

    fn is_consistent(&self) -> bool {
        self.classifier.is_fitted()
            && self.classifier.is_consistent()
            && self.classifier.n_features() as usize <= self.encoder.n_features()
    }

    /// Exports the model as a zstd-compressed stream.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    /// * `level` - zstd compression level.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: W, level: i32) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = zstd::Encoder::new(wtr, level)?;
        wtr.write_all(MODEL_MAGIC)?;
        wtr.write_all(&FORMAT_VERSION.to_le_bytes())?;
        bincode::encode_into_std_write(self, &mut wtr, bincode::config::standard())?;
        wtr.finish()?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Errors
    ///
    /// [`HinshiError::CorruptArtifact`] will be returned if `rdr` fails, or if the stream is not
    /// a model written by [`Model::write()`] in the current format.
    pub fn read<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let mut rdr = zstd::Decoder::new(rdr)
            .map_err(|e| HinshiError::corrupt_artifact(format!("cannot decompress: {e}")))?;
        let mut magic = [0; 8];
        rdr.read_exact(&mut magic)
            .map_err(|e| HinshiError::corrupt_artifact(format!("cannot read header: {e}")))?;
        if &magic != MODEL_MAGIC {
            return Err(HinshiError::corrupt_artifact("not a model file"));
        }
        let mut version = [0; 4];
        rdr.read_exact(&mut version)
            .map_err(|e| HinshiError::corrupt_artifact(format!("cannot read header: {e}")))?;
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(HinshiError::corrupt_artifact(format!(
                "unsupported format version {version}"
            )));
        }
        let model: Self = bincode::decode_from_std_read(&mut rdr, bincode::config::standard())
            .map_err(|e| HinshiError::corrupt_artifact(format!("cannot decode: {e}")))?;
        if !model.is_consistent() {
            return Err(HinshiError::corrupt_artifact("inconsistent model shape"));
        }
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Sentence> {
        vec![
            Sentence::from_tagged([("Dogs", "NOUN"), ("bark", "VERB")]).unwrap(),
            Sentence::from_tagged([("Cats", "NOUN"), ("meow", "VERB")]).unwrap(),
            Sentence::from_tagged([("Birds", "NOUN"), ("sing", "VERB")]).unwrap(),
            Sentence::from_tagged([("Cows", "NOUN"), ("moo", "VERB")]).unwrap(),
        ]
    }

    fn params() -> TrainParams {
        TrainParams::default().costs(vec![1.0, 10.0]).n_threads(2)
    }

    #[test]
    fn test_train() {
        let (model, train_accuracy) = Model::train(&corpus(), &params()).unwrap();

        assert_eq!(1.0, train_accuracy);
        assert_eq!(&["NOUN", "VERB"], model.classifier().labels());
        assert_eq!(1.0, model.evaluate(&corpus()).unwrap());
    }

    #[test]
    fn test_train_no_tokens() {
        let result = Model::train(&[], &params());

        assert_eq!(
            "InvalidArgumentError: sentences: contains no tokens",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_train_missing_label() {
        let mut sentences = corpus();
        sentences.push(Sentence::from_tokens(["Fish", "swim"]).unwrap());
        let result = Model::train(&sentences, &params());

        assert!(matches!(result, Err(HinshiError::MissingLabel(_))));
    }

    #[test]
    fn test_tag() {
        let (model, _) = Model::train(&corpus(), &params()).unwrap();

        assert_eq!(
            vec![
                ("Horses".to_string(), "NOUN".to_string()),
                ("neigh".to_string(), "VERB".to_string()),
            ],
            model.tag(&["Horses", "neigh"]).unwrap()
        );
        assert!(model.tag::<&str>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_test_report() {
        let (model, _) = Model::train(&corpus(), &params()).unwrap();
        let report = model.test(&corpus()).unwrap();

        assert_eq!(1.0, report.accuracy);
        assert_eq!(1.0, report.f1);
        assert_eq!(4, report.confusion.get("NOUN", "NOUN"));
        assert_eq!(0, report.confusion.get("NOUN", "VERB"));
    }

    #[test]
    fn test_write_read() {
        let (model, _) = Model::train(&corpus(), &params()).unwrap();
        let mut buf = vec![];
        model.write(&mut buf, 3).unwrap();
        let restored = Model::read(buf.as_slice()).unwrap();

        assert_eq!(model, restored);
        let sent = ["Horses", "neigh", "loudly"];
        assert_eq!(model.tag(&sent).unwrap(), restored.tag(&sent).unwrap());
    }

    #[test]
    fn test_read_arbitrary_bytes() {
        let result = Model::read(&b"this is not a model"[..]);

        assert!(matches!(result, Err(HinshiError::CorruptArtifact(_))));
    }

    #[test]
    fn test_read_empty() {
        let result = Model::read(&b""[..]);

        assert!(matches!(result, Err(HinshiError::CorruptArtifact(_))));
    }

    #[test]
    fn test_read_wrong_magic() {
        let buf = zstd::encode_all(&b"HINSHI-X and some payload"[..], 3).unwrap();
        let result = Model::read(buf.as_slice());

        assert_eq!(
            "CorruptArtifactError: not a model file",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_read_wrong_version() {
        let mut payload = MODEL_MAGIC.to_vec();
        payload.extend_from_slice(&2u32.to_le_bytes());
        let buf = zstd::encode_all(payload.as_slice(), 3).unwrap();
        let result = Model::read(buf.as_slice());

        assert_eq!(
            "CorruptArtifactError: unsupported format version 2",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_read_truncated() {
        let (model, _) = Model::train(&corpus(), &params()).unwrap();
        let mut payload = MODEL_MAGIC.to_vec();
        payload.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        let mut encoded = vec![];
        bincode::encode_into_std_write(&model, &mut encoded, bincode::config::standard()).unwrap();
        payload.extend_from_slice(&encoded[..encoded.len() / 2]);
        let buf = zstd::encode_all(payload.as_slice(), 3).unwrap();
        let result = Model::read(buf.as_slice());

        assert!(matches!(result, Err(HinshiError::CorruptArtifact(_))));
    }

    fn assert_inconsistent(model: &Model) {
        let mut buf = vec![];
        model.write(&mut buf, 3).unwrap();
        let result = Model::read(buf.as_slice());

        assert_eq!(
            "CorruptArtifactError: inconsistent model shape",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_read_truncated_weights() {
        let (mut model, _) = Model::train(&corpus(), &params()).unwrap();
        model.classifier.weights.pop();

        assert_inconsistent(&model);
    }

    #[test]
    fn test_read_extra_bias() {
        let (mut model, _) = Model::train(&corpus(), &params()).unwrap();
        model.classifier.bias.push(0.0);

        assert_inconsistent(&model);
    }

    #[test]
    fn test_read_dimensions_beyond_vocabulary() {
        let (mut model, _) = Model::train(&corpus(), &params()).unwrap();
        let n_features = model.encoder.n_features() + 1;
        let n_labels = model.classifier.labels.len();
        model.classifier.n_features = u32::try_from(n_features).unwrap();
        model.classifier.weights.resize(n_features * n_labels, 0.0);

        assert!(model.classifier.is_consistent());
        assert_inconsistent(&model);
    }

    #[test]
    fn test_read_unfitted() {
        let model = Model {
            encoder: VectorEncoder::new(),
            classifier: LinearClassifier::new(),
        };
        let mut buf = vec![];
        model.write(&mut buf, 3).unwrap();
        let result = Model::read(buf.as_slice());

        assert_eq!(
            "CorruptArtifactError: inconsistent model shape",
            &result.err().unwrap().to_string()
        );
    }
}
