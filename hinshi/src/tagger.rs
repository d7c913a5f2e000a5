use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::classifier::TrainParams;
use crate::corpus::CorpusReader;
use crate::errors::{HinshiError, Result};
use crate::metrics::TestReport;
use crate::model::Model;

const DEFAULT_ZSTD_LEVEL: i32 = 19;

/// Part-of-speech tagger.
///
/// A tagger starts unfitted and becomes fitted by [`PosTagger::train()`] or [`PosTagger::load()`].
///
/// # Examples
///
/// ```no_run
/// use hinshi::{PosTagger, TrainParams};
///
/// let mut tagger = PosTagger::new(TrainParams::default());
/// let train_accuracy = tagger.train("train.tsv").unwrap();
/// println!("{train_accuracy}");
/// println!("{:?}", tagger.tag(&["Dogs", "bark"]).unwrap());
/// tagger.save("tagger.model.zst").unwrap();
/// ```
#[derive(Debug)]
pub struct PosTagger {
    params: TrainParams,
    reader: CorpusReader,
    zstd_level: i32,
    model: Option<Model>,
}

impl PosTagger {
    /// Creates an unfitted tagger.
    pub fn new(params: TrainParams) -> Self {
        Self {
            params,
            reader: CorpusReader::new(),
            zstd_level: DEFAULT_ZSTD_LEVEL,
            model: None,
        }
    }

    /// Creates a fitted tagger from a trained model.
    ///
    /// Training parameters are set to their defaults.
    pub fn from_model(model: Model) -> Self {
        Self {
            model: Some(model),
            ..Self::new(TrainParams::default())
        }
    }

    /// Rejects malformed corpus rows instead of treating them as sentence boundaries.
    pub fn strict_corpus(mut self, strict: bool) -> Self {
        self.reader = self.reader.strict(strict);
        self
    }

    /// Sets the zstd compression level used by [`PosTagger::save()`].
    pub fn zstd_level(mut self, level: i32) -> Self {
        self.zstd_level = level;
        self
    }

    pub fn is_fitted(&self) -> bool {
        self.model.is_some()
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn fitted_model(&self) -> Result<&Model> {
        self.model.as_ref().ok_or(HinshiError::NotFitted)
    }

    /// Trains a new model on the corpus at `path` and returns the training accuracy.
    ///
    /// A previous model is replaced on success and kept on failure.
    ///
    /// # Errors
    ///
    /// - [`HinshiError::CorruptCorpus`] if the corpus cannot be read.
    /// - [`HinshiError::MissingLabel`] if a token has no label.
    /// - [`HinshiError::InvalidArgument`] if the corpus has no tokens.
    pub fn train<P>(&mut self, path: P) -> Result<f64>
    where
        P: AsRef<Path>,
    {
        let sentences = self.reader.read(path)?;
        let (model, train_accuracy) = Model::train(&sentences, &self.params)?;
        self.model = Some(model);
        Ok(train_accuracy)
    }

    /// Computes the accuracy on the corpus at `path`.
    ///
    /// # Errors
    ///
    /// [`HinshiError::NotFitted`] will be returned if the tagger is not fitted.
    pub fn evaluate<P>(&self, path: P) -> Result<f64>
    where
        P: AsRef<Path>,
    {
        let model = self.fitted_model()?;
        let sentences = self.reader.read(path)?;
        model.evaluate(&sentences)
    }

    /// Computes micro-averaged scores and the confusion matrix on the corpus at `path`.
    ///
    /// # Errors
    ///
    /// [`HinshiError::NotFitted`] will be returned if the tagger is not fitted.
    pub fn test<P>(&self, path: P) -> Result<TestReport>
    where
        P: AsRef<Path>,
    {
        let model = self.fitted_model()?;
        let sentences = self.reader.read(path)?;
        model.test(&sentences)
    }

    /// Tags a tokenized sentence. The result is aligned with `tokens`.
    ///
    /// # Errors
    ///
    /// [`HinshiError::NotFitted`] will be returned if the tagger is not fitted.
    pub fn tag<S>(&self, tokens: &[S]) -> Result<Vec<(String, String)>>
    where
        S: AsRef<str>,
    {
        self.fitted_model()?.tag(tokens)
    }

    /// Tags each sentence independently.
    ///
    /// # Errors
    ///
    /// [`HinshiError::NotFitted`] will be returned if the tagger is not fitted.
    pub fn tag_sents<T, S>(&self, sentences: &[T]) -> Result<Vec<Vec<(String, String)>>>
    where
        T: AsRef<[S]>,
        S: AsRef<str>,
    {
        let model = self.fitted_model()?;
        sentences.iter().map(|s| model.tag(s.as_ref())).collect()
    }

    /// Writes the model to `path`, overwriting an existing file.
    ///
    /// The model is first written to `<path>.tmp` and then renamed, so `path` is left untouched
    /// if writing fails.
    ///
    /// # Errors
    ///
    /// [`HinshiError::NotFitted`] will be returned if the tagger is not fitted.
    pub fn save<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let model = self.fitted_model()?;
        let path = path.as_ref();
        let tmp_path = tmp_path(path);
        let result = File::create(&tmp_path)
            .map_err(HinshiError::from)
            .and_then(|f| {
                let mut f = BufWriter::new(f);
                model.write(&mut f, self.zstd_level)?;
                f.flush()?;
                Ok(())
            })
            .and_then(|()| Ok(fs::rename(&tmp_path, path)?));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
            return result;
        }
        log::info!("Model is written to {}", path.display());
        Ok(())
    }

    /// Replaces the model with the one stored at `path`.
    ///
    /// # Errors
    ///
    /// [`HinshiError::CorruptArtifact`] will be returned if the file cannot be opened or is not
    /// a valid model. The current model is kept in that case.
    pub fn load<P>(&mut self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            HinshiError::corrupt_artifact(format!("cannot open {}: {e}", path.display()))
        })?;
        self.model = Some(Model::read(BufReader::new(f))?);
        log::info!("Model is loaded from {}", path.display());
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp_path = path.as_os_str().to_owned();
    tmp_path.push(".tmp");
    PathBuf::from(tmp_path)
}

impl Default for PosTagger {
    fn default() -> Self {
        Self::new(TrainParams::default())
    }
}
