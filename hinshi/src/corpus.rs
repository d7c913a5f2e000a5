use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::{HinshiError, Result};

/// Sentence with optional part-of-speech labels.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Sentence {
    pub(crate) tokens: Vec<String>,
    pub(crate) tags: Vec<Option<String>>,
}

impl Sentence {
    /// Creates a new [`Sentence`] from unlabeled tokens.
    ///
    /// # Errors
    ///
    /// If the given `tokens` is empty, an error variant will be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use hinshi::Sentence;
    ///
    /// let s = Sentence::from_tokens(["Gets", "the", "Job", "Done"]);
    /// assert!(s.is_ok());
    ///
    /// let s = Sentence::from_tokens(Vec::<String>::new());
    /// assert!(s.is_err());
    /// ```
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Err(HinshiError::invalid_argument("tokens", "is empty"));
        }
        let tags = vec![None; tokens.len()];
        Ok(Self { tokens, tags })
    }

    /// Creates a new [`Sentence`] from pairs of a token and its label.
    ///
    /// # Errors
    ///
    /// If the given `pairs` is empty, an error variant will be returned.
    pub fn from_tagged<I, S, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let (tokens, tags): (Vec<String>, Vec<Option<String>>) = pairs
            .into_iter()
            .map(|(token, tag)| (token.into(), Some(tag.into())))
            .unzip();
        if tokens.is_empty() {
            return Err(HinshiError::invalid_argument("pairs", "is empty"));
        }
        Ok(Self { tokens, tags })
    }

    /// Gets the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Gets the token surfaces.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Gets the labels. `None` is used for tokens without a label.
    pub fn tags(&self) -> &[Option<String>] {
        &self.tags
    }
}

/// Reader of tab-separated tagged corpora.
///
/// Each line is `TOKEN<TAB>IGNORED<TAB>LABEL`. Any other line terminates the current sentence.
///
/// # Examples
///
/// ```
/// use hinshi::CorpusReader;
///
/// let corpus = "Dogs\t_\tNOUN\nbark\t_\tVERB\n\nRun\t_\tVERB\n";
/// let sentences = CorpusReader::new().read_from(corpus.as_bytes()).unwrap();
/// assert_eq!(2, sentences.len());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CorpusReader {
    strict: bool,
}

impl CorpusReader {
    /// Creates a permissive reader.
    pub const fn new() -> Self {
        Self { strict: false }
    }

    /// Makes the reader reject non-blank lines that are not well-formed rows instead of treating
    /// them as sentence boundaries.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Reads all sentences from the file at `path`.
    ///
    /// # Errors
    ///
    /// [`HinshiError::CorruptCorpus`] will be returned if the file cannot be opened or is not
    /// valid UTF-8.
    pub fn read<P>(&self, path: P) -> Result<Vec<Sentence>>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            HinshiError::corrupt_corpus(format!("cannot open {}: {e}", path.display()))
        })?;
        let sentences = self.read_from(BufReader::new(f))?;
        log::info!(
            "{} sentences are read from {}",
            sentences.len(),
            path.display()
        );
        Ok(sentences)
    }

    /// Reads all sentences from a buffered reader.
    ///
    /// # Errors
    ///
    /// [`HinshiError::CorruptCorpus`] will be returned if `rdr` fails or yields invalid UTF-8.
    pub fn read_from<R>(&self, rdr: R) -> Result<Vec<Sentence>>
    where
        R: BufRead,
    {
        let mut sentences = vec![];
        let mut tokens = vec![];
        let mut tags = vec![];
        for (i, line) in rdr.lines().enumerate() {
            let line = line.map_err(|e| {
                HinshiError::corrupt_corpus(format!("line {}: {e}", i + 1))
            })?;
            let line = line.trim();
            let mut fields = line.split('\t');
            if let (Some(token), Some(_), Some(tag), None) =
                (fields.next(), fields.next(), fields.next(), fields.next())
            {
                tokens.push(token.to_string());
                tags.push(Some(tag.to_string()));
                continue;
            }
            if self.strict && !line.is_empty() {
                return Err(HinshiError::corrupt_corpus(format!(
                    "line {}: expected 3 tab-separated fields",
                    i + 1
                )));
            }
            if !tokens.is_empty() {
                sentences.push(Sentence {
                    tokens: std::mem::take(&mut tokens),
                    tags: std::mem::take(&mut tags),
                });
            }
        }
        if !tokens.is_empty() {
            sentences.push(Sentence { tokens, tags });
        }
        Ok(sentences)
    }
}
