//! Definition of errors.

use std::error::Error;
use std::fmt;

pub type Result<T, E = HinshiError> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum HinshiError {
    CorruptCorpus(CorruptCorpusError),
    MissingLabel(MissingLabelError),
    NotFitted,
    UnknownLabelDomain,
    CorruptArtifact(CorruptArtifactError),
    InvalidArgument(InvalidArgumentError),
    CastError(std::num::TryFromIntError),
    EncodeError(bincode::error::EncodeError),
    IOError(std::io::Error),
}

impl HinshiError {
    pub(crate) fn corrupt_corpus<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::CorruptCorpus(CorruptCorpusError { msg: msg.into() })
    }

    pub(crate) const fn missing_label(sentence: usize, token: usize) -> Self {
        Self::MissingLabel(MissingLabelError { sentence, token })
    }

    pub(crate) fn corrupt_artifact<S>(msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::CorruptArtifact(CorruptArtifactError { msg: msg.into() })
    }

    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument(InvalidArgumentError {
            arg,
            msg: msg.into(),
        })
    }
}

impl fmt::Display for HinshiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::CorruptCorpus(e) => e.fmt(f),
            Self::MissingLabel(e) => e.fmt(f),
            Self::NotFitted => {
                write!(f, "NotFittedError: the tagger has not been trained or loaded")
            }
            Self::UnknownLabelDomain => {
                write!(f, "UnknownLabelDomainError: the classifier has no labels")
            }
            Self::CorruptArtifact(e) => e.fmt(f),
            Self::InvalidArgument(e) => e.fmt(f),
            Self::CastError(e) => e.fmt(f),
            Self::EncodeError(e) => e.fmt(f),
            Self::IOError(e) => e.fmt(f),
        }
    }
}

impl Error for HinshiError {}

/// Error used when a corpus cannot be read.
#[derive(Debug)]
pub struct CorruptCorpusError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for CorruptCorpusError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CorruptCorpusError: {}", self.msg)
    }
}

impl Error for CorruptCorpusError {}

/// Error used when a token has no label but one is required.
#[derive(Debug)]
pub struct MissingLabelError {
    /// Index of the sentence.
    pub(crate) sentence: usize,

    /// Index of the token in the sentence.
    pub(crate) token: usize,
}

impl fmt::Display for MissingLabelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "MissingLabelError: token {} of sentence {} has no label",
            self.token, self.sentence
        )
    }
}

impl Error for MissingLabelError {}

/// Error used when a model file cannot be restored.
#[derive(Debug)]
pub struct CorruptArtifactError {
    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for CorruptArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CorruptArtifactError: {}", self.msg)
    }
}

impl Error for CorruptArtifactError {}

/// Error used when the argument is invalid.
#[derive(Debug)]
pub struct InvalidArgumentError {
    /// Name of the argument.
    pub(crate) arg: &'static str,

    /// Error message.
    pub(crate) msg: String,
}

impl fmt::Display for InvalidArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "InvalidArgumentError: {}: {}", self.arg, self.msg)
    }
}

impl Error for InvalidArgumentError {}

impl From<std::num::TryFromIntError> for HinshiError {
    fn from(error: std::num::TryFromIntError) -> Self {
        Self::CastError(error)
    }
}

impl From<bincode::error::EncodeError> for HinshiError {
    fn from(error: bincode::error::EncodeError) -> Self {
        Self::EncodeError(error)
    }
}

impl From<std::io::Error> for HinshiError {
    fn from(error: std::io::Error) -> Self {
        Self::IOError(error)
    }
}
