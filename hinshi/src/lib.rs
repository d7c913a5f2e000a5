#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Hinshi
//!
//! Hinshi is a part-of-speech tagger based on a linear classifier over per-token features.
//!
//! ## Examples
//!
//! ```no_run
//! use std::io::{prelude::*, stdin};
//!
//! use hinshi::{PosTagger, TrainParams};
//!
//! let mut tagger = PosTagger::new(TrainParams::default());
//! tagger.train("train.tsv").unwrap();
//! println!("Accuracy: {}", tagger.evaluate("dev.tsv").unwrap());
//! tagger.save("tagger.model.zst").unwrap();
//!
//! let mut tagger = PosTagger::default();
//! tagger.load("tagger.model.zst").unwrap();
//! for line in stdin().lock().lines() {
//!     let line = line.unwrap();
//!     let tokens: Vec<_> = line.split_whitespace().collect();
//!     for (token, tag) in tagger.tag(&tokens).unwrap() {
//!         print!("{token}/{tag} ");
//!     }
//!     println!();
//! }
//! ```
//!
//! The corpus format is one token per line, `TOKEN<TAB>IGNORED<TAB>LABEL`, with sentences
//! separated by any other line. See [`CorpusReader`].

mod classifier;
mod corpus;
mod dataset;
mod encoder;
mod feature;
mod metrics;
mod model;
mod tagger;

pub mod errors;

pub use classifier::{LinearClassifier, SolverType, TrainParams};
pub use corpus::{CorpusReader, Sentence};
pub use dataset::Dataset;
pub use encoder::{FeatureVector, VectorEncoder};
pub use feature::{extract_features, extract_sentence_features, FeatureMap, FeatureValue};
pub use metrics::{accuracy, ConfusionMatrix, TestReport};
pub use model::Model;
pub use tagger::PosTagger;
