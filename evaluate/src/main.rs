use std::path::PathBuf;

use clap::Parser;
use hinshi::PosTagger;

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of Hinshi.")]
struct Args {
    /// The model file to use when tagging
    #[arg(long)]
    model: PathBuf,

    /// A tagged corpus to evaluate on
    #[arg(long)]
    corpus: PathBuf,

    /// Reject malformed corpus lines instead of treating them as sentence boundaries
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut tagger = PosTagger::default().strict_corpus(args.strict);
    tagger.load(&args.model)?;

    let report = tagger.test(&args.corpus)?;
    println!("{report}");

    Ok(())
}
