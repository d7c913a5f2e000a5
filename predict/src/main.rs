use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use hinshi::PosTagger;

#[derive(Parser, Debug)]
#[command(about = "A program to perform part-of-speech tagging.")]
struct Args {
    /// The model file to use when tagging
    #[arg(long)]
    model: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut tagger = PosTagger::default();
    tagger.load(&args.model)?;

    eprintln!("Start tagging");
    let mut n_tokens = 0;
    let start = Instant::now();
    let mut out = BufWriter::new(stdout().lock());
    for line in stdin().lock().lines() {
        let line = line?;
        let tokens: Vec<_> = line.split_whitespace().collect();
        let tagged = tagger.tag(&tokens)?;
        n_tokens += tagged.len();
        let tagged: Vec<_> = tagged
            .into_iter()
            .map(|(token, tag)| format!("{token}/{tag}"))
            .collect();
        writeln!(out, "{}", tagged.join(" "))?;
    }
    out.flush()?;
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [tokens/sec]",
        n_tokens as f64 / duration.as_secs_f64()
    );

    Ok(())
}
