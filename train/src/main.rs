use std::path::PathBuf;

use clap::Parser;
use hinshi::{PosTagger, SolverType, TrainParams};

#[derive(Parser, Debug)]
#[command(about = "A program to train models of Hinshi.")]
struct Args {
    /// A tagged training corpus
    #[arg(long)]
    corpus: PathBuf,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// A tagged corpus to report the accuracy of the trained model on
    #[arg(long)]
    dev: Option<PathBuf>,

    /// The epsilon stopping criterion for classifier training
    #[arg(long, default_value = "0.01")]
    eps: f64,

    /// A candidate of the cost hyperparameter. If repeated, the best one is selected by
    /// cross-validation. (default: 10 values log-spaced in [1e-4, 1e4])
    #[arg(long)]
    cost: Vec<f64>,

    /// The number of cross-validation folds
    #[arg(long, default_value = "5")]
    folds: usize,

    /// The solver. {0, 1, 2, 3, 4, 5, 6, 7} (see LIBLINEAR documentation for more details)
    #[arg(long, default_value = "0")]
    solver: SolverType,

    /// The number of cross-validation threads (0 means the number of available cores)
    #[arg(long, default_value = "0")]
    n_threads: usize,

    /// Reject malformed corpus lines instead of treating them as sentence boundaries
    #[arg(long)]
    strict: bool,

    /// The zstd compression level of the model file
    #[arg(long, default_value = "19")]
    zstd_level: i32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut params = TrainParams::default()
        .solver(args.solver)
        .epsilon(args.eps)
        .n_folds(args.folds);
    if !args.cost.is_empty() {
        params = params.costs(args.cost);
    }
    if args.n_threads != 0 {
        params = params.n_threads(args.n_threads);
    }

    let mut tagger = PosTagger::new(params)
        .strict_corpus(args.strict)
        .zstd_level(args.zstd_level);

    eprintln!("Start training...");
    let train_accuracy = tagger.train(&args.corpus)?;
    eprintln!("Finish training.");
    println!("Training accuracy: {train_accuracy}");

    if let Some(dev) = args.dev {
        let dev_accuracy = tagger.evaluate(dev)?;
        println!("Dev accuracy: {dev_accuracy}");
    }

    tagger.save(&args.model)?;

    Ok(())
}
