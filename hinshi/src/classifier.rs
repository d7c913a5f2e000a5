use std::str::FromStr;
use std::thread;
use std::time::Instant;

use bincode::{Decode, Encode};
use hashbrown::HashMap;
use liblinear::LibLinearModel;

use crate::encoder::FeatureVector;
use crate::errors::{HinshiError, Result};

/// Solver type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SolverType {
    /// L2-regularized logistic regression (primal).
    #[default]
    L2RegularizedLogistic = 0,

    /// L2-regularized L2-loss support vector classification (dual).
    L2RegularizedL2LossSVCDual = 1,

    /// L2-regularized L2-loss support vector classification (primal).
    L2RegularizedL2LossSVC = 2,

    /// L2-regularized L1-loss support vector classification (dual)
    L2RegularizedL1LossSVCDual = 3,

    /// support vector classification by Crammer and Singer
    CrammerSingerSVC = 4,

    /// L1-regularized L2-loss support vector classification
    L1RegularizedL2LossSVC = 5,

    /// L1-regularized logistic regression
    L1RegularizedLogistic = 6,

    /// L2-regularized logistic regression (dual).
    L2RegularizedLogisticDual = 7,
}

impl FromStr for SolverType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Self::L2RegularizedLogistic),
            "1" => Ok(Self::L2RegularizedL2LossSVCDual),
            "2" => Ok(Self::L2RegularizedL2LossSVC),
            "3" => Ok(Self::L2RegularizedL1LossSVCDual),
            "4" => Ok(Self::CrammerSingerSVC),
            "5" => Ok(Self::L1RegularizedL2LossSVC),
            "6" => Ok(Self::L1RegularizedLogistic),
            "7" => Ok(Self::L2RegularizedLogisticDual),
            _ => Err("Unsupported solver type."),
        }
    }
}

impl From<SolverType> for liblinear::SolverType {
    fn from(solver: SolverType) -> Self {
        match solver {
            SolverType::L2RegularizedLogistic => Self::L2R_LR,
            SolverType::L2RegularizedL2LossSVCDual => Self::L2R_L2LOSS_SVC_DUAL,
            SolverType::L2RegularizedL2LossSVC => Self::L2R_L2LOSS_SVC,
            SolverType::L2RegularizedL1LossSVCDual => Self::L2R_L1LOSS_SVC_DUAL,
            SolverType::CrammerSingerSVC => Self::MCSVM_CS,
            SolverType::L1RegularizedL2LossSVC => Self::L1R_L2LOSS_SVC,
            SolverType::L1RegularizedLogistic => Self::L1R_LR,
            SolverType::L2RegularizedLogisticDual => Self::L2R_LR_DUAL,
        }
    }
}

/// Hyperparameters of [`LinearClassifier::fit()`].
///
/// # Examples
///
/// ```
/// use hinshi::{SolverType, TrainParams};
///
/// let params = TrainParams::default()
///     .solver(SolverType::L2RegularizedL2LossSVCDual)
///     .costs(vec![0.1, 1.0, 10.0])
///     .n_folds(3)
///     .n_threads(2);
/// assert_eq!(3, params.get_costs().len());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TrainParams {
    solver: SolverType,
    epsilon: f64,
    costs: Vec<f64>,
    n_folds: usize,
    n_threads: usize,
}

impl Default for TrainParams {
    /// L2-regularized logistic regression, `epsilon = 0.01`, 10 costs log-spaced in
    /// `[1e-4, 1e4]`, 5 folds, one thread per available core.
    fn default() -> Self {
        Self {
            solver: SolverType::default(),
            epsilon: 0.01,
            costs: (0..10)
                .map(|i| 10f64.powf(-4.0 + 8.0 * f64::from(i) / 9.0))
                .collect(),
            n_folds: 5,
            n_threads: thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl TrainParams {
    /// Sets the solver.
    pub fn solver(mut self, solver: SolverType) -> Self {
        self.solver = solver;
        self
    }

    /// Sets the tolerance of the termination criterion.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Sets the candidates of the cost parameter C. With a single candidate, cross-validation is
    /// skipped.
    pub fn costs(mut self, costs: Vec<f64>) -> Self {
        self.costs = costs;
        self
    }

    /// Sets the number of cross-validation folds.
    pub fn n_folds(mut self, n_folds: usize) -> Self {
        self.n_folds = n_folds;
        self
    }

    /// Sets the number of cross-validation worker threads.
    pub fn n_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    pub const fn get_solver(&self) -> SolverType {
        self.solver
    }

    pub const fn get_epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn get_costs(&self) -> &[f64] {
        &self.costs
    }

    pub const fn get_n_folds(&self) -> usize {
        self.n_folds
    }

    pub const fn get_n_threads(&self) -> usize {
        self.n_threads
    }

    fn validate(&self) -> Result<()> {
        if self.costs.is_empty() {
            return Err(HinshiError::invalid_argument("costs", "is empty"));
        }
        if self.costs.iter().any(|&c| !(c.is_finite() && c > 0.0)) {
            return Err(HinshiError::invalid_argument(
                "costs",
                "must be positive finite numbers",
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(HinshiError::invalid_argument(
                "epsilon",
                "must be a positive finite number",
            ));
        }
        Ok(())
    }
}

/// Training examples with labels replaced by class ids.
struct Problem<'a> {
    xs: &'a [FeatureVector],
    ys: Vec<usize>,
    n_labels: usize,
    n_features: usize,
}

/// Weights and biases of a linear model.
struct Weights {
    // The weight of feature `i` for class `j` is at `(i - 1) * n_labels + j`.
    weights: Vec<f64>,
    bias: Vec<f64>,
}

/// Returns the class with the highest decision value. Ties go to the smaller class id.
fn decide(weights: &[f64], bias: &[f64], x: &FeatureVector) -> usize {
    let n_labels = bias.len();
    let mut scores = bias.to_vec();
    for &(fid, value) in x {
        let Some(start) = (fid as usize).checked_sub(1).map(|i| i * n_labels) else {
            continue;
        };
        if let Some(row) = weights.get(start..start + n_labels) {
            for (score, &w) in scores.iter_mut().zip(row) {
                *score += w * value;
            }
        }
    }
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Assigns examples to folds so that each class is spread evenly over the folds.
fn stratified_folds(ys: &[usize], n_folds: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ys.len()).collect();
    order.sort_by_key(|&i| ys[i]);
    let mut folds = vec![0; ys.len()];
    for (pos, &i) in order.iter().enumerate() {
        folds[i] = pos % n_folds;
    }
    folds
}

impl Problem<'_> {
    /// Trains a model on the examples at `indices`.
    fn train(&self, indices: &[usize], cost: f64, params: &TrainParams) -> Result<Weights> {
        let mut weights = vec![0.0; self.n_features * self.n_labels];
        let mut bias = vec![0.0; self.n_labels];

        // A single class needs no solver.
        let first = self.ys[indices[0]];
        if indices.iter().all(|&i| self.ys[i] == first) {
            bias[first] = 1.0;
            return Ok(Weights { weights, bias });
        }

        let xs = indices.iter().map(|&i| self.xs[i].clone()).collect();
        let ys = indices.iter().map(|&i| self.ys[i] as f64).collect();
        let mut builder = liblinear::Builder::new();
        let training_input = liblinear::util::TrainingInput::from_sparse_features(ys, xs)
            .map_err(|e| HinshiError::invalid_argument("xs", format!("liblinear error: {e:?}")))?;
        builder.problem().input_data(training_input).bias(1.0);
        builder
            .parameters()
            .solver_type(params.solver.into())
            .stopping_criterion(params.epsilon)
            .constraints_violation_cost(cost);
        let model = builder
            .build_model()
            .map_err(|e| HinshiError::invalid_argument("params", e.to_string()))?;

        for (i, &cls) in model.labels().iter().enumerate() {
            let i = i32::try_from(i)?;
            let cls = usize::try_from(cls)?;
            bias[cls] = model.label_bias(i);
            for fid in 1..=model.num_features() {
                weights[(fid - 1) * self.n_labels + cls] =
                    model.feature_coefficient(i32::try_from(fid)?, i);
            }
        }
        Ok(Weights { weights, bias })
    }

    /// Trains on all folds but `fold` and returns the accuracy on `fold`.
    fn score_fold(
        &self,
        folds: &[usize],
        fold: usize,
        cost: f64,
        params: &TrainParams,
    ) -> Result<f64> {
        let (test, train): (Vec<usize>, Vec<usize>) =
            (0..self.xs.len()).partition(|&i| folds[i] == fold);
        let model = self.train(&train, cost, params)?;
        let n_correct = test
            .iter()
            .filter(|&&i| decide(&model.weights, &model.bias, &self.xs[i]) == self.ys[i])
            .count();
        Ok(n_correct as f64 / test.len() as f64)
    }

    /// Selects the cost and trains on all examples.
    fn fit(&self, params: &TrainParams) -> Result<(f64, Weights)> {
        let n_folds = params.n_folds.min(self.xs.len());
        let cost = if params.costs.len() >= 2 && n_folds >= 2 {
            self.select_cost(n_folds, params)?
        } else {
            params.costs[0]
        };
        log::info!("Selected C = {cost}");
        let indices: Vec<usize> = (0..self.xs.len()).collect();
        Ok((cost, self.train(&indices, cost, params)?))
    }

    /// Selects the cost with the best mean cross-validation accuracy.
    fn select_cost(&self, n_folds: usize, params: &TrainParams) -> Result<f64> {
        let costs = params.get_costs();
        let folds = stratified_folds(&self.ys, n_folds);
        let n_tasks = costs.len() * n_folds;
        let n_threads = params.n_threads.clamp(1, n_tasks);

        let (task_tx, task_rx) = crossbeam_channel::unbounded();
        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        for c in 0..costs.len() {
            for fold in 0..n_folds {
                task_tx.send((c, fold)).unwrap();
            }
        }
        drop(task_tx);

        let folds = &folds[..];
        thread::scope(|scope| {
            for _ in 0..n_threads {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    for (c, fold) in task_rx {
                        let score = self.score_fold(folds, fold, costs[c], params);
                        result_tx.send((c, score)).unwrap();
                    }
                });
            }
        });
        drop(result_tx);

        let mut scores = vec![0.0; costs.len()];
        for (c, score) in result_rx {
            scores[c] += score? / n_folds as f64;
        }
        let mut best = 0;
        for (c, &score) in scores.iter().enumerate() {
            log::debug!("C = {}: cross-validation accuracy {:.4}", costs[c], score);
            if score > scores[best] {
                best = c;
            }
        }
        Ok(costs[best])
    }
}

/// Multi-class linear classifier.
///
/// Training uses LIBLINEAR; the learned weights are copied out so that the classifier can be
/// serialized and used for prediction without it.
///
/// # Examples
///
/// ```
/// use hinshi::{LinearClassifier, TrainParams};
///
/// let xs = vec![vec![(1, 1.0)], vec![(2, 1.0)], vec![(1, 1.0)], vec![(2, 1.0)]];
/// let ys = ["NOUN", "VERB", "NOUN", "VERB"];
/// let mut classifier = LinearClassifier::new();
/// classifier.fit(&xs, &ys, &TrainParams::default().costs(vec![1.0])).unwrap();
/// assert_eq!(vec!["NOUN", "VERB"], classifier.predict(&xs[..2]).unwrap());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Decode, Encode)]
pub struct LinearClassifier {
    pub(crate) labels: Vec<String>,
    pub(crate) n_features: u32,
    pub(crate) weights: Vec<f64>,
    pub(crate) bias: Vec<f64>,
    pub(crate) cost: f64,
}

impl LinearClassifier {
    /// Creates an unfitted classifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets labels in the order they were first seen during fitting.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Gets the cost parameter chosen during fitting.
    pub const fn cost(&self) -> f64 {
        self.cost
    }

    /// Gets the number of dimensions the classifier has weights for.
    pub const fn n_features(&self) -> u32 {
        self.n_features
    }

    pub fn is_fitted(&self) -> bool {
        !self.labels.is_empty()
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.bias.len() == self.labels.len()
            && self.weights.len() == self.n_features as usize * self.labels.len()
    }

    /// Trains the classifier. The cost parameter is selected by stratified cross-validation over
    /// the candidates in `params`, then the model is refit on all examples.
    ///
    /// The classifier is left untouched if an error is returned.
    ///
    /// # Errors
    ///
    /// [`HinshiError::InvalidArgument`] will be returned if the inputs are empty or of different
    /// lengths, if `params` is invalid, or if LIBLINEAR rejects the problem.
    pub fn fit<S>(&mut self, xs: &[FeatureVector], ys: &[S], params: &TrainParams) -> Result<()>
    where
        S: AsRef<str>,
    {
        if xs.len() != ys.len() {
            return Err(HinshiError::invalid_argument(
                "ys",
                format!("expected {} labels, got {}", xs.len(), ys.len()),
            ));
        }
        if xs.is_empty() {
            return Err(HinshiError::invalid_argument("xs", "is empty"));
        }
        params.validate()?;

        let mut label_ids = HashMap::new();
        let mut labels = vec![];
        let ys = ys
            .iter()
            .map(|y| {
                let y = y.as_ref();
                *label_ids.entry(y).or_insert_with(|| {
                    labels.push(y.to_string());
                    labels.len() - 1
                })
            })
            .collect();
        let n_features = xs
            .iter()
            .filter_map(|x| x.last())
            .map(|&(fid, _)| fid)
            .max()
            .unwrap_or(0);
        let problem = Problem {
            xs,
            ys,
            n_labels: labels.len(),
            n_features: usize::try_from(n_features)?,
        };

        liblinear::toggle_liblinear_stdout_output(false);
        let start = Instant::now();
        let result = problem.fit(params);
        liblinear::toggle_liblinear_stdout_output(true);
        let (cost, Weights { weights, bias }) = result?;
        log::info!(
            "Trained {} classes over {} features in {:.3} secs",
            labels.len(),
            n_features,
            start.elapsed().as_secs_f64()
        );

        *self = Self {
            labels,
            n_features,
            weights,
            bias,
            cost,
        };
        Ok(())
    }

    /// Predicts a label for each vector.
    ///
    /// # Errors
    ///
    /// [`HinshiError::UnknownLabelDomain`] will be returned if the classifier is not fitted.
    pub fn predict(&self, xs: &[FeatureVector]) -> Result<Vec<&str>> {
        if !self.is_fitted() {
            return Err(HinshiError::UnknownLabelDomain);
        }
        Ok(xs
            .iter()
            .map(|x| self.labels[decide(&self.weights, &self.bias, x)].as_str())
            .collect())
    }
}
