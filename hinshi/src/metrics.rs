//! Evaluation metrics.

use std::collections::BTreeMap;
use std::fmt;

/// Ratio of positions where `gold` and `pred` agree. Returns `0.0` for empty inputs.
pub fn accuracy<S, T>(gold: &[S], pred: &[T]) -> f64
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    let n_total = gold.len().min(pred.len());
    if n_total == 0 {
        return 0.0;
    }
    let n_cor = gold
        .iter()
        .zip(pred)
        .filter(|(g, p)| g.as_ref() == p.as_ref())
        .count();
    n_cor as f64 / n_total as f64
}

/// Confusion matrix over the sorted union of gold and predicted labels.
///
/// Rows are gold labels and columns are predicted labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfusionMatrix {
    labels: Vec<String>,
    counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new<S, T>(gold: &[S], pred: &[T]) -> Self
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut label_ids = BTreeMap::new();
        for label in gold.iter().map(AsRef::as_ref) {
            label_ids.insert(label, 0);
        }
        for label in pred.iter().map(AsRef::as_ref) {
            label_ids.insert(label, 0);
        }
        for (i, id) in label_ids.values_mut().enumerate() {
            *id = i;
        }
        let mut counts = vec![vec![0; label_ids.len()]; label_ids.len()];
        for (g, p) in gold.iter().zip(pred) {
            counts[label_ids[g.as_ref()]][label_ids[p.as_ref()]] += 1;
        }
        Self {
            labels: label_ids.into_keys().map(str::to_string).collect(),
            counts,
        }
    }

    /// Gets labels in sorted order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Gets the number of tokens with the gold label `gold` predicted as `pred`.
    pub fn get(&self, gold: &str, pred: &str) -> usize {
        let Ok(i) = self.labels.binary_search_by(|l| l.as_str().cmp(gold)) else {
            return 0;
        };
        let Ok(j) = self.labels.binary_search_by(|l| l.as_str().cmp(pred)) else {
            return 0;
        };
        self.counts[i][j]
    }

    /// Gets the rows of counts.
    pub fn counts(&self) -> &[Vec<usize>] {
        &self.counts
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let label_width = self.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let count_width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .chain(self.labels.iter().map(|l| l.chars().count()))
            .max()
            .unwrap_or(0);
        write!(f, "{:label_width$}", "")?;
        for label in &self.labels {
            write!(f, " {label:>count_width$}")?;
        }
        for (label, row) in self.labels.iter().zip(&self.counts) {
            write!(f, "\n{label:label_width$}")?;
            for count in row {
                write!(f, " {count:>count_width$}")?;
            }
        }
        Ok(())
    }
}

/// Result of [`PosTagger::test()`](crate::PosTagger::test).
///
/// Precision, recall and F1 are micro-averaged over all tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
    pub confusion: ConfusionMatrix,
}

impl TestReport {
    pub fn new<S, T>(gold: &[S], pred: &[T]) -> Self
    where
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let n_total = gold.len().min(pred.len());
        let n_tp = gold
            .iter()
            .zip(pred)
            .filter(|(g, p)| g.as_ref() == p.as_ref())
            .count();
        // Every wrong prediction is a false positive of one label and a false negative of another.
        let n_fp = n_total - n_tp;
        let n_fn = n_total - n_tp;
        let precision = ratio(n_tp, n_tp + n_fp);
        let recall = ratio(n_tp, n_tp + n_fn);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2. * precision * recall / (precision + recall)
        };
        Self {
            precision,
            recall,
            f1,
            accuracy: accuracy(gold, pred),
            confusion: ConfusionMatrix::new(gold, pred),
        }
    }
}

fn ratio(n: usize, d: usize) -> f64 {
    if d == 0 {
        0.0
    } else {
        n as f64 / d as f64
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Precision: {}", self.precision)?;
        writeln!(f, "Recall: {}", self.recall)?;
        writeln!(f, "F1: {}", self.f1)?;
        writeln!(f, "Accuracy: {}", self.accuracy)?;
        write!(f, "{}", self.confusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let gold = ["DT", "NN", "VB", "NN"];
        let pred = ["DT", "NN", "NN", "NN"];

        assert_eq!(0.75, accuracy(&gold, &pred));
    }

    #[test]
    fn test_accuracy_empty() {
        let gold: [&str; 0] = [];

        assert_eq!(0.0, accuracy(&gold, &gold));
    }

    #[test]
    fn test_confusion_matrix() {
        let gold = ["NN", "VB", "NN", "DT"];
        let pred = ["NN", "NN", "JJ", "DT"];
        let cm = ConfusionMatrix::new(&gold, &pred);

        assert_eq!(&["DT", "JJ", "NN", "VB"], cm.labels());
        assert_eq!(
            &[
                vec![1, 0, 0, 0],
                vec![0, 0, 0, 0],
                vec![0, 1, 1, 0],
                vec![0, 0, 1, 0],
            ],
            cm.counts()
        );
        assert_eq!(1, cm.get("VB", "NN"));
        assert_eq!(0, cm.get("NN", "VB"));
        assert_eq!(0, cm.get("XX", "NN"));
    }

    #[test]
    fn test_confusion_matrix_display() {
        let gold = ["NN", "VB", "NN"];
        let pred = ["NN", "NN", "VB"];
        let cm = ConfusionMatrix::new(&gold, &pred);

        assert_eq!("   NN VB\nNN  1  1\nVB  1  0", cm.to_string());
    }

    #[test]
    fn test_report() {
        let gold = ["DT", "NN", "VB", "NN"];
        let pred = ["DT", "NN", "NN", "NN"];
        let report = TestReport::new(&gold, &pred);

        assert_eq!(0.75, report.precision);
        assert_eq!(0.75, report.recall);
        assert_eq!(0.75, report.f1);
        assert_eq!(0.75, report.accuracy);
        assert_eq!(2, report.confusion.get("NN", "NN"));
    }

    #[test]
    fn test_report_empty() {
        let gold: [&str; 0] = [];
        let report = TestReport::new(&gold, &gold);

        assert_eq!(0.0, report.precision);
        assert_eq!(0.0, report.f1);
        assert!(report.confusion.labels().is_empty());
    }
}
