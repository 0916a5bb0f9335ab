/// Number of equal-width bins in every histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Frequency histogram of one column.
///
/// `edges` has one more entry than `counts`; bin `i` covers
/// `[edges[i], edges[i + 1])`, except the last bin which also includes its
/// right edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite values into `bins` equal-width bins spanning their range.
    /// Returns `None` when there is nothing to bin.
    pub fn from_values(column: &str, values: &[f64], bins: usize) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return None;
        }

        let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let width = (hi - lo) / bins as f64;

        let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Some(Histogram {
            column: column.to_string(),
            edges,
            counts,
        })
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Midpoint and width of bin `i`.
    pub fn bin(&self, i: usize) -> (f64, f64) {
        let (lo, hi) = (self.edges[i], self.edges[i + 1]);
        ((lo + hi) / 2.0, hi - lo)
    }
}
