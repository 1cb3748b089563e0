//! Descriptive statistics, correlation, binning and kernel density.
//!
//! Conventions follow the Pandas / NumPy / SciPy defaults the charts were
//! first drawn with: sample standard deviation (ddof = 1), linearly
//! interpolated quantiles, equal-width histogram edges with a closed last
//! bin, and a Gaussian KDE using Scott's rule.

use serde::Serialize;

/// Arithmetic mean; NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1); NaN below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Quantile `q` in `[0, 1]` of an ascending slice, linear interpolation.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Pearson correlation over pairwise-complete observations.
///
/// NaN when fewer than two complete pairs exist or either side has zero
/// variance over those pairs.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width binned counts. `edges.len() == counts.len() + 1`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin `values` into `bins` equal-width bins spanning their range.
///
/// A constant input spans `[v - 0.5, v + 0.5]`. An empty input yields an
/// empty histogram.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram {
            edges: Vec::new(),
            counts: Vec::new(),
        };
    }
    let (mut lo, mut hi) = min_max(values);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    let last = bins - 1;
    for &v in values {
        let mut idx = ((((v - lo) / (hi - lo)) * bins as f64).floor() as usize).min(last);
        // The scaled index can disagree with the reported edges by one ulp.
        if v < edges[idx] {
            idx -= 1;
        } else if idx != last && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }
    Histogram { edges, counts }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

// ---------------------------------------------------------------------------
// Kernel density estimate
// ---------------------------------------------------------------------------

/// A density curve sampled on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub bandwidth: f64,
}

/// Gaussian KDE with Scott's bandwidth, evaluated on `grid_size` points
/// spanning the data range extended by `cut` bandwidths on each side.
///
/// `None` when the estimate is undefined: fewer than two values, zero
/// variance, or an empty grid.
pub fn gaussian_kde(values: &[f64], grid_size: usize, cut: f64) -> Option<DensityCurve> {
    if values.len() < 2 || grid_size == 0 {
        return None;
    }
    let std = sample_std(values);
    if !std.is_finite() || std == 0.0 {
        return None;
    }
    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);

    let (lo, hi) = min_max(values);
    let start = lo - cut * bandwidth;
    let end = hi + cut * bandwidth;
    let step = if grid_size > 1 {
        (end - start) / (grid_size - 1) as f64
    } else {
        0.0
    };

    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let x: Vec<f64> = (0..grid_size).map(|i| start + step * i as f64).collect();
    let y = x
        .iter()
        .map(|&xi| {
            let sum: f64 = values
                .iter()
                .map(|&v| {
                    let z = (xi - v) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            sum * norm
        })
        .collect();

    Some(DensityCurve { x, y, bandwidth })
}
