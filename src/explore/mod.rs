// src/explore/mod.rs

use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::GiniPanel;

pub const DEFAULT_BINS: usize = 30;

/// Equal-width histogram over [lo, hi]; the last bin is closed on the right.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub lo: f64,
    pub hi: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        let bins = bins.max(1);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let lo = finite.iter().copied().reduce(f64::min)?;
        let hi = finite.iter().copied().reduce(f64::max)?;
        // a single distinct value gets a unit-wide range centred on it
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
        let width = (hi - lo) / bins as f64;

        let mut counts = vec![0; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Self { lo, hi, counts })
    }

    pub fn bin_width(&self) -> f64 {
        (self.hi - self.lo) / self.counts.len() as f64
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exploration {
    pub countries: usize,
    pub observations: usize,
    pub mean: Option<f64>,
    pub histogram: Option<Histogram>,
    /// Average Gini over all countries reporting in each year.
    pub yearly_mean: BTreeMap<i32, f64>,
}

pub fn yearly_mean(panel: &GiniPanel) -> BTreeMap<i32, f64> {
    let mut acc: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for (_, series) in panel.iter() {
        for (year, v) in series {
            let e = acc.entry(*year).or_default();
            e.0 += v;
            e.1 += 1;
        }
    }
    acc.into_iter()
        .map(|(y, (sum, n))| (y, sum / n as f64))
        .collect()
}

#[tracing::instrument(level = "info", skip(panel), fields(countries = panel.len()))]
pub fn explore(panel: &GiniPanel, bins: usize) -> Exploration {
    let values: Vec<f64> = panel
        .iter()
        .flat_map(|(_, s)| s.iter().map(|(_, v)| *v))
        .collect();
    let mean = if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    };
    Exploration {
        countries: panel.len(),
        observations: values.len(),
        mean,
        histogram: Histogram::new(&values, bins),
        yearly_mean: yearly_mean(panel),
    }
}

const BAR: usize = 40;

impl Exploration {
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} observations across {} countries",
            self.observations, self.countries
        );
        if let Some(m) = self.mean {
            out.push_str(&format!(", mean Gini {:.4}", m));
        }
        out.push('\n');

        if let Some(h) = &self.histogram {
            out.push_str("\nDistribution of Gini Coefficient\n");
            let peak = h.counts.iter().copied().max().unwrap_or(0).max(1);
            let w = h.bin_width();
            for (i, c) in h.counts.iter().enumerate() {
                let start = h.lo + w * i as f64;
                let bar = "#".repeat(c * BAR / peak);
                out.push_str(&format!(
                    "[{:.4}, {:.4}) {:>5} {}\n",
                    start,
                    start + w,
                    c,
                    bar
                ));
            }
        }

        if !self.yearly_mean.is_empty() {
            out.push_str("\nAverage Gini Coefficient Over Time\n");
            for (year, m) in &self.yearly_mean {
                out.push_str(&format!("{} {:.4}\n", year, m));
            }
        }
        out
    }
}
