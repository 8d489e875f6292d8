use std::{collections::BTreeMap, fs::OpenOptions, path::Path};

use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stat names used in the k6 summary export
pub mod stat {
    pub const P95: &str = "p(95)";
    pub const P50: &str = "p(50)";
    pub const RATE: &str = "rate";
}

/// The summary document k6 writes with `--summary-export` / `handleSummary`
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ResultDocument {
    #[serde(default)]
    pub metrics: BTreeMap<String, Metric>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Metric {
    /// Stat name to value, e.g. `p(95)` or `rate`
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl ResultDocument {
    /// Read a result document from disk
    #[tracing::instrument(level = "debug")]
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .wrap_err_with(|| format!("Could not open result file {}", path.display()))?;

        serde_json::from_reader(file)
            .wrap_err_with(|| format!("Could not parse result file {}", path.display()))
    }

    /// Look up `metrics[metric].values[stat]`
    ///
    /// Returns `None` if any level is missing or the value is not a number.
    pub fn value(&self, metric: &str, stat: &str) -> Option<f64> {
        self.metrics
            .get(metric)
            .and_then(|m| m.values.get(stat))
            .and_then(Value::as_f64)
    }
}
