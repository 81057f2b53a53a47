//! The drug poisoning mortality document
//!
//! The loader writes one `DrugPoisoningStatistic` element per
//! (year, state, sex, race, age range) under a `DrugPoisoning` root.
//! Missing values were written as `-1`. The document is small enough to
//! be deserialized once and scanned linearly for every query.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::util::safe_open_file;
use crate::error::{Error, Result};

/// Read access to the drug poisoning statistics
pub trait DocumentStore: Send + Sync {
    /// Every statistic, in document order
    fn statistics(&self) -> &[DrugPoisoningStatistic];

    /// Statistics matching `predicate`, in document order
    fn select<'a>(
        &'a self,
        predicate: &dyn Fn(&DrugPoisoningStatistic) -> bool,
    ) -> Vec<&'a DrugPoisoningStatistic> {
        self.statistics().iter().filter(|s| predicate(s)).collect()
    }

    /// `(min, max)` over `Year`, or `None` for an empty document
    fn year_range(&self) -> Option<(i32, i32)> {
        let years = self.statistics().iter().map(|s| s.year);
        let min = years.clone().min()?;
        let max = years.max()?;
        Some((min, max))
    }

    /// Distinct state names as written in the document
    fn states(&self) -> BTreeSet<String> {
        self.statistics().iter().map(|s| s.state.clone()).collect()
    }
}

/// One drug poisoning observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DrugPoisoningStatistic {
    pub year: i32,
    pub sex: String,
    pub age_range: AgeRange,
    pub race: String,
    pub state: String,
    pub deaths: i64,
    pub population: i64,
    pub crude: CrudeRate,
    pub age_info: AgeAdjustedRate,
}

/// Age bounds split by the loader; `0` and `150` stand in for open ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgeRange {
    pub lower_bound: i32,
    pub upper_bound: i32,
}

impl AgeRange {
    /// The `lower-upper` label used in results
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}", self.lower_bound, self.upper_bound)
    }
}

/// Crude death rate statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CrudeRate {
    pub death_rate: f64,
    pub stderr: f64,
    pub low_confidence_limit: f64,
    pub upper_confidence_limit: f64,
    /// Text: split from a free-form range by the loader
    pub state_rate_lower_bound: String,
    pub state_rate_upper_bound: String,
    #[serde(rename = "USRate")]
    pub us_rate: f64,
}

/// Age-adjusted death rate statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AgeAdjustedRate {
    pub adjusted_rate: f64,
    pub stderr: f64,
    pub low_confidence_limit: f64,
    pub upper_confidence_limit: f64,
    #[serde(rename = "USRate")]
    pub us_rate: f64,
}

#[derive(Debug, Deserialize)]
struct DrugPoisoningRoot {
    #[serde(rename = "DrugPoisoningStatistic", default)]
    statistics: Vec<DrugPoisoningStatistic>,
}

/// XML-backed document store
#[derive(Debug, Clone, Default)]
pub struct DrugPoisoningDocument {
    source: Option<PathBuf>,
    statistics: Vec<DrugPoisoningStatistic>,
}

impl DrugPoisoningDocument {
    /// Load and deserialize the document at `path`
    ///
    /// # Errors
    /// `StoreUnavailable` when the file cannot be opened, `MalformedDocument`
    /// when it does not match the loader's layout.
    pub fn open(path: &Path) -> Result<Self> {
        let start = Instant::now();
        let file = safe_open_file(path, "drug poisoning document")?;
        let reader = std::io::BufReader::new(file);
        let root: DrugPoisoningRoot =
            quick_xml::de::from_reader(reader).map_err(|e| Error::MalformedDocument {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        log::info!(
            "Loaded {} drug poisoning statistics from {} in {:?}",
            root.statistics.len(),
            path.display(),
            start.elapsed()
        );
        Ok(Self {
            source: Some(path.to_path_buf()),
            statistics: root.statistics,
        })
    }

    /// Deserialize a document held in memory
    pub fn from_xml_str(xml: &str) -> Result<Self> {
        let root: DrugPoisoningRoot =
            quick_xml::de::from_str(xml).map_err(|e| Error::MalformedDocument {
                path: PathBuf::from("<memory>"),
                reason: e.to_string(),
            })?;
        Ok(Self::from_statistics(root.statistics))
    }

    #[must_use]
    pub fn from_statistics(statistics: Vec<DrugPoisoningStatistic>) -> Self {
        Self {
            source: None,
            statistics,
        }
    }

    /// File the document was loaded from, if any
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl DocumentStore for DrugPoisoningDocument {
    fn statistics(&self) -> &[DrugPoisoningStatistic] {
        &self.statistics
    }
}
