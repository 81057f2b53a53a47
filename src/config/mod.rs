//! Configuration for the explorer.

use std::path::PathBuf;

use crate::utils::DEFAULT_BATCH_SIZE;

/// File name the loader writes the drug poisoning document to
pub const DEFAULT_DRUG_POISONING_XML: &str = "drug-poisoning-mortality-data.xml";

/// Configuration for opening the stores
#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    /// Directory holding one Parquet file (or directory of parts) per table
    pub data_dir: PathBuf,
    /// Path to the drug poisoning XML document
    pub drug_poisoning_xml: PathBuf,
    /// Batch size for reading Parquet files
    pub batch_size: usize,
    /// Load tables in parallel
    pub parallel_load: bool,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("./data");
        Self {
            drug_poisoning_xml: data_dir.join(DEFAULT_DRUG_POISONING_XML),
            data_dir,
            batch_size: DEFAULT_BATCH_SIZE,
            parallel_load: true,
        }
    }
}

impl ExplorerConfig {
    /// Defaults overridden by `NCHS_DATA_DIR`, `NCHS_DRUG_POISONING_XML`
    /// and `NCHS_BATCH_SIZE` when set
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("NCHS_DATA_DIR") {
            config = config.with_data_dir(dir);
        }
        if let Some(xml) = lookup("NCHS_DRUG_POISONING_XML") {
            config.drug_poisoning_xml = PathBuf::from(xml);
        }
        if let Some(size) = lookup("NCHS_BATCH_SIZE").and_then(|s| s.parse::<usize>().ok()) {
            config.batch_size = size;
        }

        config
    }

    /// Point at a different data directory; the XML path follows it
    /// unless it was set explicitly elsewhere
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.drug_poisoning_xml = dir.join(DEFAULT_DRUG_POISONING_XML);
        self.data_dir = dir;
        self
    }
}
