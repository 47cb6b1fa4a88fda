use std::path::PathBuf;

use crate::record::RowPolicy;

/// Where city files live and how unparseable rows are treated.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub row_policy: RowPolicy,
}

impl StoreConfig {
    pub fn strict(mut self, strict: bool) -> Self {
        self.row_policy = if strict {
            RowPolicy::Reject
        } else {
            RowPolicy::Skip
        };
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            row_policy: RowPolicy::Skip,
        }
    }
}
