use std::path::PathBuf;

use crate::facility::{FacilityType, Icao};

/// Errors from facility lookups and facility databases.
#[derive(Debug, thiserror::Error)]
pub enum FacilityError {
    #[error("unknown facility '{0}'")]
    UnknownFacility(Icao),

    #[error("nearest {category} search failed: {reason}")]
    SearchFailed {
        category: FacilityType,
        reason: String,
    },

    #[error("malformed facility database: {0}")]
    MalformedDatabase(#[from] serde_json::Error),

    #[error("failed to read facility database {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
