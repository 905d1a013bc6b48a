//! External data-plane seams.
//!
//! The dashboard consumes two read-only services per dataset: the
//! coordinate fetch (growing x/y arrays plus optional metadata columns) and
//! the streaming status report. Transport lives with the embedder; failures
//! here are transient by contract and the session retries on the next poll.

use std::collections::BTreeMap;

use dd_core::{CoreResult, DatasetId};
use dd_stream::{CoordinateSeries, StreamStatus};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service unavailable: {what}")]
    Unavailable { what: String },

    #[error("Malformed response: {what}")]
    Malformed { what: String },
}

/// Raw fetch result before the parallel-array invariant is checked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateBatch {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub meta: BTreeMap<String, Vec<f64>>,
}

impl CoordinateBatch {
    pub fn into_series(self) -> CoreResult<CoordinateSeries> {
        CoordinateSeries::from_parts(self.xs, self.ys, self.meta)
    }
}

/// Coordinate fetch service: dataset id to everything streamed so far.
pub trait CoordinateApi {
    fn fetch(&mut self, dataset_id: &DatasetId) -> ApiResult<CoordinateBatch>;
}

/// Streaming-status service.
pub trait StatusApi {
    fn fetch(&mut self, dataset_id: &DatasetId) -> ApiResult<StreamStatus>;
}
