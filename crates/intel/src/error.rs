use thiserror::Error;


/// Failure of an engine operation.
///
/// Every variant is request-scoped; none is fatal to the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntelError {
    /// The request itself is unusable (e.g. missing store identifier).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The store does not exist for the requesting tenant.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying read failed or timed out. Safe to retry.
    #[error("data source error: {0}")]
    DataSource(String),
}

impl IntelError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn data_source(msg: impl Into<String>) -> Self {
        Self::DataSource(msg.into())
    }

    /// The engine performs no writes, so only data-source failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IntelError::DataSource(_))
    }
}

/// Error raised by an [`InventoryDataSource`](crate::InventoryDataSource) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DataSourceError(pub String);

impl DataSourceError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<DataSourceError> for IntelError {
    fn from(value: DataSourceError) -> Self {
        IntelError::DataSource(value.0)
    }
}
