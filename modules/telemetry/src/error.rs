use crate::registry::SubscriptionId;
use common::position_type::UnknownPositionType;
use thiserror::Error;

/// Failures of the subscription registry.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("subscription registry is full ({0} entries)")]
    Exhausted(usize),
    #[error("subscription identifiers are exhausted")]
    IdsExhausted,
    #[error("no subscription with id {0}")]
    NotFound(SubscriptionId),
}

/// Errors reported to callers of the telemetry API.
///
/// Every variant maps to a stable [`code`](TelemetryError::code) the outer
/// request layer hands back to its callers.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TelemetryError {
    #[error(transparent)]
    UnknownType(#[from] UnknownPositionType),
    #[error("invalid period \"{0}\"")]
    InvalidPeriod(String),
    #[error("missing or malformed subscription id")]
    MissingId,
    #[error("no subscription with id {0}")]
    BadId(SubscriptionId),
    #[error("out of resources: {0}")]
    OutOfResources(RegistryError),
    #[error("no position received yet")]
    NoPosition,
}

impl TelemetryError {
    pub fn code(&self) -> &'static str {
        match self {
            TelemetryError::UnknownType(_) => "unknown-type",
            TelemetryError::InvalidPeriod(_) => "invalid-period",
            TelemetryError::MissingId => "missing-id",
            TelemetryError::BadId(_) => "bad-id",
            TelemetryError::OutOfResources(_) => "out-of-memory",
            TelemetryError::NoPosition => "no-position",
        }
    }

    /// Validation errors are the caller's fault and must not be retried.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TelemetryError::UnknownType(_)
                | TelemetryError::InvalidPeriod(_)
                | TelemetryError::MissingId
                | TelemetryError::BadId(_)
        )
    }
}

impl From<RegistryError> for TelemetryError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound(id) => TelemetryError::BadId(id),
            e => TelemetryError::OutOfResources(e),
        }
    }
}
