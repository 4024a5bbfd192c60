use thiserror::Error;

/// Errors attached to a single order.
///
/// These travel inside an order's result slot and are observed by whoever
/// awaits the order, so they are cheap to clone and compare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    #[error("station is unavailable")]
    StationUnavailable,
    #[error("cash register is unavailable")]
    RegisterUnavailable,
    #[error("station is closed")]
    Closed,
    #[error("station is full")]
    Full,
    #[error("station is empty")]
    Empty,
    #[error("order was cancelled")]
    Cancelled,
    #[error("order could not be completed in time, please try again later")]
    Timeout,
    #[error("invalid order kind: {0}")]
    InvalidKind(String),
    #[error("paid:{inserted}, expected:{required}")]
    InsufficientPayment { inserted: i64, required: i64 },
    #[error("invalid payment")]
    InvalidPayment,
    #[error("not enough change")]
    NotEnoughChange,
    #[error("invalid kiosk configuration")]
    InvalidConfig,
    #[error("internal error: {0}")]
    Internal(String),
}

/// Who is to blame for a failed order, as seen by the requesting side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The order itself was wrong (unknown kind, not enough money inserted).
    Rejected,
    /// The order was abandoned before completion (cancelled, timed out, closed).
    Aborted,
    /// The kiosk could not serve a valid order.
    Server,
}

impl OrderError {
    pub fn fault(&self) -> Fault {
        match self {
            Self::InvalidKind(_) | Self::InsufficientPayment { .. } | Self::InvalidPayment => {
                Fault::Rejected
            }
            Self::Cancelled | Self::Timeout | Self::Closed | Self::Full => Fault::Aborted,
            Self::StationUnavailable
            | Self::RegisterUnavailable
            | Self::Empty
            | Self::NotEnoughChange
            | Self::InvalidConfig
            | Self::Internal(_) => Fault::Server,
        }
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::Rejected => write!(f, "rejected"),
            Fault::Aborted => write!(f, "aborted"),
            Fault::Server => write!(f, "server"),
        }
    }
}

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Order error: {0}")]
    OrderError(#[from] OrderError),
}

pub type Result<T> = std::result::Result<T, KioskError>;
