#![forbid(unsafe_code)]

use courier_common::{types::StatusCode, BoxError};
use snafu::{Location, Snafu};

pub mod channel;

/// Endpoint operation a transport failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Send,
    Receive,
    DeleteBatch,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Send => write!(f, "send"),
            Operation::Receive => write!(f, "receive"),
            Operation::DeleteBatch => write!(f, "delete batch"),
        }
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("invalid argument: {message}"))]
    InvalidArgument {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("operation cancelled"))]
    Cancelled {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("{op} request to the queue endpoint failed"))]
    EndpointFault {
        op: Operation,
        #[snafu(source)]
        error: BoxError,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("queue endpoint answered {op} with status {status}"))]
    EndpointStatus {
        op: Operation,
        status: StatusCode,
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("the message consumer failed"))]
    Consumer {
        #[snafu(source)]
        error: BoxError,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled { .. })
    }

    /// Either face of a transport failure: a faulted call or a status >= 400.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::EndpointFault { .. } | Error::EndpointStatus { .. }
        )
    }
}
