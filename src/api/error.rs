use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use std::time::Duration;

use crate::blockchain::{FormatError, LedgerError};

/// Errors surfaced by the HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Format(#[from] FormatError),

    #[error("{0}")]
    Ledger(#[from] LedgerError),

    #[error("Please supply a valid list of nodes")]
    MissingNodes,

    #[error("Invalid node address: {0}")]
    InvalidNode(String),

    #[error("The chain has no genesis block")]
    EmptyChain,

    #[error("No proof found within {0:?}")]
    MiningTimeout(Duration),

    #[error("The chain advanced while mining, the proof is stale")]
    StaleProof,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Format(_)
            | ApiError::Ledger(_)
            | ApiError::MissingNodes
            | ApiError::InvalidNode(_) => StatusCode::BAD_REQUEST,
            ApiError::StaleProof => StatusCode::CONFLICT,
            ApiError::MiningTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::EmptyChain | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Ledger(LedgerError::MissingPreviousHash).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidNode("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::StaleProof.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::MiningTimeout(Duration::from_secs(1)).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_ledger_message_passes_through() {
        let err = ApiError::from(LedgerError::InvalidReward {
            expected: crate::blockchain::Amount::one(),
        });
        assert_eq!(err.to_string(), "Mining reward must be 1");
    }
}
