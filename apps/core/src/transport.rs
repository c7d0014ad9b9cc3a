use serde::{Deserialize, Serialize};

use crate::contract::{CoreRequest, CoreResponse};
use crate::core_service::{Launcher, ServiceError};
use crate::revision_store::{DocumentStore, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    EntryNotFound,
    Launch,
    Conflict,
    Store,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

pub fn handle_request<S: DocumentStore>(
    launcher: &mut Launcher<S>,
    request: CoreRequest,
) -> TransportResponse {
    match launcher.handle_command(request) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_service_error(error),
        },
    }
}

pub fn handle_json<S: DocumentStore>(launcher: &mut Launcher<S>, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(launcher, request),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|error| {
        serde_json::json!({
            "status": "err",
            "error": { "code": "invalid_json", "message": error.to_string() },
        })
        .to_string()
    })
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    let message = error.to_string();
    let code = match error {
        ServiceError::EntryNotFound(_) => ErrorCode::EntryNotFound,
        ServiceError::Launch(_) => ErrorCode::Launch,
        ServiceError::Store(StoreError::Conflict { .. }) => ErrorCode::Conflict,
        ServiceError::Store(_) => ErrorCode::Store,
        ServiceError::Config(_) => ErrorCode::Config,
    };
    ErrorResponse { code, message }
}
