//! HTTP request handlers.
//!
//! Handlers parse their input, delegate to the sandbox crate and map the
//! outcome to a response. They hold no logic of their own.

pub mod exec;
pub mod files;
pub mod health;
pub mod sessions;

use crate::error::GatewayError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Json, Query};

/// Unwrap a JSON body, turning a rejection into a structured 400.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, GatewayError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| GatewayError::InvalidBody(rejection.body_text()))
}

/// Unwrap a query string, turning a rejection into a structured 400.
pub(crate) fn query<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, GatewayError> {
    params
        .map(|Query(value)| value)
        .map_err(|rejection| GatewayError::InvalidBody(rejection.body_text()))
}
