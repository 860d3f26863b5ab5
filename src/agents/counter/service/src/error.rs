/*
   Polar (OSS)

   Copyright 2024 Carnegie Mellon University.

   NO WARRANTY. THIS CARNEGIE MELLON UNIVERSITY AND SOFTWARE ENGINEERING INSTITUTE MATERIAL IS
   FURNISHED ON AN "AS-IS" BASIS. CARNEGIE MELLON UNIVERSITY MAKES NO WARRANTIES OF ANY KIND,
   EITHER EXPRESSED OR IMPLIED, AS TO ANY MATTER INCLUDING, BUT NOT LIMITED TO, WARRANTY OF FITNESS
   FOR PURPOSE OR MERCHANTABILITY, EXCLUSIVITY, OR RESULTS OBTAINED FROM USE OF THE MATERIAL.
   CARNEGIE MELLON UNIVERSITY DOES NOT MAKE ANY WARRANTY OF ANY KIND WITH RESPECT TO FREEDOM FROM
   PATENT, TRADEMARK, OR COPYRIGHT INFRINGEMENT.

   Licensed under a MIT-style license, please see license.txt or contact permission@sei.cmu.edu for
   full terms.

   [DISTRIBUTION STATEMENT A] This material has been approved for public release and unlimited
   distribution.  Please see Copyright notice for non-US Government use and distribution.

   This Software includes and/or makes use of Third-Party Software each subject to its own license.

   DM24-0470
*/

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pushbutton::{
    CounterSnapshot, BAD_REQUEST_STR, INTERNAL_ERROR_STR, METHOD_NOT_ALLOWED_STR,
};
use thiserror::Error;
use tracing::{debug, error};

/// Failures talking to the counter store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("counter store is not configured: {0} is missing")]
    Unconfigured(&'static str),

    #[error("counter store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("counter store responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("counter store reported an unreadable count: {0}")]
    InvalidCount(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, unparseable or stale press timestamp, or a body that isn't a press at all.
    #[error("Malformed press: {0}")]
    Validation(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] StoreError),

    #[error("Method not allowed")]
    MethodNotSupported,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(reason) => {
                debug!("Rejecting press. {reason}");
                (StatusCode::BAD_REQUEST, BAD_REQUEST_STR)
            }
            ApiError::Upstream(e) => {
                error!("{e}");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_STR)
            }
            ApiError::MethodNotSupported => (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_STR),
        };

        (status, Json(CounterSnapshot::failed(message))).into_response()
    }
}
