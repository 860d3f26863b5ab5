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
    extract::{rejection::JsonRejection, State},
    Json,
};
use pushbutton::{CounterSnapshot, PressRequest};
use tracing::{debug, info};

use crate::{error::ApiError, state::AppState, validate::validate_timestamp};

pub async fn count_handler(State(state): State<AppState>) -> Result<Json<CounterSnapshot>, ApiError> {
    let count = state.store.count().await?;
    debug!("Current press count {count}");
    Ok(Json(CounterSnapshot::ok(count)))
}

pub async fn press_handler(
    State(state): State<AppState>,
    payload: Result<Json<PressRequest>, JsonRejection>,
) -> Result<Json<CounterSnapshot>, ApiError> {
    let Json(press) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let pressed_at = validate_timestamp(press.ts.as_deref(), state.clock.now())?;

    let count = state.store.insert_press().await?;
    info!("Recorded press at {pressed_at}, store reported {count}");

    Ok(Json(CounterSnapshot::ok(count)))
}

pub async fn method_not_allowed_handler() -> ApiError {
    ApiError::MethodNotSupported
}
