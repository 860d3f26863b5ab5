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

use pushbutton::{CounterSnapshot, PressRequest, BUTTON_RESOURCE_PATH};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not reach the counter service: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("unreadable response from the counter service: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("counter service returned {status}: {error}")]
    Status { status: u16, error: String },
    #[error("counter service reported: {0}")]
    Rejected(String),
}

/// The two operations of the counter service, as the view sees them.
#[ractor::async_trait]
pub trait CounterApi: Send + Sync + 'static {
    async fn get_count(&self) -> Result<u64, FetchError>;

    /// Record one press. The returned count is what the service reported for the insert.
    async fn record_press(&self, press: PressRequest) -> Result<u64, FetchError>;
}

pub struct HttpCounterApi {
    client: Client,
    endpoint: String,
}

impl HttpCounterApi {
    /// `base_url` is the service root, e.g. `http://127.0.0.1:3000`.
    pub fn new(client: Client, base_url: &str) -> Self {
        HttpCounterApi {
            client,
            endpoint: format!("{}{BUTTON_RESOURCE_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

async fn read_snapshot(response: reqwest::Response) -> Result<u64, FetchError> {
    let status = response.status();
    if !status.is_success() {
        // the body is still a snapshot on errors, but only its message is worth keeping
        let error = match response.json::<CounterSnapshot>().await {
            Ok(snapshot) => snapshot.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        };
        return Err(FetchError::Status {
            status: status.as_u16(),
            error,
        });
    }

    let snapshot = response
        .json::<CounterSnapshot>()
        .await
        .map_err(FetchError::Decode)?;

    if snapshot.is_ok() {
        Ok(snapshot.count)
    } else {
        Err(FetchError::Rejected(snapshot.error))
    }
}

#[ractor::async_trait]
impl CounterApi for HttpCounterApi {
    async fn get_count(&self) -> Result<u64, FetchError> {
        debug!("GET {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        read_snapshot(response).await
    }

    async fn record_press(&self, press: PressRequest) -> Result<u64, FetchError> {
        debug!("POST {} ts={:?}", self.endpoint, press.ts);
        let response = self
            .client
            .post(&self.endpoint)
            .json(&press)
            .send()
            .await
            .map_err(FetchError::Transport)?;
        read_snapshot(response).await
    }
}
