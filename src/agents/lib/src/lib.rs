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

use chrono::{SecondsFormat, Utc};
use reqwest::{Certificate, Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;
use tracing::debug;

/// The single resource both service operations live on.
pub const BUTTON_RESOURCE_PATH: &str = "/api/button";
pub const INTERNAL_ERROR_STR: &str = "internal error";
pub const BAD_REQUEST_STR: &str = "bad request";
pub const METHOD_NOT_ALLOWED_STR: &str = "method not allowed";

/// The `{count, error}` body returned by every response of the counter service.
/// `error` is empty on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub count: u64,
    pub error: String,
}

impl CounterSnapshot {
    pub fn ok(count: u64) -> Self {
        CounterSnapshot {
            count,
            error: String::new(),
        }
    }

    pub fn failed(error: &str) -> Self {
        CounterSnapshot {
            count: 0,
            error: error.to_string(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_empty()
    }
}

/// Body of a press. `ts` is an ISO-8601 timestamp taken by the client when the button was pushed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<String>,
}

impl PressRequest {
    /// A press stamped with the current UTC time.
    pub fn now() -> Self {
        PressRequest {
            ts: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebClientError {
    #[error("failed to read proxy CA certificate {path}: {source}")]
    Certificate {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to build web client: {0}")]
    Build(#[from] reqwest::Error),
}

pub fn init_logging(service_name: &str) {
    use std::io::{stderr, IsTerminal};
    use tracing_glog::{Glog, GlogFields};
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt = tracing_subscriber::fmt::Layer::default()
        .with_ansi(stderr().is_terminal())
        .with_writer(std::io::stderr)
        .event_format(Glog::default())
        .fmt_fields(GlogFields::default().compact());

    if tracing_subscriber::registry()
        .with(filter)
        .with(fmt)
        .try_init()
        .is_err()
    {
        eprintln!("Logging registry already initialized");
    }

    debug!("{service_name} logging initialized");
}

/// Helper function to parse a file at a given path and return the raw bytes as a vector
pub fn get_file_as_byte_vec(filename: &str) -> Result<Vec<u8>, std::io::Error> {
    let mut f = std::fs::File::open(filename)?;
    let mut buffer = Vec::new();
    f.read_to_end(&mut buffer)?;
    Ok(buffer)
}

/// Helper function to get a web client with optional proxy CA certificate
/// Attempts to find a path to the proxy CA certificate provided by the environment variable PROXY_CA_CERT
pub fn get_web_client() -> Result<Client, WebClientError> {
    debug!("Attempting to find PROXY_CA_CERT");
    match std::env::var("PROXY_CA_CERT") {
        Ok(path) => {
            let cert_data =
                get_file_as_byte_vec(&path).map_err(|source| WebClientError::Certificate {
                    path: path.clone(),
                    source,
                })?;
            let root_cert = Certificate::from_pem(&cert_data)?;

            debug!("Found PROXY_CA_CERT at: {path}, Configuring web client...");

            Ok(ClientBuilder::new()
                .add_root_certificate(root_cert)
                .use_rustls_tls()
                .build()?)
        }
        Err(e) => {
            debug!("Failed to find PROXY_CA_CERT. {e} Configuring web client without proxy CA certificate...");
            Ok(ClientBuilder::new().build()?)
        }
    }
}
