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

//! # Counter store
//!
//! The press table lives in a hosted Postgres behind a PostgREST endpoint. The service never reads
//! a row; it only asks for an exact row count or appends an empty row.
//!
//! ## Wire contract
//! - count: `HEAD {endpoint}/rest/v1/{table}?select=*` with `Prefer: count=exact`
//! - insert: `POST {endpoint}/rest/v1/{table}` with `{}` and `Prefer: return=minimal,count=exact`
//! - the count comes back in `Content-Range`, either `*/42` or `0-24/42`
//! - both requests authenticate with the service role in `apikey` and as a bearer token
//!
//! The count reported for an insert is the number of rows that insert touched, not the table
//! total.
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, Response};
use tracing::{debug, trace};

use crate::error::StoreError;

pub const DEFAULT_PRESS_TABLE: &str = "usdbutton_presses";
const APIKEY_HEADER: &str = "apikey";
const PREFER_HEADER: &str = "Prefer";
const CONTENT_RANGE_HEADER: &str = "Content-Range";
const PREFER_COUNT: &str = "count=exact";
const PREFER_INSERT: &str = "return=minimal,count=exact";

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Exact number of press rows.
    async fn count(&self) -> Result<u64, StoreError>;

    /// Append one empty press row, returning the count the store reports for the insert.
    async fn insert_press(&self) -> Result<u64, StoreError>;
}

pub struct PostgrestStore {
    client: Client,
    endpoint: Option<String>,
    service_role: Option<String>,
    table: String,
}

impl PostgrestStore {
    pub fn new(
        client: Client,
        endpoint: Option<String>,
        service_role: Option<String>,
        table: String,
    ) -> Self {
        PostgrestStore {
            client,
            endpoint: endpoint.map(|e| e.trim_end_matches('/').to_string()),
            service_role,
            table,
        }
    }

    /// Resolve the table url and credential, failing per call when either is absent.
    fn target(&self) -> Result<(String, &str), StoreError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(StoreError::Unconfigured("COUNTER_STORE_URL"))?;
        let key = self
            .service_role
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(StoreError::Unconfigured("COUNTER_STORE_SERVICE_ROLE"))?;

        Ok((format!("{endpoint}/rest/v1/{}", self.table), key))
    }
}

#[async_trait]
impl CounterStore for PostgrestStore {
    async fn count(&self) -> Result<u64, StoreError> {
        let (url, key) = self.target()?;
        debug!("Counting rows at {url}");

        let response = self
            .client
            .head(url)
            .query(&[("select", "*")])
            .header(APIKEY_HEADER, key)
            .bearer_auth(key)
            .header(PREFER_HEADER, PREFER_COUNT)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(content_range_total(response.headers())?.unwrap_or(0))
    }

    async fn insert_press(&self) -> Result<u64, StoreError> {
        let (url, key) = self.target()?;
        debug!("Inserting press at {url}");

        let response = self
            .client
            .post(url)
            .header(APIKEY_HEADER, key)
            .bearer_auth(key)
            .header(PREFER_HEADER, PREFER_INSERT)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        let response = ensure_success(response).await?;
        Ok(content_range_total(response.headers())?.unwrap_or(0))
    }
}

async fn ensure_success(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Total from a `Content-Range` header. `None` when the header is absent or the total is `*`.
pub fn content_range_total(headers: &HeaderMap) -> Result<Option<u64>, StoreError> {
    let Some(value) = headers.get(CONTENT_RANGE_HEADER) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|e| StoreError::InvalidCount(e.to_string()))?;
    trace!("Content-Range: {value}");

    let total = value
        .rsplit_once('/')
        .map(|(_, total)| total.trim())
        .ok_or_else(|| StoreError::InvalidCount(value.to_string()))?;

    if total == "*" {
        return Ok(None);
    }

    total
        .parse::<u64>()
        .map(Some)
        .map_err(|_| StoreError::InvalidCount(value.to_string()))
}

/// Process-local store for running without a datastore. Inserts report one row, as PostgREST does.
#[derive(Default)]
pub struct MemoryStore {
    presses: AtomicU64,
}

impl MemoryStore {
    pub fn with_count(count: u64) -> Self {
        MemoryStore {
            presses: AtomicU64::new(count),
        }
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.presses.load(Ordering::SeqCst))
    }

    async fn insert_press(&self) -> Result<u64, StoreError> {
        self.presses.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }
}
