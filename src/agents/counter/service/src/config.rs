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

use std::env;

use tracing::{info, warn};

use crate::store::DEFAULT_PRESS_TABLE;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgrest,
    Memory,
}

/// Service configuration, read from the environment.
/// BUTTON_BIND_ADDR - socket address to listen on
/// COUNTER_STORE - `postgrest` (default) or `memory`
/// COUNTER_STORE_URL - base url of the PostgREST endpoint
/// COUNTER_STORE_SERVICE_ROLE - credential sent with every store request
/// COUNTER_STORE_TABLE - name of the press table
///
/// The url and credential are not checked here. Without them every store call fails and the
/// service answers 500, so a misconfigured deployment is loud rather than silently empty.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub store: StoreKind,
    pub store_url: Option<String>,
    pub service_role: Option<String>,
    pub table: String,
}

impl Config {
    pub fn from_env() -> Self {
        let store = match env::var("COUNTER_STORE").as_deref() {
            Ok("memory") => StoreKind::Memory,
            Ok("postgrest") | Err(_) => StoreKind::Postgrest,
            Ok(other) => {
                warn!("Unknown COUNTER_STORE {other}, using postgrest");
                StoreKind::Postgrest
            }
        };

        let store_url = optional("COUNTER_STORE_URL");
        let service_role = optional("COUNTER_STORE_SERVICE_ROLE");

        if store == StoreKind::Postgrest && (store_url.is_none() || service_role.is_none()) {
            warn!("Counter store credentials are incomplete, every store call will fail");
        }

        Config {
            bind_addr: with_default("BUTTON_BIND_ADDR", DEFAULT_BIND_ADDR),
            store,
            store_url,
            service_role,
            table: with_default("COUNTER_STORE_TABLE", DEFAULT_PRESS_TABLE),
        }
    }
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn with_default(key: &str, default: &str) -> String {
    optional(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
