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

//! The button page as a terminal program.
//!
//! A single [`observer::ButtonView`] actor owns the count and the yak feed. It polls the counter
//! service on a timer, forwards presses, and redraws through a [`render::Renderer`].
pub mod client;
pub mod feed;
pub mod observer;
pub mod render;
pub mod scheduler;
pub mod tween;
pub mod view;

use std::env;

use tracing::{info, warn};

pub const BUTTON_VIEW_NAME: &str = "button.view.observer";
pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewConfig {
    pub service_url: String,
    /// Fixed seed for the yak feed. Unset means a fresh feed every run.
    pub rng_seed: Option<u64>,
}

impl ViewConfig {
    pub fn from_env() -> Self {
        let service_url = env::var("BUTTON_SERVICE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| {
                info!("BUTTON_SERVICE_URL not set, using default: {DEFAULT_SERVICE_URL}");
                DEFAULT_SERVICE_URL.to_string()
            });

        let rng_seed = match env::var("BUTTON_RNG_SEED") {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(seed) => Some(seed),
                Err(e) => {
                    warn!("Ignoring BUTTON_RNG_SEED {raw}: {e}");
                    None
                }
            },
            Err(_) => None,
        };

        ViewConfig {
            service_url,
            rng_seed,
        }
    }

    pub fn yak_source(&self) -> feed::YakSource {
        match self.rng_seed {
            Some(seed) => feed::YakSource::seeded(seed),
            None => feed::YakSource::from_entropy(),
        }
    }
}
