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

use std::{error::Error, sync::Arc};

use button_observer::{
    client::HttpCounterApi,
    observer::{watch_presses, ButtonView, ButtonViewArgs, ViewTiming},
    render::TerminalRenderer,
    scheduler::IntervalScheduler,
    ViewConfig, BUTTON_VIEW_NAME,
};
use pushbutton::{get_web_client, init_logging};
use ractor::Actor;
use tokio::io::{stdin, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_logging(BUTTON_VIEW_NAME);

    let config = ViewConfig::from_env();
    let api = HttpCounterApi::new(get_web_client()?, &config.service_url);
    info!("Watching {}", api.endpoint());

    let args = ButtonViewArgs {
        api: Arc::new(api),
        scheduler: Box::new(IntervalScheduler::default()),
        renderer: Box::new(TerminalRenderer::default()),
        yaks: config.yak_source(),
        timing: ViewTiming::default(),
    };

    let (view, handle) = match Actor::spawn(Some(BUTTON_VIEW_NAME.to_string()), ButtonView, args).await
    {
        Ok(spawned) => spawned,
        Err(e) => {
            error!("{e}");
            return Err(e.into());
        }
    };

    watch_presses(view, handle, BufReader::new(stdin())).await;
    Ok(())
}
