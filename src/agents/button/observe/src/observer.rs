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

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use pushbutton::PressRequest;
use ractor::{concurrency::JoinHandle, Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info, warn};

use crate::{
    client::{CounterApi, FetchError},
    feed::{YakKind, YakSource},
    render::{Frame, Renderer},
    scheduler::Scheduler,
    view::{ViewEvent, ViewState},
};

pub const POLL_TIMER: &str = "poll";
pub const FEED_TIMER: &str = "feed";
pub const FRAME_TIMER: &str = "frame";

pub enum Command {
    PollCount,
    AddYak,
    Frame,
}

pub enum ButtonViewMessage {
    Tick(Command),
    /// The user pushed the button.
    Press,
    CountFetched(Result<u64, FetchError>),
    PressRecorded(Result<u64, FetchError>),
    GetState(RpcReplyPort<ViewState>),
}

#[derive(Debug, Clone, Copy)]
pub struct ViewTiming {
    pub poll: Duration,
    pub feed: Duration,
    pub frame: Duration,
}

impl Default for ViewTiming {
    fn default() -> Self {
        ViewTiming {
            poll: Duration::from_secs(5),
            feed: Duration::from_secs(5),
            frame: Duration::from_millis(100),
        }
    }
}

pub struct ButtonViewArgs {
    pub api: Arc<dyn CounterApi>,
    pub scheduler: Box<dyn Scheduler<ButtonViewMessage>>,
    pub renderer: Box<dyn Renderer>,
    pub yaks: YakSource,
    pub timing: ViewTiming,
}

pub struct ButtonViewState {
    api: Arc<dyn CounterApi>,
    scheduler: Box<dyn Scheduler<ButtonViewMessage>>,
    renderer: Box<dyn Renderer>,
    yaks: YakSource,
    timing: ViewTiming,
    view: ViewState,
    last_frame: Option<Frame>,
}

/// Owns everything on screen. Timers, presses and fetch results all arrive as messages.
pub struct ButtonView;

impl ButtonView {
    fn observe(myself: &ActorRef<ButtonViewMessage>, state: &mut ButtonViewState) {
        let timing = state.timing;
        info!(
            "Polling every {}s, new yak every {}s",
            timing.poll.as_secs(),
            timing.feed.as_secs()
        );

        state.scheduler.every(
            myself,
            POLL_TIMER,
            timing.poll,
            || ButtonViewMessage::Tick(Command::PollCount),
        );
        state.scheduler.every(
            myself,
            FEED_TIMER,
            timing.feed,
            || ButtonViewMessage::Tick(Command::AddYak),
        );
        state.scheduler.every(
            myself,
            FRAME_TIMER,
            timing.frame,
            || ButtonViewMessage::Tick(Command::Frame),
        );
    }

    fn fetch_count(myself: &ActorRef<ButtonViewMessage>, api: &Arc<dyn CounterApi>) {
        let myself = myself.clone();
        let api = api.clone();
        tokio::spawn(async move {
            let result = api.get_count().await;
            if myself
                .send_message(ButtonViewMessage::CountFetched(result))
                .is_err()
            {
                debug!("View stopped before the count arrived");
            }
        });
    }

    /// Record the press, then read the count back. Both results come back as messages.
    fn send_press(myself: &ActorRef<ButtonViewMessage>, api: &Arc<dyn CounterApi>) {
        let myself = myself.clone();
        let api = api.clone();
        tokio::spawn(async move {
            let recorded = api.record_press(PressRequest::now()).await;
            if myself
                .send_message(ButtonViewMessage::PressRecorded(recorded))
                .is_err()
            {
                return;
            }

            let result = api.get_count().await;
            let _ = myself.send_message(ButtonViewMessage::CountFetched(result));
        });
    }

    fn apply(state: &mut ButtonViewState, event: ViewEvent) {
        let view = std::mem::take(&mut state.view);
        state.view = view.apply(event, Instant::now());
        Self::redraw(state);
    }

    /// Render only when the frame differs from the last one drawn.
    fn redraw(state: &mut ButtonViewState) {
        let frame = Frame::capture(&state.view, Instant::now());
        if state.last_frame.as_ref() != Some(&frame) {
            state.renderer.render(&frame);
            state.last_frame = Some(frame);
        }
    }
}

#[ractor::async_trait]
impl Actor for ButtonView {
    type Msg = ButtonViewMessage;
    type State = ButtonViewState;
    type Arguments = ButtonViewArgs;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        args: ButtonViewArgs,
    ) -> Result<Self::State, ActorProcessingErr> {
        debug!("Starting button view");
        Ok(ButtonViewState {
            api: args.api,
            scheduler: args.scheduler,
            renderer: args.renderer,
            yaks: args.yaks,
            timing: args.timing,
            view: ViewState::default(),
            last_frame: None,
        })
    }

    async fn post_start(
        &self,
        myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        ButtonView::observe(&myself, state);
        ButtonView::fetch_count(&myself, &state.api);
        ButtonView::redraw(state);
        Ok(())
    }

    async fn post_stop(
        &self,
        _myself: ActorRef<Self::Msg>,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        state.scheduler.cancel_all();
        debug!("Button view stopped");
        Ok(())
    }

    async fn handle(
        &self,
        myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            ButtonViewMessage::Tick(command) => match command {
                Command::PollCount => ButtonView::fetch_count(&myself, &state.api),
                Command::AddYak => {
                    let yak = state.yaks.next(YakKind::Basic);
                    ButtonView::apply(state, ViewEvent::YakAdded(yak));
                }
                Command::Frame => ButtonView::redraw(state),
            },
            ButtonViewMessage::Press => {
                let yak = state.yaks.next(YakKind::Button);
                ButtonView::apply(state, ViewEvent::YakAdded(yak));
                ButtonView::send_press(&myself, &state.api);
            }
            ButtonViewMessage::CountFetched(result) => match result {
                Ok(count) => ButtonView::apply(state, ViewEvent::CountArrived(count)),
                Err(e) => {
                    warn!("{e}");
                    ButtonView::apply(state, ViewEvent::FetchFailed(e.to_string()));
                }
            },
            ButtonViewMessage::PressRecorded(result) => match result {
                Ok(count) => info!("Press recorded, insert count {count}"),
                Err(e) => warn!("Press not recorded: {e}"),
            },
            ButtonViewMessage::GetState(reply) => {
                if reply.send(state.view.clone()).is_err() {
                    debug!("State requested but nobody waited for it");
                }
            }
        }
        Ok(())
    }
}

/// Every line read from `input` is a push of the button. Stops the view at end of input or on
/// Ctrl+C, then waits for it to finish.
pub async fn watch_presses<R>(view: ActorRef<ButtonViewMessage>, handle: JoinHandle<()>, input: R)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(_)) => {
                    if view.send_message(ButtonViewMessage::Press).is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    error!("Failed to read input: {e}");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    view.stop(None);
    if let Err(e) = handle.await {
        error!("Button view did not shut down cleanly: {e}");
    }
}
