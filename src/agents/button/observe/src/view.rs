use std::time::Instant;

use crate::{
    feed::{Yak, YakFeed},
    tween::{CountTween, COUNT_ANIMATION},
};

/// What the counter area is showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountDisplay {
    /// Nothing has come back from the service yet.
    Loading,
    Live(CountTween),
    /// The last fetch failed. No number is shown until one succeeds.
    Unavailable(String),
}

/// Things that move the view forward. Randomness and timing are resolved before an event is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    CountArrived(u64),
    FetchFailed(String),
    YakAdded(Yak),
}

/// Everything the button page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub count: CountDisplay,
    pub feed: YakFeed,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            count: CountDisplay::Loading,
            feed: YakFeed::default(),
        }
    }
}

impl ViewState {
    pub fn apply(mut self, event: ViewEvent, now: Instant) -> ViewState {
        match event {
            ViewEvent::CountArrived(count) => {
                self.count = match self.count {
                    CountDisplay::Live(tween) if tween.target() == count => {
                        CountDisplay::Live(tween)
                    }
                    CountDisplay::Live(tween) => CountDisplay::Live(tween.retarget(count, now)),
                    CountDisplay::Loading | CountDisplay::Unavailable(_) => {
                        CountDisplay::Live(CountTween::new(0, count, now, COUNT_ANIMATION))
                    }
                };
            }
            ViewEvent::FetchFailed(reason) => {
                self.count = CountDisplay::Unavailable(reason);
            }
            ViewEvent::YakAdded(yak) => {
                self.feed.push(yak);
            }
        }
        self
    }

    /// The number on screen at `now`, if one is shown at all.
    pub fn displayed_count(&self, now: Instant) -> Option<u64> {
        match &self.count {
            CountDisplay::Live(tween) => Some(tween.value_at(now)),
            _ => None,
        }
    }

    /// Last count read from the service, ignoring the animation.
    pub fn latest_count(&self) -> Option<u64> {
        match &self.count {
            CountDisplay::Live(tween) => Some(tween.target()),
            _ => None,
        }
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        matches!(&self.count, CountDisplay::Live(tween) if !tween.is_settled(now))
    }
}
