use std::sync::Arc;

use crate::{
    store::CounterStore,
    validate::{Clock, SystemClock},
};

/// Handles shared by every request. Holds no counter state of its own.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CounterStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        AppState {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}
