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

//! Named repeating timers that post a message to an actor. The view only asks for "every N, send
//! this", so tests can fire ticks by hand.
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use ractor::{ActorRef, Message};
use tokio::task::AbortHandle;
use tracing::debug;

pub trait Scheduler<M: Message>: Send {
    /// Send `message()` to `myself` every `period`, first after one full period. Replaces any
    /// timer already under `name`.
    fn every(
        &mut self,
        myself: &ActorRef<M>,
        name: &'static str,
        period: Duration,
        message: fn() -> M,
    );

    fn cancel(&mut self, name: &'static str);

    fn cancel_all(&mut self);
}

/// Timers backed by `send_interval`, keeping each abort handle under its name.
#[derive(Default)]
pub struct IntervalScheduler {
    handles: HashMap<&'static str, AbortHandle>,
}

impl<M: Message> Scheduler<M> for IntervalScheduler {
    fn every(
        &mut self,
        myself: &ActorRef<M>,
        name: &'static str,
        period: Duration,
        message: fn() -> M,
    ) {
        debug!("Scheduling {name} every {}ms", period.as_millis());
        let handle = myself.send_interval(period, message).abort_handle();

        if let Some(previous) = self.handles.insert(name, handle) {
            previous.abort();
        }
    }

    fn cancel(&mut self, name: &'static str) {
        if let Some(handle) = self.handles.remove(name) {
            debug!("Cancelling {name}");
            handle.abort();
        }
    }

    fn cancel_all(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        for (_, handle) in self.handles.drain() {
            handle.abort();
        }
    }
}

struct ManualTimer<M> {
    myself: ActorRef<M>,
    period: Duration,
    message: fn() -> M,
}

/// Timers that only go off when `fire` is called. Clones share the same timers.
pub struct ManualScheduler<M> {
    timers: Arc<Mutex<HashMap<&'static str, ManualTimer<M>>>>,
}

impl<M> Clone for ManualScheduler<M> {
    fn clone(&self) -> Self {
        ManualScheduler {
            timers: self.timers.clone(),
        }
    }
}

impl<M> Default for ManualScheduler<M> {
    fn default() -> Self {
        ManualScheduler {
            timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<M: Message> ManualScheduler<M> {
    /// Send the message under `name` once. Returns false if nothing is scheduled there.
    pub fn fire(&self, name: &str) -> bool {
        let timer = match self.timers.lock() {
            Ok(timers) => timers
                .get(name)
                .map(|timer| (timer.myself.clone(), timer.message)),
            Err(_) => None,
        };

        match timer {
            Some((myself, message)) => {
                if myself.send_message(message()).is_err() {
                    debug!("{name} fired at a stopped actor");
                }
                true
            }
            None => false,
        }
    }

    pub fn is_scheduled(&self, name: &str) -> bool {
        self.timers
            .lock()
            .map(|timers| timers.contains_key(name))
            .unwrap_or(false)
    }

    pub fn period(&self, name: &str) -> Option<Duration> {
        self.timers
            .lock()
            .ok()
            .and_then(|timers| timers.get(name).map(|timer| timer.period))
    }
}

impl<M: Message> Scheduler<M> for ManualScheduler<M> {
    fn every(
        &mut self,
        myself: &ActorRef<M>,
        name: &'static str,
        period: Duration,
        message: fn() -> M,
    ) {
        if let Ok(mut timers) = self.timers.lock() {
            timers.insert(
                name,
                ManualTimer {
                    myself: myself.clone(),
                    period,
                    message,
                },
            );
        }
    }

    fn cancel(&mut self, name: &'static str) {
        if let Ok(mut timers) = self.timers.lock() {
            timers.remove(name);
        }
    }

    fn cancel_all(&mut self) {
        if let Ok(mut timers) = self.timers.lock() {
            timers.clear();
        }
    }
}
