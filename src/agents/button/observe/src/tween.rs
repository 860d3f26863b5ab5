use std::time::{Duration, Instant};

/// How long the counter takes to roll from one value to the next.
pub const COUNT_ANIMATION: Duration = Duration::from_secs(2);

/// Eased roll of the displayed count toward the latest value read from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountTween {
    from: u64,
    to: u64,
    started: Instant,
    duration: Duration,
}

impl CountTween {
    pub fn new(from: u64, to: u64, started: Instant, duration: Duration) -> Self {
        CountTween {
            from,
            to,
            started,
            duration,
        }
    }

    pub fn target(&self) -> u64 {
        self.to
    }

    pub fn is_settled(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }

    pub fn value_at(&self, now: Instant) -> u64 {
        if self.is_settled(now) || self.from == self.to {
            return self.to;
        }

        let progress = now.saturating_duration_since(self.started).as_secs_f64()
            / self.duration.as_secs_f64();
        let span = self.to as f64 - self.from as f64;
        let value = (self.from as f64 + span * ease_out_expo(progress)).round() as u64;

        value.clamp(self.from.min(self.to), self.from.max(self.to))
    }

    /// Restart toward `to` from wherever the count is showing right now.
    pub fn retarget(&self, to: u64, now: Instant) -> CountTween {
        CountTween::new(self.value_at(now), to, now, self.duration)
    }
}

/// Exponential ease-out, scaled so it lands exactly on 1 at the end.
fn ease_out_expo(progress: f64) -> f64 {
    (1.0 - 2f64.powf(-10.0 * progress)) * 1024.0 / 1023.0
}
