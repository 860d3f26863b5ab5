//! The yak feed: fake comments that scroll past the button. Nothing here leaves the client.
use std::collections::VecDeque;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use uuid::Builder;

/// Most yaks on screen at once. The oldest goes when another arrives.
pub const FEED_CAPACITY: usize = 4;

/// Exclusive upper bound of a yak's score.
pub const MAX_YAK_SCORE: u32 = 20;

pub const BASIC_YAKS: &[&str] = &[
    "anyone else hear the coyotes by the dome last night",
    "the library printer is possessed again",
    "who keeps parking in the bike lane behind the union",
    "dining hall has breakfast for dinner, this is not a drill",
    "professor cancelled class because of the wind. respect",
    "is the vermillion river supposed to be that color",
    "lost: one glove, left hand, very sad",
    "the heat in the dorm is either off or lava",
    "finals week is a state of mind",
    "someone is playing trumpet in the stairwell and honestly it slaps",
    "free pizza in the lobby if you get there in five minutes",
    "squirrels on campus are getting bolder every day",
];

pub const BUTTON_YAKS: &[&str] = &[
    "WHO PUSHED THE BUTTON",
    "it literally says don't push the button",
    "there goes another one",
    "you had one job",
    "the button remembers",
    "that's going on your permanent record",
    "somebody stop them",
    "we were doing so well",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YakKind {
    Basic,
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Yak {
    pub id: String,
    pub content: String,
    pub score: u32,
    /// Raised by a press rather than the feed timer.
    pub button: bool,
}

/// Rolling window of the newest yaks, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YakFeed {
    yaks: VecDeque<Yak>,
}

impl YakFeed {
    /// Append a yak, returning whichever one fell off the front.
    pub fn push(&mut self, yak: Yak) -> Option<Yak> {
        self.yaks.push_back(yak);
        if self.yaks.len() > FEED_CAPACITY {
            self.yaks.pop_front()
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Yak> {
        self.yaks.iter()
    }

    pub fn len(&self) -> usize {
        self.yaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.yaks.is_empty()
    }
}

/// Makes yaks from an injected generator, so a fixed seed replays the same feed.
pub struct YakSource {
    rng: SmallRng,
}

impl YakSource {
    pub fn new(rng: SmallRng) -> Self {
        YakSource { rng }
    }

    pub fn seeded(seed: u64) -> Self {
        YakSource::new(SmallRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        let mut rng = rand::rng();
        YakSource::new(SmallRng::from_rng(&mut rng))
    }

    pub fn next(&mut self, kind: YakKind) -> Yak {
        let messages = match kind {
            YakKind::Basic => BASIC_YAKS,
            YakKind::Button => BUTTON_YAKS,
        };

        let content = messages[self.rng.random_range(0..messages.len())].to_string();
        let score = self.rng.random_range(0..MAX_YAK_SCORE);
        let id = Builder::from_random_bytes(self.rng.random::<[u8; 16]>())
            .into_uuid()
            .to_string();

        Yak {
            id,
            content,
            score,
            button: kind == YakKind::Button,
        }
    }
}
