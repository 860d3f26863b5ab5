use std::{
    fmt,
    io::{self, Write},
    time::Instant,
};

use tracing::warn;

use crate::{
    feed::Yak,
    view::{CountDisplay, ViewState},
};

pub const BUTTON_CAPTION: &str = "Don't push the button";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountLine {
    Loading,
    Live(u64),
    Unavailable(String),
}

/// One still of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub count: CountLine,
    pub yaks: Vec<Yak>,
}

impl Frame {
    pub fn capture(state: &ViewState, now: Instant) -> Frame {
        let count = match &state.count {
            CountDisplay::Loading => CountLine::Loading,
            CountDisplay::Live(tween) => CountLine::Live(tween.value_at(now)),
            CountDisplay::Unavailable(reason) => CountLine::Unavailable(reason.clone()),
        };

        Frame {
            count,
            yaks: state.feed.iter().cloned().collect(),
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.count {
            CountLine::Loading => writeln!(f, "Total Button Pushes: ...")?,
            CountLine::Live(count) => writeln!(f, "Total Button Pushes: {}", group_digits(*count))?,
            CountLine::Unavailable(reason) => {
                writeln!(f, "Total Button Pushes: unavailable ({reason})")?
            }
        }

        writeln!(f)?;
        writeln!(f, "    [ {BUTTON_CAPTION} ]   (press Enter)")?;
        writeln!(f)?;

        for yak in &self.yaks {
            let marker = if yak.button { '!' } else { ' ' };
            writeln!(f, "{marker} {:>2}  {}", yak.score, yak.content)?;
        }

        Ok(())
    }
}

fn group_digits(count: u64) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Where frames end up.
pub trait Renderer: Send {
    fn render(&mut self, frame: &Frame);
}

/// Redraws the whole terminal on every frame.
pub struct TerminalRenderer<W: Write + Send = io::Stdout> {
    out: W,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        TerminalRenderer { out: io::stdout() }
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        TerminalRenderer { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&mut self, frame: &Frame) {
        if let Err(e) = write!(self.out, "{CLEAR_SCREEN}{frame}").and_then(|_| self.out.flush()) {
            warn!("Failed to draw frame {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(1234567), "1,234,567");
    }

    #[test]
    fn draws_count_button_and_feed() {
        let frame = Frame {
            count: CountLine::Live(4321),
            yaks: vec![
                Yak {
                    id: "a".into(),
                    content: "quiet day".into(),
                    score: 3,
                    button: false,
                },
                Yak {
                    id: "b".into(),
                    content: "WHO PUSHED THE BUTTON".into(),
                    score: 17,
                    button: true,
                },
            ],
        };

        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(&frame);
        let drawn = String::from_utf8(renderer.into_inner()).unwrap();

        assert!(drawn.starts_with(CLEAR_SCREEN));
        assert!(drawn.contains("Total Button Pushes: 4,321"));
        assert!(drawn.contains(BUTTON_CAPTION));
        let quiet = drawn.find("   3  quiet day").unwrap();
        let loud = drawn.find("! 17  WHO PUSHED THE BUTTON").unwrap();
        assert!(quiet < loud);
    }

    #[test]
    fn failed_count_shows_no_number() {
        let frame = Frame {
            count: CountLine::Unavailable("service returned 500".into()),
            yaks: Vec::new(),
        };
        let drawn = frame.to_string();

        assert!(drawn.contains("unavailable (service returned 500)"));
        assert!(!drawn.chars().next().unwrap().is_ascii_digit());
    }
}
