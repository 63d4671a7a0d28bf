use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;

use crate::config::AppConfig;
use crate::refresh::Poller;
use crate::render::{DisplaySlots, Renderer};
use crate::source::TimerSource;
use crate::timer::color::Shade;
use crate::timer::Timer;
use crate::tui::event::{AppEvent, EventHandler};

/// Writes each slot change as one `key=value` line.
///
/// Output errors (a closed pipe, typically) are remembered and surfaced by
/// the loop instead of panicking inside the setter.
pub struct LineSlots<W: Write> {
    out: W,
    error: Option<std::io::Error>,
}

impl<W: Write> LineSlots<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn line(&mut self, key: &str, value: &dyn std::fmt::Display) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = writeln!(self.out, "{key}={value}").and_then(|_| self.out.flush()) {
            self.error = Some(e);
        }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }
}

impl<W: Write> DisplaySlots for LineSlots<W> {
    fn set_clock(&mut self, clock: &str) {
        self.line("clock", &clock);
    }

    fn set_text(&mut self, text: &str) {
        self.line("text", &text);
    }

    fn set_background(&mut self, color: Shade) {
        self.line("color", &color);
    }
}

/// Run the timer with line output on stdout. Stops on Ctrl-C or when
/// stdout goes away.
pub fn run(source: &TimerSource, config: &AppConfig, timer: Timer, poll: bool) -> Result<()> {
    let events = EventHandler::ticks(Duration::from_millis(config.display.tick_ms));
    let _poller = if poll {
        Poller::from_config(&config.refresh, Local::now().timestamp(), events.sender())?
    } else {
        None
    };

    let mut renderer = Renderer::new(timer);
    let mut slots = LineSlots::new(std::io::stdout().lock());
    renderer.step(&Local::now(), &mut slots);

    loop {
        if let Some(e) = slots.take_error() {
            tracing::info!(error = %e, "output closed, stopping");
            return Ok(());
        }
        match events.next()? {
            AppEvent::Tick => {
                renderer.step(&Local::now(), &mut slots);
            }
            AppEvent::Updated(last_update) => {
                tracing::info!(last_update, "reloading after server update");
                if source.reload_into(&mut renderer).is_some() {
                    renderer.step(&Local::now(), &mut slots);
                }
            }
            AppEvent::Key(_) | AppEvent::Resize(_, _) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::{Delays, Knots, Phase};
    use chrono::{DateTime, Utc};

    fn timer() -> Timer {
        Timer {
            colors: Knots::default(),
            delays: Delays::default(),
            phases: vec![Phase {
                timestamp_1: 1000,
                timestamp_2: 1900,
                timestamp_3: 2200,
                timestamp: 2200,
                timestamp_next: None,
                text_before: "Ronde dans %s".into(),
                text_after: "Ronde depuis %s".into(),
                error: false,
            }],
        }
    }

    #[test]
    fn changes_become_lines() {
        let mut renderer = Renderer::new(timer());
        let mut slots = LineSlots::new(Vec::new());
        let t0 = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let t1 = DateTime::<Utc>::from_timestamp(1, 0).unwrap();
        renderer.step(&t0, &mut slots);
        renderer.step(&t0, &mut slots);
        renderer.step(&t1, &mut slots);

        let out = String::from_utf8(slots.out).unwrap();
        assert_eq!(
            out,
            "clock=00:00:00\n\
             color=rgb(0,255,0)\n\
             text=Ronde dans 36 minutes et 40 secondes\n\
             clock=00:00:01\n\
             text=Ronde dans 36 minutes et 39 secondes\n"
        );
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_kept_not_panicked() {
        let mut slots = LineSlots::new(Broken);
        slots.set_clock("00:00:00");
        slots.set_text("x");
        let err = slots.take_error().unwrap();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
        assert!(slots.take_error().is_none());
    }
}
