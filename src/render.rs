use chrono::{DateTime, TimeZone};

use crate::timer::color::Shade;
use crate::timer::resolver::{resolve, Resolution};
use crate::timer::Timer;

/// The three writable fields of a timer display.
///
/// Implemented by the terminal view and by the plain stdout printer. The
/// renderer only calls a setter when the value actually changed.
pub trait DisplaySlots {
    fn set_clock(&mut self, clock: &str);
    fn set_text(&mut self, text: &str);
    fn set_background(&mut self, color: Shade);
}

/// Last values written to the slots. In memory only.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RenderState {
    pub clock: Option<String>,
    pub text: Option<String>,
    pub color: Option<Shade>,
}

/// One independent timer display: its phases plus what it last wrote.
pub struct Renderer {
    timer: Timer,
    state: RenderState,
}

impl Renderer {
    pub fn new(timer: Timer) -> Self {
        Self {
            timer,
            state: RenderState::default(),
        }
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Swap in freshly loaded phases. The slots keep their content until
    /// the next step decides otherwise.
    pub fn replace_timer(&mut self, timer: Timer) {
        self.timer = timer;
    }

    /// Render the instant `now` into `slots`.
    ///
    /// Returns the resolution that was displayed, or None when no phase
    /// covers `now`; in that case nothing is written, the clock included.
    pub fn step<Tz: TimeZone, S: DisplaySlots>(
        &mut self,
        now: &DateTime<Tz>,
        slots: &mut S,
    ) -> Option<Resolution> {
        let resolution = resolve(&self.timer, now.timestamp())?;
        let clock = clock_text(now);

        if self.state.clock.as_deref() != Some(clock.as_str()) {
            slots.set_clock(&clock);
            self.state.clock = Some(clock);
        }
        if self.state.color != Some(resolution.color) {
            slots.set_background(resolution.color);
            self.state.color = Some(resolution.color);
        }
        if self.state.text.as_deref() != Some(resolution.text.as_str()) {
            slots.set_text(&resolution.text);
            self.state.text = Some(resolution.text.clone());
        }
        Some(resolution)
    }
}

/// `HH:MM:SS` in the time zone of `now`.
pub fn clock_text<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    now.naive_local().format("%H:%M:%S").to_string()
}
