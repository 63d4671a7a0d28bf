use serde::Serialize;

use super::color::{interpolate, Shade};
use super::duration::duration_signed;
use super::{Phase, Timer};

/// Where the current time falls within a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubState {
    /// Before the first ramp: knot 1.
    Pre,
    /// Knot 1 -> knot 2.
    Ramp1,
    /// Knot 2 -> knot 3.
    Ramp2,
    /// After the target instant: knot 3, counting up.
    Post,
}

impl SubState {
    pub fn label(self) -> &'static str {
        match self {
            SubState::Pre => "pre",
            SubState::Ramp1 => "ramp 1->2",
            SubState::Ramp2 => "ramp 2->3",
            SubState::Post => "post",
        }
    }
}

/// What the display should show at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Index of the matched phase in the timer's phase list.
    pub phase: usize,
    pub state: SubState,
    pub color: Shade,
    pub text: String,
}

/// Find the phase and sub-state covering `now` (unix seconds).
///
/// Phases are scanned in order and the first match wins. Flagged phases
/// are skipped. A phase past its target instant keeps matching (post state)
/// until `timestamp_next`, after which the scan moves on to the following
/// phase; the last unflagged phase stays in post state forever. Returns
/// None once the sequence is exhausted.
pub fn resolve(timer: &Timer, now: i64) -> Option<Resolution> {
    let last_valid = timer.phases.iter().rposition(|p| !p.error)?;

    for (index, phase) in timer.phases.iter().enumerate() {
        if phase.error {
            continue;
        }
        let is_last = index == last_valid;
        if let Some(state) = sub_state(phase, now, is_last) {
            return Some(render(timer, index, phase, state, now));
        }
    }
    None
}

fn sub_state(phase: &Phase, now: i64, is_last: bool) -> Option<SubState> {
    if now < phase.timestamp_1 {
        return Some(SubState::Pre);
    }
    if now < phase.timestamp_2 {
        return Some(SubState::Ramp1);
    }
    if now < phase.timestamp_3 {
        return Some(SubState::Ramp2);
    }
    match phase.timestamp_next {
        Some(next) if !is_last && now >= next => None,
        _ => Some(SubState::Post),
    }
}

fn render(timer: &Timer, index: usize, phase: &Phase, state: SubState, now: i64) -> Resolution {
    let knots = &timer.colors;
    let delays = &timer.delays;

    let color = match state {
        SubState::Pre => knots.color_1.into(),
        SubState::Ramp1 => interpolate(
            knots.color_1,
            knots.color_2,
            now.saturating_sub(phase.timestamp_1),
            delays.delay_1,
        ),
        SubState::Ramp2 => interpolate(
            knots.color_2,
            knots.color_3,
            now.saturating_sub(phase.timestamp_2),
            delays.delay_2,
        ),
        SubState::Post => knots.color_3.into(),
    };

    let text = match state {
        SubState::Post => fill(&phase.text_after, &duration_signed(now.saturating_sub(phase.timestamp))),
        _ => fill(&phase.text_before, &duration_signed(phase.timestamp.saturating_sub(now))),
    };

    Resolution {
        phase: index,
        state,
        color,
        text,
    }
}

/// Replace the first `%s` marker; templates without one are shown as-is.
fn fill(template: &str, duration: &str) -> String {
    template.replacen("%s", duration, 1)
}
