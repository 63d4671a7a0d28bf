pub mod color;
pub mod duration;
pub mod resolver;
pub mod schedule;

use serde::{Deserialize, Serialize};

use color::Rgb;

/// Default knots: green, then orange, then red once the round has started.
pub const DEFAULT_COLORS: [Rgb; 3] = [
    Rgb::new(0, 255, 0),
    Rgb::new(255, 127, 0),
    Rgb::new(255, 0, 0),
];

/// The three color knots of a timer, fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[Rgb; 3]", into = "[Rgb; 3]")]
pub struct Knots {
    pub color_1: Rgb,
    pub color_2: Rgb,
    pub color_3: Rgb,
}

impl Default for Knots {
    fn default() -> Self {
        DEFAULT_COLORS.into()
    }
}

impl From<[Rgb; 3]> for Knots {
    fn from([color_1, color_2, color_3]: [Rgb; 3]) -> Self {
        Self {
            color_1,
            color_2,
            color_3,
        }
    }
}

impl From<Knots> for [Rgb; 3] {
    fn from(knots: Knots) -> Self {
        [knots.color_1, knots.color_2, knots.color_3]
    }
}

/// Ramp lengths in minutes.
///
/// `delay_1` and `delay_2` are the interpolation denominators of the two
/// ramps. `delay_3` only matters when phases are built from round dates:
/// it is how long the post state lasts before the next round takes over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Delays {
    pub delay_1: u32,
    pub delay_2: u32,
    pub delay_3: u32,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            delay_1: 15,
            delay_2: 5,
            delay_3: 10,
        }
    }
}

/// One timer segment, usually one round.
///
/// All timestamps are unix seconds. Phases are trusted to be ordered with
/// `timestamp_1 <= timestamp_2 <= timestamp_3 <= timestamp_next`; nothing
/// here checks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    /// Knot 1 holds until here, then the first ramp starts.
    pub timestamp_1: i64,
    /// End of the knot 1 -> knot 2 ramp.
    pub timestamp_2: i64,
    /// End of the knot 2 -> knot 3 ramp; knot 3 holds from here.
    pub timestamp_3: i64,
    /// The instant the countdown counts toward (and later counts up from).
    pub timestamp: i64,
    /// Start of the following phase; None for the last one.
    #[serde(default)]
    pub timestamp_next: Option<i64>,
    /// Shown before `timestamp_3`; `%s` is replaced by the duration.
    pub text_before: String,
    /// Shown from `timestamp_3` on; `%s` is replaced by the duration.
    pub text_after: String,
    /// Flagged phases are ignored by the resolver as if absent.
    #[serde(default)]
    pub error: bool,
}

/// Everything a renderer needs: knots, delays and the ordered phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    #[serde(default)]
    pub colors: Knots,
    #[serde(default)]
    pub delays: Delays,
    pub phases: Vec<Phase>,
}

impl Timer {
    /// Parse a phase feed produced by an external collaborator.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Number of phases the resolver will consider.
    pub fn valid_phase_count(&self) -> usize {
        self.phases.iter().filter(|p| !p.error).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_factory_settings() {
        let delays = Delays::default();
        assert_eq!((delays.delay_1, delays.delay_2, delays.delay_3), (15, 5, 10));
        assert_eq!(Knots::default().color_2, Rgb::new(255, 127, 0));
    }

    #[test]
    fn parse_feed_with_defaults() {
        let json = r#"{
            "phases": [
                {
                    "timestamp_1": 100, "timestamp_2": 200, "timestamp_3": 300,
                    "timestamp": 300, "timestamp_next": 1000,
                    "text_before": "Début dans %s", "text_after": "Commencé depuis %s"
                },
                {
                    "timestamp_1": 1000, "timestamp_2": 1100, "timestamp_3": 1200,
                    "timestamp": 1200,
                    "text_before": "B %s", "text_after": "A %s", "error": true
                }
            ]
        }"#;
        let timer = Timer::from_json(json).unwrap();
        assert_eq!(timer.colors, Knots::default());
        assert_eq!(timer.delays, Delays::default());
        assert_eq!(timer.phases.len(), 2);
        assert_eq!(timer.phases[0].timestamp_next, Some(1000));
        assert!(!timer.phases[0].error);
        assert_eq!(timer.phases[1].timestamp_next, None);
        assert_eq!(timer.valid_phase_count(), 1);
    }

    #[test]
    fn parse_feed_with_colors_and_partial_delays() {
        let json = r#"{
            "colors": [[1, 2, 3], [4, 5, 6], [7, 8, 9]],
            "delays": { "delay_1": 2 },
            "phases": []
        }"#;
        let timer = Timer::from_json(json).unwrap();
        assert_eq!(timer.colors.color_3, Rgb::new(7, 8, 9));
        assert_eq!(timer.delays.delay_1, 2);
        assert_eq!(timer.delays.delay_2, 5);
    }

    #[test]
    fn parse_feed_rejects_missing_fields() {
        let json = r#"{ "phases": [ { "timestamp": 5 } ] }"#;
        assert!(Timer::from_json(json).is_err());
    }
}
