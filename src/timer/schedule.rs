use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;

use super::color::Rgb;
use super::{Delays, Knots, Phase, Timer};
use crate::config::{HourConfig, TimerConfig};

const ROUND_TEXT_BEFORE: &str = "Début de la ronde {} dans %s";
const ROUND_TEXT_AFTER: &str = "Ronde {} commencée depuis %s";

/// Severity of a configuration remark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warning,
}

/// A remark about the `[timer]` section, tied to the key it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: Level,
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.location, self.message)
    }
}

/// Result of building a timer from configuration.
///
/// `timer` is None when no hour could be accepted; the diagnostics say why.
#[derive(Debug)]
pub struct BuildOutcome {
    pub timer: Option<Timer>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BuildOutcome {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.level == Level::Warning)
    }

    /// Forward every diagnostic to the log.
    pub fn log(&self) {
        for d in &self.diagnostics {
            match d.level {
                Level::Debug => tracing::debug!(location = %d.location, "{}", d.message),
                Level::Info => tracing::info!(location = %d.location, "{}", d.message),
                Level::Warning => tracing::warn!(location = %d.location, "{}", d.message),
            }
        }
    }
}

/// An accepted round start before its boundaries are known.
struct Hour {
    date: NaiveDate,
    timestamp: i64,
    text_before: String,
    text_after: String,
}

/// Turns the `[timer]` configuration into phases.
///
/// Round start times are interpreted in `tz`; the display uses
/// `chrono::Local`, tests use `Utc` for determinism.
pub struct TimerBuilder<Tz: TimeZone> {
    tz: Tz,
    diagnostics: Vec<Diagnostic>,
}

impl<Tz: TimeZone> TimerBuilder<Tz> {
    pub fn new(tz: Tz) -> Self {
        Self {
            tz,
            diagnostics: Vec::new(),
        }
    }

    pub fn build(mut self, config: &TimerConfig) -> BuildOutcome {
        if config.hours.is_empty() {
            self.push(Level::Debug, "timer.hours", "no hour declared, the timer is disabled");
            return self.finish(None);
        }

        let mut hours: Vec<Hour> = Vec::new();
        for (position, hour) in config.hours.iter().enumerate() {
            if let Some(accepted) = self.hour(position, hour, hours.last()) {
                hours.push(accepted);
            }
        }
        if hours.is_empty() {
            self.push(Level::Warning, "timer.hours", "no valid hour, the timer is disabled");
            return self.finish(None);
        }

        let colors = self.colors(config);
        let delays = self.delays(config);
        let phases = phases(&hours, &delays);

        self.finish(Some(Timer {
            colors,
            delays,
            phases,
        }))
    }

    fn finish(self, timer: Option<Timer>) -> BuildOutcome {
        BuildOutcome {
            timer,
            diagnostics: self.diagnostics,
        }
    }

    fn push(&mut self, level: Level, location: impl Into<String>, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic {
            level,
            location: location.into(),
            message: message.into(),
        });
    }

    fn hour(&mut self, position: usize, config: &HourConfig, previous: Option<&Hour>) -> Option<Hour> {
        let id = config
            .id
            .clone()
            .unwrap_or_else(|| (position + 1).to_string());
        let location = format!("timer.hours.{id}");

        for key in config.extra.keys() {
            self.push(Level::Warning, format!("{location}.{key}"), "unknown option");
        }

        let Some(raw) = config.date.as_deref() else {
            self.push(Level::Warning, format!("{location}.date"), "missing option, hour ignored");
            return None;
        };
        let date_str = raw.split_whitespace().collect::<Vec<_>>().join(" ");

        let datetime = match parse_date(&date_str) {
            Some(DateSpec::Full(dt)) => dt,
            Some(DateSpec::TimeOnly(time)) => {
                let Some(previous) = previous else {
                    self.push(
                        Level::Warning,
                        format!("{location}.date"),
                        "the first hour must include a day, hour ignored",
                    );
                    return None;
                };
                self.push(
                    Level::Debug,
                    format!("{location}.date"),
                    format!("no day given, using {}", previous.date),
                );
                previous.date.and_time(time)
            }
            None => {
                self.push(
                    Level::Warning,
                    format!("{location}.date"),
                    format!("invalid date [{date_str}] ([YYYY-MM-DD hh:mm] or [hh:mm] expected), hour ignored"),
                );
                return None;
            }
        };

        let Some(timestamp) = self
            .tz
            .from_local_datetime(&datetime)
            .earliest()
            .map(|dt| dt.timestamp())
        else {
            self.push(
                Level::Warning,
                format!("{location}.date"),
                format!("[{datetime}] does not exist in the local time zone, hour ignored"),
            );
            return None;
        };

        if let Some(previous) = previous {
            if timestamp <= previous.timestamp {
                self.push(
                    Level::Warning,
                    format!("{location}.date"),
                    format!("[{datetime}] is not after the previous hour, hour ignored"),
                );
                return None;
            }
        }

        let round = id.parse::<u32>().ok();
        let text_before = config
            .text_before
            .clone()
            .or_else(|| round.map(|r| ROUND_TEXT_BEFORE.replacen("{}", &r.to_string(), 1)));
        let text_after = config
            .text_after
            .clone()
            .or_else(|| round.map(|r| ROUND_TEXT_AFTER.replacen("{}", &r.to_string(), 1)));
        let (Some(text_before), Some(text_after)) = (text_before, text_after) else {
            self.push(
                Level::Warning,
                location,
                "options [text_before] and [text_after] are required for non-numeric ids, hour ignored",
            );
            return None;
        };

        Some(Hour {
            date: datetime.date(),
            timestamp,
            text_before,
            text_after,
        })
    }

    fn colors(&mut self, config: &TimerConfig) -> Knots {
        let mut knots: [Rgb; 3] = Knots::default().into();
        for (key, value) in &config.colors {
            let location = format!("timer.colors.{key}");
            let slot = match key.as_str() {
                "1" => 0,
                "2" => 1,
                "3" => 2,
                _ => {
                    self.push(Level::Warning, location, "invalid color key (expected 1, 2 or 3), ignored");
                    continue;
                }
            };
            match Rgb::parse(value) {
                Some(rgb) => {
                    self.push(Level::Info, location, format!("custom color {} set", rgb.hex()));
                    knots[slot] = rgb;
                }
                None => self.push(
                    Level::Warning,
                    location,
                    format!("invalid color [{value}] (#HHH, #HHHHHH or rgb(R, G, B) expected), default kept"),
                ),
            }
        }
        knots.into()
    }

    fn delays(&mut self, config: &TimerConfig) -> Delays {
        let mut delays = Delays::default();
        let slots = [
            ("delay_1", config.delay_1, &mut delays.delay_1),
            ("delay_2", config.delay_2, &mut delays.delay_2),
            ("delay_3", config.delay_3, &mut delays.delay_3),
        ];
        for (key, value, slot) in slots {
            let Some(value) = value else { continue };
            match u32::try_from(value) {
                Ok(minutes) if minutes >= 1 => *slot = minutes,
                _ => self.push(
                    Level::Warning,
                    format!("timer.{key}"),
                    format!("a positive integer is expected, got {value}, default kept"),
                ),
            }
        }
        delays
    }
}

enum DateSpec {
    Full(NaiveDateTime),
    TimeOnly(NaiveTime),
}

fn parse_date(value: &str) -> Option<DateSpec> {
    let value = value.strip_prefix('#').unwrap_or(value);
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M") {
        return Some(DateSpec::Full(dt));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .ok()
        .map(DateSpec::TimeOnly)
}

/// Derive phase boundaries from accepted round starts.
///
/// The first ramp spans `delay_1` minutes and ends `delay_2` minutes before
/// the start; the post state lasts `delay_3` minutes, except after the
/// last round where it never ends.
fn phases(hours: &[Hour], delays: &Delays) -> Vec<Phase> {
    let d1 = i64::from(delays.delay_1) * 60;
    let d2 = i64::from(delays.delay_2) * 60;
    let d3 = i64::from(delays.delay_3) * 60;
    let last = hours.len() - 1;

    hours
        .iter()
        .enumerate()
        .map(|(i, hour)| Phase {
            timestamp_1: hour.timestamp - d1 - d2,
            timestamp_2: hour.timestamp - d2,
            timestamp_3: hour.timestamp,
            timestamp: hour.timestamp,
            timestamp_next: (i != last).then_some(hour.timestamp + d3),
            text_before: hour.text_before.clone(),
            text_after: hour.text_after.clone(),
            error: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn parse(toml_str: &str) -> TimerConfig {
        toml::from_str(toml_str).unwrap()
    }

    fn build(toml_str: &str) -> BuildOutcome {
        TimerBuilder::new(Utc).build(&parse(toml_str))
    }

    fn ts(s: &str) -> i64 {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M")
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn no_hours_disables_timer() {
        let outcome = build("");
        assert!(outcome.timer.is_none());
        assert_eq!(outcome.diagnostics[0].level, Level::Debug);
    }

    #[test]
    fn computes_boundaries_from_delays() {
        let outcome = build(
            r#"
[[hours]]
id = "1"
date = "2026-10-19 14:00"
[[hours]]
id = "2"
date = "2026-10-19 17:30"
"#,
        );
        let timer = outcome.timer.as_ref().unwrap();
        let start = ts("2026-10-19 14:00");
        let p1 = &timer.phases[0];
        assert_eq!(p1.timestamp_1, start - 20 * 60);
        assert_eq!(p1.timestamp_2, start - 5 * 60);
        assert_eq!(p1.timestamp_3, start);
        assert_eq!(p1.timestamp, start);
        assert_eq!(p1.timestamp_next, Some(start + 10 * 60));
        assert_eq!(p1.text_before, "Début de la ronde 1 dans %s");
        assert_eq!(p1.text_after, "Ronde 1 commencée depuis %s");
        assert_eq!(timer.phases[1].timestamp_next, None);
    }

    #[test]
    fn time_only_inherits_previous_day() {
        let outcome = build(
            r#"
[[hours]]
date = "2026-10-19   9:05"
[[hours]]
date = "13:00"
"#,
        );
        let timer = outcome.timer.as_ref().unwrap();
        assert_eq!(timer.phases[0].timestamp, ts("2026-10-19 09:05"));
        assert_eq!(timer.phases[1].timestamp, ts("2026-10-19 13:00"));
        // Missing ids fall back to positions, hence round texts.
        assert_eq!(timer.phases[1].text_before, "Début de la ronde 2 dans %s");
        assert!(outcome.diagnostics.iter().any(|d| d.level == Level::Debug));
    }

    #[test]
    fn first_hour_needs_a_day() {
        let outcome = build(
            r#"
[[hours]]
date = "13:00"
[[hours]]
date = "2026-10-19 15:00"
"#,
        );
        let timer = outcome.timer.as_ref().unwrap();
        assert_eq!(timer.phases.len(), 1);
        assert_eq!(outcome.warnings().count(), 1);
    }

    #[test]
    fn out_of_order_hour_is_ignored() {
        let outcome = build(
            r#"
[[hours]]
date = "2026-10-19 15:00"
[[hours]]
date = "2026-10-19 15:00"
[[hours]]
date = "2026-10-19 12:00"
[[hours]]
date = "2026-10-20 09:00"
"#,
        );
        let timer = outcome.timer.as_ref().unwrap();
        assert_eq!(timer.phases.len(), 2);
        assert_eq!(timer.phases[1].timestamp, ts("2026-10-20 09:00"));
        assert_eq!(outcome.warnings().count(), 2);
    }

    #[test]
    fn invalid_and_missing_dates_are_ignored() {
        let outcome = build(
            r#"
[[hours]]
date = "tomorrow"
[[hours]]
text_before = "x %s"
[[hours]]
date = "2026-02-30 10:00"
"#,
        );
        assert!(outcome.timer.is_none());
        // Three ignored hours plus the "no valid hour" remark.
        assert_eq!(outcome.warnings().count(), 4);
    }

    #[test]
    fn named_hours_need_both_texts() {
        let outcome = build(
            r#"
[[hours]]
id = "lunch"
date = "2026-10-19 12:00"
text_before = "Repas dans %s"
[[hours]]
id = "closing"
date = "2026-10-19 18:00"
text_before = "Fermeture dans %s"
text_after = "Fermé depuis %s"
"#,
        );
        let timer = outcome.timer.as_ref().unwrap();
        assert_eq!(timer.phases.len(), 1);
        assert_eq!(timer.phases[0].text_after, "Fermé depuis %s");
    }

    #[test]
    fn explicit_texts_override_round_texts() {
        let outcome = build(
            r#"
[[hours]]
id = "3"
date = "2026-10-19 12:00"
text_after = "C'est parti depuis %s"
"#,
        );
        let phase = &outcome.timer.as_ref().unwrap().phases[0];
        assert_eq!(phase.text_before, "Début de la ronde 3 dans %s");
        assert_eq!(phase.text_after, "C'est parti depuis %s");
    }

    #[test]
    fn unknown_hour_keys_warn_but_keep_hour() {
        let outcome = build(
            r#"
[[hours]]
date = "2026-10-19 12:00"
colour = "red"
"#,
        );
        assert_eq!(outcome.timer.as_ref().unwrap().phases.len(), 1);
        let warning = outcome.warnings().next().unwrap();
        assert_eq!(warning.location, "timer.hours.1.colour");
    }

    #[test]
    fn custom_colors_and_delays() {
        let outcome = build(
            r##"
delay_1 = 2
delay_2 = 0
delay_3 = 30
[colors]
1 = "#00F"
3 = "rgb(10, 20, 30)"
4 = "#FFFFFF"
2 = "not a color"
[[hours]]
date = "2026-10-19 12:00"
"##,
        );
        let timer = outcome.timer.as_ref().unwrap();
        assert_eq!(timer.colors.color_1, Rgb::new(0, 0, 255));
        assert_eq!(timer.colors.color_2, Rgb::new(255, 127, 0));
        assert_eq!(timer.colors.color_3, Rgb::new(10, 20, 30));
        assert_eq!(timer.delays.delay_1, 2);
        assert_eq!(timer.delays.delay_2, 5);
        assert_eq!(timer.delays.delay_3, 30);

        let start = ts("2026-10-19 12:00");
        assert_eq!(timer.phases[0].timestamp_1, start - 7 * 60);

        let locations: Vec<&str> = outcome.warnings().map(|d| d.location.as_str()).collect();
        assert!(locations.contains(&"timer.colors.4"));
        assert!(locations.contains(&"timer.colors.2"));
        assert!(locations.contains(&"timer.delay_2"));
    }
}
