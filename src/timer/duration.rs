/// Human-readable French duration, e.g. `2 heures et 5 minutes`.
///
/// Seconds cascade into minutes, hours, days and weeks. Only the largest
/// non-zero unit is shown, followed by the next smaller unit when that one
/// is non-zero. A unit is pluralized only when its value is above 1, so
/// `0 seconde` and `1 minute` stay singular.
pub fn duration(seconds: u64) -> String {
    let sec = seconds % 60;
    let rest = seconds / 60;
    let min = rest % 60;
    let rest = rest / 60;
    let hou = rest % 24;
    let rest = rest / 24;
    let day = rest % 7;
    let wee = rest / 7;

    let tiers = [
        (wee, "semaine"),
        (day, "jour"),
        (hou, "heure"),
        (min, "minute"),
        (sec, "seconde"),
    ];

    // Largest non-zero tier; seconds are reported even when zero.
    let first = tiers.iter().position(|(v, _)| *v > 0).unwrap_or(tiers.len() - 1);
    let (value, unit) = tiers[first];
    let mut text = unit_text(value, unit);
    if let Some(&(next, next_unit)) = tiers.get(first + 1) {
        if next > 0 {
            text.push_str(" et ");
            text.push_str(&unit_text(next, next_unit));
        }
    }
    text
}

/// Same as [`duration`] for a signed difference; negative spans read as 0.
pub fn duration_signed(seconds: i64) -> String {
    duration(seconds.max(0).unsigned_abs())
}

fn unit_text(value: u64, unit: &str) -> String {
    if value > 1 {
        format!("{value} {unit}s")
    } else {
        format!("{value} {unit}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;
    const WEEK: u64 = 7 * DAY;

    #[test]
    fn zero_is_singular_seconds() {
        assert_eq!(duration(0), "0 seconde");
    }

    #[test]
    fn seconds_only() {
        assert_eq!(duration(1), "1 seconde");
        assert_eq!(duration(59), "59 secondes");
    }

    #[test]
    fn one_does_not_pluralize() {
        assert_eq!(duration(61), "1 minute et 1 seconde");
    }

    #[test]
    fn whole_minutes_drop_zero_seconds() {
        assert_eq!(duration(120), "2 minutes");
    }

    #[test]
    fn hours_report_minutes_not_seconds() {
        assert_eq!(duration(3661), "1 heure et 1 minute");
        assert_eq!(duration(2 * HOUR + 59), "2 heures");
    }

    #[test]
    fn days_and_hours() {
        assert_eq!(duration(3 * DAY + 5 * HOUR + 10 * MINUTE), "3 jours et 5 heures");
        assert_eq!(duration(DAY + 30 * MINUTE), "1 jour");
    }

    #[test]
    fn weeks_and_days() {
        assert_eq!(duration(2 * WEEK + DAY + HOUR), "2 semaines et 1 jour");
        assert_eq!(duration(WEEK), "1 semaine");
        assert_eq!(duration(10 * WEEK + 6 * DAY), "10 semaines et 6 jours");
    }

    #[test]
    fn never_empty_or_garbage() {
        for d in (0..200_000).step_by(37).chain([u64::MAX / 2, u64::MAX]) {
            let text = duration(d);
            assert!(!text.is_empty());
            assert!(!text.contains("undefined") && !text.contains("NaN"), "{d}: {text}");
        }
    }

    #[test]
    fn signed_negative_reads_as_zero() {
        assert_eq!(duration_signed(-42), "0 seconde");
        assert_eq!(duration_signed(90), "1 minute et 30 secondes");
    }
}
