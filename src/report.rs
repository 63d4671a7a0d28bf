use anyhow::{Context, Result};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use console::style;
use serde::Serialize;

use crate::paths;
use crate::source::TimerSource;
use crate::timer::resolver::{resolve, Resolution};
use crate::timer::schedule::Level;
use crate::timer::Timer;

/// Resolve `--at` to a local instant, defaulting to now.
///
/// Accepts `YYYY-MM-DD hh:mm:ss` or `YYYY-MM-DD hh:mm`.
pub fn resolve_instant(at: Option<&str>) -> Result<DateTime<Local>> {
    let Some(s) = at else {
        return Ok(Local::now());
    };
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .with_context(|| format!("Invalid instant [{s}] (expected YYYY-MM-DD hh:mm[:ss])"))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .with_context(|| format!("[{s}] does not exist in the local time zone"))
}

/// Print what the display shows at one instant.
pub fn show(timer: &Timer, at: &DateTime<Local>, json: bool) -> Result<()> {
    let resolution = resolve(timer, at.timestamp());

    if json {
        #[derive(Serialize)]
        struct Shown<'a> {
            at: i64,
            resolution: Option<&'a Resolution>,
        }
        let shown = Shown {
            at: at.timestamp(),
            resolution: resolution.as_ref(),
        };
        println!("{}", serde_json::to_string_pretty(&shown)?);
        return Ok(());
    }

    println!("  At:     {}", style(at.format("%Y-%m-%d %H:%M:%S")).cyan());
    let Some(r) = resolution else {
        println!("  {}", style("No phase covers this instant; the display keeps its last state.").yellow());
        return Ok(());
    };
    let [red, green, blue] = r.color.to_bytes();
    println!("  Phase:  {} ({})", r.phase + 1, r.state.label());
    println!(
        "  Color:  {} {}",
        r.color,
        style("      ").on_color256(ansi256(red, green, blue))
    );
    println!("  Text:   {}", style(&r.text).bold());
    Ok(())
}

/// Map an RGB color to the nearest entry of the xterm 6x6x6 cube.
fn ansi256(red: u8, green: u8, blue: u8) -> u8 {
    let level = |c: u8| ((u16::from(c) * 5 + 127) / 255) as u8;
    16 + 36 * level(red) + 6 * level(green) + level(blue)
}

#[derive(Serialize)]
struct PhaseRow {
    index: usize,
    skipped: bool,
    ramp_1: String,
    ramp_2: String,
    target: String,
    next: Option<String>,
    text_before: String,
    text_after: String,
}

fn local(ts: i64) -> String {
    Local
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// List phases with their boundaries as local date-times.
pub fn phases(timer: &Timer, json: bool) -> Result<()> {
    let rows: Vec<PhaseRow> = timer
        .phases
        .iter()
        .enumerate()
        .map(|(i, p)| PhaseRow {
            index: i + 1,
            skipped: p.error,
            ramp_1: local(p.timestamp_1),
            ramp_2: local(p.timestamp_2),
            target: local(p.timestamp),
            next: p.timestamp_next.map(local),
            text_before: p.text_before.clone(),
            text_after: p.text_after.clone(),
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    let knots = &timer.colors;
    let delays = &timer.delays;
    println!("{}", style("Timer").bold());
    println!(
        "  Colors: {} -> {} -> {}",
        knots.color_1.hex(),
        knots.color_2.hex(),
        knots.color_3.hex()
    );
    println!(
        "  Delays: {} min ramp, {} min ramp, {} min after start",
        delays.delay_1, delays.delay_2, delays.delay_3
    );
    println!();

    for row in &rows {
        let header = format!("  #{}  {}", row.index, row.target);
        if row.skipped {
            println!("{}  {}", style(header).dim(), style("(skipped)").yellow());
            continue;
        }
        println!("{}", style(header).bold());
        println!("      ramps at {} and {}", row.ramp_1, row.ramp_2);
        if let Some(next) = &row.next {
            println!("      hands over at {next}");
        }
        println!("      before: {}", row.text_before);
        println!("      after:  {}", row.text_after);
    }
    Ok(())
}

/// Print configuration remarks. Returns the number of warnings.
pub fn check(source: &TimerSource) -> Result<usize> {
    let loaded = source.load()?;
    let outcome = &loaded.outcome;

    for d in &outcome.diagnostics {
        let tag = match d.level {
            Level::Debug => style("debug").dim(),
            Level::Info => style("info").cyan(),
            Level::Warning => style("warning").yellow().bold(),
        };
        println!("  {tag:>8}  {d}");
    }

    match &outcome.timer {
        Some(timer) => println!(
            "{} {} phase(s), {} usable",
            style("OK").green().bold(),
            timer.phases.len(),
            timer.valid_phase_count()
        ),
        None => println!("{}", style("No timer configured").red().bold()),
    }
    match &loaded.config.refresh.url {
        Some(url) => println!(
            "  Refresh: {} every {}s",
            style(url).cyan(),
            loaded.config.refresh.interval_secs
        ),
        None => println!("  Refresh: {}", style("off").dim()),
    }
    Ok(outcome.warnings().count())
}

/// Show where config and data live.
pub fn show_paths() {
    println!("  Config:  {}", style(paths::config_file().display()).cyan());
    println!("  Data:    {}", style(paths::data_dir().display()).cyan());
    println!("  Log:     {}", style(paths::log_file().display()).cyan());
}
