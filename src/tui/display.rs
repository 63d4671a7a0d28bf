use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{KeyCode, KeyEventKind};

use crate::config::AppConfig;
use crate::refresh::Poller;
use crate::render::Renderer;
use crate::source::TimerSource;
use crate::timer::Timer;
use crate::tui::event::{AppEvent, EventHandler};
use crate::tui::widgets::timer::TimerView;
use crate::tui::{self, Tui};

/// Run the full-screen timer until the user quits.
///
/// Keys: `q`/`Esc` quit, `r` reloads the timer. Server updates reported by
/// the poller reload it too.
pub fn run(source: &TimerSource, config: &AppConfig, timer: Timer, poll: bool) -> Result<()> {
    let mut terminal = tui::init()?;
    let result = run_loop(&mut terminal, source, config, timer, poll);
    tui::restore()?;
    result
}

fn run_loop(
    terminal: &mut Tui,
    source: &TimerSource,
    config: &AppConfig,
    timer: Timer,
    poll: bool,
) -> Result<()> {
    let events = EventHandler::terminal(Duration::from_millis(config.display.tick_ms));
    let _poller = if poll {
        Poller::from_config(&config.refresh, Local::now().timestamp(), events.sender())?
    } else {
        None
    };

    let mut renderer = Renderer::new(timer);
    let mut view = TimerView::new(config.display.title.as_str());
    renderer.step(&Local::now(), &mut view);

    loop {
        terminal.draw(|frame| frame.render_widget(&view, frame.area()))?;

        match events.next()? {
            AppEvent::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('r') => {
                    tracing::info!("manual reload requested");
                    reload(source, &mut renderer, &mut view);
                }
                _ => {}
            },
            AppEvent::Updated(last_update) => {
                tracing::info!(last_update, "reloading after server update");
                reload(source, &mut renderer, &mut view);
            }
            AppEvent::Tick => {
                renderer.step(&Local::now(), &mut view);
            }
            AppEvent::Key(_) | AppEvent::Resize(_, _) => {}
        }
    }

    Ok(())
}

fn reload(source: &TimerSource, renderer: &mut Renderer, view: &mut TimerView) {
    if let Some(config) = source.reload_into(renderer) {
        view.set_title(config.display.title);
        renderer.step(&Local::now(), view);
    }
}
