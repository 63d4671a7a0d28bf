use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};

/// Events consumed by the display loops.
#[derive(Debug)]
pub enum AppEvent {
    /// A keyboard event.
    Key(KeyEvent),
    /// Terminal was resized.
    #[allow(dead_code)]
    Resize(u16, u16),
    /// Periodic tick driving the timer render step.
    Tick,
    /// The server reported content newer than our timer (unix seconds).
    Updated(i64),
}

/// Multiplexes terminal input, ticks and poller notifications.
///
/// Producers run on background threads and feed one channel; the render
/// loop blocks on `next`.
pub struct EventHandler {
    tx: mpsc::Sender<AppEvent>,
    rx: mpsc::Receiver<AppEvent>,
    _handles: Vec<std::thread::JoinHandle<()>>,
}

impl EventHandler {
    /// Ticks only, no terminal input. Used by the plain display.
    pub fn ticks(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let ticker = tx.clone();
        let handle = std::thread::spawn(move || loop {
            std::thread::sleep(tick_rate);
            if ticker.send(AppEvent::Tick).is_err() {
                return;
            }
        });
        Self {
            tx,
            rx,
            _handles: vec![handle],
        }
    }

    /// Poll crossterm events and tick every `tick_rate`.
    ///
    /// Ticks keep their cadence while keys arrive: the poll timeout is
    /// whatever is left until the next tick is due.
    pub fn terminal(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let input = tx.clone();

        let handle = std::thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                if event::poll(timeout).unwrap_or(false) {
                    let sent = match event::read() {
                        Ok(Event::Key(key)) => input.send(AppEvent::Key(key)),
                        Ok(Event::Resize(w, h)) => input.send(AppEvent::Resize(w, h)),
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        return;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    last_tick = Instant::now();
                    if input.send(AppEvent::Tick).is_err() {
                        return;
                    }
                }
            }
        });

        Self {
            tx,
            rx,
            _handles: vec![handle],
        }
    }

    /// A sender for additional producers such as the update poller.
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    /// Receive the next event, blocking until one is available.
    pub fn next(&self) -> Result<AppEvent, mpsc::RecvError> {
        self.rx.recv()
    }
}
