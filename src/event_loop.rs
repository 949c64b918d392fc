use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::{Stream, StreamExt};
use ratatui::{Terminal, backend::Backend};
use std::io;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{debug, info};

use crate::app::{App, Channels};
use crate::input::handle_input;
use crate::ui::draw;

const TICK: Duration = Duration::from_millis(250);

/// One pass of the timer: expire banners, kick off due refreshes and keep
/// the spinner moving while a cycle is in flight.
fn on_tick(app: &mut App, now: Instant) {
    app.clear_stale_messages();
    if app.refresh_due(now) {
        let generation = app.start_refresh();
        debug!(generation, "auto refresh");
    }
    if app.is_loading() || app.logs_loading {
        app.dirty = true;
    }
}

pub async fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: App,
    channels: Channels,
) -> Result<()> {
    drive(terminal, app, channels, EventStream::new()).await
}

async fn drive<B, S>(
    terminal: &mut Terminal<B>,
    mut app: App,
    channels: Channels,
    mut reader: S,
) -> Result<()>
where
    B: Backend,
    S: Stream<Item = io::Result<Event>> + Unpin,
{
    let Channels {
        mut events,
        mut loads,
    } = channels;
    let mut ticker = time::interval(TICK);

    loop {
        if app.dirty {
            terminal.draw(|f| draw(f, &mut app))?;
            app.dirty = false;
        }

        if app.should_quit {
            info!("quitting");
            return Ok(());
        }

        tokio::select! {
            _ = ticker.tick() => on_tick(&mut app, Instant::now()),
            Some(Ok(event)) = reader.next() => match event {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_input(&mut app, key);
                    app.dirty = true;
                }
                Event::Resize(..) => app.dirty = true,
                _ => {}
            },
            Ok(()) = loads.changed() => {
                let state = loads.borrow_and_update().clone();
                app.apply_load_state(state);
            }
            Some(event) = events.recv() => {
                app.handle_event(event);
                while let Ok(event) = events.try_recv() {
                    app.handle_event(event);
                }
            }
        }
    }
}
