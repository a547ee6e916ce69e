//! Terminal host for [WorkTimer]: the piece that owns the event loop. It delivers ticks once a
//! second, refreshes totals once an hour, applies commands typed by the user and saves the timer
//! when shutting down.

pub mod display;
pub mod input;
pub mod shutdown;

use std::{
    io::{self, Write},
    time::Duration,
};

use anyhow::Result;
use input::{spawn_stdin_reader, HostCommand};
use tokio::{sync::mpsc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{
    storage::{file_store::FileStore, KeyValueStore},
    timer::{TimerView, WorkTimer},
};

pub struct TerminalHost<S> {
    timer: WorkTimer<S>,
    commands: mpsc::Receiver<HostCommand>,
    shutdown: CancellationToken,
}

impl<S: KeyValueStore> TerminalHost<S> {
    pub fn new(
        timer: WorkTimer<S>,
        commands: mpsc::Receiver<HostCommand>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            timer,
            commands,
            shutdown,
        }
    }

    /// Executes the host event loop until shutdown is requested, then saves the timer one last
    /// time and hands it back.
    pub async fn run(self, mut render: impl FnMut(&TimerView)) -> Result<WorkTimer<S>> {
        let Self {
            mut timer,
            mut commands,
            shutdown,
        } = self;

        let clock = timer.clock();
        let tick_interval = timer.settings().tick_interval;
        let refresh_interval = timer.settings().aggregate_refresh;
        let mut next_tick = clock.instant() + tick_interval;
        let mut next_refresh = clock.instant() + refresh_interval;
        let mut input_open = true;

        render(&timer.view());
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                command = commands.recv(), if input_open => match command {
                    Some(HostCommand::Quit) => {
                        info!("Quit requested");
                        shutdown.cancel();
                        break;
                    }
                    Some(command) => {
                        apply(&mut timer, command);
                        render(&timer.view());
                    }
                    // No more input, keep counting until interrupted.
                    None => input_open = false,
                },
                _ = clock.sleep_until(next_tick) => {
                    next_tick = next_deadline(next_tick, tick_interval, clock.instant());
                    if timer.is_running() {
                        timer.tick();
                        render(&timer.view());
                    }
                }
                _ = clock.sleep_until(next_refresh) => {
                    next_refresh = next_deadline(next_refresh, refresh_interval, clock.instant());
                    timer.refresh_aggregates();
                    render(&timer.view());
                }
            }
        }

        timer.flush();
        Ok(timer)
    }
}

fn apply<S: KeyValueStore>(timer: &mut WorkTimer<S>, command: HostCommand) {
    let result = match command {
        HostCommand::Start => timer.start(),
        HostCommand::Pause => timer.pause(),
        HostCommand::Reset => timer.reset(),
        HostCommand::Set(parts) => timer.set_time(parts),
        HostCommand::Quit => Ok(()),
    };
    if let Err(e) = result {
        error!("Failed to save after {command:?}: {e:?}");
    }
}

/// Next deadline of a repeating timer. Deadlines missed entirely (e.g. after the machine slept)
/// are skipped instead of being replayed one by one.
fn next_deadline(previous: Instant, interval: Duration, now: Instant) -> Instant {
    let next = previous + interval;
    if next < now {
        now + interval
    } else {
        next
    }
}

/// Runs the timer in the current terminal until interrupted or told to quit.
pub async fn run_foreground(timer: WorkTimer<FileStore>) -> Result<()> {
    println!("Commands: start | pause | reset | set HH:MM:SS | quit");
    let (sender, receiver) = mpsc::channel::<HostCommand>(10);
    spawn_stdin_reader(sender);

    let shutdown_token = CancellationToken::new();
    let host = TerminalHost::new(timer, receiver, shutdown_token.clone());

    let (_, host_result) = tokio::join!(
        shutdown::detect_shutdown(shutdown_token),
        host.run(|view| {
            print!("\r\x1b[2K{}", display::render(view, true));
            let _ = io::stdout().flush();
        }),
    );
    println!();

    host_result?;
    Ok(())
}
