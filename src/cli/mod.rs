pub mod history;

use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;

use crate::{
    host::{display::render, run_foreground},
    session::parts::TimeParts,
    storage::file_store::FileStore,
    timer::{settings::TimerSettings, WorkTimer},
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::enable_logging,
        runtime::single_thread_runtime,
    },
};

#[derive(Parser, Debug)]
#[command(name = "Worktimer", version, long_about = None)]
#[command(about = "Work-session stopwatch that remembers your day", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Show logs in the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Keep the timer open in this terminal, reading commands from input")]
    Run {
        #[arg(long, help = "Start counting right away")]
        start: bool,
    },
    #[command(about = "Start or resume the session")]
    Start {},
    #[command(about = "Pause the session")]
    Pause {},
    #[command(about = "Stop the session and clear its time")]
    Reset {},
    #[command(about = "Set the session time. Out of range values are clamped")]
    Set {
        #[arg(help = "Time as HH:MM:SS, HH:MM or HH")]
        time: TimeParts,
    },
    #[command(about = "Show the session and worked time totals")]
    Status {},
    #[command(about = "Show worked time per day")]
    History {},
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(&ensure_dir(dir.join("logs"))?, logging_level, args.log)?;

    let store = FileStore::open(&dir)?;
    let mut timer = WorkTimer::open(store, Arc::new(DefaultClock), TimerSettings::default());
    match args.commands {
        Commands::Run { start } => {
            if start {
                timer.start()?;
            }
            return single_thread_runtime()?.block_on(run_foreground(timer));
        }
        Commands::Start {} => timer.start()?,
        Commands::Pause {} => timer.pause()?,
        Commands::Reset {} => timer.reset()?,
        Commands::Set { time } => timer.set_time(time)?,
        Commands::Status {} => (),
        Commands::History {} => return history::print_history(&mut timer),
    }
    timer.refresh_aggregates();
    println!("{}", render(&timer.view(), false));
    Ok(())
}
