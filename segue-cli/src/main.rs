use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use log::LevelFilter;

use segue_core::{
    GroupKind, PlaybackQueue, RepeatMode, ShuffleMode, Track,
    commands::QueueCommand,
    engine::{QueueEngine, QueueEngineHandle},
    scope,
};

mod input;
mod logger;
mod state;

use input::{HELP, Input};
use state::AppState;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Drive a play queue from the terminal, one command per line
#[derive(Debug, Parser)]
#[command(name = "segue", version, about)]
struct Args {
    /// Audio files to enqueue
    files: Vec<PathBuf>,

    /// Initial repeat mode
    #[arg(long, default_value_t = RepeatMode::Off)]
    repeat: RepeatMode,

    /// Initial shuffle mode
    #[arg(long, default_value_t = ShuffleMode::Off)]
    shuffle: ShuffleMode,

    /// Log level, overrides RUST_LOG
    #[arg(long)]
    log_level: Option<LevelFilter>,

    /// Seed for a reproducible shuffle order
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::setup_logging(args.log_level)?;

    log::info!("Starting segue");

    let mut queue = match args.seed {
        Some(seed) => PlaybackQueue::new().with_shuffle_seed(seed),
        None => PlaybackQueue::new(),
    };
    let added = queue.add_tracks(args.files.iter().map(Track::new));
    queue.set_repeat_and_shuffle_modes(args.repeat, args.shuffle);
    log::info!("Adding {} files to queue from CLI", added.len());

    // Create queue engine and get communication handle
    let (engine, handle) = QueueEngine::with_queue(queue);
    let engine_thread = engine.spawn()?;

    let result = run(&handle);

    // Ensure clean shutdown
    let _ = handle.send(QueueCommand::Quit);
    drop(handle);
    if engine_thread.join().is_err() {
        log::error!("Queue engine thread panicked");
    }

    result
}

fn run(handle: &QueueEngineHandle) -> anyhow::Result<()> {
    let mut state = AppState::new();
    state.queue_size = handle.tracks.len();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print_prompt(&mut stdout, &state)?;

    for line in stdin.lock().lines() {
        let line = line?;

        match input::parse_line(&line) {
            Ok(Input::Command(command)) => {
                let quitting = matches!(command, QueueCommand::Quit);
                handle.send(command)?;
                await_response(handle, &mut state)?;
                if quitting || state.shutdown {
                    break;
                }
                writeln!(stdout, "{}", state.status_message)?;
            }
            Ok(Input::List) => print_queue(&mut stdout, handle, &state)?,
            Ok(Input::Groups(kind)) => print_groups(&mut stdout, handle, kind)?,
            Ok(Input::Help) => writeln!(stdout, "{}", HELP)?,
            Ok(Input::Empty) => {}
            Err(err) => writeln!(stdout, "{:#}", err)?,
        }

        print_prompt(&mut stdout, &state)?;
    }

    Ok(())
}

/// Every command gets exactly one response
fn await_response(handle: &QueueEngineHandle, state: &mut AppState) -> anyhow::Result<()> {
    match handle.resp_rx.recv_timeout(RESPONSE_TIMEOUT) {
        Ok(response) => {
            state.handle_response(response);
            Ok(())
        }
        Err(RecvTimeoutError::Timeout) => anyhow::bail!("Queue engine did not respond"),
        Err(RecvTimeoutError::Disconnected) => anyhow::bail!("Queue engine has stopped"),
    }
}

fn print_queue(out: &mut impl Write, handle: &QueueEngineHandle, state: &AppState) -> io::Result<()> {
    let playing = state.now_playing.as_ref().map(|(index, _)| *index);
    let tracks = handle.tracks.read();

    if tracks.is_empty() {
        return writeln!(out, "(queue is empty)");
    }
    for (index, track) in tracks.iter().enumerate() {
        let marker = if Some(index) == playing { ">" } else { " " };
        writeln!(out, "{} {:>3}  {}", marker, index, track)?;
    }
    Ok(())
}

fn print_groups(out: &mut impl Write, handle: &QueueEngineHandle, kind: GroupKind) -> io::Result<()> {
    let groups = scope::groups(&handle.tracks.read(), kind);
    if groups.is_empty() {
        return writeln!(out, "(no {} tags in the queue)", kind);
    }
    for group in groups {
        writeln!(out, "  {}", group.name)?;
    }
    Ok(())
}

fn print_prompt(out: &mut impl Write, state: &AppState) -> io::Result<()> {
    write!(out, "[{}] > ", state.modes)?;
    out.flush()
}
