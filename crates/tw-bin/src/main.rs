//! tilewin entrypoint: terminal setup, logging, and the select loop over
//! input and the message-queue wakeup.

mod app;
mod config;
mod pane;

use anyhow::Result;
use app::App;
use clap::Parser;
use core_input::{TermEvent, spawn_input_thread};
use core_layout::Laymgr;
use core_terminal::TermSurface;
use core_window::{Ui, WM_QUIT};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tilewin", version, about = "Tiling terminal panes")]
struct Args {
    /// Configuration file path (overrides discovery of `tilewin.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
}

fn configure_logging() -> Result<WorkerGuard> {
    use tracing_subscriber::EnvFilter;

    let log_dir = Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, "tilewin.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn install_panic_hook() {
    let default = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(target: "runtime", %info, "panic");
        default(info);
    }));
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging()?;
    install_panic_hook();
    info!(target: "runtime", "startup");

    let config = config::load_from(args.config.as_deref())?;
    let mut surface = TermSurface::new()?;
    surface.set_title(&config.title)?;
    let mut ui = Ui::new(surface)?;

    let lm = Laymgr::new(&mut ui, None);
    let app = Rc::new(App::new(lm, config));

    let first = pane::Pane::create(&mut ui, &app)?;
    let root_lay = app.lm.root();
    app.lm.set_window(&mut ui, root_lay, Some(first.window()));
    ui.set_focus(Some(first.window()));
    app.lm.update(&mut ui, true);

    let (tx, input_rx) = crossbeam_channel::unbounded();
    let _input_thread = spawn_input_thread(tx);
    let wake_rx = ui.wake_receiver();
    info!(target: "runtime", "entering event loop");

    loop {
        // Drain the queue; the paint pass runs when it empties.
        while let Some(msg) = ui.get_message() {
            if msg.id == WM_QUIT {
                info!(target: "runtime", "quit");
                ui.shutdown();
                return Ok(());
            }
            ui.dispatch(msg);
        }

        crossbeam_channel::select! {
            recv(input_rx) -> ev => match ev {
                Ok(TermEvent::Char(ch, mods)) => ui.send_char(ch, mods),
                Ok(TermEvent::Key(key, mods)) => ui.send_key(key, mods),
                Ok(TermEvent::Resize(cols, rows)) => {
                    debug!(target: "runtime", cols, rows, "resize event");
                    ui.resize()?;
                }
                Err(_) => {
                    info!(target: "runtime", "input channel closed");
                    ui.shutdown();
                    return Ok(());
                }
            },
            recv(wake_rx) -> _ => {}
        }
    }
}
