//! Main entrypoint for running Plexus

use std::sync::Arc;

use clap::Parser as _;
use color_eyre::eyre::{ContextCompat as _, Result};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _, Layer as _};

use plexus_field::scheduler::{FrameScheduler, HostEvent};

use crate::cli_args::CliArgs;
use crate::config::Config;
use crate::input::Input;
use crate::shared_state::SharedState;
use crate::terminal::TerminalCanvas;

/// How many host events can queue up before senders have to wait.
const EVENT_QUEUE_SIZE: usize = 64;

/// Main entrypoint
pub(crate) async fn run(state: &Arc<SharedState>) -> Result<()> {
    setup(state).await?;
    let config = state.config.read().await.clone();

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(EVENT_QUEUE_SIZE);

    let maybe_canvas = TerminalCanvas::try_open(Arc::clone(state), config.pixel_scale);
    let maybe_input_thread_handle = maybe_canvas
        .is_some()
        .then(|| Input::start(events_tx.clone(), Arc::clone(state), config.pixel_scale));
    let resize_handle = watch_for_resizes(events_tx);

    FrameScheduler::start(maybe_canvas, config.field, config.frame_rate, events_rx).await?;
    tracing::debug!("🏁 left the frame loop, exiting Plexus...");

    resize_handle.abort();
    if let Some(input_thread_handle) = maybe_input_thread_handle {
        if input_thread_handle.is_finished() {
            // The STDIN loop blocks on reading, so it can't be told to exit. Therefore we should
            // only join it if it finished due of its own error.
            input_thread_handle
                .join()
                .map_err(|err| color_eyre::eyre::eyre!("STDIN handle: {err:?}"))??;
        }
    }

    tracing::trace!("Leaving Plexus's main `run()` function");
    Ok(())
}

/// Tell the particle field every time the user's terminal changes size.
#[cfg(unix)]
fn watch_for_resizes(
    events_tx: tokio::sync::mpsc::Sender<HostEvent>,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        let mut signals =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::window_change())?;
        while signals.recv().await.is_some() {
            tracing::trace!("Terminal resized");
            if events_tx.send(HostEvent::Resize).await.is_err() {
                break;
            }
        }
        Ok(())
    })
}

/// Other platforms don't send resize signals.
#[cfg(not(unix))]
fn watch_for_resizes(
    events_tx: tokio::sync::mpsc::Sender<HostEvent>,
) -> tokio::task::JoinHandle<Result<()>> {
    tokio::spawn(async move {
        drop(events_tx);
        Ok(())
    })
}

/// Prepare the application to start.
async fn setup(state: &Arc<SharedState>) -> Result<()> {
    let cli_args = CliArgs::parse();

    let directory_result = Config::setup_directory(cli_args.config_dir.clone());
    let directory = match directory_result {
        Ok(directory) => directory,
        Err(directory_error) => {
            color_eyre::eyre::bail!("Error setting up config directory: {directory_error:?}");
        }
    };

    let config_result = Config::load(&directory, &cli_args.main_config);
    let mut config = match config_result {
        Ok(config) => config,
        Err(config_error) => {
            let path = directory.join(&cli_args.main_config);
            color_eyre::eyre::bail!(
                "Bad config file: {config_error:?}\n\nConfig path: {}",
                path.display()
            );
        }
    };
    config.apply_cli_args(&cli_args)?;
    *state.config.write().await = config;

    setup_logging(state).await?;

    // Assuming true colour makes Plexus simpler.
    std::env::set_var("COLORTERM", "truecolor");

    tracing::info!("Starting Plexus");
    tracing::debug!("Loaded config: {:?}", state.config.read().await);

    Ok(())
}

/// Setup logging
async fn setup_logging(state: &Arc<SharedState>) -> Result<()> {
    let are_log_filters_manually_set = std::env::var("PLEXUS_LOG").is_ok();
    let path = state.config.read().await.log_path.clone();
    let level = state.config.read().await.log_level.clone();
    let level_as_string = format!("{level:?}").to_lowercase();

    let is_loggable = !matches!(level, crate::config::LogLevel::Off) || are_log_filters_manually_set;

    if !is_loggable {
        return Ok(());
    }

    let directory = path.parent().context("Couldn't get log path's parent")?;
    std::fs::create_dir_all(directory)?;
    let file = std::fs::File::create(path)?;

    let filters = if are_log_filters_manually_set {
        if let Ok(user_filters) = std::env::var("PLEXUS_LOG") {
            std::env::set_var("RUST_LOG", user_filters);
        }

        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("error".parse()?)
            .from_env_lossy()
    } else {
        tracing_subscriber::EnvFilter::builder()
            .with_default_directive("off".parse()?)
            .from_env_lossy()
            .add_directive(format!("plexus={level_as_string}").parse()?)
            .add_directive(format!("plexus_field={level_as_string}").parse()?)
    };

    let logfile_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_filter(filters);

    let tracing_setup = tracing_subscriber::registry().with(logfile_layer);

    if std::env::var_os("ENABLE_TOKIO_CONSOLE") == Some("1".into()) {
        let console_layer = console_subscriber::spawn();
        tracing_setup.with(console_layer).init();
    } else {
        tracing_setup.init();
    }

    *state.is_logging.write().await = true;

    Ok(())
}
