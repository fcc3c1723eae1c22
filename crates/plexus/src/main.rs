//! Just `main()`. Keep as small as possible.

pub mod cli_args;
pub mod config;
pub mod input;
pub mod pixels;
pub mod run;
pub mod shared_state;
pub mod terminal;

use color_eyre::eyre::Result;

#[expect(clippy::non_ascii_literal, reason = "It's just for debugging")]
#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "It's our central place for communicating with the user on CLI"
)]
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let state = shared_state::SharedState::init();
    let result = run::run(&std::sync::Arc::clone(&state)).await;

    let logpath = state.config.read().await.log_path.clone();
    let is_logging = *state.is_logging.read().await;
    tracing::debug!("Plexus is exiting 🙇");

    match result {
        Ok(()) => {
            if is_logging {
                println!("Logs saved to {}", logpath.display());
            }
        }
        Err(error) => {
            tracing::error!("{error:?}");
            eprintln!("Error: {error}");
            if is_logging {
                eprintln!("See {} for more details", logpath.display());
            }
        }
    }

    Ok(())
}
