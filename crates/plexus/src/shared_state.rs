//! Here we store the little bit of data that the host's tasks and threads share.
//! Access is mediated with locks to support asynchronicity

use std::sync::Arc;

use color_eyre::eyre::{eyre, Result};
use tokio::sync::RwLock;

/// The size of the user's terminal
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
#[expect(
    clippy::exhaustive_structs,
    reason = "It's very unlikely that this is going to have any more fields added to it"
)]
pub struct TTYSize {
    /// Width of the TTY
    pub width: u16,
    /// Height of the TTY
    pub height: u16,
}

impl TTYSize {
    /// Whether the given 0-based cell is on the outermost ring of the terminal. A pointer can't
    /// be seen leaving a terminal, so being here is as close as we get.
    #[must_use]
    pub const fn is_on_edge(&self, column: u16, row: u16) -> bool {
        column == 0
            || row == 0
            || column >= self.width.saturating_sub(1)
            || row >= self.height.saturating_sub(1)
    }
}

/// All the shared data the app uses
#[non_exhaustive]
pub struct SharedState {
    /// User config
    pub config: RwLock<crate::config::Config>,
    /// Just the size of the user's terminal. It's read from the STDIN thread and written from
    /// inside the render loop, neither of which can `.await`, so it's a `std` lock.
    pub tty_size: std::sync::RwLock<TTYSize>,
    /// Is the application logging?
    pub is_logging: RwLock<bool>,
}

impl SharedState {
    /// Initialise the shared state
    #[must_use]
    pub fn init() -> Arc<Self> {
        Arc::new(Self {
            config: RwLock::default(),
            tty_size: std::sync::RwLock::default(),
            is_logging: RwLock::default(),
        })
    }

    /// Get a read lock and return the current TTY size
    pub fn get_tty_size(&self) -> Result<TTYSize> {
        let tty_size = self
            .tty_size
            .read()
            .map_err(|error| eyre!("TTY size lock poisoned: {error:?}"))?;
        Ok(*tty_size)
    }

    /// Get a write lock and set the a new TTY size
    pub fn set_tty_size(&self, width: u16, height: u16) -> Result<()> {
        let mut tty_size = self
            .tty_size
            .write()
            .map_err(|error| eyre!("TTY size lock poisoned: {error:?}"))?;
        *tty_size = TTYSize { width, height };
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn edges_of_the_terminal() {
        let size = TTYSize {
            width: 80,
            height: 24,
        };
        assert!(size.is_on_edge(0, 10));
        assert!(size.is_on_edge(10, 0));
        assert!(size.is_on_edge(79, 10));
        assert!(size.is_on_edge(10, 23));
        assert!(!size.is_on_edge(1, 1));
        assert!(!size.is_on_edge(78, 22));
    }

    #[test]
    fn tty_size_round_trips_through_the_lock() {
        let state = SharedState::init();
        state.set_tty_size(100, 40).unwrap();
        assert_eq!(
            state.get_tty_size().unwrap(),
            TTYSize {
                width: 100,
                height: 40
            }
        );
    }
}
