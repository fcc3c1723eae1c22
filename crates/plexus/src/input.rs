//! Handle all the raw input directly from the end user.

use std::io::Read as _;
use std::sync::Arc;

use color_eyre::eyre::Result;
use termwiz::input::{InputEvent, KeyCode, Modifiers};

use plexus_field::scheduler::HostEvent;

use crate::shared_state::{SharedState, TTYSize};

/// Bytes from STDIN
pub type BytesFromSTDIN = [u8; 128];

/// Turn a parsed terminal event into something the particle field understands.
///
/// Mouse coordinates from the terminal are 1-based cells. The pointer is put in the middle of
/// its cell, in surface pixels. Terminals can't report the mouse leaving, so reaching the
/// outermost cells counts as having left.
#[must_use]
pub fn translate(event: &InputEvent, tty_size: TTYSize, pixel_scale: f32) -> Option<HostEvent> {
    match event {
        InputEvent::Key(key_event) => match key_event.key {
            KeyCode::Escape | KeyCode::Char('q' | '\u{3}') => Some(HostEvent::End),
            KeyCode::Char('c') if key_event.modifiers.contains(Modifiers::CTRL) => {
                Some(HostEvent::End)
            }
            KeyCode::Char(' ') => Some(HostEvent::TogglePause),
            _ => None,
        },
        InputEvent::Mouse(mouse) => {
            let column = mouse.x.saturating_sub(1);
            let row = mouse.y.saturating_sub(1);
            if tty_size.is_on_edge(column, row) {
                return Some(HostEvent::PointerLeave);
            }

            Some(HostEvent::PointerMove {
                x: (f32::from(column) + 0.5) * pixel_scale,
                y: (f32::from(row) * 2.0 + 1.0) * pixel_scale,
            })
        }
        _ => None,
    }
}

/// Handle input from the user
pub(crate) struct Input {
    /// Where translated events are sent.
    events_tx: tokio::sync::mpsc::Sender<HostEvent>,
    /// Shared app state
    state: Arc<SharedState>,
    /// How many surface pixels make one terminal pixel.
    pixel_scale: f32,
}

impl Input {
    /// Start a thread to listen and parse the end user's STDIN and forward it to the particle
    /// field.
    pub fn start(
        events_tx: tokio::sync::mpsc::Sender<HostEvent>,
        state: Arc<SharedState>,
        pixel_scale: f32,
    ) -> std::thread::JoinHandle<Result<()>> {
        // The Tokio docs actually suggest using `std::thread` to listen on STDIN for interactive
        // applications.
        std::thread::spawn(move || -> Result<()> {
            let events_for_shutdown = events_tx.clone();
            let input = Self {
                events_tx,
                state,
                pixel_scale,
            };
            let result = input.consume_stdin();
            if let Err(error) = result {
                if let Err(send_error) = events_for_shutdown.blocking_send(HostEvent::End) {
                    tracing::error!("Couldn't send end event after STDIN error: {send_error:?}");
                }
                return Err(error);
            }
            Ok(())
        })
    }

    /// Listen to the end user's STDIN and parse all the bytes into events. Returns when the
    /// particle field stops listening.
    fn consume_stdin(&self) -> Result<()> {
        tracing::debug!("Starting to listen on STDIN");

        let stdin = std::io::stdin();
        let mut reader = std::io::BufReader::new(stdin);
        let mut parser = termwiz::input::InputParser::new();

        loop {
            let mut buffer: BytesFromSTDIN = [0; 128];
            let n = reader.read(&mut buffer[..])?;
            if n == 0 {
                color_eyre::eyre::bail!("STDIN closed");
            }

            let Some(bytes) = buffer.get(0..n) else {
                tracing::warn!("Couldn't get bytes from STDIN input buffer");
                continue;
            };
            tracing::trace!("Received STDIN input: {bytes:x?}");

            let mut events = Vec::new();
            parser.parse(bytes, |event| events.push(event), false);

            for event in events {
                if !self.forward(&event)? {
                    tracing::debug!("Particle field stopped listening, leaving STDIN loop");
                    return Ok(());
                }
            }
        }
    }

    /// Send a parsed event on, if it means anything to the particle field. Returns whether the
    /// field is still listening.
    fn forward(&self, event: &InputEvent) -> Result<bool> {
        tracing::trace!("Parsed input event: {event:?}");

        let tty_size = self.state.get_tty_size()?;
        let Some(host_event) = translate(event, tty_size, self.pixel_scale) else {
            return Ok(true);
        };

        Ok(self.events_tx.blocking_send(host_event).is_ok())
    }
}
