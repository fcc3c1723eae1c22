//! The render loop: one full field update and redraw per tick, never overlapping.

use std::ops::ControlFlow;

use color_eyre::eyre::Result;

use crate::adapter::ViewportAdapter;
use crate::canvas::{Canvas, Region};
use crate::config::Config;
use crate::field::ParticleField;
use crate::linker::ProximityLinker;

/// The number of microseconds in a second.
pub const MICROSECONDS_PER_SECOND: u64 = 1_000_000;

/// The default target frame rate.
pub const DEFAULT_FRAME_RATE: u32 = 30;

/// Everything the host can tell the field about.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum HostEvent {
    /// The viewport changed size. The new size is queried from the canvas.
    Resize,
    /// The pointer moved, in surface pixels.
    PointerMove {
        /// Horizontal position
        x: f32,
        /// Vertical position
        y: f32,
    },
    /// The pointer left the interactive area.
    PointerLeave,
    /// Pause or resume the animation.
    TogglePause,
    /// Stop the loop.
    End,
}

/// Whether the animation is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RunState {
    /// A tick on every frame.
    Running,
    /// No ticks. The last frame stays on the surface.
    Paused,
}

/// `FrameScheduler`
pub struct FrameScheduler<C: Canvas> {
    /// Where everything gets drawn.
    canvas: C,
    /// All the particles.
    field: ParticleField,
    /// Keeps track of the viewport and the pointer.
    adapter: ViewportAdapter,
    /// Draws the lines between particles.
    linker: ProximityLinker,
    /// Target frames per second.
    frame_rate: u32,
    /// The time at which the previous frame was rendered.
    last_frame_tick: tokio::time::Instant,
    /// Running or paused.
    state: RunState,
    /// How many frames have been drawn.
    frames: u64,
}

impl<C: Canvas> FrameScheduler<C> {
    /// Instantiate. This sizes the surface and seeds the field straight away, as if the
    /// viewport had just been resized.
    pub fn new(mut canvas: C, config: Config, frame_rate: u32) -> Result<Self> {
        let initial_viewport = canvas.viewport_size()?;
        let linker = ProximityLinker::new(config.link_strategy, config.appearance.clone());
        let adapter = ViewportAdapter::new(config, initial_viewport.width);

        let mut scheduler = Self {
            canvas,
            field: ParticleField::new(),
            adapter,
            linker,
            frame_rate: frame_rate.max(1),
            last_frame_tick: tokio::time::Instant::now(),
            state: RunState::Running,
            frames: 0,
        };
        scheduler
            .adapter
            .on_resize(&mut scheduler.canvas, &mut scheduler.field)?;

        Ok(scheduler)
    }

    /// Our main entrypoint. Without a canvas there's nothing to draw on, so nothing happens.
    pub async fn start(
        maybe_canvas: Option<C>,
        config: Config,
        frame_rate: u32,
        events: tokio::sync::mpsc::Receiver<HostEvent>,
    ) -> Result<()> {
        let Some(canvas) = maybe_canvas else {
            tracing::debug!("No drawing surface available, not starting the particle field");
            return Ok(());
        };

        Self::launch(canvas, config, frame_rate, events).await?;
        Ok(())
    }

    /// Draw the first frame straight away, then run the loop. Returns the scheduler once the
    /// loop has ended.
    pub async fn launch(
        canvas: C,
        config: Config,
        frame_rate: u32,
        events: tokio::sync::mpsc::Receiver<HostEvent>,
    ) -> Result<Self> {
        let mut scheduler = Self::new(canvas, config, frame_rate)?;
        scheduler.tick()?;
        scheduler.run(events).await?;
        Ok(scheduler)
    }

    /// Tick on every frame and handle host events in between. Runs until the host sends
    /// `HostEvent::End` or hangs up.
    pub async fn run(
        &mut self,
        mut events: tokio::sync::mpsc::Receiver<HostEvent>,
    ) -> Result<()> {
        tracing::debug!("Starting the frame loop at {} fps", self.frame_rate);

        #[expect(
            clippy::integer_division_remainder_used,
            reason = "This is caused by the `tokio::select!`"
        )]
        loop {
            tokio::select! {
                () = self.sleep_until_next_frame_tick() => {
                    if matches!(self.state, RunState::Running) {
                        self.tick()?;
                    }
                },
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else {
                        tracing::debug!("All host event senders gone");
                        break;
                    };
                    if self.handle_event(event)?.is_break() {
                        break;
                    }
                }
            }
        }

        tracing::debug!("Left the frame loop after {} frames", self.frames);
        Ok(())
    }

    /// Advance the field by one tick and redraw everything.
    pub fn tick(&mut self) -> Result<()> {
        let viewport = self.adapter.viewport();
        let bounds = viewport.dimensions;
        let pointer = viewport.pointer;
        let field_config = *self.adapter.field_config();

        self.field.advance(bounds, pointer, &field_config);
        self.draw_frame()
    }

    /// Clear the surface, draw every particle, then the links between them.
    fn draw_frame(&mut self) -> Result<()> {
        let viewport = self.adapter.viewport();
        let bounds = viewport.dimensions;
        let pointer = viewport.pointer;
        let field_config = *self.adapter.field_config();

        self.canvas.clear(Region::whole(bounds))?;

        let colour = self.linker.appearance.particle_colour();
        for particle in self.field.particles() {
            particle.draw(&mut self.canvas, colour)?;
        }

        self.linker.compute_and_draw(
            self.field.particles(),
            pointer,
            &field_config,
            &mut self.canvas,
        )?;

        self.canvas.present()?;
        self.frames += 1;
        Ok(())
    }

    /// Handle a single event from the host.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<ControlFlow<()>> {
        tracing::trace!("Handling host event: {event:?}");

        match event {
            HostEvent::Resize => {
                self.adapter.on_resize(&mut self.canvas, &mut self.field)?;
                if matches!(self.state, RunState::Paused) {
                    self.draw_frame()?;
                }
            }
            HostEvent::PointerMove { x, y } => self.adapter.on_pointer_move(x, y),
            HostEvent::PointerLeave => self.adapter.on_pointer_leave(),
            HostEvent::TogglePause => {
                self.state = match self.state {
                    RunState::Running => RunState::Paused,
                    RunState::Paused => RunState::Running,
                };
                tracing::debug!("Animation is now {:?}", self.state);
            }
            HostEvent::End => {
                tracing::debug!("Host asked the frame loop to end");
                return Ok(ControlFlow::Break(()));
            }
        }

        Ok(ControlFlow::Continue(()))
    }

    /// Sleep until the next frame render is due.
    pub async fn sleep_until_next_frame_tick(&mut self) {
        let target = MICROSECONDS_PER_SECOND.wrapping_div(self.frame_rate.into());
        let target_frame_rate_micro = std::time::Duration::from_micros(target);
        if let Some(wait) = target_frame_rate_micro.checked_sub(self.last_frame_tick.elapsed()) {
            tokio::time::sleep(wait).await;
        }
        self.last_frame_tick = tokio::time::Instant::now();
    }

    /// The surface being drawn on.
    pub const fn canvas(&self) -> &C {
        &self.canvas
    }

    /// The surface being drawn on, mutably. For hosts that need to reach their own canvas.
    pub const fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// All the particles.
    pub const fn field(&self) -> &ParticleField {
        &self.field
    }

    /// The viewport and pointer.
    pub const fn adapter(&self) -> &ViewportAdapter {
        &self.adapter
    }

    /// Running or paused.
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// How many frames have been drawn so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod test {
    use glam::Vec2;

    use super::*;
    use crate::canvas::{DrawCommand, Recorder};
    use crate::state::Dimensions;

    fn scheduler(width: f32, height: f32) -> FrameScheduler<Recorder> {
        FrameScheduler::new(Recorder::new(width, height), Config::default(), 60).unwrap()
    }

    #[test]
    fn construction_sizes_and_seeds_the_field() {
        let scheduler = scheduler(500.0, 300.0);
        assert_eq!(scheduler.canvas().dimensions(), Dimensions::new(500.0, 300.0));
        assert_eq!(scheduler.field().len(), 40);
        assert_eq!(scheduler.state(), RunState::Running);
        assert_eq!(scheduler.frames(), 0);
    }

    #[test]
    fn a_tick_clears_then_draws_particles_then_links() {
        let mut scheduler = scheduler(1024.0, 768.0);
        scheduler.tick().unwrap();

        let frame = &scheduler.canvas().last_frame;
        assert_eq!(
            frame.first(),
            Some(&DrawCommand::Clear(Region::whole(Dimensions::new(
                1024.0, 768.0
            ))))
        );
        assert_eq!(scheduler.canvas().circles().len(), 80);

        let first_line = frame
            .iter()
            .position(|command| matches!(command, DrawCommand::Line { .. }));
        let last_circle = frame
            .iter()
            .rposition(|command| matches!(command, DrawCommand::Circle { .. }));
        if let (Some(line), Some(circle)) = (first_line, last_circle) {
            assert!(line > circle);
        }
        assert_eq!(scheduler.frames(), 1);
        assert_eq!(scheduler.canvas().frames_presented, 1);
    }

    #[test]
    fn pointer_events_reach_the_viewport() {
        let mut scheduler = scheduler(800.0, 600.0);
        scheduler
            .handle_event(HostEvent::PointerMove { x: 5.0, y: 6.0 })
            .unwrap();
        assert_eq!(scheduler.adapter().viewport().pointer, Some(Vec2::new(5.0, 6.0)));

        scheduler.handle_event(HostEvent::PointerLeave).unwrap();
        assert!(scheduler.adapter().viewport().pointer.is_none());
    }

    #[test]
    fn toggling_pause() {
        let mut scheduler = scheduler(800.0, 600.0);
        scheduler.handle_event(HostEvent::TogglePause).unwrap();
        assert_eq!(scheduler.state(), RunState::Paused);
        scheduler.handle_event(HostEvent::TogglePause).unwrap();
        assert_eq!(scheduler.state(), RunState::Running);
    }

    #[test]
    fn resizing_while_paused_redraws_once() {
        let mut scheduler = scheduler(800.0, 600.0);
        scheduler.handle_event(HostEvent::TogglePause).unwrap();
        scheduler.canvas.viewport = Dimensions::new(400.0, 300.0);

        scheduler.handle_event(HostEvent::Resize).unwrap();

        assert_eq!(scheduler.frames(), 1);
        assert_eq!(scheduler.canvas().dimensions(), Dimensions::new(400.0, 300.0));
    }

    #[test]
    fn end_breaks_the_loop() {
        let mut scheduler = scheduler(800.0, 600.0);
        let flow = scheduler.handle_event(HostEvent::End).unwrap();
        assert!(flow.is_break());
    }

    #[tokio::test]
    async fn run_ticks_until_told_to_end() {
        let mut scheduler = scheduler(800.0, 600.0);
        let (events_tx, events_rx) = tokio::sync::mpsc::channel(16);

        tokio::spawn(async move {
            events_tx
                .send(HostEvent::PointerMove { x: 1.0, y: 2.0 })
                .await
                .unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            events_tx.send(HostEvent::End).await.unwrap();
        });

        scheduler.run(events_rx).await.unwrap();

        assert!(scheduler.frames() > 0);
        assert_eq!(scheduler.adapter().viewport().pointer, Some(Vec2::new(1.0, 2.0)));
    }

    #[tokio::test]
    async fn run_ends_when_the_host_hangs_up() {
        let mut scheduler = scheduler(800.0, 600.0);
        let (events_tx, events_rx) = tokio::sync::mpsc::channel(1);
        drop(events_tx);
        scheduler.run(events_rx).await.unwrap();
    }

    #[tokio::test]
    async fn start_with_a_canvas_returns_once_ended() {
        let (events_tx, events_rx) = tokio::sync::mpsc::channel(1);
        events_tx.send(HostEvent::End).await.unwrap();

        let canvas = Recorder::new(800.0, 600.0);
        FrameScheduler::start(Some(canvas), Config::default(), 30, events_rx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn the_first_frame_is_drawn_even_when_end_is_already_queued() {
        let (events_tx, events_rx) = tokio::sync::mpsc::channel(1);
        events_tx.send(HostEvent::End).await.unwrap();

        let scheduler =
            FrameScheduler::launch(Recorder::new(800.0, 600.0), Config::default(), 30, events_rx)
                .await
                .unwrap();

        assert!(scheduler.frames() >= 1);
        assert!(scheduler.canvas().frames_presented >= 1);
        assert_eq!(scheduler.canvas().circles().len(), 80);
    }

    #[tokio::test]
    async fn start_without_a_canvas_does_nothing() {
        let (_events_tx, events_rx) = tokio::sync::mpsc::channel(1);
        let result =
            FrameScheduler::<Recorder>::start(None, Config::default(), 30, events_rx).await;
        assert!(result.is_ok());
    }
}
