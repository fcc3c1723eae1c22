//! Plexus field: a network of particles drifting across a surface.
//!
//! Particles move in straight lines, bounce off the edges of the surface and get nudged away
//! from the pointer. Every frame, particles that are close to each other are joined with a line
//! that fades out with distance, and so are particles close to the pointer.
//!
//! The crate doesn't know how to draw anything itself. Hosts provide a [`canvas::Canvas`] and
//! feed [`scheduler::HostEvent`]s into the [`scheduler::FrameScheduler`] loop.

pub mod adapter;
pub mod canvas;
pub mod config;
pub mod field;
pub mod grid;
pub mod linker;
pub mod particle;
pub mod scheduler;
pub mod state;
