//! Side-scroller object engine
//!
//! Recreates the actor-simulation and sprite-assembly core of a 16-bit-era
//! side-scrolling platformer, bit-for-bit against the original hardware
//! behavior.
//!
//! # Pipeline
//! - [`exec::execute_objects`] iterates the actor pool once per frame and
//!   dispatches each live actor to its behavior routine
//! - behaviors call into the [`anim`] interpreter and the [`solid`] resolver
//!   and queue themselves for display
//! - [`sprite::build_sprites`] drains the 8 priority buckets into the flat
//!   sprite attribute table the presentation backend consumes verbatim
//!
//! # Accuracy notes
//! Actors are processed in slot order and freely mutate the shared player
//! record; later actors observe earlier actors' same-frame writes. Queue and
//! sprite-buffer overflow silently drops entries. All of this is load-bearing
//! for behavior parity and must not be "fixed".

pub mod anim;
pub mod assets;
pub mod behaviors;
pub mod data;
pub mod exec;
pub mod object;
pub mod player;
pub mod solid;
pub mod sprite;
pub mod world;

pub use object::{Kind, Object, Pool, RenderFlags, Status};
pub use world::{ScrollerError, World};
