//! Event plumbing shared by every layer: generational handles, the message
//! queue, and the normalized key/modifier types.
//!
//! The pieces here are deliberately free of terminal and window concerns so
//! that higher crates (core-window, core-layout) can depend on them without
//! dragging in a backend.

mod handle;
mod keys;
mod queue;

pub use handle::{Handle, HandleTable};
pub use keys::{Key, Modifiers};
pub use queue::MessageQueue;
