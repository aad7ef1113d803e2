//! Playback graph assembly and session control
//!
//! `registry` creates stages, `builder` assembles them into the Ogg playback
//! graph, `linker` connects the demultiplexer's runtime outputs, and
//! `session` drives the graph while `bus_loop` consumes its events.

pub mod builder;
pub mod bus_loop;
pub mod events;
pub mod linker;
pub mod registry;
pub mod session;
pub mod state;

pub use builder::{GraphBuilder, PlaybackPipeline, StageSet};
pub use bus_loop::DrainOutcome;
pub use events::SessionEvent;
pub use linker::{Discovery, DynamicLinker};
pub use registry::StageRegistry;
pub use session::{play, PlaybackSession, SessionReport};
pub use state::LifecycleState;
