//! Surface state, shape primitives, and a frame-driven animation loop
//! layered over a 2D drawing context.
//!
//! The host supplies two capabilities: a [`DrawContext`] to draw into and
//! a [`FrameHost`] to schedule frames. Everything else lives here.

pub mod clock;
pub mod context;
pub mod error;
pub mod id;
pub mod model;
pub mod record;
pub mod registry;
pub mod shapes;
pub mod surface;

pub use clock::{AnimationClock, FrameHost, FrameScheduler, FrameSource, ManualFrameHost};
pub use context::DrawContext;
pub use error::{AnimResult, BindError, CallbackError};
pub use id::SurfaceId;
pub use model::*;
pub use record::{DrawOp, RecordingContext};
pub use registry::{BindTarget, SurfaceRegistry};
pub use surface::{Surface, WeakSurface};
