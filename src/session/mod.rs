//! Session Module
//!
//! Client-session lifecycle: registration, pause/resume, cancellation and
//! drain-before-teardown.
//!
//! ## Components
//! - `Gate`: global stop/go switch checked before every command
//! - `SessionRegistry`: live sessions behind a single lock
//! - `DrainCoordinator`: live count, accept flag, and the "all gone" signal
//! - `CancelToken`: per-session cancellation request
//! - worker: the per-connection loop and its cleanup guard

mod cancel;
mod gate;
mod registry;
mod drain;
pub(crate) mod worker;

pub use cancel::CancelToken;
pub use gate::Gate;
pub use registry::{SessionHandle, SessionId, SessionRegistry};
pub use drain::DrainCoordinator;
