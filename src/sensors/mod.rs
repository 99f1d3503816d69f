//! Door sensing pipeline: raw level → [`Debouncer`] → [`EdgeDetector`].
//!
//! Pure logic only.  The raw level comes from a
//! [`DoorInputPort`](crate::app::ports::DoorInputPort) adapter.

pub mod debounce;
pub mod door;
pub mod edge;

pub use debounce::Debouncer;
pub use door::DoorState;
pub use edge::{EdgeDetector, Transition};
