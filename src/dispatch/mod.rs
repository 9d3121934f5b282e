//! Task dispatching.

pub mod dispatcher;

pub use dispatcher::{DispatchOptions, Dispatcher, Task};
