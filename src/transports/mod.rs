//! Transport implementations

pub mod capture;
pub mod console;

pub use capture::CaptureTransport;
pub use console::ConsoleTransport;

pub use crate::core::{AsyncTransport, Transport, TransportHandle};
