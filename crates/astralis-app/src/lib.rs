//! Astralis host application.
//!
//! Runs the trajectory animation headlessly: platform directories, the frame
//! loop, and the status API wiring around one animation lifecycle.

pub mod app;
pub mod frame_loop;
pub mod platform;
pub mod sink;

pub use app::{App, read_payload};
pub use frame_loop::FrameLoop;
pub use platform::{PlatformDirs, PlatformError};
pub use sink::HeadlessSink;
