//! Board acquisition and reconstruction.
//!
//! | Module | Role |
//! |--------|------|
//! | [`url`] | Public board link validation |
//! | [`frame`] | Frame schema and family routing |
//! | [`capture`] | Deadline-bound frame collection from a page |
//! | [`assemble`] | Frames to [`BoardInformation`] |
//! | [`store`] | Latest board holder |
//! | [`model`] | Domain types |

pub mod assemble;
pub mod capture;
pub mod frame;
pub mod model;
pub mod store;
pub mod url;

pub use assemble::assemble;
pub use capture::{
    CaptureOptions, CompletionPolicy, DEFAULT_CAPTURE_TIMEOUT, FrameCollector, REQUIRED_FRAMES,
    capture_frames,
};
pub use frame::{Family, FrameSchema};
pub use model::{BoardColumn, BoardInformation, Message};
pub use store::BoardStore;
pub use url::BoardUrl;
