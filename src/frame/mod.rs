mod build;

pub use build::{FrameReport, build_frame};
