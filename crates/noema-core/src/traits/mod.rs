mod recorder;

pub use recorder::{IVersionRecorder, NoOpRecorder};
