pub mod buffer;
pub mod capture;
pub mod source;

pub use buffer::{BlockAssembler, extract_channel};
pub use capture::AudioCapture;
pub use source::{AudioSource, DeviceSource, WavFileSource};
