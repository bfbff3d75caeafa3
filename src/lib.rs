pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod wav;

pub use config::FirConfig;
pub use error::{FirError, Result};
pub use filter::FirFilter;
pub use wav::save_wav;
