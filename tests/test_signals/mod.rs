pub mod generate;

pub use generate::{impulse, noise, sine, split_and_filter};
