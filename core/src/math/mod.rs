pub mod rounding;

pub use rounding::{round_to, round4};
