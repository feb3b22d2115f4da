#![forbid(unsafe_code)]

pub mod assessment;
pub mod model;
pub mod speech;
pub mod time;

pub use time::Clock;
