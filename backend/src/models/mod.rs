pub mod filter;
pub mod measurement;
pub mod time;

pub use filter::*;
pub use measurement::*;
pub use time::*;
