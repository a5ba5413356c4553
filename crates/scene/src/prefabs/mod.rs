pub mod oxford;

pub use oxford::*;
