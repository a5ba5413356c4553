pub mod clock;
pub mod event_bus;
pub mod metrics;
pub mod timers;

pub use clock::*;
pub use event_bus::*;
pub use timers::*;
