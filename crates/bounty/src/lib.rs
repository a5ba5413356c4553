pub mod app;
pub mod config;
pub mod error;
pub mod reward;
pub mod verification;
pub mod view;
pub mod wallet;

pub use app::*;
pub use config::*;
pub use error::*;
pub use reward::*;
pub use verification::*;
pub use view::*;
pub use wallet::*;
