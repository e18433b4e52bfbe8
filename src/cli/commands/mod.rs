//! CLI command implementations.

mod ask;
mod config;
mod eva;
mod inspect;
mod retrieve;
mod session;
mod setup;

pub use ask::run_ask;
pub use config::run_config;
pub use eva::run_eva;
pub use inspect::run_inspect;
pub use retrieve::run_retrieve;
pub use session::run_session;
