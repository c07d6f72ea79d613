//! Kernel utilities shared by feature slices and the server app.
//!
//! * [`config::load_config`] layers an optional config file, `SPROUT__*` variables and
//!   `PORT` into any deserializable config type.
//! * [`server`] holds the API state, the system router (`/health`) and the JSON reply
//!   envelope every endpoint answers with.

pub mod config;
pub mod server;

pub use sprout_domain as domain;
