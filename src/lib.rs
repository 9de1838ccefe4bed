pub mod cli;
pub mod command;
pub mod error;
pub mod radio;
pub mod response;
pub mod settings;
pub mod tables;
pub mod transport;

pub use error::{FrsError, Result};
pub use radio::{ConnectionState, Radio};
pub use settings::{RadioSettings, SettingsStore};
