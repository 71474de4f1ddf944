//! Core type definitions

pub mod command;
pub mod messaging;
pub mod service;
pub mod voice;

pub use command::*;
pub use messaging::*;
pub use service::*;
pub use voice::*;
