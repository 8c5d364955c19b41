//! Operation façade around [`dispatch_core::Engine`], plus shared logging
//! setup for binaries that embed it.

pub mod logging;
pub mod operation;

pub use operation::{handle_operation, Operation, OperationResponse};
