//! HTTP layer: the authenticated wrapper, transports, endpoints and uploads.

pub mod common;
pub(crate) mod error_helpers;
pub mod fetch;
pub mod loud_wire;
pub mod transport;
pub mod uploads;
