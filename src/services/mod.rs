//! Clients for the external services tracks can be pulled from

pub mod private_radar;

// rexport the client and its flight record
pub use private_radar::{Flight, PrivateRadar};
