//! Navigation client implementations and the daemon's wire surface.

pub mod grpc;
pub mod loopback;
pub mod nop;
