pub mod error;
pub mod pet;
pub mod ports;
pub mod response;
