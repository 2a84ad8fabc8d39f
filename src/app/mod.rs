pub mod assertions;
pub mod fixtures;
pub mod settings;
pub mod suite;
