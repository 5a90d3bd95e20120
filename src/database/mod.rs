pub mod connection;
pub mod quiz;
