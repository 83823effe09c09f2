//! Inbound surfaces: CSV files for the command line and the HTTP API.

pub mod csv;
pub mod http;
