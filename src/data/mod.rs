pub mod datetime;
pub mod loader;
pub mod naming;
pub mod parser;
pub mod writer;
