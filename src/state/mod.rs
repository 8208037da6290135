pub mod options;
pub mod table;
