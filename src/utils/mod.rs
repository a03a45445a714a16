pub mod formatters;
pub mod logger;
