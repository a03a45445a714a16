pub mod attendance;
pub mod document;
pub mod productivity;
pub mod settings;
