pub mod display;
pub mod session;
pub mod trigger;
