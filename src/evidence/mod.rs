pub mod evidence_model;
pub mod loader;
pub mod session;
