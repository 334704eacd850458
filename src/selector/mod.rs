pub mod locator;
pub mod synthesizer;
