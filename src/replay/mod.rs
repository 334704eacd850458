pub mod generator;
pub mod plan;
pub mod replay_filter;
pub mod replay_model;
