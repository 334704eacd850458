pub mod flow_builder;
pub mod flow_model;
pub mod input_template;
