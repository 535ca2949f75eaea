pub mod pipeline;
pub mod rules;
pub mod scoring;
pub mod weights;
