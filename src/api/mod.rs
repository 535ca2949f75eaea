pub mod suitability_response;

pub use suitability_response::{CategoryScoreDto, SuitabilityResponse};
