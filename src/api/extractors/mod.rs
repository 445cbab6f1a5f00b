//! Custom request extractors.

mod validated_json;
mod validated_params;

pub use validated_json::ValidatedJson;
pub use validated_params::{ValidatedPath, ValidatedQuery};
