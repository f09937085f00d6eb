mod resolve;
mod slots;

pub use resolve::{resolve_any_resource, resolve_for_resource, resolve_plain};
pub use slots::{generate_candidates, GRANULARITY_MIN};
