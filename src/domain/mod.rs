pub mod model;
pub mod sync;
pub mod validation;
