mod readiness;
pub use readiness::*;
