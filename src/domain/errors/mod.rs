mod record_errors;
mod storage_errors;
mod validation_errors;
mod workflow_errors;

pub use record_errors::*;
pub use storage_errors::*;
pub use validation_errors::*;
pub use workflow_errors::*;
