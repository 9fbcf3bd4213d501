//! Request types for HTTP handlers.

mod generate;
mod paths;
mod upload;
mod workflows;

pub use generate::*;
pub use paths::*;
pub use upload::*;
pub use workflows::*;
