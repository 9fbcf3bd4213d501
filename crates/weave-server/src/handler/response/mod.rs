//! Response types for HTTP handlers.

mod errors;
mod generate;
mod health;
mod images;
mod upload;
mod workflows;

pub use errors::*;
pub use generate::*;
pub use health::*;
pub use images::*;
pub use upload::*;
pub use workflows::*;
