pub mod validation;
pub mod http;

pub use validation::*;
pub use http::*;
