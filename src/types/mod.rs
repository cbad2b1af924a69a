//! Public types for the dispatch API.

mod method;
mod result;

pub use method::{Classification, MethodDescriptor, ParameterSpec};
pub use result::{AnnotatedResult, CacheCleared, Parameters};
