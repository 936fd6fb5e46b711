pub mod engine;
pub mod expression;
pub mod value;

pub use engine::*;
pub use expression::*;
pub use value::*;
