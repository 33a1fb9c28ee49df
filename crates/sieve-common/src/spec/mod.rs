mod shape;
mod value;

pub use shape::*;
pub use value::*;
