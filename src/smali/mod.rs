mod arguments;
mod errors;
mod methods;

pub use arguments::*;
pub use errors::*;
pub use methods::*;
