mod batch;
mod console;
mod errors;
mod rule;
mod runner;
mod settings;

pub use batch::*;
pub use console::*;
pub use errors::*;
pub use rule::*;
pub use runner::*;
pub use settings::*;
