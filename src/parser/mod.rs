pub mod filename;
pub mod spec;

pub use filename::*;
pub use spec::*;
