pub mod channel;
pub mod dataset;
pub mod filename;
pub mod spec;

pub use channel::*;
pub use dataset::*;
pub use filename::*;
pub use spec::*;
