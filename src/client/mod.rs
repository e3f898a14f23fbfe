pub use marker::*;
pub use reporter::*;

mod marker;
mod reporter;
