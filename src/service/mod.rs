pub use counter::*;
pub use dashboard::*;
pub use dedup::*;
pub use page_views::*;

mod counter;
mod dashboard;
mod dedup;
mod page_views;
