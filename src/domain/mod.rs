pub mod announcement;
pub mod gallery;
pub mod admin;
pub mod recovery;
pub mod result;

pub use announcement::*;
pub use gallery::*;
pub use admin::*;
pub use recovery::*;
pub use result::*;
