pub mod error;
pub mod fetch;
pub mod git;
pub mod models;
pub mod music;

pub use self::error::*;
pub use self::fetch::*;
pub use self::git::*;
pub use self::models::*;
pub use self::music::*;
