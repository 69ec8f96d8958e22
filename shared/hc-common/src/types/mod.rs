//! Wire Types

pub mod interaction;
pub mod locale;
pub mod response;
pub mod snowflake;
pub mod user;

pub use interaction::*;
pub use locale::{Dictionary, Locale};
pub use response::*;
pub use snowflake::Snowflake;
pub use user::{Member, User};
