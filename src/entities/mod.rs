pub mod prelude;

pub mod activity_log;
pub mod sessions;
pub mod users;
