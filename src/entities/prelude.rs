pub use super::activity_log::Entity as ActivityLog;
pub use super::sessions::Entity as Sessions;
pub use super::users::Entity as Users;
