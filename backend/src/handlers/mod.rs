pub mod auth;
pub mod forms;
pub mod reviews;
pub mod users;
