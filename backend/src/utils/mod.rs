pub mod cookies;
pub mod jwt;
pub mod password;

pub use cookies::*;
pub use jwt::*;
pub use password::*;
