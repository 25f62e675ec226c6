pub mod common;
pub mod form;
pub mod refresh_session;
pub mod review;
pub mod transaction;
pub mod user;

pub use common::*;
pub use transaction::*;
