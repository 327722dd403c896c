pub mod alert;
pub mod health;
pub mod issues;
pub mod users;
