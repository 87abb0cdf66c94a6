pub mod login;
pub mod me;
pub mod models;
pub mod register;
