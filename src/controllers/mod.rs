pub mod auth_controllers;
pub mod health;
pub mod poll_controllers;
