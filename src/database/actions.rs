pub mod admin;
pub mod recipes;
pub mod tags;
pub mod users;
