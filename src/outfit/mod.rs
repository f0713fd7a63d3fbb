pub mod category;
pub mod command;
pub mod controller;
pub mod model;
pub mod serialize;
pub mod store;
