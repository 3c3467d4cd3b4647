#[macro_use]
extern crate diesel;

pub mod controllers;
pub mod db;
pub mod rank;
