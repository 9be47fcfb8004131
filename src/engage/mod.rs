pub mod controller;
pub mod index;
pub mod model;
pub mod repository;
pub mod service;
pub mod summary;
