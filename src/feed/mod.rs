pub mod controller;
pub mod enrich;
pub mod index;
pub mod model;
pub mod service;
