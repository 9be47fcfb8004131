pub mod form;
pub mod media;
