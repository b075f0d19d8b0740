pub mod emotion;
pub mod model;
