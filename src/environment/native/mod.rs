pub mod model;
pub use model::Model;

pub mod repository;
pub use repository::Repository;
