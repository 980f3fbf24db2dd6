pub mod manager;

pub use manager::VectorDBManager;
