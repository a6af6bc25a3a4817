pub mod engine;
pub mod memory;

pub use engine::Repository;
pub use memory::InMemoryRepository;
