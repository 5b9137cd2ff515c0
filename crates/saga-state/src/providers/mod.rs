mod file;
mod memory;

pub use file::FileSystemStateRepository;
pub use memory::InMemoryStateRepository;
