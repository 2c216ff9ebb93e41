pub mod notebooks;
pub mod notes;
pub mod system;

pub use notebooks::*;
pub use notes::*;
pub use system::*;
