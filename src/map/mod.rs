pub mod direct;
pub mod set_assoc;

pub use direct::DirectMapped;
pub use set_assoc::SetAssociative;
