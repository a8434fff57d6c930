pub mod board;
pub mod card;
pub mod column;
pub mod error;
pub mod lifecycle;
pub mod topology;

pub use board::Board;
pub use card::{BlockEvent, Card, Mutation};
pub use column::{Column, ColumnKind};
pub use error::KanbanError;
pub use lifecycle::Transition;
pub use topology::ColumnTopology;
