pub mod db;
pub mod gateway;

pub use gateway::{CardGateway, UnitOfWork};
