pub mod board_service;
pub mod card_service;
pub mod query_service;
pub mod topology_cache;

pub use board_service::BoardService;
pub use card_service::CardService;
pub use query_service::QueryService;
pub use topology_cache::TopologyCache;
