pub mod boards;
pub mod cards;

pub use boards::{
    BoardDetails, BoardResponse, BoardStatistics, ColumnDetails, ColumnStatistics, ColumnSummary,
    CreateBoardRequest,
};
pub use cards::{
    BlockCardRequest, CancelCardRequest, CardDetails, CardResponse, CardSummary,
    CreateCardRequest, UnblockCardRequest,
};
