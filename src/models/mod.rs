pub mod display;
pub mod request;
pub mod result;

pub use display::{CellClass, DisplayState, RenderedCell, RenderedRow, RowClass, SummaryLine};
pub use request::{FilePayload, ReconciliationRequest};
pub use result::{CellMismatch, DetectedLayout, MatchSummary, ReconciliationResult, RowResult};
