mod summary;
pub mod views;

pub use views::{
    AmountDirection, ChildLine, IncomeLine, ProtectedMinimumView, SupportReportSummary,
};
