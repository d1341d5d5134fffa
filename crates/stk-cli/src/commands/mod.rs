pub mod batches;
pub mod check;
pub mod dispatch;
pub mod event;
pub mod history;
pub mod item;
pub mod ledger;
pub mod shared;
