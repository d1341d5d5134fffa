mod event;
mod history;
mod item;

pub use event::EventCommands;
pub use history::HistoryCommands;
pub use item::ItemCommands;
