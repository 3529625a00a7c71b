pub mod delete;
pub mod export;
pub mod history;
pub mod init;
pub mod list;
pub mod render;
pub mod save;
pub mod search;

pub use delete::{delete, DeleteArgs};
pub use export::{export, ExportArgs};
pub use history::{history, HistoryArgs};
pub use init::{init, InitArgs};
pub use list::{list, ListArgs};
pub use render::{render, RenderArgs};
pub use save::{save, SaveArgs};
pub use search::{search, SearchArgs};
