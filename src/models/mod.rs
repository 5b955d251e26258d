pub mod account;
pub mod nav_item;
pub mod page;
pub mod protocol;
pub mod query;

pub use page::Page;
pub use protocol::{ProtocolItem, ProtocolState};
pub use query::{QueryParam, Term};
