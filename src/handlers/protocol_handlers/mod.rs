//! Protocol management: the paginated list with its search form, the
//! publish/unpublish and delete actions, and the "Save" editor modal.
//!
//! Every mutation redirects back to `/protocols`, which re-queries the
//! backend with the search state kept in the session.

mod actions;
mod editor;
mod list;

pub use actions::{change_deploy, delete};
pub use editor::{edit_form, new_form, save};
pub use list::{list, search};

pub(crate) use list::render_list;

/// Session key of the last list query (terms, paging, sort).
pub const QUERY_STATE_KEY: &str = "protocol.query";
