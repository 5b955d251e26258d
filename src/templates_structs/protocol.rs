use askama::Template;

use super::PageContext;
use crate::models::page::{PageLink, SizeOption};
use crate::models::protocol::{PROTOCOL_KINDS, ProtocolForm, ProtocolItem};
use crate::models::Page;

/// Option of the editor's protocol type select.
pub struct KindOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// The "Save" modal: create when `is_new`, update otherwise.
pub struct ProtocolEditor {
    pub title: String,
    pub is_new: bool,
    pub form: ProtocolForm,
    pub errors: Vec<String>,
    pub kinds: Vec<KindOption>,
}

impl ProtocolEditor {
    pub fn create(form: ProtocolForm, errors: Vec<String>) -> Self {
        Self::build("New protocol", true, form, errors)
    }

    pub fn update(form: ProtocolForm, errors: Vec<String>) -> Self {
        Self::build("Edit protocol", false, form, errors)
    }

    fn build(title: &str, is_new: bool, form: ProtocolForm, errors: Vec<String>) -> Self {
        let kinds = PROTOCOL_KINDS
            .iter()
            .map(|(value, label)| KindOption {
                value: value.to_string(),
                label: label.to_string(),
                selected: form.kind == *value,
            })
            .collect();
        Self { title: title.to_string(), is_new, form, errors, kinds }
    }
}

#[derive(Template)]
#[template(path = "protocols/list.html")]
pub struct ProtocolListTemplate {
    pub ctx: PageContext,
    pub page: Page<ProtocolItem>,
    pub load_error: Option<String>,
    pub search_name: String,
    pub search_state: String,
    pub page_links: Vec<PageLink>,
    pub size_options: Vec<SizeOption>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub name_sort_href: String,
    pub name_sort_indicator: String,
    pub editor: Option<ProtocolEditor>,
}
