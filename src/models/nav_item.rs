pub struct NavModule {
    pub label: String,
    pub url: String,
    pub is_active: bool,
}

pub struct NavSidebarItem {
    pub label: String,
    pub url: String,
    pub is_active: bool,
}

struct NavEntry {
    module: &'static str,
    label: &'static str,
    url: &'static str,
}

/// (module label, landing url)
const MODULES: &[(&str, &str)] = &[
    ("Devices", "/protocols"),
    ("Account", "/account/settings"),
];

const ENTRIES: &[NavEntry] = &[
    NavEntry { module: "Devices", label: "Protocols", url: "/protocols" },
    NavEntry { module: "Account", label: "Profile", url: "/account/settings" },
    NavEntry { module: "Account", label: "Security", url: "/account/security" },
    NavEntry { module: "Account", label: "Notifications", url: "/account/notifications" },
];

/// Returns (header_modules, sidebar_items) for the current path.
pub fn find_navigation(current_path: &str) -> (Vec<NavModule>, Vec<NavSidebarItem>) {
    let active_entry = ENTRIES
        .iter()
        .filter(|e| current_path == e.url || current_path.starts_with(&format!("{}/", e.url)))
        .max_by_key(|e| e.url.len());
    let active_module = active_entry.map(|e| e.module).unwrap_or("");

    let modules = MODULES
        .iter()
        .map(|(label, url)| NavModule {
            label: label.to_string(),
            url: url.to_string(),
            is_active: *label == active_module,
        })
        .collect();

    let sidebar = ENTRIES
        .iter()
        .filter(|e| e.module == active_module)
        .map(|e| NavSidebarItem {
            label: e.label.to_string(),
            url: e.url.to_string(),
            is_active: active_entry.is_some_and(|a| a.url == e.url),
        })
        .collect();

    (modules, sidebar)
}
