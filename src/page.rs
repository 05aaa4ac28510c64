use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::config::{Containers, INDEX_CONTAINER, PROFILE_CONTAINER};
use crate::core::helpers::lock;

/// The host page the controller patches. Every write replaces the inner
/// content of the element with the given id.
pub trait Page: Send + Sync {
    fn has_element(&self, id: &str) -> bool;
    fn set_html(&self, id: &str, html: &str);
    fn set_visible(&self, id: &str, visible: bool);
    /// Blocking notification to the user.
    fn alert(&self, message: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Element {
    html: String,
    visible: bool,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            html: String::new(),
            visible: true,
        }
    }
}

/// In-memory page: records the last content written to each element id.
#[derive(Debug, Default)]
pub struct MemoryPage {
    elements: Mutex<BTreeMap<String, Element>>,
    alerts: Mutex<Vec<String>>,
    writes: Mutex<Vec<String>>,
}

impl MemoryPage {
    pub fn with_elements<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let elements = ids
            .into_iter()
            .map(|id| (id.to_string(), Element::default()))
            .collect();
        Self {
            elements: Mutex::new(elements),
            ..Self::default()
        }
    }

    pub fn index() -> Self {
        let c = Containers::default();
        Self::with_elements([
            INDEX_CONTAINER,
            c.heading.as_str(),
            c.composer.as_str(),
            c.posts.as_str(),
        ])
    }

    pub fn profile() -> Self {
        let c = Containers::default();
        Self::with_elements([
            PROFILE_CONTAINER,
            c.profile_info.as_str(),
            c.posts.as_str(),
        ])
    }

    pub fn html(&self, id: &str) -> Option<String> {
        lock(&self.elements).get(id).map(|e| e.html.clone())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        lock(&self.elements).get(id).map(|e| e.visible).unwrap_or(false)
    }

    pub fn alerts(&self) -> Vec<String> {
        lock(&self.alerts).clone()
    }

    /// Element ids in write order, one entry per write.
    pub fn writes(&self) -> Vec<String> {
        lock(&self.writes).clone()
    }

    fn write(&self, id: &str, html: &str) {
        lock(&self.elements).entry(id.to_string()).or_default().html = html.to_string();
        lock(&self.writes).push(id.to_string());
    }
}

impl Page for MemoryPage {
    fn has_element(&self, id: &str) -> bool {
        lock(&self.elements).contains_key(id)
    }

    fn set_html(&self, id: &str, html: &str) {
        self.write(id, html);
    }

    fn set_visible(&self, id: &str, visible: bool) {
        lock(&self.elements).entry(id.to_string()).or_default().visible = visible;
    }

    fn alert(&self, message: &str) {
        lock(&self.alerts).push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_page_exposes_index_container_only() {
        let page = MemoryPage::index();
        assert!(page.has_element(INDEX_CONTAINER));
        assert!(!page.has_element(PROFILE_CONTAINER));
    }

    #[test]
    fn writes_replace_content_and_are_recorded() {
        let page = MemoryPage::index();
        page.set_html("page-posts", "<p>one</p>");
        page.set_html("post-4", "<p>two</p>");
        page.set_html("page-posts", "<p>three</p>");
        assert_eq!(page.html("page-posts").unwrap(), "<p>three</p>");
        assert_eq!(page.writes(), vec!["page-posts", "post-4", "page-posts"]);
    }

    #[test]
    fn records_visibility_and_alerts() {
        let page = MemoryPage::index();
        page.set_visible("new-post", false);
        page.alert("boom");
        assert!(!page.is_visible("new-post"));
        assert_eq!(page.alerts(), vec!["boom".to_string()]);
    }
}
