use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Label the extract trigger carries while idle
pub const EXTRACT_LABEL: &str = "Extract Entities";
pub const CLEAR_LABEL: &str = "Clear";

/// Identifiers of the anchors the page controller looks up
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ElementIds {
    pub model_selector: String,
    pub input: String,
    pub result: String,
    pub extract_button: String,
    pub clear_button: String,
    pub badges: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            model_selector: "model-selector".to_string(),
            input: "input-text".to_string(),
            result: "result-text".to_string(),
            extract_button: "extract-btn".to_string(),
            clear_button: "clear-btn".to_string(),
            badges: "entity-badges".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Select,
    TextInput,
    Area,
    Button,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// Handler a click listener is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Extract,
    Clear,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub value: String,
    pub inner_html: String,
    pub disabled: bool,
    pub options: Vec<SelectOption>,
    pub children: Vec<String>,
    pub on_click: Option<Action>,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            value: String::new(),
            inner_html: String::new(),
            disabled: false,
            options: Vec::new(),
            children: Vec::new(),
            on_click: None,
        }
    }

    pub fn with_html(mut self, html: &str) -> Self {
        self.inner_html = html.to_string();
        self
    }
}

/// The host page as seen by the controller.
///
/// Every operation looks its anchor up by id on each call. An absent anchor
/// is a normal outcome and is reported as `None` / `false`, never as an error.
pub trait Document: Send + Sync {
    fn has_element(&self, id: &str) -> bool;

    /// Current value of an input or select. `None` when absent.
    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&self, id: &str, value: &str) -> bool;

    /// Content markup including appended children
    fn inner_html(&self, id: &str) -> Option<String>;

    /// Replace the content. Drops appended children and select options.
    fn set_inner_html(&self, id: &str, html: &str) -> bool;

    fn append_child(&self, id: &str, html: &str) -> bool;
    fn children(&self, id: &str) -> Option<Vec<String>>;

    fn replace_options(&self, id: &str, options: Vec<SelectOption>) -> bool;
    fn options(&self, id: &str) -> Option<Vec<SelectOption>>;

    fn set_disabled(&self, id: &str, disabled: bool) -> bool;
    fn is_disabled(&self, id: &str) -> Option<bool>;

    fn add_click_listener(&self, id: &str, action: Action) -> bool;
    fn click_action(&self, id: &str) -> Option<Action>;
}

/// In-memory page
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: DashMap<String, Element>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page carrying every anchor named in `ids`
    pub fn standard_page(ids: &ElementIds) -> Self {
        let doc = Self::new();
        doc.insert(&ids.model_selector, Element::new(ElementKind::Select));
        doc.insert(&ids.input, Element::new(ElementKind::TextInput));
        doc.insert(&ids.result, Element::new(ElementKind::Area));
        doc.insert(&ids.extract_button, Element::new(ElementKind::Button).with_html(EXTRACT_LABEL));
        doc.insert(&ids.clear_button, Element::new(ElementKind::Button).with_html(CLEAR_LABEL));
        doc.insert(&ids.badges, Element::new(ElementKind::Area));
        doc
    }

    pub fn insert(&self, id: &str, element: Element) {
        self.elements.insert(id.to_string(), element);
    }

    pub fn remove(&self, id: &str) -> Option<Element> {
        self.elements.remove(id).map(|(_, element)| element)
    }

    pub fn element(&self, id: &str) -> Option<Element> {
        self.elements.get(id).map(|e| e.value().clone())
    }

    fn update(&self, id: &str, f: impl FnOnce(&mut Element)) -> bool {
        match self.elements.get_mut(id) {
            Some(mut element) => {
                f(element.value_mut());
                true
            }
            None => false,
        }
    }
}

impl Document for MemoryDocument {
    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn value(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| e.value.clone())
    }

    fn set_value(&self, id: &str, value: &str) -> bool {
        self.update(id, |element| {
            // A select only takes values it has an option for
            if element.kind == ElementKind::Select
                && !element.options.iter().any(|o| o.value == value)
            {
                element.value.clear();
            } else {
                element.value = value.to_string();
            }
        })
    }

    fn inner_html(&self, id: &str) -> Option<String> {
        self.elements.get(id).map(|e| {
            let mut html = e.inner_html.clone();
            for child in &e.children {
                html.push_str(child);
            }
            html
        })
    }

    fn set_inner_html(&self, id: &str, html: &str) -> bool {
        self.update(id, |element| {
            element.inner_html = html.to_string();
            element.children.clear();
            if element.kind == ElementKind::Select {
                element.options.clear();
                element.value.clear();
            }
        })
    }

    fn append_child(&self, id: &str, html: &str) -> bool {
        self.update(id, |element| element.children.push(html.to_string()))
    }

    fn children(&self, id: &str) -> Option<Vec<String>> {
        self.elements.get(id).map(|e| e.children.clone())
    }

    fn replace_options(&self, id: &str, options: Vec<SelectOption>) -> bool {
        self.update(id, |element| {
            element.inner_html.clear();
            element.value = options.first().map(|o| o.value.clone()).unwrap_or_default();
            element.options = options;
        })
    }

    fn options(&self, id: &str) -> Option<Vec<SelectOption>> {
        self.elements.get(id).map(|e| e.options.clone())
    }

    fn set_disabled(&self, id: &str, disabled: bool) -> bool {
        self.update(id, |element| element.disabled = disabled)
    }

    fn is_disabled(&self, id: &str) -> Option<bool> {
        self.elements.get(id).map(|e| e.disabled)
    }

    fn add_click_listener(&self, id: &str, action: Action) -> bool {
        self.update(id, |element| element.on_click = Some(action))
    }

    fn click_action(&self, id: &str) -> Option<Action> {
        self.elements.get(id).and_then(|e| e.on_click)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(value: &str, text: &str) -> SelectOption {
        SelectOption {
            value: value.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_absent_anchor_is_not_an_error() {
        let doc = MemoryDocument::new();
        assert!(!doc.has_element("nope"));
        assert_eq!(doc.value("nope"), None);
        assert!(!doc.set_inner_html("nope", "<p>x</p>"));
        assert!(!doc.add_click_listener("nope", Action::Clear));
    }

    #[test]
    fn test_select_value_follows_options() {
        let doc = MemoryDocument::standard_page(&ElementIds::default());
        assert_eq!(doc.value("model-selector").as_deref(), Some(""));

        doc.replace_options("model-selector", vec![option("v1", "One"), option("v2", "Two")]);
        assert_eq!(doc.value("model-selector").as_deref(), Some("v1"));

        doc.set_value("model-selector", "v2");
        assert_eq!(doc.value("model-selector").as_deref(), Some("v2"));

        doc.set_value("model-selector", "v9");
        assert_eq!(doc.value("model-selector").as_deref(), Some(""));

        doc.set_inner_html("model-selector", "");
        assert!(doc.options("model-selector").unwrap().is_empty());
    }

    #[test]
    fn test_inner_html_includes_children_until_replaced() {
        let doc = MemoryDocument::standard_page(&ElementIds::default());
        doc.append_child("entity-badges", "<div>a</div>");
        doc.append_child("entity-badges", "<div>b</div>");
        assert_eq!(doc.inner_html("entity-badges").unwrap(), "<div>a</div><div>b</div>");

        doc.set_inner_html("entity-badges", "");
        assert_eq!(doc.children("entity-badges").unwrap().len(), 0);
        assert_eq!(doc.inner_html("entity-badges").unwrap(), "");
    }

    #[test]
    fn test_standard_page_labels() {
        let doc = MemoryDocument::standard_page(&ElementIds::default());
        assert_eq!(doc.inner_html("extract-btn").as_deref(), Some(EXTRACT_LABEL));
        assert_eq!(doc.element("clear-btn").unwrap().kind, ElementKind::Button);
        assert_eq!(doc.is_disabled("extract-btn"), Some(false));
    }
}
