//! [`MarkupTree`] over a live browser document.

use gomruk_core::fill::{ElementKind, Highlight, InteractionEvent, MarkupTree, NodeId};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventInit, HtmlElement, HtmlInputElement, HtmlTextAreaElement,
};

/// Snapshot of a document's element tree.
///
/// The element list is captured once; values, events and styles go to the
/// live elements.
pub struct WebDom {
    elements: Vec<Element>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

impl WebDom {
    /// Capture the element tree of `document`.
    pub fn new(document: &Document) -> Option<Self> {
        let root = document.document_element()?;
        let mut dom = Self {
            elements: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
        };
        dom.capture(root, None);
        Some(dom)
    }

    fn capture(&mut self, element: Element, parent: Option<usize>) -> usize {
        let idx = self.elements.len();
        let collection = element.children();
        self.elements.push(element);
        self.parents.push(parent);
        self.children.push(Vec::new());

        for i in 0..collection.length() {
            if let Some(child) = collection.item(i) {
                let child_idx = self.capture(child, Some(idx));
                self.children[idx].push(child_idx);
            }
        }
        idx
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        self.elements.get(node.0)
    }
}

/// Setter of the `value` property on the element kind's prototype.
fn native_value_setter(kind: ElementKind) -> Option<js_sys::Function> {
    let class = match kind {
        ElementKind::Input => "HTMLInputElement",
        ElementKind::TextArea => "HTMLTextAreaElement",
    };
    let global = js_sys::global();
    let constructor = js_sys::Reflect::get(&global, &JsValue::from_str(class)).ok()?;
    let prototype = js_sys::Reflect::get(&constructor, &JsValue::from_str("prototype")).ok()?;
    let descriptor = js_sys::Object::get_own_property_descriptor(
        prototype.unchecked_ref::<js_sys::Object>(),
        &JsValue::from_str("value"),
    );
    js_sys::Reflect::get(&descriptor, &JsValue::from_str("set"))
        .ok()?
        .dyn_into::<js_sys::Function>()
        .ok()
}

impl MarkupTree for WebDom {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.children
            .get(node.0)
            .map(|c| c.iter().copied().map(NodeId).collect())
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.parents.get(node.0).copied().flatten().map(NodeId)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.element(node)
            .map(|e| e.tag_name().to_ascii_lowercase())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.get_attribute(name)
    }

    fn text_content(&self, node: NodeId) -> String {
        self.element(node)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn value(&self, node: NodeId) -> String {
        let Some(element) = self.element(node) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.value()
        } else {
            String::new()
        }
    }

    fn set_value(&mut self, node: NodeId, kind: ElementKind, value: &str) {
        let Some(element) = self.element(node) else {
            return;
        };

        let written = native_value_setter(kind)
            .map(|setter| setter.call1(element, &JsValue::from_str(value)).is_ok())
            .unwrap_or(false);
        if written {
            return;
        }

        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        } else if let Some(textarea) = element.dyn_ref::<HtmlTextAreaElement>() {
            textarea.set_value(value);
        }
    }

    fn dispatch_event(&mut self, node: NodeId, event: InteractionEvent) {
        let Some(element) = self.element(node) else {
            return;
        };

        let init = EventInit::new();
        init.set_bubbles(true);
        init.set_cancelable(true);
        if let Ok(event) = Event::new_with_event_init_dict(event.name(), &init) {
            let _ = element.dispatch_event(&event);
        }
    }

    fn highlight(&mut self, node: NodeId, highlight: &Highlight) {
        let Some(element) = self.element(node).and_then(|e| e.dyn_ref::<HtmlElement>()) else {
            return;
        };
        let style = element.style();

        let border = style.get_property_value("border").unwrap_or_default();
        let background = style
            .get_property_value("background-color")
            .unwrap_or_default();
        let _ = style.set_property("border", &highlight.border);
        let _ = style.set_property("background-color", &highlight.background);

        let restore = Closure::once_into_js(move || {
            let _ = style.set_property("border", &border);
            let _ = style.set_property("background-color", &background);
        });

        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                restore.unchecked_ref(),
                highlight.duration_ms.min(i32::MAX as u64) as i32,
            );
        }
    }
}
