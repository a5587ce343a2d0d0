//! In-memory markup tree parsed from HTML with `scraper`.
//!
//! Used by the CLI to fill saved pages and by tests. Dispatched events and
//! highlights are recorded instead of being delivered to scripts.

use scraper::{ElementRef, Html, Node};
use tracing::trace;

use super::markup::{ElementKind, Highlight, InteractionEvent, MarkupTree, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Element(usize),
}

#[derive(Debug, Clone)]
struct DomElement {
    tag: String,
    attributes: Vec<(String, String)>,
    parent: Option<usize>,
    content: Vec<Content>,
    /// Value written by a fill, overriding the markup's initial value.
    value: Option<String>,
}

/// An HTML document held as an arena of elements.
#[derive(Debug, Clone)]
pub struct Dom {
    elements: Vec<DomElement>,
    events: Vec<(NodeId, InteractionEvent)>,
    highlights: Vec<(NodeId, Highlight)>,
}

impl Dom {
    /// Parse an HTML document.
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut dom = Self {
            elements: Vec::new(),
            events: Vec::new(),
            highlights: Vec::new(),
        };
        dom.build(document.root_element(), None);
        trace!("Parsed document with {} elements", dom.elements.len());
        dom
    }

    fn build(&mut self, element: ElementRef<'_>, parent: Option<usize>) -> usize {
        let idx = self.elements.len();
        self.elements.push(DomElement {
            tag: element.value().name().to_ascii_lowercase(),
            attributes: element
                .value()
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            parent,
            content: Vec::new(),
            value: None,
        });

        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let text: &str = text;
                    self.elements[idx].content.push(Content::Text(text.to_string()));
                }
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        let child_idx = self.build(child_element, Some(idx));
                        self.elements[idx].content.push(Content::Element(child_idx));
                    }
                }
                _ => {}
            }
        }

        idx
    }

    /// Every event dispatched so far, in order.
    pub fn events(&self) -> &[(NodeId, InteractionEvent)] {
        &self.events
    }

    /// Events dispatched on one element, in order.
    pub fn events_for(&self, node: NodeId) -> Vec<InteractionEvent> {
        self.events
            .iter()
            .filter(|(n, _)| *n == node)
            .map(|(_, e)| *e)
            .collect()
    }

    /// Highlights applied so far.
    pub fn highlights(&self) -> &[(NodeId, Highlight)] {
        &self.highlights
    }

    /// Serialize the document, with filled values written into the markup.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        if !self.elements.is_empty() {
            self.write_element(0, &mut out);
        }
        out
    }

    fn write_element(&self, idx: usize, out: &mut String) {
        let element = &self.elements[idx];
        out.push('<');
        out.push_str(&element.tag);

        let filled_input = element.tag == "input" && element.value.is_some();
        for (name, value) in &element.attributes {
            if filled_input && name == "value" {
                continue;
            }
            out.push_str(&format!(" {}=\"{}\"", name, escape(value, true)));
        }
        if filled_input {
            if let Some(value) = &element.value {
                out.push_str(&format!(" value=\"{}\"", escape(value, true)));
            }
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&element.tag.as_str()) {
            return;
        }

        match (&element.value, element.tag.as_str()) {
            (Some(value), "textarea") => out.push_str(&escape(value, false)),
            _ => {
                let raw_text = matches!(element.tag.as_str(), "script" | "style");
                for content in &element.content {
                    match content {
                        Content::Text(text) if raw_text => out.push_str(text),
                        Content::Text(text) => out.push_str(&escape(text, false)),
                        Content::Element(child) => self.write_element(*child, out),
                    }
                }
            }
        }

        out.push_str(&format!("</{}>", element.tag));
    }

    fn collect_text(&self, idx: usize, out: &mut String) {
        for content in &self.elements[idx].content {
            match content {
                Content::Text(text) => out.push_str(text),
                Content::Element(child) => self.collect_text(*child, out),
            }
        }
    }
}

fn escape(text: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

impl MarkupTree for Dom {
    fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.elements
            .get(node.0)
            .map(|e| {
                e.content
                    .iter()
                    .filter_map(|c| match c {
                        Content::Element(idx) => Some(NodeId(*idx)),
                        Content::Text(_) => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.elements.get(node.0)?.parent.map(NodeId)
    }

    fn tag_name(&self, node: NodeId) -> String {
        self.elements
            .get(node.0)
            .map(|e| e.tag.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.elements
            .get(node.0)?
            .attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
    }

    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if node.0 < self.elements.len() {
            self.collect_text(node.0, &mut out);
        }
        out
    }

    fn value(&self, node: NodeId) -> String {
        let Some(element) = self.elements.get(node.0) else {
            return String::new();
        };

        match &element.value {
            Some(value) => value.clone(),
            None if element.tag == "textarea" => self.text_content(node),
            None => self.attribute(node, "value").unwrap_or_default(),
        }
    }

    fn set_value(&mut self, node: NodeId, kind: ElementKind, value: &str) {
        if let Some(element) = self.elements.get_mut(node.0) {
            trace!("Setting {:?} value on <{}>", kind, element.tag);
            element.value = Some(value.to_string());
        }
    }

    fn dispatch_event(&mut self, node: NodeId, event: InteractionEvent) {
        self.events.push((node, event));
    }

    fn highlight(&mut self, node: NodeId, highlight: &Highlight) {
        self.highlights.push((node, highlight.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PAGE: &str = r#"<html><body>
        <div id="row"><label>VÖEN</label> <input id="voen" value="123"></div>
        <textarea id="notes">old &amp; new</textarea>
    </body></html>"#;

    #[test]
    fn test_structure() {
        let dom = Dom::parse(PAGE);
        let row = dom.find_by_id("row").unwrap();
        let children = dom.children(row);

        assert_eq!(dom.tag_name(dom.root()), "html");
        assert_eq!(children.len(), 2);
        assert_eq!(dom.tag_name(children[0]), "label");
        assert_eq!(dom.next_sibling(children[0]), Some(children[1]));
        assert_eq!(dom.text_content(row).trim(), "VÖEN");
    }

    #[test]
    fn test_values() {
        let mut dom = Dom::parse(PAGE);
        let voen = dom.find_by_id("voen").unwrap();
        let notes = dom.find_by_id("notes").unwrap();

        assert_eq!(dom.value(voen), "123");
        assert_eq!(dom.value(notes), "old & new");

        dom.set_value(voen, ElementKind::Input, "1700767721");
        assert_eq!(dom.value(voen), "1700767721");
        assert!(dom.to_html().contains(r#"<input id="voen" value="1700767721">"#));
    }

    #[test]
    fn test_textarea_serialization() {
        let mut dom = Dom::parse(PAGE);
        let notes = dom.find_by_id("notes").unwrap();
        dom.set_value(notes, ElementKind::TextArea, "A <B>");

        assert!(dom.to_html().contains(r#"<textarea id="notes">A &lt;B&gt;</textarea>"#));
    }

    #[test]
    fn test_element_kind() {
        let dom = Dom::parse(
            r#"<html><body><input id="a" type="hidden"><input id="b" type="Password"><select id="c"></select></body></html>"#,
        );
        assert_eq!(dom.element_kind(dom.find_by_id("a").unwrap()), None);
        assert_eq!(dom.element_kind(dom.find_by_id("b").unwrap()), Some(ElementKind::Input));
        assert_eq!(dom.element_kind(dom.find_by_id("c").unwrap()), None);
    }
}
