//! Element-level view of a foreign markup tree.

use serde::Serialize;

use crate::models::config::FillConfig;

/// Handle to an element inside a [`MarkupTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Kind of a value-bearing element. Selects the native value setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Input,
    TextArea,
}

/// Interaction events dispatched after a value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionEvent {
    Focus,
    Input,
    Change,
    KeyDown,
    KeyUp,
    Blur,
}

impl InteractionEvent {
    /// The order in which a real user's entry fires these events.
    pub const SEQUENCE: [InteractionEvent; 6] = [
        InteractionEvent::Focus,
        InteractionEvent::Input,
        InteractionEvent::Change,
        InteractionEvent::KeyDown,
        InteractionEvent::KeyUp,
        InteractionEvent::Blur,
    ];

    /// DOM event type name.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionEvent::Focus => "focus",
            InteractionEvent::Input => "input",
            InteractionEvent::Change => "change",
            InteractionEvent::KeyDown => "keydown",
            InteractionEvent::KeyUp => "keyup",
            InteractionEvent::Blur => "blur",
        }
    }
}

/// Transient visual feedback on a filled element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub border: String,
    pub background: String,
    /// Delay after which the element's own style is restored.
    pub duration_ms: u64,
}

impl From<&FillConfig> for Highlight {
    fn from(config: &FillConfig) -> Self {
        Self {
            border: config.highlight_border.clone(),
            background: config.highlight_background.clone(),
            duration_ms: config.highlight_ms,
        }
    }
}

/// Input types that never carry free text.
const NON_TEXT_INPUTS: &[&str] = &[
    "hidden", "submit", "button", "checkbox", "radio", "file", "image", "reset", "color", "range",
];

/// A markup document seen as a tree of elements.
///
/// Text nodes are not addressable; they only contribute to
/// [`MarkupTree::text_content`]. The tree is owned by its host and mutated in
/// place by a single fill pass.
pub trait MarkupTree {
    /// The document element.
    fn root(&self) -> NodeId;

    /// Child elements in document order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Parent element, `None` for the root.
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Lowercase tag name.
    fn tag_name(&self, node: NodeId) -> String;

    /// Attribute value, if present.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Concatenated text of all descendant text nodes.
    fn text_content(&self, node: NodeId) -> String;

    /// Current value of a form control.
    fn value(&self, node: NodeId) -> String;

    /// Write a value through the native setter for `kind`.
    fn set_value(&mut self, node: NodeId, kind: ElementKind, value: &str);

    /// Dispatch a bubbling event on an element.
    fn dispatch_event(&mut self, node: NodeId, event: InteractionEvent);

    /// Apply a highlight that reverts after `highlight.duration_ms`.
    fn highlight(&mut self, node: NodeId, highlight: &Highlight);

    /// Next element sibling.
    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|&n| n == node)?;
        siblings.get(pos + 1).copied()
    }

    /// All descendant elements of `node` in document order, excluding `node`.
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    /// Whether `ancestor` is `node` or contains it.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// First element with the given `id` attribute.
    fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root();
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|&n| self.attribute(n, "id").as_deref() == Some(id))
    }

    /// Element kind if `node` accepts free text.
    fn element_kind(&self, node: NodeId) -> Option<ElementKind> {
        match self.tag_name(node).as_str() {
            "textarea" => Some(ElementKind::TextArea),
            "input" => {
                let input_type = self
                    .attribute(node, "type")
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                (!NON_TEXT_INPUTS.contains(&input_type.as_str())).then_some(ElementKind::Input)
            }
            _ => None,
        }
    }

    /// The element is disabled.
    fn is_disabled(&self, node: NodeId) -> bool {
        self.attribute(node, "disabled").is_some()
    }

    /// The element is read-only.
    fn is_readonly(&self, node: NodeId) -> bool {
        self.attribute(node, "readonly").is_some()
    }
}
