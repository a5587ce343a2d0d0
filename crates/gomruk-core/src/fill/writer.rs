//! Framework-compatible value injection.

use tracing::debug;

use super::markup::{ElementKind, InteractionEvent, MarkupTree, NodeId};

/// Writes a value into a form control so that the page notices.
pub trait ValueWriter {
    /// Write `value` into `node`.
    fn write(&self, tree: &mut dyn MarkupTree, node: NodeId, kind: ElementKind, value: &str);
}

/// Writes through the element kind's native value setter, then replays the
/// events of a user typing the value.
///
/// Reactive frameworks track a control's value through its own property;
/// going through the prototype setter updates their tracker, and the event
/// sequence makes listeners on `input`/`change` run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameworkValueWriter;

impl ValueWriter for FrameworkValueWriter {
    fn write(&self, tree: &mut dyn MarkupTree, node: NodeId, kind: ElementKind, value: &str) {
        tree.set_value(node, kind, value);
        for event in InteractionEvent::SEQUENCE {
            tree.dispatch_event(node, event);
        }
        debug!("Wrote {} chars into {:?} ({:?})", value.chars().count(), node, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::Dom;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_then_event_sequence() {
        let mut dom = Dom::parse(r#"<html><body><input id="x"></body></html>"#);
        let input = dom.find_by_id("x").unwrap();

        FrameworkValueWriter.write(&mut dom, input, ElementKind::Input, "GLB");

        assert_eq!(dom.value(input), "GLB");
        assert_eq!(dom.events_for(input), InteractionEvent::SEQUENCE.to_vec());
    }
}
