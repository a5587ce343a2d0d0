//! Label-driven location of form controls in foreign markup.
//!
//! A field is located from a label node whose visible text equals one of
//! its known labels. Candidate controls are tried in a fixed order:
//!
//! 1. the control a `<label for>` points at
//! 2. the label's next sibling, or the first control inside it
//! 3. the next sibling of the label's parent, or the first control inside it
//! 4. any control in the same logical row (`tr`, `.row`, `.form-group`)

use std::collections::HashSet;

use tracing::{debug, trace};

use super::markup::{Highlight, MarkupTree, NodeId};
use super::profile::{OverwritePolicy, SiteProfile};
use super::writer::ValueWriter;
use super::{FieldState, FillDetail, FillOutcome, TargetState};
use crate::models::fields::FieldRecord;

/// Tags whose text is never a label.
const NON_LABEL_TAGS: &[&str] = &[
    "input", "textarea", "select", "option", "button", "script", "style", "head", "title",
];

/// Labels longer than this are page content, not labels.
const MAX_LABEL_CHARS: usize = 120;

/// Collapse whitespace and drop trailing `:` / `*` markers.
pub fn normalize_label(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_end_matches([':', '*', ' '])
        .trim()
        .to_string()
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect()
}

/// Deepest elements under `scope` whose text matches one of `labels`.
pub fn find_label_nodes(tree: &dyn MarkupTree, scope: NodeId, labels: &[&str]) -> Vec<NodeId> {
    let matches = |node: NodeId| -> bool {
        if NON_LABEL_TAGS.contains(&tree.tag_name(node).as_str()) {
            return false;
        }
        let text = normalize_label(&tree.text_content(node));
        !text.is_empty()
            && text.chars().count() <= MAX_LABEL_CHARS
            && labels.contains(&text.as_str())
    };

    std::iter::once(scope)
        .chain(tree.descendants(scope))
        .filter(|&node| matches(node))
        .filter(|&node| !tree.children(node).into_iter().any(|child| matches(child)))
        .collect()
}

/// Control at `node` itself, or the first control inside it.
pub fn first_control(tree: &dyn MarkupTree, node: NodeId) -> Option<NodeId> {
    if tree.element_kind(node).is_some() {
        return Some(node);
    }
    tree.descendants(node)
        .into_iter()
        .find(|&n| tree.element_kind(n).is_some())
}

fn is_row(tree: &dyn MarkupTree, node: NodeId) -> bool {
    if tree.tag_name(node) == "tr" {
        return true;
    }
    tree.attribute(node, "class").is_some_and(|class| {
        class
            .split_whitespace()
            .any(|c| c == "form-group" || c.contains("row"))
    })
}

/// Candidate controls for a label node, in search order, without duplicates.
pub fn candidates(tree: &dyn MarkupTree, label: NodeId) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::new();

    if tree.tag_name(label) == "label" {
        let target = tree
            .attribute(label, "for")
            .and_then(|id| tree.find_by_id(&id))
            .filter(|&n| tree.element_kind(n).is_some());
        push_unique(&mut out, target);
    }

    push_unique(
        &mut out,
        tree.next_sibling(label).and_then(|s| first_control(tree, s)),
    );

    push_unique(
        &mut out,
        tree.parent(label)
            .and_then(|p| tree.next_sibling(p))
            .and_then(|s| first_control(tree, s)),
    );

    let mut ancestor = tree.parent(label);
    while let Some(node) = ancestor {
        if is_row(tree, node) {
            for control in tree
                .descendants(node)
                .into_iter()
                .filter(|&n| tree.element_kind(n).is_some())
            {
                push_unique(&mut out, Some(control));
            }
            break;
        }
        ancestor = tree.parent(node);
    }

    out
}

fn push_unique(out: &mut Vec<NodeId>, node: Option<NodeId>) {
    if let Some(node) = node {
        if !out.contains(&node) {
            out.push(node);
        }
    }
}

/// Smallest container holding the section heading `title` and at least one control.
pub fn find_section(tree: &dyn MarkupTree, title: &str) -> Option<NodeId> {
    let wanted = collapse(title);
    let root = tree.root();

    let heading = std::iter::once(root)
        .chain(tree.descendants(root))
        .filter(|&n| !NON_LABEL_TAGS.contains(&tree.tag_name(n).as_str()))
        .filter(|&n| collapse(&tree.text_content(n)).starts_with(&wanted))
        .last()?;

    let mut ancestor = tree.parent(heading);
    while let Some(node) = ancestor {
        if first_control(tree, node).is_some() {
            debug!("Sender section found at {:?}", node);
            return Some(node);
        }
        ancestor = tree.parent(node);
    }
    None
}

/// The control can receive a value under `policy`.
pub fn is_fillable(tree: &dyn MarkupTree, node: NodeId, policy: OverwritePolicy) -> bool {
    if tree.is_disabled(node) || tree.is_readonly(node) {
        return false;
    }
    match policy {
        OverwritePolicy::Always => true,
        OverwritePolicy::RequireEmpty => tree.value(node).trim().is_empty(),
    }
}

/// Locate and fill every target of `profile` by label.
///
/// When the profile names a sender section and it exists, each field is
/// searched there first and in the whole document only if not found.
pub fn fill_by_labels<P: SiteProfile + ?Sized>(
    profile: &P,
    record: &FieldRecord,
    tree: &mut dyn MarkupTree,
    writer: &dyn ValueWriter,
    highlight: &Highlight,
) -> FillOutcome {
    let root = tree.root();
    let mut scopes = Vec::new();
    if let Some(section) = profile
        .sender_section()
        .and_then(|title| find_section(&*tree, title)) {
        scopes.push(section);
    }
    scopes.push(root);

    let mut outcome = FillOutcome::default();
    let mut used: HashSet<NodeId> = HashSet::new();

    for target in profile.targets() {
        let Some(value) = target.value.resolve(record) else {
            outcome.states.push(TargetState {
                target: target.value.name(),
                state: FieldState::NotAttempted,
            });
            continue;
        };

        let mut state = FieldState::NotFound;
        'search: for &scope in &scopes {
            for label in find_label_nodes(tree, scope, target.labels) {
                for candidate in candidates(tree, label) {
                    if !tree.contains(scope, candidate)
                        || used.contains(&candidate)
                        || profile.is_excluded(tree, candidate)
                    {
                        continue;
                    }

                    state = FieldState::Located;
                    let Some(kind) = tree.element_kind(candidate) else {
                        continue;
                    };
                    if !is_fillable(tree, candidate, profile.overwrite()) {
                        trace!(
                            "{} candidate {:?} is not fillable",
                            target.value.name(),
                            candidate
                        );
                        continue;
                    }

                    writer.write(tree, candidate, kind, &value);
                    tree.highlight(candidate, highlight);
                    used.insert(candidate);

                    outcome.details.push(FillDetail {
                        field: target.value.name(),
                        label: normalize_label(&tree.text_content(label)),
                        value: value.clone(),
                        element: candidate,
                    });
                    state = FieldState::Filled;
                    break 'search;
                }
            }
        }

        debug!("{}: {:?}", target.value.name(), state);
        outcome.states.push(TargetState {
            target: target.value.name(),
            state,
        });
    }

    outcome.filled_count = outcome.details.len();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::Dom;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  VÖEN\n :"), "VÖEN");
        assert_eq!(normalize_label("Göndərənin   adı *"), "Göndərənin adı");
    }

    #[test]
    fn test_deepest_label_node() {
        let dom = Dom::parse(
            r#"<html><body><div id="wrap"><label id="l">Adı:</label><input></div></body></html>"#,
        );
        let labels = find_label_nodes(&dom, dom.root(), &["Adı"]);
        assert_eq!(labels, vec![dom.find_by_id("l").unwrap()]);
    }

    #[test]
    fn test_candidate_order() {
        let dom = Dom::parse(
            r#"<html><body><table><tr>
                <td><label id="l" for="explicit">VIN</label></td>
                <td><input id="parent-sibling"></td>
                <td><input id="row-mate"></td>
            </tr></table>
            <input id="explicit"></body></html>"#,
        );
        let label = dom.find_by_id("l").unwrap();
        let ids: Vec<String> = candidates(&dom, label)
            .into_iter()
            .filter_map(|n| dom.attribute(n, "id"))
            .collect();
        assert_eq!(ids, vec!["explicit", "parent-sibling", "row-mate"]);
    }

    #[test]
    fn test_next_sibling_container() {
        let dom = Dom::parse(
            r#"<html><body><span id="l">Ünvan</span><div><p>hint</p><textarea id="t"></textarea></div></body></html>"#,
        );
        let label = dom.find_by_id("l").unwrap();
        assert_eq!(candidates(&dom, label), vec![dom.find_by_id("t").unwrap()]);
    }

    #[test]
    fn test_find_section() {
        let dom = Dom::parse(
            r#"<html><body>
            <div id="s1"><h3>1.Alıcı</h3><input></div>
            <div id="s2"><h3>2. Göndərən / İxracatçı</h3><div><input></div></div>
            </body></html>"#,
        );
        assert_eq!(
            find_section(&dom, "2.Göndərən/İxracatçı"),
            Some(dom.find_by_id("s2").unwrap())
        );
        assert_eq!(find_section(&dom, "9.Yoxdur"), None);
    }
}
