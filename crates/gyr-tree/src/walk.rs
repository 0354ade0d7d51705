//! Deterministic traversal over a document forest.

use crate::node::{Document, Node, Scalar};
use crate::path::{NodePath, Step};

/// Visit every string scalar in `forest`, in depth-first document order.
///
/// Documents are visited in slice order. Within a mapping, entries are
/// visited in document order with the key before the value; sequence items
/// are visited in order. Non-string scalars are skipped. The visitor
/// receives the path of each string scalar together with its value, and the
/// order is identical on every run over the same forest.
pub fn for_each_string<F>(forest: &[Document], mut visit: F)
where
    F: FnMut(NodePath, &str),
{
    for (document, doc) in forest.iter().enumerate() {
        let mut steps = Vec::new();
        visit_node(doc.root(), document, &mut steps, &mut visit);
    }
}

fn visit_node<F>(node: &Node, document: usize, steps: &mut Vec<Step>, visit: &mut F)
where
    F: FnMut(NodePath, &str),
{
    match node {
        Node::Scalar(Scalar::String(value)) => {
            visit(NodePath::new(document, steps.clone()), value);
        }
        Node::Scalar(_) => {}
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                steps.push(Step::Item(index));
                visit_node(item, document, steps, visit);
                steps.pop();
            }
        }
        Node::Mapping(entries) => {
            for (index, (key, value)) in entries.iter().enumerate() {
                steps.push(Step::Key(index));
                visit_node(key, document, steps, visit);
                steps.pop();

                steps.push(Step::Value(index));
                visit_node(value, document, steps, visit);
                steps.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::node_at;

    fn collect(forest: &[Document]) -> Vec<(NodePath, String)> {
        let mut seen = Vec::new();
        for_each_string(forest, |path, value| seen.push((path, value.to_string())));
        seen
    }

    #[test]
    fn visits_keys_before_values_in_document_order() {
        let forest = vec![Document::new(Node::Mapping(vec![
            (Node::string("alpha"), Node::string("one")),
            (Node::string("beta"), Node::string("two")),
        ]))];

        let values: Vec<String> = collect(&forest).into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, ["alpha", "one", "beta", "two"]);
    }

    #[test]
    fn visits_documents_in_slice_order() {
        let forest = vec![
            Document::new(Node::string("first")),
            Document::new(Node::string("second")),
        ];

        let seen = collect(&forest);
        assert_eq!(seen[0].0.document(), 0);
        assert_eq!(seen[1].0.document(), 1);
    }

    #[test]
    fn skips_non_string_scalars() {
        let forest = vec![Document::new(Node::Sequence(vec![
            Node::Scalar(Scalar::Null),
            Node::Scalar(Scalar::Bool(false)),
            Node::Scalar(Scalar::Number("42".to_string())),
            Node::string("kept"),
        ]))];

        let values: Vec<String> = collect(&forest).into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, ["kept"]);
    }

    #[test]
    fn reported_paths_resolve_to_the_visited_value() {
        let forest = vec![Document::new(Node::Mapping(vec![(
            Node::string("outer"),
            Node::Mapping(vec![(
                Node::string("inner"),
                Node::Sequence(vec![Node::string("deep")]),
            )]),
        )]))];

        for (path, value) in collect(&forest) {
            let node = node_at(&forest, &path).unwrap();
            assert_eq!(node.as_str(), Some(value.as_str()));
        }
    }

    #[test]
    fn traversal_order_is_stable_across_runs() {
        let forest = vec![Document::new(Node::Mapping(vec![
            (
                Node::string("z"),
                Node::Sequence(vec![Node::string("a"), Node::string("b")]),
            ),
            (Node::string("a"), Node::string("c")),
        ]))];

        assert_eq!(collect(&forest), collect(&forest));
    }
}
