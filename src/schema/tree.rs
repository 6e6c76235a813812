use serde_json::Value;

/// Structural view of one node of a searchable document.
pub enum NodeView<'a, N: TreeNode> {
    /// Leaf; carries its text when the leaf is a string.
    Scalar(Option<&'a str>),
    List(&'a [N]),
    /// Entries in the node's own (insertion) order, produced lazily.
    Record(N::Entries<'a>),
}

/// A document tree the path resolver can walk.
pub trait TreeNode: Sized {
    type Entries<'a>: Iterator<Item = (&'a str, &'a Self)>
    where
        Self: 'a;

    fn view(&self) -> NodeView<'_, Self>;
}

type ValueEntryFn = for<'a> fn((&'a String, &'a Value)) -> (&'a str, &'a Value);

fn value_entry<'a>((key, value): (&'a String, &'a Value)) -> (&'a str, &'a Value) {
    (key.as_str(), value)
}

impl TreeNode for Value {
    type Entries<'a> = std::iter::Map<serde_json::map::Iter<'a>, ValueEntryFn>;

    fn view(&self) -> NodeView<'_, Self> {
        match self {
            Value::String(text) => NodeView::Scalar(Some(text)),
            Value::Array(items) => NodeView::List(items),
            Value::Object(map) => NodeView::Record(map.iter().map(value_entry as ValueEntryFn)),
            Value::Null | Value::Bool(_) | Value::Number(_) => NodeView::Scalar(None),
        }
    }
}
