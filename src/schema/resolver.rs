use serde_json::Value;

use super::{
    path::{Path, Segment},
    tree::{NodeView, TreeNode},
};

/// Order in which record keys are visited; decides which of several
/// coincidental matches wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyOrder {
    #[default]
    Insertion,
    Lexicographic,
}

/// Where a field name was found inside a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// Path to the container holding the matching entry.
    pub parent: Path,
    /// Key (or index) of the matching entry inside `parent`.
    pub key: Segment,
}

impl PathMatch {
    pub fn full_path(&self) -> Path {
        self.parent.join(self.key.clone())
    }
}

/// Finds where a field name is referenced inside an arbitrarily nested
/// template.
///
/// A record entry matches when its value is a string containing the needle
/// or a list with an element equal to it. Lists that do not match as a whole
/// are searched element by element, so a string element containing the
/// needle matches at its index. The first match in depth-first order wins.
/// A substring hit inside an unrelated value is still a hit; callers get a
/// best-effort location, not a guarantee.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver {
    order: KeyOrder,
}

impl PathResolver {
    pub fn new(order: KeyOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> KeyOrder {
        self.order
    }

    pub fn locate<N: TreeNode>(&self, template: &N, needle: &str) -> Option<PathMatch> {
        if needle.is_empty() {
            return None;
        }
        let mut prefix = Path::root();
        let found = self.walk(template.view(), needle, &mut prefix);
        if found.is_none() {
            tracing::trace!(needle, "no template entry references field");
        }
        found
    }

    /// Path of the container whose entry references `needle`.
    pub fn resolve_path<N: TreeNode>(&self, template: &N, needle: &str) -> Option<Path> {
        self.locate(template, needle).map(|found| found.parent)
    }

    fn walk<N: TreeNode>(
        &self,
        view: NodeView<'_, N>,
        needle: &str,
        prefix: &mut Path,
    ) -> Option<PathMatch> {
        match view {
            NodeView::Scalar(_) => None,
            NodeView::List(items) => items
                .iter()
                .enumerate()
                .find_map(|(index, item)| self.visit(Step::Index(index), item, needle, prefix)),
            NodeView::Record(entries) if self.order == KeyOrder::Lexicographic => {
                let mut sorted: Vec<(&str, &N)> = entries.collect();
                sorted.sort_by(|(left, _), (right, _)| left.cmp(right));
                sorted
                    .into_iter()
                    .find_map(|(key, value)| self.visit(Step::Key(key), value, needle, prefix))
            }
            NodeView::Record(mut entries) => {
                entries.find_map(|(key, value)| self.visit(Step::Key(key), value, needle, prefix))
            }
        }
    }

    /// Match `child` as an entry of the container at `prefix`, else descend.
    fn visit<N: TreeNode>(
        &self,
        step: Step<'_>,
        child: &N,
        needle: &str,
        prefix: &mut Path,
    ) -> Option<PathMatch> {
        let view = child.view();
        let matched = match &view {
            NodeView::Scalar(Some(text)) => text.contains(needle),
            NodeView::Scalar(None) => return None,
            NodeView::List(items) => items
                .iter()
                .any(|item| matches!(item.view(), NodeView::Scalar(Some(text)) if text == needle)),
            NodeView::Record(_) => false,
        };
        if matched {
            return Some(PathMatch {
                parent: prefix.clone(),
                key: step.into_segment(),
            });
        }
        prefix.push(step.into_segment());
        let found = self.walk(view, needle, prefix);
        prefix.pop();
        found
    }
}

/// Borrowed segment; only turned into an owned [`Segment`] on use.
#[derive(Clone, Copy)]
enum Step<'a> {
    Key(&'a str),
    Index(usize),
}

impl Step<'_> {
    fn into_segment(self) -> Segment {
        match self {
            Step::Key(key) => Segment::Key(key.to_string()),
            Step::Index(index) => Segment::Index(index),
        }
    }
}

/// [`PathResolver::resolve_path`] with insertion key order.
pub fn resolve_path(template: &Value, needle: &str) -> Option<Path> {
    PathResolver::default().resolve_path(template, needle)
}
