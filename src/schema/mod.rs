mod path;
mod resolver;
mod tree;

pub use path::{Path, Segment};
pub use resolver::{KeyOrder, PathMatch, PathResolver, resolve_path};
pub use tree::{NodeView, TreeNode};
