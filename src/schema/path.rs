use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Dotted/bracketed location inside a JSON document, e.g. `content.authors[0].name`.
///
/// The root path renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.0.pop()
    }

    pub fn join(&self, segment: Segment) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.push(Segment::Key(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.push(Segment::Index(index));
        self
    }

    /// Read the value at this path, if every segment exists.
    pub fn lookup<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        let mut current = value;
        for segment in &self.0 {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if position == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn renders_dotted_and_bracketed_segments() {
        let path = Path::root().key("content").key("authors").index(1).key("name");
        assert_eq!(path.to_string(), "content.authors[1].name");
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn looks_up_nested_values() {
        let record = json!({"content": {"authors": [{"name": "A"}, {"name": "B"}]}});
        let path = Path::root().key("content").key("authors").index(1).key("name");
        assert_eq!(path.lookup(&record), Some(&json!("B")));
        let missing = Path::root().key("content").key("venue");
        assert_eq!(missing.lookup(&record), None);
    }
}
