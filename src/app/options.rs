use crate::{domain::DEFAULT_ORDER, schema::KeyOrder};

#[derive(Debug, Clone, PartialEq)]
pub struct EditorOptions {
    /// Sort key for fields that declare no `order`.
    pub default_order: f64,
    /// Key enumeration order used when resolving field paths in templates.
    pub key_order: KeyOrder,
    /// Re-validate a field each time it is set.
    pub validate_on_set: bool,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            default_order: DEFAULT_ORDER,
            key_order: KeyOrder::Insertion,
            validate_on_set: true,
        }
    }
}

impl EditorOptions {
    pub fn with_default_order(mut self, order: f64) -> Self {
        self.default_order = order;
        self
    }

    pub fn with_key_order(mut self, order: KeyOrder) -> Self {
        self.key_order = order;
        self
    }

    pub fn with_validate_on_set(mut self, enabled: bool) -> Self {
        self.validate_on_set = enabled;
        self
    }
}
