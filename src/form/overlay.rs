use crate::domain::FieldSpec;

use super::{editor::FieldEditor, widget::WidgetKind};

/// Edits the readers restriction of one field with the same machinery as
/// the field itself.
#[derive(Debug, Clone, Copy)]
pub struct ReadersOverlay<'a> {
    owner: &'a FieldSpec,
}

impl<'a> ReadersOverlay<'a> {
    pub fn new(owner: &'a FieldSpec) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &'a FieldSpec {
        self.owner
    }

    /// `None` when the field declares no readers.
    pub fn editor(&self) -> Option<FieldEditor<'a>> {
        self.owner.readers.as_deref().map(FieldEditor::new)
    }

    pub fn slot(&self) -> Option<&'a str> {
        self.owner
            .readers
            .as_deref()
            .map(|readers| readers.name.as_str())
    }

    pub fn widget(&self) -> Option<WidgetKind> {
        self.editor().and_then(|editor| editor.widget())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::{FieldKind, TypedParam};

    #[test]
    fn absent_readers_render_nothing() {
        let spec = FieldSpec::typed("title", TypedParam::of_type("string"));
        let overlay = ReadersOverlay::new(&spec);
        assert!(overlay.editor().is_none());
        assert_eq!(overlay.widget(), None);
    }

    #[test]
    fn readers_reuse_the_widget_vocabulary() {
        let constant = FieldSpec::typed("title", TypedParam::of_type("string"))
            .with_readers(FieldKind::Const(json!(["Venue", "Venue/Authors"])));
        assert_eq!(
            ReadersOverlay::new(&constant).widget(),
            Some(WidgetKind::TagList)
        );

        let choice = FieldSpec::typed("title", TypedParam::of_type("string")).with_readers(
            FieldKind::Typed(TypedParam::of_type("string[]").with_options(["Everyone", "Venue"])),
        );
        let overlay = ReadersOverlay::new(&choice);
        assert_eq!(overlay.widget(), Some(WidgetKind::Dropdown));
        assert_eq!(overlay.slot(), Some("title/readers"));
    }
}
