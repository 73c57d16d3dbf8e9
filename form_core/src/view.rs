//! # Render Tree
//!
//! Controls describe what they would show as a small [`View`] tree. Styling
//! and widgets belong to the presentation layer; the engine only decides
//! structure: which elements exist, their text, their nesting, and where a
//! slot stays empty because its control type could not be resolved.

use std::fmt::Write;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum View {
    /// Nothing rendered (unresolved type, missing collaborator)
    Empty,
    /// Empty drop target in the designer grid
    Placeholder,
    Element {
        tag: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<View>,
    },
}

impl View {
    pub fn element(tag: impl Into<String>) -> Self {
        View::Element {
            tag: tag.into(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn with_text(self, value: impl Into<String>) -> Self {
        match self {
            View::Element { tag, children, .. } => View::Element {
                tag,
                text: Some(value.into()),
                children,
            },
            other => other,
        }
    }

    pub fn with_child(self, child: View) -> Self {
        self.with_children(vec![child])
    }

    pub fn with_children(self, more: Vec<View>) -> Self {
        match self {
            View::Element { tag, text, mut children } => {
                children.extend(more);
                View::Element { tag, text, children }
            }
            other => other,
        }
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            View::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            View::Element { text, .. } => text.as_deref(),
            _ => None,
        }
    }

    pub fn children(&self) -> &[View] {
        match self {
            View::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, View::Empty)
    }

    /// Number of elements with `tag` in this subtree, `self` included.
    pub fn count(&self, tag: &str) -> usize {
        let own = usize::from(self.tag() == Some(tag));
        own + self.children().iter().map(|c| c.count(tag)).sum::<usize>()
    }

    /// Number of placeholders in this subtree.
    pub fn placeholders(&self) -> usize {
        match self {
            View::Placeholder => 1,
            _ => self.children().iter().map(View::placeholders).sum(),
        }
    }

    /// First element with `tag`, depth-first.
    pub fn find(&self, tag: &str) -> Option<&View> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(tag))
    }

    /// Indented outline, one node per line.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        self.write_outline(&mut out, 0);
        out
    }

    fn write_outline(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            View::Empty => {
                let _ = writeln!(out, "{}(empty)", indent);
            }
            View::Placeholder => {
                let _ = writeln!(out, "{}[ ]", indent);
            }
            View::Element { tag, text, children } => {
                match text {
                    Some(text) => {
                        let _ = writeln!(out, "{}<{}> {}", indent, tag, text);
                    }
                    None => {
                        let _ = writeln!(out, "{}<{}>", indent, tag);
                    }
                }
                for child in children {
                    child.write_outline(out, depth + 1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_and_find() {
        let view = View::element("fieldset")
            .with_child(View::element("legend").with_text("Pulse Data"))
            .with_children(vec![View::element("obsControl"), View::Empty, View::element("obsControl")]);

        assert_eq!(view.count("obsControl"), 2);
        assert_eq!(view.find("legend").and_then(View::text), Some("Pulse Data"));
        assert!(view.find("table").is_none());
    }

    #[test]
    fn test_outline() {
        let view = View::element("row").with_children(vec![View::Placeholder, View::Empty]);
        assert_eq!(view.outline(), "<row>\n  [ ]\n  (empty)\n");
    }

    #[test]
    fn test_modifiers_ignore_non_elements() {
        assert_eq!(View::Empty.with_text("x"), View::Empty);
        assert_eq!(View::Placeholder.with_child(View::Empty), View::Placeholder);
    }
}
