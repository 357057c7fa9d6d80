//! Typed element selectors.

/// The selector shapes the theme needs. Each renders to CSS for the browser
/// and is matched structurally by the in-memory document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// `#id`
    Id(String),
    /// `.class`
    Class(String),
    /// `[attribute]`
    Attribute(String),
    /// `tag`
    Tag(String),
    /// `button[type="submit"]`
    SubmitButton,
    /// Keyboard-focusable elements: buttons, links, form controls and
    /// elements with a non-negative tab index.
    Focusable,
}

impl Selector {
    pub fn id(id: impl Into<String>) -> Self {
        Selector::Id(id.into())
    }

    pub fn class(class: impl Into<String>) -> Self {
        Selector::Class(class.into())
    }

    pub fn attribute(name: impl Into<String>) -> Self {
        Selector::Attribute(name.into())
    }

    pub fn tag(tag: impl Into<String>) -> Self {
        Selector::Tag(tag.into())
    }

    /// CSS selector text.
    pub fn to_css(&self) -> String {
        match self {
            Selector::Id(id) => format!("#{}", id),
            Selector::Class(class) => format!(".{}", class),
            Selector::Attribute(name) => format!("[{}]", name),
            Selector::Tag(tag) => tag.clone(),
            Selector::SubmitButton => r#"button[type="submit"]"#.to_string(),
            Selector::Focusable => {
                r#"button, [href], input, select, textarea, [tabindex]:not([tabindex^="-"])"#
                    .to_string()
            }
        }
    }
}
