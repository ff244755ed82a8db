//! Owned XML element tree with the lookups the API responses need.
//!
//! Documents are parsed with `roxmltree` and copied into [`XmlElement`] so results can
//! outlive the response body and cross `await` points. Element names are local names
//! (namespace prefixes dropped) and child lookups ignore ASCII case.

use std::str::FromStr;

use crate::error::{NamecheapError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    /// Empty element named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Parse a document and return its root element.
    pub fn parse(document: &str) -> Result<Self> {
        let document = roxmltree::Document::parse(document).map_err(|e| NamecheapError::XmlParse {
            detail: e.to_string(),
        })?;
        Ok(Self::from_node(document.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut element = Self::new(node.tag_name().name());
        element.attributes = node
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();

        for child in node.children() {
            if child.is_element() {
                element.children.push(Self::from_node(child));
            } else if child.is_text() {
                element.text.push_str(child.text().unwrap_or_default());
            }
        }
        element
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fail with [`NamecheapError::IncorrectElement`] unless the name matches (ignoring case).
    pub fn require_name(&self, expected: &str) -> Result<()> {
        if self.name.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(NamecheapError::IncorrectElement {
                expected: expected.to_string(),
                found: self.name.clone(),
            })
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn required_attribute(&self, name: &str) -> Result<&str> {
        self.attribute(name)
            .ok_or_else(|| NamecheapError::MissingAttribute {
                element: self.name.clone(),
                attribute: name.to_string(),
            })
    }

    /// Parse an attribute, `None` when absent or unparsable.
    pub fn attribute_as<T: FromStr>(&self, name: &str) -> Option<T> {
        self.attribute(name)
            .and_then(|value| value.trim().parse().ok())
    }

    /// `true`/`false` in any case; anything else is `false`.
    pub fn attribute_as_bool(&self, name: &str) -> bool {
        self.attribute(name)
            .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
    }

    /// Concatenated text of this element and its descendants, trimmed.
    pub fn content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text.trim().to_string()
    }

    fn collect_text(&self, into: &mut String) {
        into.push_str(&self.text);
        for child in &self.children {
            child.collect_text(into);
        }
    }

    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Children whose name matches `name` (ignoring case).
    pub fn children_named<'a, 'n>(
        &'a self,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Self> + use<'a, 'n> {
        self.children
            .iter()
            .filter(move |child| child.name.eq_ignore_ascii_case(name))
    }

    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children_named(name).next()
    }

    pub fn required_child(&self, name: &str) -> Result<&Self> {
        self.child(name).ok_or_else(|| NamecheapError::MissingElement {
            parent: Some(self.name.clone()),
            element: name.to_string(),
        })
    }

    /// Parse the content of a required child.
    pub fn required_child_content_as<T: FromStr>(&self, name: &str) -> Result<T> {
        let child = self.required_child(name)?;
        let content = child.content();
        content.parse().map_err(|_| NamecheapError::InvalidData {
            detail: format!("'{content}' is not a valid value for element '{name}'"),
        })
    }
}
