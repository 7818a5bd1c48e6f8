//! Render tree produced by widgets and consumed by renderers.

use serde::Serialize;

use crate::domain::PropertyPath;

/// How a control element is bound to the property tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldBinding {
    /// Path of the bound property, relative to the root property
    pub path: PropertyPath,
    /// Model-qualified expression, e.g. `m.name`
    pub model_path: String,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingKind {
    /// Two-way: edits flow back into the property
    Value,
    /// Companion hidden input mirroring the value, never edited directly
    Mirror,
    /// Checkbox bound to a boolean
    Checked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<FieldBinding>,
    /// Action id triggered by this element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub children: Vec<RenderNode>,
    /// Void elements (`input`) have no closing tag
    pub void: bool,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: Vec::new(),
            binding: None,
            action: None,
            children: Vec::new(),
            void: matches!(tag, "input" | "br" | "hr"),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    /// Add the attribute only when `value` is present.
    pub fn attr_opt(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    pub fn flag(self, name: &str, on: bool) -> Self {
        if on {
            self.attr(name, name)
        } else {
            self
        }
    }

    pub fn bind(mut self, binding: FieldBinding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn on_action(mut self, action: &str) -> Self {
        self.action = Some(action.to_string());
        self
    }

    pub fn child(mut self, node: impl Into<RenderNode>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum RenderNode {
    Element(Element),
    Text { text: String },
    Fragment { children: Vec<RenderNode> },
}

impl RenderNode {
    pub fn text(text: impl Into<String>) -> Self {
        RenderNode::Text { text: text.into() }
    }

    pub fn fragment(children: Vec<RenderNode>) -> Self {
        RenderNode::Fragment { children }
    }

    /// Depth-first walk over every element.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Element)) {
        match self {
            RenderNode::Element(el) => {
                f(el);
                for child in &el.children {
                    child.walk(f);
                }
            }
            RenderNode::Fragment { children } => {
                for child in children {
                    child.walk(f);
                }
            }
            RenderNode::Text { .. } => {}
        }
    }
}

impl From<Element> for RenderNode {
    fn from(el: Element) -> Self {
        RenderNode::Element(el)
    }
}

/// Render tree for a whole form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderTree {
    pub root: RenderNode,
    pub model_name: String,
}

impl RenderTree {
    /// Every bound element, in document order.
    pub fn bindings(&self) -> Vec<&FieldBinding> {
        let mut out = Vec::new();
        self.root.walk(&mut |el| {
            if let Some(binding) = &el.binding {
                out.push(binding);
            }
        });
        out
    }

    pub fn to_markup(&self) -> String {
        super::markup::render(&self.root)
    }
}
