//! Markup serialization of a render tree.
//!
//! Bindings are written as `data-bind` / `data-mirror` / `data-checked`
//! attributes and actions as `data-action`, so a host renderer can reattach
//! them. Output is deterministic: the same tree always yields the same string.

use std::fmt::Write;

use super::ir::{BindingKind, Element, RenderNode};

pub fn render(node: &RenderNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &RenderNode) {
    match node {
        RenderNode::Element(el) => write_element(out, el),
        RenderNode::Text { text } => out.push_str(&escape(text)),
        RenderNode::Fragment { children } => {
            for child in children {
                write_node(out, child);
            }
        }
    }
}

fn write_element(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.tag);
    for (name, value) in &el.attrs {
        let _ = write!(out, " {}=\"{}\"", name, escape(value));
    }
    if let Some(binding) = &el.binding {
        let attr = match binding.kind {
            BindingKind::Value => "data-bind",
            BindingKind::Mirror => "data-mirror",
            BindingKind::Checked => "data-checked",
        };
        let _ = write!(out, " {}=\"{}\"", attr, escape(&binding.model_path));
    }
    if let Some(action) = &el.action {
        let _ = write!(out, " data-action=\"{}\"", escape(action));
    }
    if el.void {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &el.children {
        write_node(out, child);
    }
    let _ = write!(out, "</{}>", el.tag);
}

pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
