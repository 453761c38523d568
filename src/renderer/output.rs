//! Rendered output: a small element tree with HTML serialization

use serde::Serialize;
use std::collections::BTreeMap;

const VOID_TAGS: &[&str] = &["input", "br", "hr", "img", "meta", "link"];

/// Output of rendering one node
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Rendered {
    Element(Element),
    Text { text: String },
    Fragment { children: Vec<Rendered> },
}

impl Rendered {
    pub fn text(text: impl Into<String>) -> Self {
        Rendered::Text { text: text.into() }
    }

    pub fn fragment(children: Vec<Rendered>) -> Self {
        Rendered::Fragment { children }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Rendered::Element(element) => element.write_html(out),
            Rendered::Text { text } => out.push_str(&escape(text)),
            Rendered::Fragment { children } => {
                for child in children {
                    child.write_html(out);
                }
            }
        }
    }

    /// Concatenated text of this subtree
    pub fn text_content(&self) -> String {
        match self {
            Rendered::Element(element) => element.text_content(),
            Rendered::Text { text } => text.clone(),
            Rendered::Fragment { children } => {
                children.iter().map(Rendered::text_content).collect()
            }
        }
    }

    /// Every element in this subtree matching `predicate`, document order
    pub fn find_all<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect(predicate, &mut found);
        found
    }

    /// First element whose attribute `key` equals `value`
    pub fn find_by_attr(&self, key: &str, value: &str) -> Option<&Element> {
        self.find_all(&|el: &Element| el.attr(key) == Some(value)).into_iter().next()
    }

    fn collect<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool, found: &mut Vec<&'a Element>) {
        match self {
            Rendered::Element(element) => {
                if predicate(element) {
                    found.push(element);
                }
                for child in &element.children {
                    child.collect(predicate, found);
                }
            }
            Rendered::Text { .. } => {}
            Rendered::Fragment { children } => {
                for child in children {
                    child.collect(predicate, found);
                }
            }
        }
    }
}

impl From<Element> for Rendered {
    fn from(element: Element) -> Self {
        Rendered::Element(element)
    }
}

/// An HTML-like element; attribute order is stable
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Rendered>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attrs.contains_key(key)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_opt_attr(self, key: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.with_attr(key, value),
            None => self,
        }
    }

    /// Boolean attribute such as `disabled`, present only when `on`
    pub fn with_flag(self, key: &str, on: bool) -> Self {
        if on {
            self.with_attr(key, "")
        } else {
            self
        }
    }

    pub fn with_child(mut self, child: impl Into<Rendered>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Rendered::text(text))
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Rendered>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn text_content(&self) -> String {
        self.children.iter().map(Rendered::text_content).collect()
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(&escape(value));
                out.push('"');
            }
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
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
