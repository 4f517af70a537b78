//! Minimal owned XML document tree.
//!
//! E-utilities responses are small enough (a few hundred records per batch)
//! that building an owned tree with `quick-xml` and then querying it is simpler
//! than driving extraction from a streaming state machine.
//!
//! Text flattening is written against the [`TextTree`] trait rather than
//! [`XmlElement`] directly, so any node type that can list its fragments in
//! document order can reuse it.

use crate::error::{OptionExt, PubmedError, Result};
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One node inside an element: either a nested element or a text run.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and children in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parse a complete document and return its root element.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        // Open elements; the root is completed when the stack empties.
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => {
                    stack.push(element_from_start(&start)?);
                }
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(end) => {
                    let element = stack.pop().ok_or_xml("unbalanced closing tag")?;
                    let closing = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    if closing != element.name {
                        return Err(PubmedError::Xml(format!(
                            "expected </{}>, found </{}>",
                            element.name, closing
                        )));
                    }
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&text.unescape()?);
                    }
                }
                Event::CData(data) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push_text(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(PubmedError::Xml(format!("unclosed element <{}>", open.name)));
        }
        root.ok_or_xml("document has no root element")
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Adjacent text runs (e.g. split around an entity) are merged.
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }

    /// Direct child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|c| match c {
            XmlNode::Element(e) => Some(e),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// First descendant (excluding `self`) with the given name, pre-order.
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        for child in self.elements() {
            if child.name == name {
                return Some(child);
            }
            if let Some(found) = child.find(name) {
                return Some(found);
            }
        }
        None
    }

    /// Every descendant (excluding `self`) with the given name, pre-order.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut out = Vec::new();
        self.collect_descendants(name, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlElement>) {
        for child in self.elements() {
            if child.name == name {
                out.push(child);
            }
            child.collect_descendants(name, out);
        }
    }

    /// Text that precedes the first child element.
    ///
    /// Tails of nested elements are not included; use [`collect_text`] for
    /// the full flattened content.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(_) => break,
            }
        }
        out
    }

    /// Serialize this element (and its subtree) back to XML markup.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_xml(out),
                XmlNode::Text(t) => out.push_str(&escape(t.as_str())),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(PubmedError::Xml(format!(
            "second root element <{}>",
            element.name
        ))),
    }
}

/// A text run or a nested node, as yielded by [`TextTree::fragments`].
pub enum Fragment<'a, N> {
    Text(&'a str),
    Node(&'a N),
}

/// A document node whose content can be listed in document order.
pub trait TextTree: Sized {
    fn fragments(&self) -> Vec<Fragment<'_, Self>>;
}

impl TextTree for XmlElement {
    fn fragments(&self) -> Vec<Fragment<'_, Self>> {
        self.children
            .iter()
            .map(|c| match c {
                XmlNode::Element(e) => Fragment::Node(e),
                XmlNode::Text(t) => Fragment::Text(t.as_str()),
            })
            .collect()
    }
}

/// Depth-first list of every text fragment under `node`, in document order.
pub fn flatten_text<N: TextTree>(node: &N) -> Vec<&str> {
    let mut out = Vec::new();
    push_fragments(node, &mut out);
    out
}

fn push_fragments<'a, N: TextTree>(node: &'a N, out: &mut Vec<&'a str>) {
    for fragment in node.fragments() {
        match fragment {
            Fragment::Text(t) => out.push(t),
            Fragment::Node(n) => push_fragments(n, out),
        }
    }
}

/// Concatenated, whitespace-trimmed text content of `node`.
pub fn collect_text<N: TextTree>(node: &N) -> String {
    flatten_text(node).concat().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let root = XmlElement::parse(
            r#"<?xml version="1.0"?>
<!DOCTYPE PubmedArticleSet>
<Set><A id="1"><B>one</B><B>two</B></A><C/></Set>"#,
        )
        .expect("parse");

        assert_eq!(root.name, "Set");
        let a = root.child("A").expect("A");
        assert_eq!(a.attributes, vec![("id".to_string(), "1".to_string())]);
        assert_eq!(a.children_named("B").count(), 2);
        assert!(root.child("C").is_some());
        assert_eq!(root.descendants("B").len(), 2);
        assert_eq!(root.find("B").map(|b| b.text()), Some("one".to_string()));
    }

    #[test]
    fn test_find_excludes_self_and_is_preorder() {
        let root =
            XmlElement::parse("<X><Y><X>inner</X></Y><X>later</X></X>").expect("parse");
        assert_eq!(root.find("X").map(|x| x.text()), Some("inner".to_string()));
    }

    #[test]
    fn test_entities_are_unescaped() {
        let root = XmlElement::parse("<T>Johnson &amp; Johnson &#x2013; NJ</T>").expect("parse");
        assert_eq!(root.text(), "Johnson & Johnson \u{2013} NJ");
    }

    #[test]
    fn test_text_stops_at_first_child() {
        let root = XmlElement::parse("<T>head<i>mid</i>tail</T>").expect("parse");
        assert_eq!(root.text(), "head");
    }

    #[test]
    fn test_collect_text_includes_nested_and_tails() {
        let root = XmlElement::parse(
            "<ArticleTitle>  Role of <i>KRAS</i> in <sub>2</sub>D models <b>x<i>y</i>z</b>  </ArticleTitle>",
        )
        .expect("parse");
        assert_eq!(collect_text(&root), "Role of KRAS in 2D models xyz");
    }

    #[test]
    fn test_mismatched_tags_are_rejected() {
        assert!(XmlElement::parse("<A><B></A>").is_err());
        assert!(XmlElement::parse("<A>").is_err());
        assert!(XmlElement::parse("").is_err());
    }

    #[test]
    fn test_serialization_escapes_text() {
        let root = XmlElement::parse(r#"<Author ValidYN="Y"><LastName>O&apos;Neil &amp; Co</LastName><Empty/></Author>"#)
            .expect("parse");
        assert_eq!(
            root.to_xml_string(),
            r#"<Author ValidYN="Y"><LastName>O&apos;Neil &amp; Co</LastName><Empty /></Author>"#
        );
    }

    /// A tree type unrelated to XML, to check the traversal is generic.
    struct Outline {
        label: &'static str,
        items: Vec<Outline>,
    }

    impl TextTree for Outline {
        fn fragments(&self) -> Vec<Fragment<'_, Self>> {
            let mut out = vec![Fragment::Text(self.label)];
            out.extend(self.items.iter().map(Fragment::Node));
            out
        }
    }

    #[test]
    fn test_flatten_generic_tree() {
        let tree = Outline {
            label: "a",
            items: vec![
                Outline {
                    label: "b",
                    items: vec![Outline {
                        label: "c",
                        items: vec![],
                    }],
                },
                Outline {
                    label: "d",
                    items: vec![],
                },
            ],
        };
        assert_eq!(flatten_text(&tree), vec!["a", "b", "c", "d"]);
    }
}
