//! Engine-neutral view of a rendered document tree
//!
//! Content extraction walks nodes through [`DocumentNode`] so it does not
//! depend on a particular DOM implementation. [`HtmlNode`] adapts the
//! `scraper` tree produced from the browser's serialized DOM.

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// A node of a parsed document
pub trait DocumentNode: Sized {
    /// Lowercase tag name, for element nodes only
    fn tag_name(&self) -> Option<&str>;

    /// Character data, for text nodes only
    fn text(&self) -> Option<&str>;

    /// The node's parent, if any
    fn parent(&self) -> Option<Self>;

    /// Child nodes in document order
    fn children(&self) -> Vec<Self>;

    /// Concatenated text of every descendant text node
    fn text_content(&self) -> String;

    /// Tag name of the parent node when it is an element
    fn parent_tag(&self) -> Option<String> {
        self.parent()
            .and_then(|p| p.tag_name().map(|t| t.to_ascii_lowercase()))
    }
}

/// A node of a `scraper` document
#[derive(Debug, Clone, Copy)]
pub struct HtmlNode<'a>(NodeRef<'a, Node>);

impl<'a> HtmlNode<'a> {
    /// The document root
    pub fn root(document: &'a Html) -> Self {
        Self(document.tree.root())
    }
}

impl<'a> DocumentNode for HtmlNode<'a> {
    fn tag_name(&self) -> Option<&str> {
        self.0.value().as_element().map(|e| e.name())
    }

    fn text(&self) -> Option<&str> {
        self.0.value().as_text().map(|t| &**t)
    }

    fn parent(&self) -> Option<Self> {
        self.0.parent().map(HtmlNode)
    }

    fn children(&self) -> Vec<Self> {
        self.0.children().map(HtmlNode).collect()
    }

    fn text_content(&self) -> String {
        self.0
            .descendants()
            .filter_map(|n| n.value().as_text().map(|t| t.to_string()))
            .collect()
    }
}
