//! 页面快照（JSON）
//!
//! 文本节点写成字符串，元素写成对象：
//!
//! ```json
//! { "width": 800, "height": 600,
//!   "body": { "tag": "body", "children": ["Hello ", { "tag": "b", "children": ["World"] }] } }
//! ```

use serde::{Deserialize, Serialize};

use super::arena::{ArenaDocument, NodeId};
use super::geometry::{Point, Rect, Size};
use super::{ComputedStyle, Document};
use crate::error::{FindError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
    pub body: ElementSnapshot,
}

fn default_width() -> f64 {
    1024.0
}

fn default_height() -> f64 {
    768.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSnapshot {
    Text(String),
    Element(ElementSnapshot),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSnapshot {
    pub tag: String,
    #[serde(default)]
    pub children: Vec<NodeSnapshot>,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default)]
    pub positioned: bool,
}

impl PageSnapshot {
    pub fn from_json(data: &str) -> Result<Self> {
        let snapshot: PageSnapshot = serde_json::from_str(data)?;
        if !snapshot.body.tag.eq_ignore_ascii_case("body") {
            return Err(FindError::InvalidDocument(format!(
                "root element must be <body>, found <{}>",
                snapshot.body.tag
            )));
        }
        if !(snapshot.width > 0.0 && snapshot.height > 0.0) {
            return Err(FindError::InvalidDocument(format!(
                "page size must be positive, got {}x{}",
                snapshot.width, snapshot.height
            )));
        }
        Ok(snapshot)
    }
}

impl ArenaDocument {
    pub fn from_snapshot(snapshot: &PageSnapshot) -> Self {
        let mut doc = ArenaDocument::with_page_size(Size::new(snapshot.width, snapshot.height));
        doc.set_scroll(Point::new(snapshot.scroll_x, snapshot.scroll_y));

        let body = doc.body();
        doc.apply_element_attrs(body, &snapshot.body);

        // 显式栈，避免深层文档递归过深
        let mut stack: Vec<(NodeId, &NodeSnapshot)> = snapshot
            .body
            .children
            .iter()
            .rev()
            .map(|child| (body, child))
            .collect();
        while let Some((parent, node)) = stack.pop() {
            match node {
                NodeSnapshot::Text(text) => {
                    doc.append_text(parent, text);
                }
                NodeSnapshot::Element(element) => {
                    let id = doc.append_element(parent, &element.tag);
                    doc.apply_element_attrs(id, element);
                    stack.extend(element.children.iter().rev().map(|child| (id, child)));
                }
            }
        }
        doc
    }

    fn apply_element_attrs(&mut self, id: NodeId, element: &ElementSnapshot) {
        self.set_style(id, element.style);
        if let Some(rect) = element.rect {
            self.set_rect(id, rect);
        }
        self.set_positioned(id, element.positioned);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/snapshot.rs"]
mod tests;
