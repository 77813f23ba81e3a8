//! 内存文档模型
//!
//! 节点存放在 slotmap 中，`NodeId` 是带代数的键：
//! 节点被回收后旧句柄不会指向新节点。

use compact_str::CompactString;
use slotmap::{new_key_type, SlotMap};

use super::geometry::{Point, Rect, Size};
use super::{ComputedStyle, Document, Layout};

new_key_type! { pub struct NodeId; }

/// 高亮包装元素的标签名
pub const HIGHLIGHT_TAG: &str = "zfind-mark";

const DEFAULT_PAGE_WIDTH: f64 = 1024.0;
const DEFAULT_PAGE_HEIGHT: f64 = 768.0;

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: CompactString,
        /// 高亮包装元素为 `Some(selected)`
        highlight: Option<bool>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    style: ComputedStyle,
    /// 页面坐标
    rect: Option<Rect>,
    positioned: bool,
}

impl Node {
    fn element(tag: &str, highlight: Option<bool>) -> Self {
        Self {
            data: NodeData::Element {
                tag: CompactString::from(tag.to_ascii_lowercase()),
                highlight,
            },
            parent: None,
            children: Vec::new(),
            style: ComputedStyle::default(),
            rect: None,
            positioned: false,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            data: NodeData::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
            style: ComputedStyle::default(),
            rect: None,
            positioned: false,
        }
    }
}

pub struct ArenaDocument {
    arena: SlotMap<NodeId, Node>,
    body: NodeId,
    page_size: Size,
    scroll: Point,
    scrolled_to: Option<NodeId>,
}

impl Default for ArenaDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaDocument {
    pub fn new() -> Self {
        Self::with_page_size(Size::new(DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT))
    }

    pub fn with_page_size(page_size: Size) -> Self {
        let mut arena = SlotMap::with_key();
        let body = arena.insert(Node::element("body", None));
        Self {
            arena,
            body,
            page_size,
            scroll: Point::default(),
            scrolled_to: None,
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    pub fn set_scroll(&mut self, scroll: Point) {
        self.scroll = scroll;
    }

    /// 追加元素；`parent` 无效时节点保持游离
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.arena.insert(Node::element(tag, None));
        self.attach_last(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.arena.insert(Node::text(text));
        self.attach_last(parent, id);
        id
    }

    fn attach_last(&mut self, parent: NodeId, id: NodeId) {
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.push(id);
            if let Some(node) = self.arena.get_mut(id) {
                node.parent = Some(parent);
            }
        }
    }

    pub fn set_style(&mut self, node: NodeId, style: ComputedStyle) {
        if let Some(n) = self.arena.get_mut(node) {
            n.style = style;
        }
    }

    /// 以页面坐标设置元素布局盒
    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(n) = self.arena.get_mut(node) {
            n.rect = Some(rect);
        }
    }

    pub fn set_positioned(&mut self, node: NodeId, positioned: bool) {
        if let Some(n) = self.arena.get_mut(node) {
            n.positioned = positioned;
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(Node {
            data: NodeData::Text(content),
            ..
        }) = self.arena.get_mut(node)
        {
            content.clear();
            content.push_str(text);
        }
    }

    /// 把节点从父节点摘下（模拟页面脚本移除节点）
    pub fn detach(&mut self, node: NodeId) -> bool {
        match self.arena.get(node).and_then(|n| n.parent) {
            Some(parent) => self.remove_child(parent, node),
            None => false,
        }
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.arena.contains_key(node)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn is_highlight(&self, node: NodeId) -> bool {
        matches!(
            self.arena.get(node).map(|n| &n.data),
            Some(NodeData::Element {
                highlight: Some(_),
                ..
            })
        )
    }

    pub fn is_selected(&self, node: NodeId) -> bool {
        matches!(
            self.arena.get(node).map(|n| &n.data),
            Some(NodeData::Element {
                highlight: Some(true),
                ..
            })
        )
    }

    pub fn last_scrolled(&self) -> Option<NodeId> {
        self.scrolled_to
    }

    /// body 下所有挂载中的高亮元素（文档顺序）
    pub fn highlights(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.body];
        while let Some(id) = stack.pop() {
            if self.is_highlight(id) {
                out.push(id);
            }
            if let Some(node) = self.arena.get(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// 子树的类 HTML 序列化，用于比较结构
    pub fn serialize(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_into(node, &mut out);
        out
    }

    fn serialize_into(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Text(text) => {
                out.push('"');
                out.push_str(text);
                out.push('"');
            }
            NodeData::Element { tag, .. } => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                for &child in &node.children {
                    self.serialize_into(child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn free_subtree(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.arena.remove(id) {
                stack.extend(node.children);
            }
        }
    }
}

impl Document for ArenaDocument {
    type Node = NodeId;

    fn body(&self) -> NodeId {
        self.body
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.arena.get(self.parent(node)?)?;
        let pos = parent.children.iter().position(|&c| c == node)?;
        pos.checked_sub(1).map(|i| parent.children[i])
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.arena.get(self.parent(node)?)?;
        let pos = parent.children.iter().position(|&c| c == node)?;
        parent.children.get(pos + 1).copied()
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.arena.get(node)?.data {
            NodeData::Element { tag, .. } => Some(tag.as_str()),
            NodeData::Text(_) => None,
        }
    }

    fn text(&self, node: NodeId) -> Option<&str> {
        match &self.arena.get(node)?.data {
            NodeData::Text(text) => Some(text.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.insert(Node::text(text))
    }

    fn create_highlight(&mut self, text: &str) -> NodeId {
        let wrapper = self.arena.insert(Node::element(HIGHLIGHT_TAG, Some(false)));
        let inner = self.arena.insert(Node::text(text));
        self.attach_last(wrapper, inner);
        wrapper
    }

    fn insert_before(&mut self, parent: NodeId, node: NodeId, reference: NodeId) -> bool {
        if node == parent || node == reference || !self.arena.contains_key(node) {
            return false;
        }
        let Some(pos) = self
            .arena
            .get(parent)
            .and_then(|p| p.children.iter().position(|&c| c == reference))
        else {
            return false;
        };

        if let Some(old_parent) = self.parent(node) {
            self.remove_child(old_parent, node);
        }
        // 移除后位置可能前移（同一父节点内移动）
        let pos = self
            .arena
            .get(parent)
            .and_then(|p| p.children.iter().position(|&c| c == reference))
            .unwrap_or(pos);

        if let Some(p) = self.arena.get_mut(parent) {
            p.children.insert(pos, node);
        }
        if let Some(n) = self.arena.get_mut(node) {
            n.parent = Some(parent);
        }
        true
    }

    fn remove_child(&mut self, parent: NodeId, node: NodeId) -> bool {
        if self.parent(node) != Some(parent) {
            return false;
        }
        if let Some(p) = self.arena.get_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = self.arena.get_mut(node) {
            n.parent = None;
        }
        true
    }

    fn release(&mut self, node: NodeId) {
        if node == self.body || self.parent(node).is_some() {
            return;
        }
        if self.scrolled_to == Some(node) {
            self.scrolled_to = None;
        }
        self.free_subtree(node);
    }

    fn set_selected(&mut self, node: NodeId, selected: bool) {
        if let Some(Node {
            data: NodeData::Element {
                highlight: Some(state),
                ..
            },
            ..
        }) = self.arena.get_mut(node)
        {
            *state = selected;
        }
    }

    fn scroll_into_view(&mut self, node: NodeId) {
        if self.arena.contains_key(node) {
            self.scrolled_to = Some(node);
        }
    }
}

impl Layout for ArenaDocument {
    fn computed_style(&self, node: NodeId) -> ComputedStyle {
        self.arena
            .get(node)
            .map(|n| n.style)
            .unwrap_or_default()
    }

    /// 没有显式布局盒的节点沿用最近祖先的布局盒，都没有时占满整页
    fn bounding_rect(&self, node: NodeId) -> Rect {
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(n) = self.arena.get(id) else {
                break;
            };
            if let Some(rect) = n.rect {
                return rect.translate(Point::new(-self.scroll.x, -self.scroll.y));
            }
            current = n.parent;
        }
        Rect::from_size(self.page_size).translate(Point::new(-self.scroll.x, -self.scroll.y))
    }

    fn offset_parent(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == self.body {
                return None;
            }
            let n = self.arena.get(id)?;
            if n.positioned {
                return Some(id);
            }
            current = n.parent;
        }
        None
    }

    fn scroll_offset(&self) -> Point {
        self.scroll
    }

    fn scroll_size(&self) -> Size {
        self.page_size
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dom/arena.rs"]
mod tests;
