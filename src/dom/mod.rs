//! 文档抽象：查找引擎所依赖的宿主能力
//!
//! - Document: 节点树的读取与拼接（插入/移除/创建节点）
//! - Layout: 可见性判断所需的样式与几何信息
//! - ArenaDocument: 基于 slotmap 的内存文档实现

pub mod arena;
pub mod geometry;
pub mod snapshot;

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub use arena::{ArenaDocument, NodeId};
pub use geometry::{Point, Rect, Size};
pub use snapshot::{ElementSnapshot, NodeSnapshot, PageSnapshot};

/// 宿主文档树
///
/// 节点句柄是廉价的 `Copy` 值。节点被移除后句柄可能失效，
/// 所有读取方法对失效句柄返回 `None` / 空集合，而不是 panic。
pub trait Document {
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// 遍历起点（`<body>`）
    fn body(&self) -> Self::Node;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// 文档顺序的子节点
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    fn previous_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    fn next_sibling(&self, node: Self::Node) -> Option<Self::Node>;

    /// 元素标签名；文本节点返回 `None`
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// 文本节点内容；元素返回 `None`
    fn text(&self, node: Self::Node) -> Option<&str>;

    /// 创建游离的文本节点
    fn create_text(&mut self, text: &str) -> Self::Node;

    /// 创建游离的高亮包装元素，内部包含一个文本节点
    fn create_highlight(&mut self, text: &str) -> Self::Node;

    /// 把 `node` 插到 `parent` 下 `reference` 之前；`reference` 不是 `parent` 的子节点时返回 false
    fn insert_before(
        &mut self,
        parent: Self::Node,
        node: Self::Node,
        reference: Self::Node,
    ) -> bool;

    /// 从 `parent` 移除 `node`（节点保持游离，不释放）
    fn remove_child(&mut self, parent: Self::Node, node: Self::Node) -> bool;

    /// 引擎不再持有的游离节点；宿主可以回收
    fn release(&mut self, _node: Self::Node) {}

    /// 切换高亮元素的“当前选中”样式
    fn set_selected(&mut self, node: Self::Node, selected: bool);

    fn scroll_into_view(&mut self, node: Self::Node);

    /// 子树文本（textContent）
    fn text_content(&self, node: Self::Node) -> String {
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(text) = self.text(current) {
                out.push_str(text);
                continue;
            }
            stack.extend(self.children(current).into_iter().rev());
        }
        out
    }
}

/// 计算样式中与可见性相关的部分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputedStyle {
    pub display_none: bool,
    pub visibility_hidden: bool,
    pub opacity: f32,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display_none: false,
            visibility_hidden: false,
            opacity: 1.0,
        }
    }
}

impl ComputedStyle {
    pub fn hides(&self) -> bool {
        self.display_none || self.visibility_hidden || self.opacity <= 0.0
    }
}

/// 可见性判断所需的布局信息
pub trait Layout: Document {
    fn computed_style(&self, node: Self::Node) -> ComputedStyle;

    /// 相对视口的包围盒
    fn bounding_rect(&self, node: Self::Node) -> Rect;

    /// 最近的定位祖先；到达 body 时返回 `None`
    fn offset_parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// 页面当前滚动偏移
    fn scroll_offset(&self) -> Point;

    /// 页面总滚动尺寸（scrollWidth / scrollHeight）
    fn scroll_size(&self) -> Size;
}
