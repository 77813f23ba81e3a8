//! 节点替换记录
//!
//! 一条 Replacement 表示“用这组新节点替换原文本节点”，可正向应用、可撤销。
//! 按顺序应用全部记录、再按逆序撤销，文档结构恢复原样。

use crate::dom::Document;

#[derive(Debug)]
pub struct Replacement<N> {
    old: N,
    new_nodes: Vec<N>,
    applied: bool,
}

impl<N: Copy + Eq + std::fmt::Debug> Replacement<N> {
    pub fn new(old: N, new_nodes: Vec<N>) -> Self {
        Self {
            old,
            new_nodes,
            applied: false,
        }
    }

    pub fn old_node(&self) -> N {
        self.old
    }

    pub fn new_nodes(&self) -> &[N] {
        &self.new_nodes
    }

    pub fn is_applied(&self) -> bool {
        self.applied
    }

    /// 把新节点插到原节点之前，再移除原节点
    ///
    /// 原节点已脱离文档时静默跳过，返回 false。
    pub fn apply<D: Document<Node = N>>(&mut self, doc: &mut D) -> bool {
        if self.applied {
            return true;
        }
        let Some(parent) = doc.parent(self.old) else {
            tracing::warn!(node = ?self.old, "text node detached before highlight, skipping");
            return false;
        };
        for &node in &self.new_nodes {
            doc.insert_before(parent, node, self.old);
        }
        doc.remove_child(parent, self.old);
        self.applied = true;
        true
    }

    /// 还原原节点，移除生成的节点
    pub fn undo<D: Document<Node = N>>(&mut self, doc: &mut D) -> bool {
        if !self.applied {
            return false;
        }
        self.applied = false;

        // 页面可能移除了部分生成节点，以第一个仍在文档中的节点为锚点
        let anchor = self
            .new_nodes
            .iter()
            .find_map(|&node| doc.parent(node).map(|parent| (parent, node)));
        let Some((parent, anchor)) = anchor else {
            tracing::warn!(node = ?self.old, "highlight detached before restore, skipping");
            return false;
        };
        doc.insert_before(parent, self.old, anchor);
        for &node in &self.new_nodes {
            doc.remove_child(parent, node);
        }
        true
    }

    /// 把生成的节点交还宿主
    pub fn release<D: Document<Node = N>>(self, doc: &mut D) {
        for node in self.new_nodes {
            doc.release(node);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/find/replacement.rs"]
mod tests;
