//! 可见匹配的选择与导航
//!
//! 下标只在当前可见的匹配中计数。每次选择都重新统计可见数，
//! 因为页面内容可能在两次调用之间变化。

use serde::Serialize;

use super::{FindInPage, SearchState};
use crate::dom::Layout;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    /// 可见匹配数
    pub matches: usize,
    /// 选中的可见下标；没有选中时为 `None`
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Selection {
    /// 没有选中时为 -1
    pub fn index_or_sentinel(&self) -> i64 {
        self.index.map_or(-1, |i| i as i64)
    }
}

#[derive(Debug, Clone)]
pub(super) struct SelectedMatch {
    match_index: usize,
    visible_index: usize,
    context: String,
}

impl<D: Layout> FindInPage<D> {
    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_ref().map(|s| s.visible_index)
    }

    /// 选中第 `index` 个可见匹配并滚动到它
    ///
    /// `index` 为负或超出上次统计的可见数时不做任何事，返回原选择状态。
    /// 重新统计后越界时按方向夹取：向前越界回到第一个，否则落到最后一个。
    pub fn select_visible_match(&mut self, index: i64) -> Selection {
        if index < 0 || index as u64 >= self.visible_count as u64 {
            return self.current_selection();
        }
        let requested = index as usize;

        let previous = self.selected.as_ref().map(|s| s.visible_index);
        self.clear_selection_highlight();
        self.selected = None;

        let count = self.recount_visible();
        // 统计阶段仍在进行时由 count_step 继续累加
        if self.state == SearchState::Ready {
            self.visible_count = count;
        }
        if count == 0 {
            tracing::debug!("no visible matches left, selection cleared");
            return Selection {
                matches: 0,
                index: None,
                context: None,
            };
        }

        let visible_index = if requested < count {
            requested
        } else {
            match previous {
                Some(prev) if requested > prev => 0,
                _ => count - 1,
            }
        };

        let Some(match_index) = self.nth_visible_match(visible_index) else {
            return Selection {
                matches: count,
                index: None,
                context: None,
            };
        };

        let handles = self.matches[match_index].handles.clone();
        for &handle in &handles {
            self.doc.set_selected(handle, true);
        }
        if let Some(&first) = handles.first() {
            self.doc.scroll_into_view(first);
        }

        let context = self.context_string(&handles);
        self.selected = Some(SelectedMatch {
            match_index,
            visible_index,
            context: context.clone(),
        });
        Selection {
            matches: count,
            index: Some(visible_index),
            context: Some(context),
        }
    }

    fn current_selection(&self) -> Selection {
        Selection {
            matches: self.visible_count,
            index: self.selected.as_ref().map(|s| s.visible_index),
            context: self.selected.as_ref().map(|s| s.context.clone()),
        }
    }

    pub(super) fn clear_selection_highlight(&mut self) {
        let Some(selected) = self.selected.as_ref() else {
            return;
        };
        if let Some(m) = self.matches.get(selected.match_index) {
            for &handle in &m.handles {
                self.doc.set_selected(handle, false);
            }
        }
    }

    fn recount_visible(&self) -> usize {
        self.matches
            .iter()
            .filter(|m| m.is_visible(&self.doc))
            .count()
    }

    fn nth_visible_match(&self, n: usize) -> Option<usize> {
        self.matches
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_visible(&self.doc))
            .nth(n)
            .map(|(i, _)| i)
    }

    /// 高亮文本加上前后相邻的文本兄弟节点
    fn context_string(&self, handles: &[D::Node]) -> String {
        let mut out = String::new();
        let (Some(&first), Some(&last)) = (handles.first(), handles.last()) else {
            return out;
        };
        if let Some(text) = self
            .doc
            .previous_sibling(first)
            .and_then(|prev| self.doc.text(prev))
        {
            out.push_str(text);
        }
        for &handle in handles {
            out.push_str(&self.doc.text_content(handle));
        }
        if let Some(text) = self
            .doc
            .next_sibling(last)
            .and_then(|next| self.doc.text(next))
        {
            out.push_str(text);
        }
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/find/selection.rs"]
mod tests;
