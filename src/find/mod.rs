//! 页内查找引擎
//!
//! 在整篇文档中查找短语并高亮，分时间片执行，任何阶段都可以中断后继续：
//! - Scanning: 显式栈深度优先遍历，构建 TextBuffer
//! - Matching: 正则逐个找匹配，拆成 PartialMatch，按 Section 生成 Replacement
//! - Applying: 把 Replacement 应用到文档
//! - Counting: 统计可见匹配
//!
//! 中断时返回 `FindOutcome::Timeout`，调用方之后调用 `pump_search` 继续。

mod buffer;
mod deadline;
mod matcher;
mod replacement;
mod selection;
mod visibility;

use std::collections::VecDeque;
use std::time::Duration;

use regex::Regex;
use rustc_hash::FxHashSet;

use crate::config::FindConfig;
use crate::dom::Layout;

pub use buffer::{Section, TextBuffer};
pub use deadline::Deadline;
pub use matcher::build_regex;
pub use replacement::Replacement;
pub use selection::Selection;
pub use visibility::is_visible;

use matcher::PartialMatch;
use selection::SelectedMatch;

/// 查找结果：完成时为可见匹配数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindOutcome {
    Timeout,
    Complete(usize),
}

impl FindOutcome {
    /// 超时哨兵值
    pub const TIMEOUT_SENTINEL: i64 = -1;

    pub fn is_timeout(self) -> bool {
        matches!(self, FindOutcome::Timeout)
    }

    pub fn count(self) -> Option<usize> {
        match self {
            FindOutcome::Timeout => None,
            FindOutcome::Complete(n) => Some(n),
        }
    }

    pub fn as_sentinel(self) -> i64 {
        match self {
            FindOutcome::Timeout => Self::TIMEOUT_SENTINEL,
            FindOutcome::Complete(n) => n as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Scanning,
    Matching,
    Applying,
    Counting,
    Ready,
}

/// 一次匹配；跨多个文本节点时拥有多个高亮句柄
#[derive(Debug, Clone)]
pub struct Match<N> {
    pub id: usize,
    pub begin: usize,
    pub end: usize,
    handles: Vec<N>,
}

impl<N: Copy> Match<N> {
    fn new(id: usize, begin: usize, end: usize) -> Self {
        Self {
            id,
            begin,
            end,
            handles: Vec::new(),
        }
    }

    pub fn handles(&self) -> &[N] {
        &self.handles
    }

    /// 所有句柄都可见才算可见
    pub fn is_visible<D: Layout<Node = N>>(&self, doc: &D) -> bool {
        !self.handles.is_empty() && self.handles.iter().all(|&h| is_visible(doc, h))
    }
}

/// 恢复执行所需的全部游标
#[derive(Debug, Default)]
struct Cursor {
    /// 下一次正则查找的起点
    regex_pos: usize,
    /// 第一个可能还会收到 PartialMatch 的 Section
    section: usize,
    /// 正则已找不到新匹配
    exhausted: bool,
    /// 已应用的 Replacement 数
    applied: usize,
    /// 已统计可见性的匹配数
    counted: usize,
}

pub struct FindInPage<D: Layout> {
    doc: D,
    ignore_tags: FxHashSet<String>,
    visible_match_cap: usize,
    state: SearchState,
    generation: u64,
    regex: Option<Regex>,
    stack: Vec<D::Node>,
    buffer: TextBuffer<D::Node>,
    matches: Vec<Match<D::Node>>,
    pending: VecDeque<PartialMatch>,
    replacements: Vec<Replacement<D::Node>>,
    cursor: Cursor,
    visible_count: usize,
    selected: Option<SelectedMatch>,
}

impl<D: Layout> FindInPage<D> {
    pub fn new(doc: D) -> Self {
        Self::with_config(doc, &FindConfig::default())
    }

    pub fn with_config(doc: D, config: &FindConfig) -> Self {
        Self {
            doc,
            ignore_tags: config.ignore_set(),
            visible_match_cap: config.visible_match_cap,
            state: SearchState::Idle,
            generation: 0,
            regex: None,
            stack: Vec::new(),
            buffer: TextBuffer::new(),
            matches: Vec::new(),
            pending: VecDeque::new(),
            replacements: Vec::new(),
            cursor: Cursor::default(),
            visible_count: 0,
            selected: None,
        }
    }

    pub fn document(&self) -> &D {
        &self.doc
    }

    /// 查找进行中修改文档是允许的，引擎会容忍节点消失
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    /// 撤销高亮后交还文档
    pub fn into_document(mut self) -> D {
        self.stop();
        self.doc
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// 每次 `find_string` / `stop` 都会递增
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn matches(&self) -> &[Match<D::Node>] {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// 最近一次统计的可见匹配数（不受上限截断）
    pub fn visible_match_count(&self) -> usize {
        self.visible_count
    }

    pub fn buffer(&self) -> &TextBuffer<D::Node> {
        &self.buffer
    }

    pub fn replacements(&self) -> &[Replacement<D::Node>] {
        &self.replacements
    }

    /// 匹配的高亮文本（各句柄文本拼接）
    pub fn highlighted_text(&self, match_index: usize) -> Option<String> {
        let m = self.matches.get(match_index)?;
        Some(
            m.handles
                .iter()
                .map(|&h| self.doc.text_content(h))
                .collect(),
        )
    }

    /// 开始新的查找；旧查找的高亮会先被完全撤销
    pub fn find_string(&mut self, phrase: &str, budget: Duration) -> FindOutcome {
        self.stop();
        self.generation += 1;

        if phrase.is_empty() {
            return FindOutcome::Complete(0);
        }
        let Some(regex) = build_regex(phrase) else {
            return FindOutcome::Complete(0);
        };

        tracing::debug!(phrase_len = phrase.len(), generation = self.generation, "find started");
        self.regex = Some(regex);
        self.stack.push(self.doc.body());
        self.state = SearchState::Scanning;
        self.pump_search(budget)
    }

    /// 从上次中断处继续
    pub fn pump_search(&mut self, budget: Duration) -> FindOutcome {
        let deadline = Deadline::after(budget);
        loop {
            match self.state {
                SearchState::Idle => return FindOutcome::Complete(0),
                SearchState::Ready => return FindOutcome::Complete(self.reported_visible_count()),
                SearchState::Scanning => {
                    if !self.scan_step() {
                        self.enter(SearchState::Matching);
                    }
                }
                SearchState::Matching => {
                    if !self.match_step() {
                        self.enter(SearchState::Applying);
                    }
                }
                SearchState::Applying => {
                    if !self.apply_step() {
                        self.enter(SearchState::Counting);
                    }
                }
                SearchState::Counting => {
                    if !self.count_step() {
                        self.enter(SearchState::Ready);
                    }
                }
            }

            if self.state != SearchState::Ready && deadline.expired() {
                tracing::trace!(state = ?self.state, "time slice exhausted");
                return FindOutcome::Timeout;
            }
        }
    }

    /// 撤销所有高亮并回到 Idle；没有进行中的查找时什么也不做
    pub fn stop(&mut self) {
        if self.state == SearchState::Idle && self.replacements.is_empty() {
            return;
        }
        self.clear_selection_highlight();
        self.undo_replacements();
        self.reset();
        self.generation += 1;
        tracing::debug!(generation = self.generation, "find stopped");
    }

    fn enter(&mut self, state: SearchState) {
        match state {
            SearchState::Matching => tracing::debug!(
                buffer_len = self.buffer.len(),
                sections = self.buffer.sections().len(),
                "scan complete"
            ),
            SearchState::Applying => tracing::debug!(
                matches = self.matches.len(),
                replacements = self.replacements.len(),
                "matching complete"
            ),
            SearchState::Ready => tracing::info!(
                matches = self.matches.len(),
                visible = self.visible_count,
                "find complete"
            ),
            _ => {}
        }
        self.state = state;
    }

    fn reported_visible_count(&self) -> usize {
        self.visible_count.min(self.visible_match_cap)
    }

    /// 弹出一个节点：文本节点进入缓冲区，元素把子节点逆序压栈
    fn scan_step(&mut self) -> bool {
        let Some(node) = self.stack.pop() else {
            return false;
        };
        if let Some(text) = self.doc.text(node) {
            self.buffer.push(node, text);
        } else if let Some(tag) = self.doc.tag_name(node) {
            if !self.is_ignored(tag) {
                self.stack
                    .extend(self.doc.children(node).into_iter().rev());
            }
        }
        !self.stack.is_empty()
    }

    fn is_ignored(&self, tag: &str) -> bool {
        if self.ignore_tags.contains(tag) {
            return true;
        }
        tag.bytes().any(|b| b.is_ascii_uppercase())
            && self.ignore_tags.contains(tag.to_ascii_lowercase().as_str())
    }

    fn apply_step(&mut self) -> bool {
        let Some(replacement) = self.replacements.get_mut(self.cursor.applied) else {
            return false;
        };
        replacement.apply(&mut self.doc);
        self.cursor.applied += 1;
        self.cursor.applied < self.replacements.len()
    }

    fn count_step(&mut self) -> bool {
        let Some(m) = self.matches.get(self.cursor.counted) else {
            return false;
        };
        if m.is_visible(&self.doc) {
            self.visible_count += 1;
        }
        self.cursor.counted += 1;
        self.cursor.counted < self.matches.len()
    }

    fn undo_replacements(&mut self) {
        for replacement in self.replacements.iter_mut().rev() {
            replacement.undo(&mut self.doc);
        }
        for replacement in self.replacements.drain(..) {
            replacement.release(&mut self.doc);
        }
    }

    fn reset(&mut self) {
        self.state = SearchState::Idle;
        self.regex = None;
        self.stack.clear();
        self.buffer.clear();
        self.matches.clear();
        self.pending.clear();
        self.replacements.clear();
        self.cursor = Cursor::default();
        self.visible_count = 0;
        self.selected = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/find/engine.rs"]
mod tests;
