//! 线性化文本缓冲
//!
//! 把散落在各文本节点里的内容按文档顺序拼接成一个字符串，
//! 每个节点对应缓冲区中的一个 `[begin, end)` 区间（Section）。

/// 缓冲区区间到源文本节点的映射
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<N> {
    pub begin: usize,
    pub end: usize,
    pub node: N,
}

impl<N> Section<N> {
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

#[derive(Debug)]
pub struct TextBuffer<N> {
    text: String,
    sections: Vec<Section<N>>,
}

impl<N> Default for TextBuffer<N> {
    fn default() -> Self {
        Self {
            text: String::new(),
            sections: Vec::new(),
        }
    }
}

impl<N: Copy> TextBuffer<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个文本节点的内容并记录 Section
    pub fn push(&mut self, node: N, text: &str) {
        let begin = self.text.len();
        fold_case_into(text, &mut self.text);
        self.sections.push(Section {
            begin,
            end: self.text.len(),
            node,
        });
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sections(&self) -> &[Section<N>] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section<N>> {
        self.sections.get(index)
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 从 `from` 开始，第一个 `end > pos` 的 Section 下标
    ///
    /// 匹配位置单调前进，所以调用方只需要从上一次的结果继续找。
    /// 没有时返回 `sections.len()`。
    pub fn first_section_ending_after(&self, pos: usize, from: usize) -> usize {
        let from = from.min(self.sections.len());
        from + self.sections[from..].partition_point(|s| s.end <= pos)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.sections.clear();
    }
}

/// 逐字符转小写，但只替换 UTF-8 宽度不变的字符
///
/// 缓冲区偏移因此与节点内偏移一一对应。
fn fold_case_into(text: &str, out: &mut String) {
    out.reserve(text.len());
    for ch in text.chars() {
        let mut lower = ch.to_lowercase();
        match (lower.next(), lower.next()) {
            (Some(l), None) if l.len_utf8() == ch.len_utf8() => out.push(l),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/find/buffer.rs"]
mod tests;
