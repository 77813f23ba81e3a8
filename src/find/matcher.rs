//! 匹配发现
//!
//! 每一步只找一个匹配：
//! 1. 二分找到匹配起点所在的 Section（游标只前进，不回看已处理的 Section）
//! 2. 扫描已越过的 Section 立即生成 Replacement，释放其 PartialMatch
//! 3. 把匹配拆成每个 Section 一段 PartialMatch
//!
//! 正则再也找不到匹配后，每步冲刷一个剩余 Section。

use regex::{Regex, RegexBuilder};

use super::{FindInPage, Match, Replacement};
use crate::dom::Layout;

/// 匹配落在某个 Section 内的部分（缓冲区坐标）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PartialMatch {
    pub match_id: usize,
    pub section: usize,
    pub begin: usize,
    pub end: usize,
}

/// 字面量、大小写不敏感
pub fn build_regex(phrase: &str) -> Option<Regex> {
    match RegexBuilder::new(&regex::escape(phrase))
        .case_insensitive(true)
        .build()
    {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::warn!(error = %e, "failed to build find regex");
            None
        }
    }
}

impl<D: Layout> FindInPage<D> {
    pub(super) fn match_step(&mut self) -> bool {
        if self.cursor.exhausted {
            return self.flush_front_section();
        }

        let found = self.regex.as_ref().and_then(|regex| {
            regex
                .find_at(self.buffer.text(), self.cursor.regex_pos)
                .map(|m| (m.start(), m.end()))
        });
        let Some((start, end)) = found else {
            self.cursor.exhausted = true;
            self.cursor.section = self.buffer.sections().len();
            return !self.pending.is_empty();
        };

        self.cursor.regex_pos = if end > start {
            end
        } else {
            next_char_boundary(self.buffer.text(), start)
        };
        if end <= start {
            return true;
        }

        let first = self
            .buffer
            .first_section_ending_after(start, self.cursor.section);
        while self.pending.front().is_some_and(|p| p.section < first) {
            self.flush_front_section();
        }
        self.cursor.section = first;

        let match_id = self.matches.len();
        self.matches.push(Match::new(match_id, start, end));

        let sections = self.buffer.sections();
        let mut index = first;
        while let Some(section) = sections.get(index) {
            if section.begin >= end {
                break;
            }
            let begin = start.max(section.begin);
            let part_end = end.min(section.end);
            if begin < part_end {
                self.pending.push_back(PartialMatch {
                    match_id,
                    section: index,
                    begin,
                    end: part_end,
                });
            }
            index += 1;
        }
        true
    }

    /// 冲刷队首 Section 的全部 PartialMatch；返回是否还有待冲刷的
    fn flush_front_section(&mut self) -> bool {
        let Some(section_index) = self.pending.front().map(|p| p.section) else {
            return false;
        };
        let mut parts = Vec::new();
        while let Some(part) = self.pending.front().copied() {
            if part.section != section_index {
                break;
            }
            self.pending.pop_front();
            parts.push(part);
        }
        self.flush_section(section_index, &parts);
        !self.pending.is_empty()
    }

    /// 把一个 Section 切成普通文本段与高亮段，记录为 Replacement
    fn flush_section(&mut self, section_index: usize, parts: &[PartialMatch]) {
        let Some(section) = self.buffer.section(section_index).copied() else {
            return;
        };
        let Some(original) = self.doc.text(section.node).map(str::to_owned) else {
            tracing::warn!(node = ?section.node, "text node vanished before highlight");
            return;
        };

        // 扫描之后页面可能改写了节点文本
        let local: Vec<(usize, usize)> = parts
            .iter()
            .map(|p| (p.begin - section.begin, p.end - section.begin))
            .collect();
        let consistent = original.len() == section.len()
            && local
                .iter()
                .all(|&(b, e)| original.is_char_boundary(b) && original.is_char_boundary(e));
        if !consistent {
            tracing::warn!(node = ?section.node, "text node changed since scan, skipping");
            return;
        }

        let mut new_nodes = Vec::with_capacity(local.len() * 2 + 1);
        let mut offset = 0;
        for (part, &(begin, end)) in parts.iter().zip(&local) {
            if begin > offset {
                new_nodes.push(self.doc.create_text(&original[offset..begin]));
            }
            let handle = self.doc.create_highlight(&original[begin..end]);
            new_nodes.push(handle);
            if let Some(m) = self.matches.get_mut(part.match_id) {
                m.handles.push(handle);
            }
            offset = end;
        }
        if offset < original.len() {
            new_nodes.push(self.doc.create_text(&original[offset..]));
        }

        tracing::trace!(section = section_index, parts = parts.len(), "section flushed");
        self.replacements
            .push(Replacement::new(section.node, new_nodes));
    }
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut next = pos + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}

#[cfg(test)]
#[path = "../../tests/unit/find/matcher.rs"]
mod tests;
