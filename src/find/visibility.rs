//! 高亮元素可见性判断
//!
//! 从元素向上走到 body：
//! - 任一祖先 display:none / visibility:hidden / opacity 为 0 即不可见
//! - 元素包围盒依次与每个 offsetParent 的包围盒求交，交集为空即不可见
//! - 最终矩形必须落在页面滚动区域内

use crate::dom::{Layout, Point, Rect};

pub fn is_visible<D: Layout>(doc: &D, node: D::Node) -> bool {
    let body = doc.body();
    let scroll = doc.scroll_offset();

    let mut visible = to_page(doc.bounding_rect(node), scroll);
    if visible.is_empty() {
        return false;
    }

    let mut next_offset_parent = doc.offset_parent(node);
    let mut current = Some(node);
    while let Some(element) = current {
        if element == body {
            break;
        }
        if doc.computed_style(element).hides() {
            return false;
        }
        if Some(element) == next_offset_parent {
            let parent_rect = to_page(doc.bounding_rect(element), scroll);
            visible = match visible.intersect(&parent_rect) {
                Some(rect) => rect,
                None => return false,
            };
            next_offset_parent = doc.offset_parent(element);
        }
        current = doc.parent(element);
    }

    // 没走到 body：节点已脱离文档
    if current.is_none() {
        return false;
    }

    let page = Rect::from_size(doc.scroll_size());
    visible.intersect(&page).is_some()
}

fn to_page(rect: Rect, scroll: Point) -> Rect {
    rect.translate(scroll)
}

#[cfg(test)]
#[path = "../../tests/unit/find/visibility.rs"]
mod tests;
