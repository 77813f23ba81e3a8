use super::*;

fn sample() -> (ArenaDocument, NodeId, NodeId, NodeId) {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    let p = doc.append_element(body, "P");
    let a = doc.append_text(p, "Hello ");
    let b = doc.append_text(p, "World");
    (doc, p, a, b)
}

#[test]
fn test_append_and_serialize() {
    let (doc, _, _, _) = sample();
    assert_eq!(
        doc.serialize(doc.body()),
        r#"<body><p>"Hello ""World"</p></body>"#
    );
}

#[test]
fn test_siblings() {
    let (doc, p, a, b) = sample();
    assert_eq!(doc.next_sibling(a), Some(b));
    assert_eq!(doc.previous_sibling(b), Some(a));
    assert_eq!(doc.previous_sibling(a), None);
    assert_eq!(doc.parent(a), Some(p));
}

#[test]
fn test_insert_before_and_remove() {
    let (mut doc, p, a, b) = sample();
    let x = doc.create_text("x");
    assert!(doc.insert_before(p, x, b));
    assert_eq!(doc.children(p), vec![a, x, b]);

    assert!(doc.remove_child(p, a));
    assert_eq!(doc.children(p), vec![x, b]);
    assert_eq!(doc.parent(a), None);
    assert!(!doc.remove_child(p, a));
}

#[test]
fn test_insert_before_rejects_foreign_reference() {
    let (mut doc, p, _, _) = sample();
    let stray = doc.create_text("stray");
    let x = doc.create_text("x");
    assert!(!doc.insert_before(p, x, stray));
    assert_eq!(doc.parent(x), None);
}

#[test]
fn test_highlight_wrapper() {
    let mut doc = ArenaDocument::new();
    let h = doc.create_highlight("abc");
    assert!(doc.is_highlight(h));
    assert_eq!(doc.tag_name(h), Some(HIGHLIGHT_TAG));
    assert_eq!(doc.text_content(h), "abc");

    assert!(!doc.is_selected(h));
    doc.set_selected(h, true);
    assert!(doc.is_selected(h));
}

#[test]
fn test_release_only_frees_detached_nodes() {
    let (mut doc, _, a, _) = sample();
    let before = doc.node_count();
    doc.release(a);
    assert!(doc.contains(a));

    let h = doc.create_highlight("x");
    assert_eq!(doc.node_count(), before + 2);
    doc.release(h);
    assert!(!doc.contains(h));
    assert_eq!(doc.node_count(), before);
}

#[test]
fn test_bounding_rect_inherits_from_ancestor() {
    let (mut doc, p, a, _) = sample();
    doc.set_rect(p, Rect::new(10.0, 20.0, 100.0, 30.0));
    assert_eq!(doc.bounding_rect(a), Rect::new(10.0, 20.0, 100.0, 30.0));

    doc.set_scroll(Point::new(0.0, 15.0));
    assert_eq!(doc.bounding_rect(a), Rect::new(10.0, 5.0, 100.0, 30.0));
}

#[test]
fn test_offset_parent() {
    let (mut doc, p, a, _) = sample();
    assert_eq!(doc.offset_parent(a), None);
    doc.set_positioned(p, true);
    assert_eq!(doc.offset_parent(a), Some(p));
}

#[test]
fn test_highlights_in_document_order() {
    let (mut doc, p, a, b) = sample();
    let h1 = doc.create_highlight("Hello");
    let h2 = doc.create_highlight("World");
    doc.insert_before(p, h1, a);
    doc.insert_before(p, h2, b);
    assert_eq!(doc.highlights(), vec![h1, h2]);
}

#[test]
fn test_set_text_and_detach() {
    let (mut doc, p, a, _) = sample();
    doc.set_text(a, "Bye ");
    assert_eq!(doc.text(a), Some("Bye "));
    assert!(doc.detach(a));
    assert_eq!(doc.text_content(p), "World");
    assert!(!doc.detach(a));
}
