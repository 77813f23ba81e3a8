use super::*;
use crate::dom::{ArenaDocument, ComputedStyle, Document, NodeId};

const LONG: Duration = Duration::from_secs(60);

fn hello_page() -> (ArenaDocument, [NodeId; 3]) {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    let p = doc.append_element(body, "p");
    let a = doc.append_text(p, "Hello ");
    let b = doc.append_text(p, "World");
    let c = doc.append_text(p, ", hello again");
    (doc, [a, b, c])
}

fn drive(engine: &mut FindInPage<ArenaDocument>, first: FindOutcome) -> (usize, usize) {
    let mut outcome = first;
    let mut pumps = 0;
    while outcome.is_timeout() {
        outcome = engine.pump_search(Duration::ZERO);
        pumps += 1;
        assert!(pumps < 10_000, "search never completed");
    }
    (outcome.count().unwrap(), pumps)
}

#[test]
fn test_find_one_shot() {
    let (doc, _) = hello_page();
    let mut engine = FindInPage::new(doc);
    assert_eq!(engine.find_string("hello", LONG), FindOutcome::Complete(2));
    assert_eq!(engine.state(), SearchState::Ready);
    assert_eq!(engine.match_count(), 2);
    assert_eq!(engine.buffer().text(), "hello world, hello again");
    assert_eq!(engine.matches()[0].begin, 0);
    assert_eq!(engine.matches()[1].begin, 13);
}

#[test]
fn test_zero_budget_walks_every_phase() {
    let (doc, _) = hello_page();
    let mut engine = FindInPage::new(doc);
    let first = engine.find_string("hello", Duration::ZERO);
    assert_eq!(first, FindOutcome::Timeout);
    assert_eq!(engine.state(), SearchState::Scanning);

    let mut seen = vec![engine.state()];
    let mut outcome = first;
    while outcome.is_timeout() {
        outcome = engine.pump_search(Duration::ZERO);
        if seen.last() != Some(&engine.state()) {
            seen.push(engine.state());
        }
    }
    assert_eq!(outcome, FindOutcome::Complete(2));
    assert_eq!(
        seen,
        vec![
            SearchState::Scanning,
            SearchState::Matching,
            SearchState::Applying,
            SearchState::Counting,
            SearchState::Ready,
        ]
    );
}

#[test]
fn test_pump_when_idle_or_ready() {
    let (doc, _) = hello_page();
    let mut engine = FindInPage::new(doc);
    assert_eq!(engine.pump_search(LONG), FindOutcome::Complete(0));
    engine.find_string("world", LONG);
    assert_eq!(engine.pump_search(LONG), FindOutcome::Complete(1));
    assert_eq!(engine.pump_search(Duration::ZERO), FindOutcome::Complete(1));
}

#[test]
fn test_empty_phrase_is_noop() {
    let (doc, _) = hello_page();
    let mut engine = FindInPage::new(doc);
    assert_eq!(engine.find_string("", LONG), FindOutcome::Complete(0));
    assert_eq!(engine.state(), SearchState::Idle);
    assert!(engine.document().highlights().is_empty());
}

#[test]
fn test_regex_metacharacters_are_literal() {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    doc.append_text(body, "a.c abc (x+y) a.c");
    let mut engine = FindInPage::new(doc);
    assert_eq!(engine.find_string("a.c", LONG), FindOutcome::Complete(2));
    assert_eq!(engine.find_string("(x+y)", LONG), FindOutcome::Complete(1));
}

#[test]
fn test_ignored_tags_are_skipped() {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    doc.append_text(body, "needle ");
    let script = doc.append_element(body, "SCRIPT");
    doc.append_text(script, "needle");
    let style = doc.append_element(body, "style");
    doc.append_text(style, "needle");
    let mut engine = FindInPage::new(doc);
    assert_eq!(engine.find_string("needle", LONG), FindOutcome::Complete(1));
    assert_eq!(engine.buffer().sections().len(), 1);
}

#[test]
fn test_custom_ignore_tags() {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    let aside = doc.append_element(body, "aside");
    doc.append_text(aside, "needle");
    let config = FindConfig {
        ignore_tags: vec!["Aside".to_string()],
        ..FindConfig::default()
    };
    let mut engine = FindInPage::with_config(doc, &config);
    assert_eq!(engine.find_string("needle", LONG), FindOutcome::Complete(0));
}

#[test]
fn test_visible_count_saturates_at_cap() {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    doc.append_text(body, &"ab ".repeat(7));
    let config = FindConfig {
        visible_match_cap: 5,
        ..FindConfig::default()
    };
    let mut engine = FindInPage::with_config(doc, &config);
    assert_eq!(engine.find_string("ab", LONG), FindOutcome::Complete(5));
    assert_eq!(engine.visible_match_count(), 7);
    assert_eq!(engine.match_count(), 7);
}

#[test]
fn test_hidden_matches_are_not_counted() {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    doc.append_text(body, "cat ");
    let hidden = doc.append_element(body, "div");
    doc.set_style(
        hidden,
        ComputedStyle {
            display_none: true,
            ..ComputedStyle::default()
        },
    );
    doc.append_text(hidden, "cat");
    let mut engine = FindInPage::new(doc);
    assert_eq!(engine.find_string("cat", LONG), FindOutcome::Complete(1));
    assert_eq!(engine.match_count(), 2);
}

#[test]
fn test_stop_restores_document() {
    let (doc, nodes) = hello_page();
    let before = doc.serialize(doc.body());
    let node_count = doc.node_count();
    let mut engine = FindInPage::new(doc);

    engine.find_string("hello", LONG);
    assert_eq!(engine.document().highlights().len(), 2);

    engine.stop();
    assert_eq!(engine.state(), SearchState::Idle);
    assert_eq!(engine.match_count(), 0);
    assert_eq!(engine.document().serialize(engine.document().body()), before);
    assert_eq!(engine.document().node_count(), node_count);
    for node in nodes {
        assert!(engine.document().parent(node).is_some());
    }
}

#[test]
fn test_stop_is_idempotent() {
    let (doc, _) = hello_page();
    let mut engine = FindInPage::new(doc);
    engine.stop();
    assert_eq!(engine.generation(), 0);

    engine.find_string("hello", LONG);
    let generation = engine.generation();
    engine.stop();
    assert_eq!(engine.generation(), generation + 1);
    engine.stop();
    assert_eq!(engine.generation(), generation + 1);
}

#[test]
fn test_restart_mid_apply_undoes_partial_highlights() {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    for _ in 0..5 {
        let p = doc.append_element(body, "p");
        doc.append_text(p, "x y x");
    }
    let before = doc.serialize(body);
    let mut engine = FindInPage::new(doc);

    let mut outcome = engine.find_string("x", Duration::ZERO);
    while engine.state() != SearchState::Applying || engine.cursor.applied < 2 {
        assert!(outcome.is_timeout());
        outcome = engine.pump_search(Duration::ZERO);
    }
    assert!(!engine.document().highlights().is_empty());

    engine.stop();
    assert_eq!(engine.document().serialize(body), before);

    assert_eq!(engine.find_string("y", LONG), FindOutcome::Complete(5));
}

#[test]
fn test_select_while_counting_keeps_count_exact() {
    let mut doc = ArenaDocument::new();
    let body = doc.body();
    for _ in 0..4 {
        let p = doc.append_element(body, "p");
        doc.append_text(p, "zz");
    }
    let mut engine = FindInPage::new(doc);

    let mut outcome = engine.find_string("zz", Duration::ZERO);
    while engine.state() != SearchState::Counting || engine.cursor.counted < 2 {
        assert!(outcome.is_timeout());
        outcome = engine.pump_search(Duration::ZERO);
    }
    let selection = engine.select_visible_match(0);
    assert_eq!(selection.index, Some(0));
    assert_eq!(engine.state(), SearchState::Counting);

    let (count, _) = drive(&mut engine, outcome);
    assert_eq!(count, 4);
    assert_eq!(engine.visible_match_count(), engine.match_count());
    assert_eq!(engine.selected_index(), Some(0));
}

#[test]
fn test_stop_during_scan() {
    let (doc, _) = hello_page();
    let mut engine = FindInPage::new(doc);
    assert!(engine.find_string("hello", Duration::ZERO).is_timeout());
    engine.stop();
    assert_eq!(engine.state(), SearchState::Idle);
    assert!(engine.buffer().is_empty());
    assert_eq!(engine.pump_search(LONG), FindOutcome::Complete(0));
}

#[test]
fn test_text_removed_between_slices() {
    let (doc, [a, _, _]) = hello_page();
    let mut engine = FindInPage::new(doc);
    let mut outcome = engine.find_string("hello", Duration::ZERO);
    while engine.state() == SearchState::Scanning {
        outcome = engine.pump_search(Duration::ZERO);
    }
    // 第一个文本节点在高亮前被页面移除
    engine.document_mut().detach(a);
    let (count, _) = drive(&mut engine, outcome);
    assert_eq!(count, 1);
    assert_eq!(engine.match_count(), 2);
    assert!(!engine.matches()[0].is_visible(engine.document()));
}

#[test]
fn test_text_rewritten_between_slices() {
    let (doc, [a, _, _]) = hello_page();
    let mut engine = FindInPage::new(doc);
    let mut outcome = engine.find_string("hello", Duration::ZERO);
    while engine.state() == SearchState::Scanning {
        outcome = engine.pump_search(Duration::ZERO);
    }
    engine.document_mut().set_text(a, "Goodbye, ");
    let (count, _) = drive(&mut engine, outcome);
    assert_eq!(count, 1);
    assert_eq!(engine.matches()[0].handles().len(), 0);
    assert_eq!(engine.document().text(a), Some("Goodbye, "));
}

#[test]
fn test_into_document_restores() {
    let (doc, _) = hello_page();
    let before = doc.serialize(doc.body());
    let mut engine = FindInPage::new(doc);
    engine.find_string("o", LONG);
    let doc = engine.into_document();
    assert_eq!(doc.serialize(doc.body()), before);
}

#[test]
fn test_outcome_sentinel() {
    assert_eq!(FindOutcome::Timeout.as_sentinel(), -1);
    assert_eq!(FindOutcome::Complete(3).as_sentinel(), 3);
    assert_eq!(FindOutcome::Timeout.count(), None);
}
