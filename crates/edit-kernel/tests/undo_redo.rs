//! Session-level undo/redo behavior, including coalesced typing runs and
//! interaction with in-flight analysis state.

use edit_kernel::{DocumentSession, Position, Selection};
use rand::Rng;

#[test]
fn test_undo_redo_single_edit() {
    let mut session = DocumentSession::new("hello world");
    session.replace(0, 5, "goodbye");
    assert_eq!(session.text(), "goodbye world");

    assert!(session.undo());
    assert_eq!(session.text(), "hello world");
    assert!(!session.can_undo());
    assert!(session.can_redo());

    assert!(session.redo());
    assert_eq!(session.text(), "goodbye world");
    assert!(!session.can_redo());
}

#[test]
fn test_typed_word_undoes_in_one_step() {
    let mut session = DocumentSession::new("x = ");
    for (i, ch) in "value".chars().enumerate() {
        session.insert(4 + i, &ch.to_string());
    }
    assert_eq!(session.text(), "x = value");

    assert!(session.undo());
    assert_eq!(session.text(), "x = ");
    assert!(!session.can_undo());

    assert!(session.redo());
    assert_eq!(session.text(), "x = value");
}

#[test]
fn test_backspace_run_undoes_in_one_step() {
    let mut session = DocumentSession::new("abcdef");
    // Backspace the last three characters one at a time.
    for offset in [5, 4, 3] {
        session.delete(offset, 1);
    }
    assert_eq!(session.text(), "abc");

    assert!(session.undo());
    assert_eq!(session.text(), "abcdef");
}

#[test]
fn test_newline_breaks_typing_run() {
    let mut session = DocumentSession::empty();
    session.insert(0, "a");
    session.insert(1, "\n");
    session.insert(2, "b");

    assert!(session.undo());
    assert_eq!(session.text(), "a\n");
    assert!(session.undo());
    assert_eq!(session.text(), "a");
}

#[test]
fn test_new_edit_clears_redo() {
    let mut session = DocumentSession::new("base");
    session.insert(4, " one");
    session.undo();
    assert!(session.can_redo());

    session.insert(4, " two");
    assert!(!session.can_redo());
    assert_eq!(session.text(), "base two");
}

#[test]
fn test_undo_restores_cursor_and_selection() {
    let mut session = DocumentSession::new("hello world");
    let selection = Selection::new(Position::new(0, 0), Position::new(0, 5));
    session.set_selection(selection);
    session.replace(0, 5, "hi");

    assert_eq!(session.cursor(), Position::new(0, 2));
    assert_eq!(session.selection(), None);

    session.undo();
    assert_eq!(session.cursor(), Position::new(0, 5));
    assert_eq!(session.selection(), Some(selection));
}

#[test]
fn test_undo_participates_in_remapping() {
    // Undoing is an edit like any other: it lands in the ledger so stale
    // analysis results keep remapping across it.
    let mut session = DocumentSession::new("fn a\n");
    session.insert(0, "// x\n");
    let before = session.ledger_len();
    session.undo();
    assert_eq!(session.ledger_len(), before + 1);
    assert_eq!(session.text(), "fn a\n");
}

#[test]
fn test_random_edits_undo_all_restores_original() {
    let mut rng = rand::thread_rng();
    let original = "line one\nline two\nline three\n";

    for _ in 0..20 {
        let mut session = DocumentSession::new(original);
        let mut edits = 0;
        for _ in 0..30 {
            let len = session.text().chars().count();
            if rng.gen_bool(0.5) && len > 0 {
                let offset = rng.gen_range(0..len);
                let del = rng.gen_range(1..=(len - offset).min(4));
                session.delete(offset, del);
            } else {
                let offset = rng.gen_range(0..=len);
                session.insert(offset, "word ");
            }
            edits += 1;
        }
        let final_text = session.text();

        let mut undos = 0;
        while session.undo() {
            undos += 1;
        }
        assert!(undos <= edits);
        assert_eq!(session.text(), original);

        while session.redo() {}
        assert_eq!(session.text(), final_text);
    }
}
