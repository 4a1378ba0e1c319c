//! Line editor tests

mod common;

use std::cell::RefCell;

use common::Capture;
use dma_uart_console::console::editor::{EditEvent, LineEditor, Recall, ERASE_LINE};
use dma_uart_console::console::{CommandTable, Console, ParsedCommand};
use dma_uart_console::ResponseSink;
use proptest::prelude::*;

type Editor = LineEditor<64, 4>;

fn feed(editor: &mut Editor, bytes: &[u8], out: &mut Capture) -> Vec<Vec<u8>> {
    let lines = RefCell::new(Vec::new());
    for &b in bytes {
        editor.feed_byte(b, out, |line, _| lines.borrow_mut().push(line.to_vec()));
    }
    lines.into_inner()
}

#[test]
fn test_echo_and_uppercase() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    feed(&mut editor, b"$hci", &mut out);

    assert_eq!(editor.line().as_bytes(), b"$HCI");
    assert_eq!(out.0, b"$HCI");
}

#[test]
fn test_submit_dispatches_once_and_records() {
    let mut editor = Editor::new().with_prompt("> ");
    let mut out = Capture::default();

    let lines = feed(&mut editor, b"$HCI\r", &mut out);

    assert_eq!(lines, vec![b"$HCI".to_vec()]);
    assert!(editor.line().is_empty());
    assert_eq!(editor.history().slot(0).unwrap().as_bytes(), b"$HCI");
    assert_eq!(out.text(), "$HCI\r\n> ");
}

#[test]
fn test_empty_line_not_dispatched() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    let lines = feed(&mut editor, b"\r\r", &mut out);

    assert!(lines.is_empty());
    assert!(editor.history().is_empty());
    assert_eq!(out.0, b"\r\n\r\n");
}

#[test]
fn test_backspace_erases_last_byte() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    feed(&mut editor, b"$ADX", &mut out);
    out.clear();
    let event = editor.feed_byte(0x08, &mut out, |_, _| {});

    assert_eq!(event, EditEvent::Erased);
    assert_eq!(editor.line().as_bytes(), b"$AD");
    assert_eq!(out.0, b"\x08 \x08");

    editor.feed_byte(0x7F, &mut out, |_, _| {});
    assert_eq!(editor.line().as_bytes(), b"$A");
}

#[test]
fn test_backspace_at_zero() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    for _ in 0..10 {
        editor.feed_byte(0x08, &mut out, |_, _| {});
    }
    assert_eq!(editor.line().len(), 0);

    feed(&mut editor, b"OK", &mut out);
    assert_eq!(editor.line().as_bytes(), b"OK");
}

#[test]
fn test_up_arrow_recalls_previous_line() {
    let mut editor = Editor::new().with_prompt("> ");
    let mut out = Capture::default();

    feed(&mut editor, b"$ADC\r", &mut out);
    out.clear();

    let mut last = EditEvent::None;
    for &b in b"\x1b[A" {
        last = editor.feed_byte(b, &mut out, |_, _| {});
    }

    assert_eq!(last, EditEvent::Recalled(Recall::Up));
    assert_eq!(editor.line().as_bytes(), b"$ADC");
    assert_eq!(editor.line().len(), 4);
    assert!(!editor.line().as_bytes().contains(&0x1B));

    let mut expected = ERASE_LINE.to_vec();
    expected.extend_from_slice(b"> $ADC");
    assert_eq!(out.0, expected);
}

#[test]
fn test_arrow_rebuilt_after_backspace_still_recalls() {
    let mut editor = Editor::new().with_prompt("> ");
    let mut out = Capture::default();

    feed(&mut editor, b"$ADC\r", &mut out);
    out.clear();

    // ESC [ <BS> [ A: the backspace resets the sequence, the tail still reads ESC [ A.
    let mut last = EditEvent::None;
    for &b in b"\x1b[\x08[A" {
        last = editor.feed_byte(b, &mut out, |_, _| {});
    }

    assert_eq!(last, EditEvent::Recalled(Recall::Up));
    assert_eq!(editor.line().as_bytes(), b"$ADC");

    let mut redraw = ERASE_LINE.to_vec();
    redraw.extend_from_slice(b"> $ADC");
    assert!(out.0.ends_with(&redraw));
}

#[test]
fn test_recall_replaces_partial_input() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    feed(&mut editor, b"$ONE\r$TWO\r$PART", &mut out);
    feed(&mut editor, b"\x1b[A", &mut out);
    assert_eq!(editor.line().as_bytes(), b"$TWO");

    feed(&mut editor, b"\x1b[A", &mut out);
    assert_eq!(editor.line().as_bytes(), b"$ONE");

    feed(&mut editor, b"\x1b[B", &mut out);
    assert_eq!(editor.line().as_bytes(), b"$TWO");
}

#[test]
fn test_recalled_line_can_be_resubmitted() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    feed(&mut editor, b"$ADC 3\r", &mut out);
    let lines = feed(&mut editor, b"\x1b[A\r", &mut out);

    assert_eq!(lines, vec![b"$ADC 3".to_vec()]);
    assert_eq!(editor.history().len(), 2);
}

#[test]
fn test_escape_bytes_not_echoed() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    feed(&mut editor, b"\x1b[", &mut out);
    assert!(out.0.is_empty());
}

#[test]
fn test_lf_after_cr_ignored() {
    let mut editor = Editor::new();
    let mut out = Capture::default();

    let lines = feed(&mut editor, b"$A\r\n$B\r\n", &mut out);

    assert_eq!(lines, vec![b"$A".to_vec(), b"$B".to_vec()]);
}

#[test]
fn test_console_routes_through_table() {
    fn hci(count: &mut u32, cmd: &ParsedCommand<'_>, out: &mut dyn ResponseSink) {
        *count += 1;
        out.emit(cmd.line);
    }

    let mut table: CommandTable<u32, 4> = CommandTable::new();
    table.register_command("$HCI", hci).unwrap();
    let mut console: Console<'_, u32, 64, 4, 4> = Console::new(&table, "");
    let mut calls = 0;
    let mut out = Capture::default();

    for &b in b"$HCI\r$NOPE\r" {
        console.feed_byte(b, &mut calls, &mut out);
    }

    assert_eq!(calls, 1);
    assert_eq!(out.text(), "$HCI\r\n$HCI$NOPE\r\n?");
}

proptest! {
    #[test]
    fn prop_backspace_never_underflows(
        ops in prop::collection::vec(prop_oneof![Just(0x08u8), Just(b'X')], 0..200),
    ) {
        let mut editor = LineEditor::<8, 2>::new();
        let mut out: heapless::Vec<u8, 4096> = heapless::Vec::new();
        let mut expected = 0usize;

        for op in ops {
            editor.feed_byte(op, &mut out, |_, _| {});
            expected = if op == 0x08 {
                expected.saturating_sub(1)
            } else {
                (expected + 1).min(8)
            };
            prop_assert_eq!(editor.line().len(), expected);
            prop_assert!(editor.line().as_bytes().iter().all(|&b| b == b'X'));
        }
    }
}
