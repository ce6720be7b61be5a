use super::*;

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use pretty_assertions::assert_eq;

type TestConsole = Console<VecDeque<u8>, Vec<u8>, LogHandler, TestClock>;

#[test]
fn literal() {
    let (mut c, _) = testing_console(b"hello");
    assert_eq!(
        events(&mut c),
        &[
            KeyEvent::Char(b'h'),
            KeyEvent::Char(b'e'),
            KeyEvent::Char(b'l'),
            KeyEvent::Char(b'l'),
            KeyEvent::Char(b'o'),
        ]
    );
    assert_eq!(c.line(), b"hello");
    assert_eq!(c.caret(), 5);
}

#[test]
fn idle_when_nothing_arrived() {
    let (mut c, _) = testing_console(b"");
    assert_eq!(c.read_key(), KeyEvent::Idle);
    assert_eq!(c.read_key(), KeyEvent::Idle);
}

#[test]
fn first_poll_draws_prompt() {
    let (mut c, _) = testing_console(b"");
    c.read_key();
    assert_eq!(output(&c), "\x1b[1000D\x1b[0K#\x1b[1000D\x1b[1C");
}

#[test]
fn arrow_keys() {
    let (mut c, _) = testing_console(b"ab\x1b[A\x1b[B\x1b[D\x1b[D\x1b[D\x1b[C");
    assert_eq!(
        events(&mut c),
        &[
            KeyEvent::Char(b'a'),
            KeyEvent::Char(b'b'),
            KeyEvent::Up,
            KeyEvent::Down,
            KeyEvent::Left,
            KeyEvent::Left,
            KeyEvent::Left,
            KeyEvent::Right,
        ]
    );
    // Three lefts from 2 stop at 0, then one right.
    assert_eq!(c.caret(), 1);
}

#[test]
fn left_arrow_without_auto_move_keeps_caret() {
    let (mut c, _) = testing_console(b"ab\x1b[D");
    c.set_auto_move(false);
    events(&mut c);
    assert_eq!(c.caret(), 2);
}

#[test]
fn csi_parameter_bytes_ask_for_more() {
    let (mut c, _) = testing_console(b"\x1b[3");
    assert_eq!(c.read_key(), KeyEvent::Pending);
    assert_eq!(c.decoder().lookahead(), b"\x1b[3");
    c.source_mut().push_back(b'~');
    assert_eq!(c.read_key(), KeyEvent::Delete);
    assert!(c.decoder().is_idle());
}

#[test]
fn delete_removes_byte_at_caret() {
    let (mut c, _) = testing_console(b"abc\x1b[1~\x1b[3~");
    assert_eq!(
        events(&mut c),
        &[
            KeyEvent::Char(b'a'),
            KeyEvent::Char(b'b'),
            KeyEvent::Char(b'c'),
            KeyEvent::Home,
            KeyEvent::Delete,
        ]
    );
    assert_eq!(c.line(), b"bc");
    assert_eq!(c.caret(), 0);
}

#[test]
fn delete_at_end_does_nothing() {
    let (mut c, _) = testing_console(b"abc\x1b[3~");
    events(&mut c);
    assert_eq!(c.line(), b"abc");
    assert_eq!(c.caret(), 3);
}

#[test]
fn tilde_keys() {
    let (mut c, _) = testing_console(
        b"\x1b[2~\x1b[4~\x1b[5~\x1b[6~\x1b[11~\x1b[15~\x1b[17~\x1b[21~\x1b[23~\x1b[24~",
    );
    c.set_auto_edit(false);
    assert_eq!(
        events(&mut c),
        &[
            KeyEvent::Insert,
            KeyEvent::End,
            KeyEvent::PageUp,
            KeyEvent::PageDown,
            KeyEvent::F(1),
            KeyEvent::F(5),
            KeyEvent::F(6),
            KeyEvent::F(10),
            KeyEvent::F(11),
            KeyEvent::F(12),
        ]
    );
}

#[test]
fn ss3_function_keys() {
    let (mut c, _) = testing_console(b"\x1bOP\x1bOQ\x1bOR\x1bOS\x1bOx");
    assert_eq!(
        events(&mut c),
        &[
            KeyEvent::F(1),
            KeyEvent::F(2),
            KeyEvent::F(3),
            KeyEvent::F(4),
            KeyEvent::Unrecognized(Sequence::from_slice(b"\x1bOx")),
        ]
    );
}

#[test]
fn double_escape() {
    let (mut c, _) = testing_console(b"\x1b\x1b");
    assert_eq!(events(&mut c), &[KeyEvent::Escape]);
}

#[test]
fn unrecognized_sequences() {
    let (mut c, _) = testing_console(b"\x1b[99~\x1b[5Z\x1bxok");
    assert_eq!(
        events(&mut c),
        &[
            KeyEvent::Unrecognized(Sequence::from_slice(b"\x1b[99~")),
            KeyEvent::Unrecognized(Sequence::from_slice(b"\x1b[5Z")),
            KeyEvent::Unrecognized(Sequence::from_slice(b"\x1bx")),
            KeyEvent::Char(b'o'),
            KeyEvent::Char(b'k'),
        ]
    );
    assert_eq!(c.line(), b"ok");
}

#[test]
fn overlong_sequence_is_unrecognized() {
    let (mut c, _) = testing_console(b"\x1b[1111111111~a");
    let got = events(&mut c);
    assert_eq!(got.len(), 2);
    match got[0] {
        KeyEvent::Unrecognized(seq) => {
            assert!(seq.has_overrun());
            assert_eq!(seq.len(), LOOKAHEAD_LEN);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(got[1], KeyEvent::Char(b'a'));
}

#[test]
fn debug_mode_dumps_unrecognized_sequence() {
    let (mut c, _) = testing_console(b"\x1b[99~");
    c.set_debug(true);
    events(&mut c);
    assert!(output(&c).contains(" \\e[99~ => 0x5B [ 0x39 9 0x39 9 0x7E ~\r\n"));
}

#[test]
fn cursor_position_report_is_swallowed() {
    let (mut c, _) = testing_console(b"\x1b[12;40Rx");
    assert_eq!(events(&mut c), &[KeyEvent::Char(b'x')]);
    assert_eq!(c.line(), b"x");
}

#[test]
fn lone_escape_surfaces_after_timeout() {
    let (mut c, clock) = testing_console(b"\x1b");
    assert_eq!(c.read_key(), KeyEvent::Pending);
    clock.advance(100);
    assert_eq!(c.read_key(), KeyEvent::Pending);
    clock.advance(200);
    assert_eq!(c.read_key(), KeyEvent::Escape);
    assert_eq!(c.read_key(), KeyEvent::Idle);
    assert!(c.decoder().is_idle());
}

#[test]
fn stalled_sequence_drains_one_byte_per_poll() {
    let (mut c, clock) = testing_console(b"\x1b[1");
    assert_eq!(c.read_key(), KeyEvent::Pending);
    clock.advance(SEQUENCE_TIMEOUT_MS + 1);
    assert_eq!(c.read_key(), KeyEvent::Escape);
    assert_eq!(c.read_key(), KeyEvent::Char(b'['));
    assert_eq!(c.read_key(), KeyEvent::Char(b'1'));
    assert_eq!(c.read_key(), KeyEvent::Idle);
    // Flushed bytes are reported, not typed.
    assert_eq!(c.line(), b"");
}

#[test]
fn late_byte_does_not_swallow_lone_escape() {
    let (mut c, clock) = testing_console(b"\x1b");
    assert_eq!(c.read_key(), KeyEvent::Pending);
    clock.advance(300);
    c.source_mut().push_back(b'a');
    assert_eq!(c.read_key(), KeyEvent::Escape);
    assert_eq!(c.read_key(), KeyEvent::Char(b'a'));
    assert_eq!(c.read_key(), KeyEvent::Idle);
    assert_eq!(c.line(), b"a");
}

#[test]
fn stalled_telnet_command_is_discarded() {
    let (mut c, clock) = testing_console(&[telnet::IAC, telnet::DO]);
    assert_eq!(c.read_key(), KeyEvent::Pending);
    clock.advance(SEQUENCE_TIMEOUT_MS + 1);
    assert_eq!(c.read_key(), KeyEvent::Idle);
    assert!(c.decoder().is_idle());
}

#[test]
fn telnet_negotiation_produces_no_keys() {
    let mut input = vec![
        telnet::IAC,
        telnet::DO,
        telnet::OPT_ECHO,
        telnet::IAC,
        telnet::DONT,
        telnet::OPT_NAWS,
        telnet::IAC,
        telnet::WILL,
        telnet::OPT_BINARY,
        telnet::IAC,
        241, // NOP
    ];
    input.extend(b"ok");
    let (mut c, _) = testing_console(&input);
    assert_eq!(events(&mut c), &[KeyEvent::Char(b'o'), KeyEvent::Char(b'k')]);
    assert!(!c.writer().contains(&telnet::IAC));
}

#[test]
fn telnet_subnegotiation_skips_payload() {
    let input = [
        telnet::IAC,
        telnet::SB,
        telnet::OPT_NAWS,
        0,
        80,
        telnet::IAC,
        telnet::IAC, // escaped 255 inside the payload
        24,
        telnet::IAC,
        telnet::SE,
        b'x',
    ];
    let (mut c, _) = testing_console(&input);
    assert_eq!(events(&mut c), &[KeyEvent::Char(b'x')]);
}

#[test]
fn telnet_escaped_iac_is_a_character() {
    let (mut c, _) = testing_console(&[telnet::IAC, telnet::IAC]);
    assert_eq!(events(&mut c), &[KeyEvent::Char(0xff)]);
    assert_eq!(c.line(), &[0xff]);
}

#[test]
fn control_bytes() {
    let (mut c, _) = testing_console(b"\x03\x09\x00\x1c");
    assert_eq!(
        events(&mut c),
        &[
            KeyEvent::Ctrl(b'C'),
            KeyEvent::Tab,
            KeyEvent::Ctrl(b'@'),
            KeyEvent::Ctrl(b'\\'),
        ]
    );
    assert_eq!(c.line(), b"");
}

#[test]
fn backspace_and_del_erase() {
    let (mut c, _) = testing_console(b"abcd\x7f\x08");
    assert_eq!(
        &events(&mut c)[4..],
        &[KeyEvent::Backspace, KeyEvent::Backspace]
    );
    assert_eq!(c.line(), b"ab");
    assert_eq!(c.caret(), 2);
}

#[test]
fn ctrl_keys_move_caret() {
    let (mut c, _) = testing_console(b"one two three\x01");
    events(&mut c);
    assert_eq!(c.caret(), 0);

    c.source_mut().push_back(0x06); // ^F
    events(&mut c);
    assert_eq!(c.caret(), 3);
    c.source_mut().push_back(0x06);
    events(&mut c);
    assert_eq!(c.caret(), 7);
    c.source_mut().push_back(0x02); // ^B
    events(&mut c);
    assert_eq!(c.caret(), 4);
    c.source_mut().push_back(0x05); // ^E
    events(&mut c);
    assert_eq!(c.caret(), 13);
}

#[test]
fn insert_key_toggles_overwrite() {
    let (mut c, _) = testing_console(b"abc\x1b[1~\x1b[2~xy");
    events(&mut c);
    assert!(!c.insert_mode());
    assert_eq!(c.line(), b"xyc");
    assert_eq!(c.caret(), 2);
}

#[test]
fn enter_hands_line_to_handler_then_clears() {
    let (mut c, _) = testing_console(b"ls -l\r\n");
    assert_eq!(events(&mut c).last(), Some(&KeyEvent::Enter));
    assert_eq!(c.handler().lines, &[b"ls -l".to_vec()]);
    assert_eq!(c.line(), b"");
    assert_eq!(c.caret(), 0);
}

#[test]
fn cr_and_lf_each_end_a_line() {
    let (mut c, _) = testing_console(b"a\rb\n\r\n");
    events(&mut c);
    assert_eq!(
        c.handler().lines,
        &[b"a".to_vec(), b"b".to_vec(), b"".to_vec()]
    );
}

#[test]
fn cr_lf_split_across_polls_ends_one_line() {
    let (mut c, _) = testing_console(b"ab\r");
    events(&mut c);
    c.source_mut().push_back(b'\n');
    assert!(events(&mut c).is_empty());
    assert_eq!(c.handler().lines, &[b"ab".to_vec()]);

    // Only the byte right after CR is dropped.
    c.source_mut().extend(b"x\n");
    assert_eq!(events(&mut c), &[KeyEvent::Char(b'x'), KeyEvent::Enter]);
    assert_eq!(c.handler().lines, &[b"ab".to_vec(), b"x".to_vec()]);
}

#[test]
fn enter_without_auto_clear_keeps_line() {
    let (mut c, _) = testing_console(b"keep\r");
    c.set_auto_clear(false);
    events(&mut c);
    assert_eq!(c.handler().lines, &[b"keep".to_vec()]);
    assert_eq!(c.line(), b"keep");
}

#[test]
fn typing_stops_when_buffer_is_full() {
    let (mut c, _) = testing_console_with_capacity(b"abcdefgh", 8);
    events(&mut c);
    assert_eq!(c.line(), b"abcdef");
    assert_eq!(c.caret(), 6);
}

#[test]
fn history_recall() {
    let (mut c, _) = testing_console(b"one\rtwo\rtwo\r\x1b[A");
    events(&mut c);
    assert_eq!(c.history().len(), 2);
    assert_eq!(c.line(), b"two");
    assert_eq!(c.caret(), 3);

    c.source_mut().extend(b"\x1b[A\x1b[A");
    events(&mut c);
    assert_eq!(c.line(), b"one");

    c.source_mut().extend(b"\x1b[B");
    events(&mut c);
    assert_eq!(c.line(), b"two");

    c.source_mut().extend(b"\x1b[B");
    events(&mut c);
    assert_eq!(c.line(), b"");
}

#[test]
fn history_off_leaves_up_alone() {
    let (mut c, _) = testing_console(b"one\r\x1b[A");
    c.set_auto_history(false);
    events(&mut c);
    assert!(c.history().is_empty());
    assert_eq!(c.line(), b"");
}

#[test]
fn history_evicts_oldest() {
    let mut history = History::new(2, 16);
    assert!(history.push(b"a"));
    assert!(history.push(b"b"));
    assert!(history.push(b"c"));
    assert!(!history.push(b""));
    assert_eq!(history.iter().collect::<Vec<_>>(), [b"c".as_slice(), b"b"]);
    assert_eq!(history.older(), Recall::Entry(b"c"));
    assert_eq!(history.older(), Recall::Entry(b"b"));
    assert_eq!(history.older(), Recall::Unchanged);
    assert_eq!(history.newer(), Recall::Entry(b"c"));
    assert_eq!(history.newer(), Recall::Fresh);
    assert_eq!(history.newer(), Recall::Unchanged);
}

#[test]
fn set_caret_clamps() {
    let mut editor = LineEditor::new(Vec::new(), 16);
    editor.replace(b"abcd").unwrap();
    for i in 0..10 {
        editor.set_caret(i);
        assert_eq!(editor.caret(), i.min(4));
    }
    editor.move_caret(-10);
    assert_eq!(editor.caret(), 0);
}

#[test]
fn insert_then_backspace_restores() {
    let mut editor = LineEditor::new(Vec::new(), 16);
    editor.replace(b"abcd").unwrap();
    for caret in 0..=4 {
        editor.set_caret(caret);
        editor.insert(b'x').unwrap();
        editor.backspace().unwrap();
        assert_eq!(editor.contents(), b"abcd");
        assert_eq!(editor.caret(), caret);
    }
}

#[test]
fn insert_at_keeps_caret() {
    let mut editor = LineEditor::new(Vec::new(), 16);
    editor.replace(b"ac").unwrap();
    editor.insert_at(1, b'b').unwrap();
    assert_eq!(editor.contents(), b"abc");
    assert_eq!(editor.caret(), 2);
}

#[test]
fn insert_fails_at_capacity_minus_two() {
    let mut editor = LineEditor::new(Vec::new(), 10);
    for b in b"12345678" {
        editor.insert(*b).unwrap();
    }
    assert_eq!(
        editor.insert(b'9'),
        Err(EditError::BufferFull { capacity: 10 })
    );
    assert_eq!(editor.contents(), b"12345678");
    assert_eq!(editor.caret(), 8);
}

#[test]
fn zero_capacity_editor_refuses_edits() {
    let mut editor = LineEditor::new(Vec::new(), 0);
    assert_eq!(editor.insert(b'a'), Err(EditError::NoCapacity));
    assert_eq!(editor.backspace(), Err(EditError::NoCapacity));
    assert_eq!(editor.delete_forward(), Err(EditError::NoCapacity));
    editor.set_caret(3);
    editor.clear();
    assert_eq!(editor.contents(), b"");
    assert_eq!(editor.caret(), 0);
}

#[test]
fn editor_redraws_after_each_change() {
    let mut editor = LineEditor::new(Vec::new(), 16);
    editor.set_prompt("> ");
    editor.insert(b'a').unwrap();
    editor.insert(b'b').unwrap();
    let out = String::from_utf8(editor.into_writer()).unwrap();
    assert_eq!(
        out,
        "\x1b[1000D\x1b[0K> a\x1b[1000D\x1b[3C\x1b[1000D\x1b[0K> ab\x1b[1000D\x1b[4C"
    );
}

#[test]
fn editor_without_auto_redraw_is_silent() {
    let mut editor = LineEditor::with_flags(Vec::new(), 16, ConsoleFlags::INSERT_MODE);
    editor.insert(b'a').unwrap();
    editor.clear();
    assert!(editor.writer().is_empty());
}

#[test]
fn render_plain() {
    let mut out = Vec::new();
    render::render_line(
        &mut out,
        &Prompt::new("> "),
        b"ab\0\0",
        1,
        ConsoleFlags::default(),
    )
    .unwrap();
    assert_eq!(out, b"\x1b[1000D\x1b[0K> ab\x1b[1000D\x1b[3C");
}

#[test]
fn render_password_hides_text_and_caret() {
    let mut out = Vec::new();
    render::render_line(
        &mut out,
        &Prompt::new("pw:"),
        b"secret\0\0",
        6,
        ConsoleFlags::HIDE_PASSWORD,
    )
    .unwrap();
    assert_eq!(out, b"\x1b[1000D\x1b[0Kpw:\x1b[1000D\x1b[3C");
}

#[test]
fn render_debug_dumps_storage() {
    let mut out = Vec::new();
    render::render_line(
        &mut out,
        &Prompt::new("#"),
        b"a\0\0",
        1,
        ConsoleFlags::DEBUG,
    )
    .unwrap();
    assert_eq!(out, b"\x1b[1000D\x1b[0K#0x61 ||\x1b[1000D\x1b[2C");
}

#[test]
fn render_debug_pads_hex_with_zero() {
    let mut out = Vec::new();
    render::render_line(&mut out, &Prompt::new(""), b"\x0a\0", 0, ConsoleFlags::DEBUG).unwrap();
    assert_eq!(out, b"\x1b[1000D\x1b[0K0x0a |\x1b[1000D");
}

#[test]
fn render_skips_zero_column_move() {
    let mut out = Vec::new();
    render::render_line(&mut out, &Prompt::new(""), b"\0\0", 0, ConsoleFlags::empty()).unwrap();
    assert_eq!(out, b"\x1b[1000D\x1b[0K\x1b[1000D");
}

#[test]
fn prompt_is_truncated() {
    let long = "abcdefghijklmnopqrstuvwxyz0123456789";
    assert_eq!(Prompt::new(long).as_str(), &long[..PROMPT_CAPACITY]);
    // Never splits a character.
    let wide = "ééééééééééééééééé";
    let prompt = Prompt::new(wide);
    assert_eq!(prompt.len(), 30);
    assert!(wide.starts_with(prompt.as_str()));
}

#[test]
fn config_from_toml() {
    let config = ConsoleConfig::from_toml_str(
        r#"
        prompt = "> "
        line_capacity = 64
        hide_password = true
        auto_history = false
        "#,
    )
    .unwrap();
    assert_eq!(config.prompt, "> ");
    assert_eq!(config.line_capacity, 64);
    assert_eq!(config.history_depth, DEFAULT_HISTORY_DEPTH);
    assert_eq!(
        config.flags(),
        (ConsoleFlags::default() | ConsoleFlags::HIDE_PASSWORD) - ConsoleFlags::AUTO_HISTORY
    );
}

#[test]
fn config_defaults_match_flag_defaults() {
    let config = ConsoleConfig::default();
    assert_eq!(config.flags(), ConsoleFlags::default());
    assert_eq!(config.line_capacity, DEFAULT_LINE_CAPACITY);
    assert_eq!(config.prompt().as_str(), "#");
}

#[test]
fn config_rejects_tiny_capacity() {
    let err = ConsoleConfig::from_toml_str("line_capacity = 1").unwrap_err();
    assert!(matches!(err, ConfigError::CapacityTooSmall(1)));
    let err = ConsoleConfig::from_toml_str("line_capacity = \"lots\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn console_from_config() {
    let config = ConsoleConfig {
        prompt: "$ ".to_string(),
        line_capacity: 4,
        auto_clear: false,
        ..ConsoleConfig::default()
    };
    let clock = TestClock::default();
    let input: VecDeque<u8> = b"abcd\r".iter().copied().collect();
    let mut c = Console::from_config(&config, input, Vec::new(), LogHandler::new(), clock);
    events(&mut c);
    assert_eq!(c.prompt(), "$ ");
    assert_eq!(c.handler().lines, &[b"ab".to_vec()]);
    assert_eq!(c.line(), b"ab");
}

#[test]
fn channel_source() {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut source = ChannelSource::new(rx);
    assert!(!source.available());
    tx.send(b'a').unwrap();
    tx.send(b'b').unwrap();
    assert_eq!(source.peek(), Some(b'a'));
    assert_eq!(source.read(), Some(b'a'));
    assert_eq!(source.read(), Some(b'b'));
    assert_eq!(source.read(), None);
    drop(tx);
    assert!(!source.available());
    assert!(source.is_closed());
}

#[test]
fn key_event_markers() {
    assert!(KeyEvent::Char(b'a').is_key());
    assert!(KeyEvent::F(3).is_key());
    assert!(!KeyEvent::Pending.is_key());
    assert!(!KeyEvent::Idle.is_key());
    assert!(!KeyEvent::Unrecognized(Sequence::new()).is_key());
}

#[test]
fn sequence_debug_is_readable() {
    let seq = Sequence::from_slice(b"\x1b[3;5~");
    assert_eq!(format!("{seq:?}"), "Sequence(\"\\e[3;5~\")");
}

/// Polls until the input is used up and returns every key event seen,
/// leaving out the `Pending` and `Idle` markers.
fn events(c: &mut TestConsole) -> Vec<KeyEvent> {
    let mut log = Vec::new();
    loop {
        let event = c.read_key();
        match event {
            KeyEvent::Pending | KeyEvent::Idle => {
                if c.source_mut().is_empty() {
                    return log;
                }
            }
            _ => log.push(event),
        }
    }
}

fn output(c: &TestConsole) -> String {
    String::from_utf8_lossy(c.writer()).into_owned()
}

fn testing_console(input: &[u8]) -> (TestConsole, TestClock) {
    testing_console_with_capacity(input, 32)
}

fn testing_console_with_capacity(input: &[u8], capacity: usize) -> (TestConsole, TestClock) {
    let clock = TestClock::default();
    let c = Console::with_clock(
        input.iter().copied().collect(),
        Vec::new(),
        LogHandler::new(),
        clock.clone(),
        capacity,
    );
    (c, clock)
}

#[derive(Debug, Clone, Default)]
struct TestClock {
    now: Rc<Cell<u64>>,
}

impl TestClock {
    fn advance(&self, millis: u64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for TestClock {
    fn now_millis(&self) -> u64 {
        self.now.get()
    }
}

struct LogHandler {
    lines: Vec<Vec<u8>>,
}

impl LogHandler {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }
}

impl LineHandler for LogHandler {
    fn line(&mut self, line: &[u8]) {
        self.lines.push(line.to_vec());
    }
}
