use super::*;
use core::sync::atomic::{AtomicUsize, Ordering};

static HOME_HITS: AtomicUsize = AtomicUsize::new(0);

fn count_home(_codec: &mut EscapeCodec, key: KeyCode) {
    assert_eq!(key, KeyCode::Home);
    HOME_HITS.fetch_add(1, Ordering::SeqCst);
}

fn hide_on_end(codec: &mut EscapeCodec, _key: KeyCode) {
    codec.action(Action::CursorHide, |_| Ok::<(), ()>(())).unwrap();
}

#[test]
fn test_decode_every_known_key() {
    let mut codec = EscapeCodec::new();
    for (bytes, key) in KEY_SEQUENCES.iter() {
        assert_eq!(codec.decode(bytes), Ok(Some(*key)));
    }
}

#[test]
fn test_decode_empty_is_invalid() {
    let mut codec = EscapeCodec::new();
    assert_eq!(codec.decode(&[]), Err(Error::InvalidArguments));
}

#[test]
fn test_decode_unknown_is_noop() {
    let mut codec = EscapeCodec::new();
    codec.attach(KeyCode::Home, count_home);
    let before = HOME_HITS.load(Ordering::SeqCst);

    assert_eq!(codec.decode(b"\x1B[Z"), Ok(None));
    assert_eq!(codec.decode(b"\x1B[3"), Ok(None));
    assert_eq!(codec.decode(b"\x1B"), Ok(None));
    assert_eq!(codec.decode(b"\x1B[3~~"), Ok(None));

    assert_eq!(HOME_HITS.load(Ordering::SeqCst), before);
    assert_eq!(codec.font_color(), Color::Default);
    assert!(codec.cursor_visible());
}

#[test]
fn test_decode_fires_attached_callback() {
    let mut codec = EscapeCodec::new();
    codec.attach(KeyCode::Home, count_home);
    let before = HOME_HITS.load(Ordering::SeqCst);

    assert_eq!(codec.decode(b"\x1B[H"), Ok(Some(KeyCode::Home)));
    assert_eq!(HOME_HITS.load(Ordering::SeqCst), before + 1);

    codec.detach(KeyCode::Home);
    assert!(!codec.is_attached(KeyCode::Home));
    assert_eq!(codec.decode(b"\x1B[H"), Ok(Some(KeyCode::Home)));
    assert_eq!(HOME_HITS.load(Ordering::SeqCst), before + 1);
}

#[test]
fn test_callback_receives_codec() {
    let mut codec = EscapeCodec::new();
    codec.attach(KeyCode::End, hide_on_end);
    codec.decode(b"\x1B[F").unwrap();
    assert!(!codec.cursor_visible());
}

#[test]
fn test_match_sequence_prefixes() {
    assert_eq!(match_sequence(b"\x1B"), SequenceMatch::Partial);
    assert_eq!(match_sequence(b"\x1B["), SequenceMatch::Partial);
    assert_eq!(match_sequence(b"\x1B[5"), SequenceMatch::Partial);
    assert_eq!(match_sequence(b"\x1B[5~"), SequenceMatch::Complete(KeyCode::PageUp));
    assert_eq!(match_sequence(b"\x1B[7"), SequenceMatch::Unknown);
    assert_eq!(match_sequence(b"\x1BO"), SequenceMatch::Unknown);
}

#[test]
fn test_font_red() {
    let mut codec = EscapeCodec::new();
    let mut sent = heapless::String::<16>::new();
    codec
        .set_font_color(Color::Red, |seq| sent.push_str(seq))
        .unwrap();
    assert_eq!(sent.as_str(), "\x1B[31m");
    assert_eq!(codec.font_color(), Color::Red);
}

#[test]
fn test_default_colors() {
    assert_eq!(Color::Default.font_sequence(), "\x1B[39m");
    assert_eq!(Color::Default.background_sequence(), "\x1B[49m");
    assert_eq!(Color::White.background_sequence(), "\x1B[47m");
    assert_eq!(Color::Black.font_sequence(), "\x1B[30m");
}

#[test]
fn test_failed_write_keeps_state() {
    let mut codec = EscapeCodec::new();
    let result = codec.set_background_color(Color::Blue, |_| Err::<(), ()>(()));
    assert_eq!(result, Err(Error::Port));
    assert_eq!(codec.background_color(), Color::Default);

    let result = codec.action(Action::CursorHide, |_| Err::<(), ()>(()));
    assert_eq!(result, Err(Error::Port));
    assert!(codec.cursor_visible());
}

#[test]
fn test_action_sequences() {
    assert_eq!(Action::ClearScreen.sequence(), "\x1B[2J\x1B[1;1H");
    assert_eq!(Action::ClearLine.sequence(), "\x1B[2K\r");
    assert_eq!(Action::DeleteChar.sequence(), "\x08 \x08");
    assert_eq!(Action::CursorLeft.sequence(), "\x1B[D");
    assert_eq!(Action::CursorShow.sequence(), "\x1B[?25h");
}

#[test]
fn test_cursor_visibility_tracks_actions() {
    let mut codec = EscapeCodec::new();
    let ok = |_: &str| Ok::<(), ()>(());
    codec.action(Action::CursorHide, ok).unwrap();
    assert!(!codec.cursor_visible());
    codec.action(Action::CursorShow, ok).unwrap();
    assert!(codec.cursor_visible());
}
