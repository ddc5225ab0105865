// Host-side mirror of the shell tokenizer and line editing in
// crates/kernel/src/shell.rs.

pub const MAX_ARGS: usize = 16;
pub const LINE_CAP: usize = 256;

/// Split on runs of spaces, capping at MAX_ARGS tokens.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ')
        .filter(|t| !t.is_empty())
        .take(MAX_ARGS)
        .collect()
}

/// Replay a byte stream through the shell's line-editing rules and
/// return the committed line: printables append (dropped past
/// capacity), 0x08 erases, `\n` commits.
pub fn edit_line(input: &[u8]) -> String {
    let mut buf: Vec<u8> = Vec::new();
    for &c in input {
        match c {
            b'\n' => break,
            0x08 => {
                buf.pop();
            }
            0x20..=0x7E => {
                if buf.len() < LINE_CAP - 1 {
                    buf.push(c);
                }
            }
            _ => {}
        }
    }
    String::from_utf8(buf).unwrap()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn echo_tokens() {
        assert_eq!(tokenize("echo a b c"), vec!["echo", "a", "b", "c"]);
        assert_eq!(tokenize("echo a b c")[1..].join(" "), "a b c");
    }

    #[test]
    fn empty_line_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn backspace_edits_buffer() {
        assert_eq!(edit_line(b"hellp\x08o\n"), "hello");
        // Backspace at column 0 is a no-op.
        assert_eq!(edit_line(b"\x08\x08hi\n"), "hi");
    }

    #[test]
    fn overflow_drops_silently() {
        let mut input = vec![b'a'; LINE_CAP + 50];
        input.push(b'\n');
        assert_eq!(edit_line(&input).len(), LINE_CAP - 1);
    }

    proptest! {
        #[test]
        fn join_roundtrip(tokens in proptest::collection::vec("[a-z0-9]{1,8}", 1..MAX_ARGS)) {
            // Single-space separated, no leading/trailing spaces:
            // tokenizing then joining reproduces the line.
            let line = tokens.join(" ");
            prop_assert_eq!(tokenize(&line).join(" "), line);
        }

        #[test]
        fn never_more_than_max_args(line in "[ a-z]{0,200}") {
            prop_assert!(tokenize(&line).len() <= MAX_ARGS);
        }
    }
}
