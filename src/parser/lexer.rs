//! Character-class helpers and backslash-escape decoding shared by the
//! parser's boundary scan and the substitution engine's decode pass
//! (§4.B "Escape sequences").

/// Characters that may appear in a bare (unqualified-by-braces) variable name,
/// including the `::` namespace separator (§4.B "Variable reference").
pub fn is_varname_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ':'
}

pub fn is_command_separator(c: char) -> bool {
    c == ';' || c == '\n'
}

pub fn is_inline_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Decode one backslash escape starting at `chars[i]` (`chars[i] == '\\'`).
/// Returns the decoded text and the index just past the consumed escape.
/// Mirrors §4.B's table: `\n \t \r \\ \" \{ \}`, `\xHH`, `\uHHHH`, `\ooo`
/// (octal, up to 3 digits), and backslash-newline line continuation
/// (collapses to a single space, eating following indentation).
pub fn decode_backslash(chars: &[char], i: usize) -> (String, usize) {
    debug_assert_eq!(chars[i], '\\');
    if i + 1 >= chars.len() {
        return ("\\".to_string(), i + 1);
    }
    let c = chars[i + 1];
    match c {
        'n' => ("\n".to_string(), i + 2),
        't' => ("\t".to_string(), i + 2),
        'r' => ("\r".to_string(), i + 2),
        '\\' => ("\\".to_string(), i + 2),
        '"' => ("\"".to_string(), i + 2),
        '{' => ("{".to_string(), i + 2),
        '}' => ("}".to_string(), i + 2),
        '\n' => {
            let mut j = i + 2;
            while j < chars.len() && is_inline_space(chars[j]) {
                j += 1;
            }
            (" ".to_string(), j)
        }
        'x' => decode_hex_escape(chars, i + 2, 2),
        'u' => decode_hex_escape(chars, i + 2, 4),
        '0'..='7' => decode_octal_escape(chars, i + 1),
        other => (other.to_string(), i + 2),
    }
}

fn decode_hex_escape(chars: &[char], start: usize, max_digits: usize) -> (String, usize) {
    let mut j = start;
    let mut value: u32 = 0;
    let mut count = 0;
    while j < chars.len() && count < max_digits && chars[j].is_ascii_hexdigit() {
        value = value * 16 + chars[j].to_digit(16).unwrap();
        j += 1;
        count += 1;
    }
    if count == 0 {
        // No valid hex digits followed \x or \u: treat literally as the marker char.
        return (chars[start - 1].to_string(), start);
    }
    let ch = char::from_u32(value).unwrap_or('\u{FFFD}');
    (ch.to_string(), j)
}

fn decode_octal_escape(chars: &[char], start: usize) -> (String, usize) {
    let mut j = start;
    let mut value: u32 = 0;
    let mut count = 0;
    while j < chars.len() && count < 3 && ('0'..='7').contains(&chars[j]) {
        value = value * 8 + chars[j].to_digit(8).unwrap();
        j += 1;
        count += 1;
    }
    let ch = char::from_u32(value).unwrap_or('\u{FFFD}');
    (ch.to_string(), j)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> (String, usize) {
        let chars: Vec<char> = s.chars().collect();
        decode_backslash(&chars, 0)
    }

    #[test]
    fn simple_escapes() {
        assert_eq!(decode("\\n").0, "\n");
        assert_eq!(decode("\\t").0, "\t");
        assert_eq!(decode("\\{").0, "{");
    }

    #[test]
    fn hex_and_unicode_escapes() {
        assert_eq!(decode("\\x41").0, "A");
        assert_eq!(decode("\\u0041").0, "A");
    }

    #[test]
    fn octal_escape() {
        assert_eq!(decode("\\101").0, "A");
    }

    #[test]
    fn line_continuation_collapses_to_space() {
        let (text, consumed) = decode("\\\n   rest");
        assert_eq!(text, " ");
        let chars: Vec<char> = "\\\n   rest".chars().collect();
        assert_eq!(&chars[consumed..].iter().collect::<String>(), "rest");
    }
}
