//! The NL text format.
//!
//! One symbol is one record line followed by any number of comment
//! continuation lines:
//!
//! ```text
//! $<offset hex>[/<array count hex>]#<name>#<first comment line>
//! \<comment line>
//! ```
//!
//! Only the name field honors backslash escapes. Comments are written
//! verbatim, so a `#` in a name or a first comment line does not survive
//! a save and reload.

use std::io::Write;

use super::{
    error::{Error, NlResult},
    symbols::{Offset, Symbol},
};

pub const RECORD_START: char = '$';
pub const CONTINUATION_START: char = '\\';
pub const FIELD_DELIMITER: char = '#';
pub const ARRAY_DELIMITER: char = '/';
pub const ESCAPE: char = '\\';

/// Characters following an escape that decode to something other than themselves
const ESCAPES: [(char, char); 3] = [('r', '\r'), ('n', '\n'), ('t', '\t')];

/// A single classified line of an NL file
#[derive(Debug, PartialEq, Eq)]
pub enum Line<'a> {
    /// Starts a new symbol
    Record(Record),
    /// Continues the comment of the most recent record.
    /// Empty continuations carry no text.
    Continuation(&'a str),
    /// Anything else, including blank lines
    Ignored,
}

/// A parsed record line. A non-zero `array` makes `symbol` the template
/// for that many consecutive elements.
#[derive(Debug, PartialEq, Eq)]
pub struct Record {
    pub symbol: Symbol,
    pub array: u32,
    /// false when the offset field held no hex digits and defaulted to 0
    pub has_offset: bool,
}

impl Record {
    pub fn is_array(&self) -> bool {
        self.array > 0
    }

    /// Element `index` of an array record, `None` once its offset
    /// passes the end of the offset range
    pub fn element(&self, index: u32) -> Option<Symbol> {
        self.symbol.array_element(index)
    }
}

/// Classifies one line. Only record lines can fail.
pub fn parse_line(line: &str) -> NlResult<Line<'_>> {
    if let Some(rest) = line.strip_prefix(CONTINUATION_START) {
        Ok(Line::Continuation(rest.trim_end()))
    } else if let Some(rest) = line.strip_prefix(RECORD_START) {
        Ok(Line::Record(parse_record(rest)?))
    } else {
        Ok(Line::Ignored)
    }
}

/// Parses everything following the `$` of a record line
pub fn parse_record(line: &str) -> NlResult<Record> {
    let (digits, rest) = take_hex(line);
    let has_offset = !digits.is_empty();
    let offset = parse_hex(digits)?;

    let (array, rest) = if let Some(rest) = rest.strip_prefix(ARRAY_DELIMITER) {
        let (digits, rest) = take_hex(rest);
        (parse_hex(digits)?, rest)
    } else {
        (0, rest)
    };

    let rest = rest
        .strip_prefix(FIELD_DELIMITER)
        .ok_or(Error::MissingOffsetDelimiter(offset))?;

    let (name, rest) = decode_name(rest.trim_start());
    let name = name.trim_end().to_owned();
    let rest = rest.ok_or_else(|| Error::MissingNameDelimiter(name.clone()))?;

    let comment = rest.trim();

    Ok(Record {
        symbol: Symbol::with_comment(offset, name, comment),
        array,
        has_offset,
    })
}

/// Decodes a name field up to the first unescaped `#`.
/// Returns the decoded name and the text after the delimiter, or `None`
/// when the field is not terminated.
/// An escape at the very end of the field is dropped.
pub fn decode_name(field: &str) -> (String, Option<&str>) {
    let mut name = String::with_capacity(field.len());
    let mut literal = false;

    for (i, c) in field.char_indices() {
        if literal {
            name.push(unescape(c));
            literal = false;
        } else if c == ESCAPE {
            literal = true;
        } else if c == FIELD_DELIMITER {
            return (name, Some(&field[i + c.len_utf8()..]));
        } else {
            name.push(c);
        }
    }
    (name, None)
}

fn unescape(c: char) -> char {
    ESCAPES
        .iter()
        .find(|(k, _)| *k == c)
        .map(|(_, v)| *v)
        .unwrap_or(c)
}

fn take_hex(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(s.len());
    s.split_at(end)
}

fn parse_hex(digits: &str) -> NlResult<u32> {
    if digits.is_empty() {
        Ok(0)
    } else {
        u32::from_str_radix(digits, 16).map_err(|_| Error::InvalidOffset)
    }
}

/// Writes one symbol as a record line plus its continuation lines.
/// Comment lines that are blank are not written.
pub fn write_symbol(w: &mut dyn Write, sym: &Symbol) -> NlResult<()> {
    let mut lines = sym.comment().split('\n');
    let first = lines.next().unwrap_or("");

    writeln!(
        w,
        "{}{:04X}{}{}{}{}",
        RECORD_START,
        sym.offset(),
        FIELD_DELIMITER,
        sym.name(),
        FIELD_DELIMITER,
        first
    )?;

    for line in lines.filter(|l| !l.trim_end().is_empty()) {
        writeln!(w, "{}{}", CONTINUATION_START, line)?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use crate::core::{error::Error, symbols::Symbol};

    use super::{decode_name, parse_line, parse_record, write_symbol, Line};

    #[test]
    fn simple_record() {
        let rec = parse_record("C000#Reset#entry point  ").unwrap();
        assert_eq!(Symbol::with_comment(0xC000, "Reset", "entry point"), rec.symbol);
        assert_eq!(0, rec.array);
        assert!(rec.has_offset);
    }

    #[test]
    fn whitespace_around_fields() {
        let rec = parse_record("10#  Name   #   the comment\r\n").unwrap();
        assert_eq!("Name", rec.symbol.name());
        assert_eq!("the comment", rec.symbol.comment());
    }

    #[test]
    fn empty_comment() {
        let rec = parse_record("0010#tmp#").unwrap();
        assert_eq!(0x10, rec.symbol.offset());
        assert_eq!("", rec.symbol.comment());
    }

    #[test]
    fn comment_is_not_unescaped() {
        let rec = parse_record("10#A#see \\n and # here").unwrap();
        assert_eq!("see \\n and # here", rec.symbol.comment());
    }

    #[test]
    fn missing_offset_digits() {
        let rec = parse_record("#Name#").unwrap();
        assert!(!rec.has_offset);
        assert_eq!(0, rec.symbol.offset());
    }

    #[test]
    fn offset_out_of_range() {
        assert!(matches!(
            parse_record("123456789#Name#"),
            Err(Error::InvalidOffset)
        ));
    }

    #[test]
    fn missing_delimiters() {
        assert!(matches!(
            parse_record("12 Name#"),
            Err(Error::MissingOffsetDelimiter(0x12))
        ));
        assert!(matches!(
            parse_record("12#Name"),
            Err(Error::MissingNameDelimiter(name)) if name == "Name"
        ));
    }

    #[test]
    fn array_record() {
        let rec = parse_record("1000/3#LIST#note").unwrap();
        assert!(rec.is_array());
        assert_eq!(3, rec.array);
        assert_eq!(
            Some(Symbol::with_comment(0x1002, "LIST[2]", "note")),
            rec.element(2)
        );
    }

    #[test]
    fn array_count_is_hex() {
        let rec = parse_record("0/10#A#").unwrap();
        assert_eq!(16, rec.array);
    }

    #[test]
    fn array_zero_is_plain() {
        let rec = parse_record("20/0#A#").unwrap();
        assert!(!rec.is_array());
        assert_eq!(Symbol::new(0x20, "A"), rec.symbol);
    }

    #[test]
    fn array_element_past_offset_range() {
        let rec = parse_record("FFFFFFFE/3#A#").unwrap();
        assert_eq!(Some(0xFFFFFFFF), rec.element(1).map(|s| s.offset()));
        assert!(rec.element(2).is_none());
    }

    #[test]
    fn escapes() {
        assert_eq!(("a\nb".into(), Some("")), decode_name("a\\nb#"));
        assert_eq!(("a\tb".into(), Some("")), decode_name("a\\tb#"));
        assert_eq!(("a\rb".into(), Some("")), decode_name("a\\rb#"));
        assert_eq!(("a\\b".into(), Some("")), decode_name("a\\\\b#"));
        assert_eq!(("a#b".into(), Some("c")), decode_name("a\\#b#c"));
        assert_eq!(("xy".into(), Some("")), decode_name("\\xy#"));
    }

    #[test]
    fn trailing_escape_is_dropped() {
        assert_eq!(("abc".into(), None), decode_name("abc\\"));
    }

    #[test]
    fn classify_lines() {
        assert_eq!(Line::Continuation("more"), parse_line("\\more  \n").unwrap());
        assert_eq!(Line::Continuation(""), parse_line("\\   ").unwrap());
        assert_eq!(Line::Ignored, parse_line("").unwrap());
        assert_eq!(Line::Ignored, parse_line("; note").unwrap());
        assert!(matches!(parse_line("$10#A#").unwrap(), Line::Record(_)));
    }

    #[test]
    fn write_multiline() {
        let sym = Symbol::with_comment(0x2000, "FOO", "line1\nline2\n\n   \nline3");
        let mut out = Vec::new();
        write_symbol(&mut out, &sym).unwrap();
        assert_eq!(
            "$2000#FOO#line1\n\\line2\n\\line3\n",
            String::from_utf8(out).unwrap()
        );
    }

    #[test]
    fn write_pads_offset() {
        let mut out = Vec::new();
        write_symbol(&mut out, &Symbol::new(0x1F, "X")).unwrap();
        write_symbol(&mut out, &Symbol::new(0x12345, "Y")).unwrap();
        assert_eq!("$001F#X#\n$12345#Y#\n", String::from_utf8(out).unwrap());
    }
}
