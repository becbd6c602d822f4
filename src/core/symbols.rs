#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bank-local address of a symbol
pub type Offset = u32;

/// Identifies a page. Ordinary ROM banks are >= 0, the two pseudo-banks
/// below are negative.
pub type Bank = i32;

/// Addresses below the banked window (zero page, work ram, sram)
pub const RAM_BANK: Bank = -1;
/// Built-in hardware register catalog, never persisted
pub const REGISTER_BANK: Bank = -2;

/// A named, commented annotation of one offset.
/// Offset and name are fixed once the symbol exists, since the owning
/// page indexes by both. Only the comment may be edited in place.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    #[cfg_attr(feature = "serde", serde(default))]
    offset: Offset,
    #[cfg_attr(feature = "serde", serde(default))]
    name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    comment: String,
}

impl Symbol {
    pub fn new(offset: Offset, name: impl Into<String>) -> Self {
        Self {
            offset,
            name: name.into(),
            comment: String::new(),
        }
    }

    pub fn with_comment(offset: Offset, name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            offset,
            name: name.into(),
            comment: comment.into(),
        }
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.comment = comment.into();
    }

    /// Appends a continuation line, starting a new comment line
    pub(crate) fn push_comment_line(&mut self, line: &str) {
        self.comment.push('\n');
        self.comment.push_str(line);
    }

    /// Builds element `index` of an array declared by this symbol
    pub(crate) fn array_element(&self, index: u32) -> Option<Symbol> {
        Some(Symbol {
            offset: self.offset.checked_add(index)?,
            name: format!("{}[{}]", self.name, index),
            comment: self.comment.clone(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::Symbol;

    #[test]
    fn default_is_empty() {
        let sym = Symbol::default();
        assert_eq!(0, sym.offset());
        assert_eq!("", sym.name());
        assert_eq!("", sym.comment());
    }

    #[test]
    fn array_element() {
        let sym = Symbol::with_comment(0x1000, "LIST", "note");
        let el = sym.array_element(2).unwrap();
        assert_eq!(0x1002, el.offset());
        assert_eq!("LIST[2]", el.name());
        assert_eq!("note", el.comment());

        let sym = Symbol::new(u32::MAX, "END");
        assert!(sym.array_element(1).is_none());
    }

    #[test]
    fn push_comment_line() {
        let mut sym = Symbol::with_comment(0, "A", "first");
        sym.push_comment_line("second");
        assert_eq!("first\nsecond", sym.comment());
    }
}
