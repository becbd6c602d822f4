use std::{
    collections::{BTreeMap, HashMap},
    fs::File,
    io::{BufWriter, Write},
};

use log::{debug, error, warn};

use super::{
    error::{Error, NlResult},
    filename::nl_filename,
    nl,
    symbols::{Bank, Offset, Symbol, REGISTER_BANK},
};

/// All symbols of one bank.
/// Symbols are owned by the offset index, the name index only refers
/// back to offsets. Both always hold the same set of symbols.
#[derive(Default, Clone, Debug)]
pub struct Page {
    bank: Bank,
    symbols: BTreeMap<Offset, Symbol>,
    names: HashMap<String, Offset>,
}

impl Page {
    pub fn new(bank: Bank) -> Self {
        Self {
            bank,
            ..Default::default()
        }
    }

    pub fn bank(&self) -> Bank {
        self.bank
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in offset order
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.values()
    }

    /// Adds a symbol unless its offset or its name is already taken.
    /// Neither index changes on failure.
    pub fn add_symbol(&mut self, sym: Symbol) -> NlResult<()> {
        if self.symbols.contains_key(&sym.offset()) {
            return Err(Error::DuplicateOffset(sym.offset()));
        }
        if self.names.contains_key(sym.name()) {
            return Err(Error::DuplicateName(sym.name().into()));
        }

        self.names.insert(sym.name().into(), sym.offset());
        self.symbols.insert(sym.offset(), sym);
        Ok(())
    }

    pub fn get_symbol_at_offset(&self, offset: Offset) -> Option<&Symbol> {
        self.symbols.get(&offset)
    }

    /// Only the comment of the returned symbol can be changed
    pub fn get_symbol_at_offset_mut(&mut self, offset: Offset) -> Option<&mut Symbol> {
        self.symbols.get_mut(&offset)
    }

    pub fn get_symbol(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(self.names.get(name)?)
    }

    /// Removes the symbol at `offset` from both indexes
    pub fn delete_symbol_at_offset(&mut self, offset: Offset) -> NlResult<Symbol> {
        let sym = self
            .symbols
            .remove(&offset)
            .ok_or(Error::SymbolNotFound(offset))?;
        self.names.remove(sym.name());
        Ok(sym)
    }

    /// Writes every symbol in offset order
    pub fn write(&self, w: &mut dyn Write) -> NlResult<()> {
        self.symbols().try_for_each(|sym| nl::write_symbol(w, sym))
    }

    /// Persists the page to its NL file. Empty pages and the register
    /// page are skipped without touching any file.
    pub fn save(&self, rom_file: Option<&str>) -> NlResult<()> {
        if self.is_empty() {
            debug!("Skipping empty symbol page {}", self.bank);
            return Ok(());
        }
        if self.bank == REGISTER_BANK {
            debug!("Skipping register symbol page");
            return Ok(());
        }

        let Some(rom_file) = rom_file else {
            warn!("Unable to save symbol page {}: no image loaded", self.bank);
            return Err(Error::NoImage);
        };
        let path = nl_filename(rom_file, self.bank);

        let f = File::create(&path).map_err(|err| {
            error!("Could not open file '{}' for writing: {}", path.display(), err);
            err
        })?;
        let mut w = BufWriter::new(f);
        self.write(&mut w)
            .and_then(|_| Ok(w.flush()?))
            .map_err(|err| {
                error!("Unable to write '{}': {}", path.display(), err);
                err
            })?;

        debug!("Saved {} symbols to '{}'", self.len(), path.display());
        Ok(())
    }

    /// Human readable listing of the page
    pub fn dump(&self, w: &mut dyn Write) -> NlResult<()> {
        writeln!(w, "Page: {:X}", self.bank)?;
        for sym in self.symbols() {
            writeln!(w, "   Sym: ${:04X} '{}'", sym.offset(), sym.name())?;
        }
        Ok(())
    }

    pub fn print(&self) {
        if let Err(err) = self.dump(&mut std::io::stdout().lock()) {
            error!("Unable to print symbol page {}: {}", self.bank, err);
        }
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::tempdir;

    use crate::core::{
        error::Error,
        symbols::{Symbol, REGISTER_BANK},
    };

    use super::Page;

    fn assert_consistent(page: &Page) {
        assert_eq!(page.symbols.len(), page.names.len());
        for (name, offset) in page.names.iter() {
            assert_eq!(name, page.symbols[offset].name());
        }
        for (offset, sym) in page.symbols.iter() {
            assert_eq!(*offset, sym.offset());
            assert_eq!(Some(offset), page.names.get(sym.name()));
        }
    }

    #[test]
    fn add_and_get() {
        let mut page = Page::new(0);
        page.add_symbol(Symbol::with_comment(0x10, "A", "first"))
            .unwrap();
        page.add_symbol(Symbol::new(0x08, "B")).unwrap();

        assert_eq!("A", page.get_symbol_at_offset(0x10).unwrap().name());
        assert_eq!(0x08, page.get_symbol("B").unwrap().offset());
        assert!(page.get_symbol("C").is_none());
        assert!(page.get_symbol_at_offset(0x11).is_none());

        let order: Vec<_> = page.symbols().map(|s| s.offset()).collect();
        assert_eq!(vec![0x08, 0x10], order);
        assert_consistent(&page);
    }

    #[test]
    fn duplicates_are_rejected() {
        let mut page = Page::new(0);
        page.add_symbol(Symbol::new(0x10, "A")).unwrap();

        assert!(matches!(
            page.add_symbol(Symbol::new(0x10, "B")),
            Err(Error::DuplicateOffset(0x10))
        ));
        assert!(matches!(
            page.add_symbol(Symbol::new(0x20, "A")),
            Err(Error::DuplicateName(_))
        ));

        assert_eq!(1, page.len());
        assert!(page.get_symbol("B").is_none());
        assert!(page.get_symbol_at_offset(0x20).is_none());
        assert_consistent(&page);
    }

    #[test]
    fn delete() {
        let mut page = Page::new(0);
        page.add_symbol(Symbol::new(0x10, "A")).unwrap();
        page.add_symbol(Symbol::new(0x20, "B")).unwrap();

        let removed = page.delete_symbol_at_offset(0x10).unwrap();
        assert_eq!("A", removed.name());
        assert!(page.get_symbol("A").is_none());
        assert!(matches!(
            page.delete_symbol_at_offset(0x10),
            Err(Error::SymbolNotFound(0x10))
        ));
        assert_consistent(&page);

        // the name is free again
        page.add_symbol(Symbol::new(0x30, "A")).unwrap();
        assert_consistent(&page);
    }

    #[test]
    fn edit_comment() {
        let mut page = Page::new(0);
        page.add_symbol(Symbol::new(0x10, "A")).unwrap();
        page.get_symbol_at_offset_mut(0x10)
            .unwrap()
            .set_comment("changed");
        assert_eq!("changed", page.get_symbol("A").unwrap().comment());
    }

    #[test]
    fn save_writes_in_offset_order() {
        let dir = tempdir().expect("tempdir");
        let rom = dir.path().join("game.nes");
        let rom = rom.to_str().unwrap();

        let mut page = Page::new(2);
        page.add_symbol(Symbol::with_comment(0x8100, "Second", "b"))
            .unwrap();
        page.add_symbol(Symbol::with_comment(0x8000, "First", "a\nmore"))
            .unwrap();
        page.save(Some(rom)).unwrap();

        let text = fs::read_to_string(dir.path().join("game.nes.2.nl")).unwrap();
        assert_eq!("$8000#First#a\n\\more\n$8100#Second#b\n", text);
    }

    #[test]
    fn save_skips_empty_and_registers() {
        let dir = tempdir().expect("tempdir");
        let rom = dir.path().join("game.nes");
        let rom = rom.to_str().unwrap();

        Page::new(0).save(Some(rom)).unwrap();
        Page::new(0).save(None).unwrap();

        let mut regs = Page::new(REGISTER_BANK);
        regs.add_symbol(Symbol::new(0x2000, "PPU_CTRL")).unwrap();
        regs.save(Some(rom)).unwrap();

        assert_eq!(0, fs::read_dir(dir.path()).unwrap().count());
    }

    #[test]
    fn save_without_image() {
        let mut page = Page::new(0);
        page.add_symbol(Symbol::new(0x10, "A")).unwrap();
        assert!(matches!(page.save(None), Err(Error::NoImage)));
    }

    #[test]
    fn save_unwritable() {
        let dir = tempdir().expect("tempdir");
        let rom = dir.path().join("missing").join("game.nes");

        let mut page = Page::new(0);
        page.add_symbol(Symbol::new(0x10, "A")).unwrap();
        assert!(matches!(
            page.save(Some(rom.to_str().unwrap())),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn dump() {
        let mut page = Page::new(0x1A);
        page.add_symbol(Symbol::new(0x10, "A")).unwrap();
        let mut out = Vec::new();
        page.dump(&mut out).unwrap();
        assert_eq!("Page: 1A\n   Sym: $0010 'A'\n", String::from_utf8(out).unwrap());
    }
}
