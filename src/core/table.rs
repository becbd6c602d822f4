use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, ErrorKind, Write},
    path::Path,
};

use log::{debug, error, trace, warn};

use super::{
    error::{Error, NlResult},
    filename::nl_filename,
    image::{Address, Image},
    nl::{self, Line},
    page::Page,
    registers::register_page,
    symbols::{Bank, Offset, Symbol, RAM_BANK, REGISTER_BANK},
};

/// Every symbol page of the loaded image, keyed by bank.
///
/// The table remembers the image identifier it was loaded for so that
/// pending edits are flushed to that image's files before a reload.
/// Edits made through the `*_at_bank_offset` calls only reach the disk
/// on `save`.
#[derive(Default, Debug)]
pub struct Table {
    pages: BTreeMap<Bank, Page>,
    rom_file: Option<String>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rom_file(&self) -> Option<&str> {
        self.rom_file.as_deref()
    }

    pub fn set_rom_file(&mut self, rom_file: Option<String>) {
        self.rom_file = rom_file;
    }

    /// Pages in bank order
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    pub fn page(&self, bank: Bank) -> Option<&Page> {
        self.pages.get(&bank)
    }

    pub fn page_mut(&mut self, bank: Bank) -> Option<&mut Page> {
        self.pages.get_mut(&bank)
    }

    /// Loads the NL file of `bank` into a fresh page, replacing any page
    /// already loaded for that bank.
    /// A missing file is not logged, most banks have none.
    pub fn load_file_nl(&mut self, bank: Bank) -> NlResult<()> {
        let rom_file = self.rom_file.as_deref().ok_or(Error::NoImage)?;
        let path = nl_filename(rom_file, bank);
        trace!("Looking for NL file '{}'", path.display());

        let f = match File::open(&path) {
            Ok(f) => f,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::NlFileNotFound(path))
            }
            Err(err) => {
                warn!("Unable to open '{}': {}", path.display(), err);
                return Err(err.into());
            }
        };
        debug!("Loading NL file '{}'", path.display());

        self.load_nl(bank, BufReader::new(f), &path)
    }

    /// Parses NL records from `reader` into a new page for `bank`.
    /// The page is registered before parsing, so an empty or fully
    /// malformed file still yields an empty page.
    /// Malformed records and collisions are logged and skipped.
    pub fn load_nl(&mut self, bank: Bank, reader: impl BufRead, path: &Path) -> NlResult<()> {
        let page = self.pages.entry(bank).or_default();
        *page = Page::new(bank);

        // offset of the symbol continuation lines attach to
        let mut open: Option<Offset> = None;

        for (i, raw) in reader.split(b'\n').enumerate() {
            let line_num = i + 1;
            let raw = raw.map_err(|err| {
                error!("Unable to read line {} of file {}: {}", line_num, path.display(), err);
                err
            })?;
            let line = String::from_utf8_lossy(&raw);

            let record = match nl::parse_line(&line) {
                Ok(Line::Continuation(text)) => {
                    if let (Some(offset), false) = (open, text.is_empty()) {
                        if let Some(sym) = page.get_symbol_at_offset_mut(offset) {
                            sym.push_comment_line(text);
                        }
                    }
                    continue;
                }
                Ok(Line::Ignored) => continue,
                Ok(Line::Record(record)) => record,
                Err(err) => {
                    open = None;
                    error!("{} on line {} of file {}", err, line_num, path.display());
                    continue;
                }
            };

            open = None;
            if !record.has_offset {
                warn!("Invalid offset on line {} of file {}", line_num, path.display());
            }

            if !record.is_array() {
                let offset = record.symbol.offset();
                match page.add_symbol(record.symbol) {
                    Ok(()) => open = Some(offset),
                    Err(err) => log_add_failure(&err, path, line_num),
                }
                continue;
            }

            for i in 0..record.array {
                let Some(sym) = record.element(i) else {
                    // every later element overflows as well
                    let err = Error::OffsetOverflow(record.symbol.offset(), i);
                    error!("{} on line {} of file {}", err, line_num, path.display());
                    break;
                };
                if let Err(err) = page.add_symbol(sym) {
                    log_add_failure(&err, path, line_num);
                }
            }
        }
        Ok(())
    }

    /// Installs the built-in hardware register page, replacing any
    /// previous one
    pub fn load_register_map(&mut self) -> NlResult<()> {
        self.pages.insert(REGISTER_BANK, register_page());
        Ok(())
    }

    /// Flushes and discards the current symbols, then loads every NL file
    /// that exists for `image`
    pub fn load_game_symbols(&mut self, image: &dyn Image) -> NlResult<()> {
        self.save();
        self.clear();
        self.rom_file = image.rom_file().map(Into::into);

        if self.rom_file.is_none() {
            debug!("No image identifier, only loading registers");
        }

        // missing files are the normal case
        let _ = self.load_file_nl(RAM_BANK);
        self.load_register_map()?;

        let banks = image.bank_count();
        debug!("Loading symbols for {} banks", banks);
        for bank in 0..banks {
            let _ = self.load_file_nl(bank as Bank);
        }
        Ok(())
    }

    /// Adds `sym` at `offset` of `bank`, creating the page if needed.
    /// `offset` takes precedence over the symbol's own offset.
    pub fn add_symbol_at_bank_offset(
        &mut self,
        bank: Bank,
        offset: Offset,
        sym: Symbol,
    ) -> NlResult<()> {
        let sym = if sym.offset() == offset {
            sym
        } else {
            Symbol::with_comment(offset, sym.name(), sym.comment())
        };

        self.pages
            .entry(bank)
            .or_insert_with(|| Page::new(bank))
            .add_symbol(sym)
    }

    pub fn delete_symbol_at_bank_offset(&mut self, bank: Bank, offset: Offset) -> NlResult<Symbol> {
        self.pages
            .get_mut(&bank)
            .ok_or(Error::PageNotFound(bank))?
            .delete_symbol_at_offset(offset)
    }

    pub fn get_symbol_at_bank_offset(&self, bank: Bank, offset: Offset) -> Option<&Symbol> {
        self.pages.get(&bank)?.get_symbol_at_offset(offset)
    }

    pub fn get_symbol(&self, bank: Bank, name: &str) -> Option<&Symbol> {
        self.pages.get(&bank)?.get_symbol(name)
    }

    /// First match in bank order, so the lowest bank wins
    pub fn get_symbol_at_any_bank(&self, name: &str) -> Option<&Symbol> {
        self.get_symbol_with_bank(name).map(|(_, sym)| sym)
    }

    /// Like `get_symbol_at_any_bank`, also reporting the bank
    pub fn get_symbol_with_bank(&self, name: &str) -> Option<(Bank, &Symbol)> {
        self.pages
            .iter()
            .find_map(|(bank, page)| Some((*bank, page.get_symbol(name)?)))
    }

    /// Resolves an absolute address through the image's bank mapping.
    /// Ram addresses fall back to the register page.
    pub fn get_symbol_at_address(
        &self,
        image: &dyn Image,
        address: Address,
    ) -> Option<(Bank, &Symbol)> {
        let bank = image.bank_of(address);
        if let Some(sym) = self.get_symbol_at_bank_offset(bank, address) {
            return Some((bank, sym));
        }
        if bank == RAM_BANK {
            return self
                .get_symbol_at_bank_offset(REGISTER_BANK, address)
                .map(|sym| (REGISTER_BANK, sym));
        }
        None
    }

    /// Saves every page. Failures are logged by the pages.
    pub fn save(&self) {
        for page in self.pages() {
            let _ = page.save(self.rom_file());
        }
    }

    pub fn clear(&mut self) {
        self.pages.clear();
    }

    pub fn dump(&self, w: &mut dyn Write) -> NlResult<()> {
        self.pages().try_for_each(|page| page.dump(w))
    }

    pub fn print(&self) {
        for page in self.pages() {
            page.print();
        }
    }
}

fn log_add_failure(err: &Error, path: &Path, line_num: usize) {
    error!(
        "Failed to add symbol on line {} of file {}: {}",
        line_num,
        path.display(),
        err
    );
}
