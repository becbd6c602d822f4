use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use super::{
    config::Config,
    error::NlResult,
    symbols::{Bank, RAM_BANK},
};

/// Absolute CPU address
pub type Address = u32;

/// Size of the full address space, used when no image is present
pub const DEFAULT_IMAGE_SIZE: usize = 0x10000;
/// First address of the banked window
pub const BANKED_WINDOW_START: Address = 0x8000;

pub const INES_MAGIC: &[u8; 4] = b"NES\x1A";
pub const INES_HEADER_SIZE: usize = 16;
pub const INES_PRG_UNIT: usize = 0x4000;
pub const INES_CHR_UNIT: usize = 0x2000;

/// What the symbol table needs to know about the loaded program image
pub trait Image {
    /// Path-like identifier NL file names are derived from
    fn rom_file(&self) -> Option<&str>;
    fn bank_size(&self) -> usize;
    /// Header + code + graphics size, `None` when no image is present
    fn image_size(&self) -> Option<usize>;
    /// Bank containing `address`
    fn bank_of(&self, address: Address) -> Bank;

    fn bank_count(&self) -> usize {
        let size = self.image_size().unwrap_or(DEFAULT_IMAGE_SIZE);
        match self.bank_size() {
            0 => 0,
            bank_size => size / bank_size,
        }
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    pub header: usize,
    pub code: usize,
    pub graphics: usize,
}

impl ImageSize {
    pub fn total(&self) -> usize {
        self.header + self.code + self.graphics
    }

    /// Reads the sizes from an iNES header
    pub fn from_ines(header: &[u8]) -> Option<Self> {
        if header.len() < INES_HEADER_SIZE || &header[..4] != INES_MAGIC {
            return None;
        }
        Some(Self {
            header: INES_HEADER_SIZE,
            code: header[4] as usize * INES_PRG_UNIT,
            graphics: header[5] as usize * INES_CHR_UNIT,
        })
    }
}

/// A fixed view of an image: identifier, sizes and the current bank
/// mapping of the banked window.
#[derive(Clone, Debug)]
pub struct ImageInfo {
    rom_file: Option<String>,
    bank_size: usize,
    size: Option<ImageSize>,
    // start of each bank sized window -> selected bank
    mapping: BTreeMap<Address, Bank>,
}

impl Default for ImageInfo {
    fn default() -> Self {
        Self::new(None, 0x4000, None)
    }
}

impl ImageInfo {
    pub fn new(rom_file: Option<String>, bank_size: usize, size: Option<ImageSize>) -> Self {
        Self {
            rom_file,
            bank_size,
            size,
            mapping: BTreeMap::default(),
        }
    }

    /// Builds the image view for the configured rom. A rom without a
    /// readable iNES header is still used as an identifier.
    pub fn from_config(cfg: &Config) -> NlResult<Self> {
        let rom_file = cfg.rom_file()?;
        let header = match &rom_file {
            Some(path) => read_ines_header(Path::new(path)),
            None => None,
        };

        let overridden =
            cfg.header_size.is_some() || cfg.prg_size.is_some() || cfg.chr_size.is_some();

        // without any size information the whole address space is scanned
        let size = if rom_file.is_some() && (header.is_some() || overridden) {
            let h = header.unwrap_or_default();
            Some(ImageSize {
                header: cfg.header_size.unwrap_or(h.header),
                code: cfg.prg_size.unwrap_or(h.code),
                graphics: cfg.chr_size.unwrap_or(h.graphics),
            })
        } else {
            None
        };

        Ok(Self::new(rom_file, cfg.bank_size, size))
    }

    /// Selects `bank` for the window containing `address`
    pub fn map_bank(&mut self, address: Address, bank: Bank) {
        if address < BANKED_WINDOW_START {
            return;
        }
        self.mapping.insert(self.window_start(address), bank);
    }

    fn window_start(&self, address: Address) -> Address {
        let bank_size = self.bank_size.max(1) as Address;
        address - (address - BANKED_WINDOW_START) % bank_size
    }
}

impl Image for ImageInfo {
    fn rom_file(&self) -> Option<&str> {
        self.rom_file.as_deref()
    }

    fn bank_size(&self) -> usize {
        self.bank_size
    }

    fn image_size(&self) -> Option<usize> {
        self.size.map(|s| s.total())
    }

    fn bank_of(&self, address: Address) -> Bank {
        if address < BANKED_WINDOW_START {
            return RAM_BANK;
        }
        let window = self.window_start(address);
        match self.mapping.get(&window) {
            Some(bank) => *bank,
            None => ((address - BANKED_WINDOW_START) / self.bank_size.max(1) as Address) as Bank,
        }
    }
}

fn read_ines_header(path: &Path) -> Option<ImageSize> {
    let mut header = [0; INES_HEADER_SIZE];
    let mut f = File::open(path).ok()?;
    f.read_exact(&mut header).ok()?;
    ImageSize::from_ines(&header)
}
