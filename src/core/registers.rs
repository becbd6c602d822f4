use lazy_static::lazy_static;

use super::{
    page::Page,
    symbols::{Offset, Symbol, REGISTER_BANK},
};

lazy_static! {
    /// Memory mapped PPU, APU and controller ports
    pub static ref REGISTERS: Vec<(Offset, &'static str)> = vec![
        (0x2000, "PPU_CTRL"),
        (0x2001, "PPU_MASK"),
        (0x2002, "PPU_STATUS"),
        (0x2003, "PPU_OAM_ADDR"),
        (0x2004, "PPU_OAM_DATA"),
        (0x2005, "PPU_SCROLL"),
        (0x2006, "PPU_ADDRESS"),
        (0x2007, "PPU_DATA"),
        (0x4000, "SQ1_VOL"),
        (0x4001, "SQ1_SWEEP"),
        (0x4002, "SQ1_LO"),
        (0x4003, "SQ1_HI"),
        (0x4004, "SQ2_VOL"),
        (0x4005, "SQ2_SWEEP"),
        (0x4006, "SQ2_LO"),
        (0x4007, "SQ2_HI"),
        (0x4008, "TRI_LINEAR"),
        // 0x4009 unused
        (0x400A, "TRI_LO"),
        (0x400B, "TRI_HI"),
        (0x400C, "NOISE_VOL"),
        // 0x400D unused
        (0x400E, "NOISE_LO"),
        (0x400F, "NOISE_HI"),
        (0x4010, "DMC_FREQ"),
        (0x4011, "DMC_RAW"),
        (0x4012, "DMC_START"),
        (0x4013, "DMC_LEN"),
        (0x4014, "OAM_DMA"),
        (0x4015, "APU_STATUS"),
        (0x4016, "JOY1"),
        (0x4017, "JOY2_FRAME"),
    ];
}

/// Builds the register pseudo-page
pub fn register_page() -> Page {
    let mut page = Page::new(REGISTER_BANK);
    for (offset, name) in REGISTERS.iter() {
        // offsets and names above are unique
        let _ = page.add_symbol(Symbol::new(*offset, *name));
    }
    page
}
