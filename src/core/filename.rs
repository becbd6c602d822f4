use std::path::PathBuf;

use super::{
    error::{Error, NlResult},
    image::{Address, Image},
    symbols::Bank,
};

pub const NL_EXTENSION: &str = "nl";
pub const RAM_SUFFIX: &str = "ram";

/// Derives the NL file of `bank` for the image identified by `rom_file`.
/// `|` in the identifier becomes `.`, negative banks use the ram file.
pub fn nl_filename(rom_file: &str, bank: Bank) -> PathBuf {
    let mut name = rom_file.replace('|', ".");
    if bank < 0 {
        name.push_str(&format!(".{}.{}", RAM_SUFFIX, NL_EXTENSION));
    } else {
        name.push_str(&format!(".{:X}.{}", bank, NL_EXTENSION));
    }
    PathBuf::from(name)
}

pub fn nl_filename_for_bank(image: &dyn Image, bank: Bank) -> NlResult<PathBuf> {
    Ok(nl_filename(image.rom_file().ok_or(Error::NoImage)?, bank))
}

/// The NL file holding symbols for an absolute address
pub fn nl_filename_for_address(image: &dyn Image, address: Address) -> NlResult<PathBuf> {
    nl_filename_for_bank(image, image.bank_of(address))
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use crate::core::{
        error::Error,
        image::ImageInfo,
        symbols::{RAM_BANK, REGISTER_BANK},
    };

    use super::{nl_filename, nl_filename_for_address, nl_filename_for_bank};

    #[test]
    fn banks() {
        assert_eq!(PathBuf::from("game.nes.0.nl"), nl_filename("game.nes", 0));
        assert_eq!(PathBuf::from("game.nes.1F.nl"), nl_filename("game.nes", 0x1F));
        assert_eq!(PathBuf::from("game.nes.ram.nl"), nl_filename("game.nes", RAM_BANK));
    }

    #[test]
    fn pipes_are_replaced() {
        assert_eq!(
            PathBuf::from("roms/pack.zip.game.nes.A.nl"),
            nl_filename("roms/pack.zip|game.nes", 10)
        );
    }

    #[test]
    fn no_image() {
        let image = ImageInfo::default();
        assert!(matches!(
            nl_filename_for_bank(&image, REGISTER_BANK),
            Err(Error::NoImage)
        ));
    }

    #[test]
    fn address() {
        let image = ImageInfo::new(Some("g.nes".into()), 0x4000, None);
        assert_eq!(
            PathBuf::from("g.nes.ram.nl"),
            nl_filename_for_address(&image, 0x0300).unwrap()
        );
        assert_eq!(
            PathBuf::from("g.nes.1.nl"),
            nl_filename_for_address(&image, 0xC000).unwrap()
        );
    }
}
