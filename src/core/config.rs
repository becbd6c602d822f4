use std::path::PathBuf;

use super::{
    error::{Error, NlResult},
    image::Address,
    symbols::{Bank, Offset, Symbol, RAM_BANK, REGISTER_BANK},
};
#[cfg(feature = "cli")]
use clap::{Args, CommandFactory, Parser, Subcommand};
#[cfg(feature = "cli")]
use clap_complete::{generate, Generator, Shell};

/// Parses `$C000`, `0xC000` as hex and anything else as decimal
pub fn parse_number(s: &str) -> NlResult<u32> {
    let s = s.trim();
    let res = if let Some(hex) = s.strip_prefix('$').or_else(|| s.strip_prefix("0x")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    res.map_err(|_| Error::InvalidAddress(s.into()))
}

pub fn parse_usize(s: &str) -> NlResult<usize> {
    Ok(parse_number(s)? as usize)
}

/// A bank number, or `ram` / `regs` for the pseudo-banks.
/// Values outside the `Bank` range are rejected.
pub fn parse_bank(s: &str) -> NlResult<Bank> {
    let s = s.trim();
    let invalid = || Error::InvalidAddress(s.into());
    match s {
        "ram" => Ok(RAM_BANK),
        "regs" => Ok(REGISTER_BANK),
        s => match s.strip_prefix('-') {
            Some(n) => Bank::try_from(parse_number(n)?)
                .ok()
                .and_then(Bank::checked_neg)
                .ok_or_else(invalid),
            None => Bank::try_from(parse_number(s)?).map_err(|_| invalid()),
        },
    }
}

#[cfg_attr(feature = "cli", derive(Args))]
#[derive(Clone, Debug, Default)]
pub struct AddSym {
    #[cfg_attr(feature = "cli", arg(value_parser = parse_bank, allow_hyphen_values = true))]
    pub bank: Bank,
    #[cfg_attr(feature = "cli", arg(value_parser = parse_number))]
    pub offset: Offset,
    pub name: String,
    #[cfg_attr(feature = "cli", arg(default_value = ""))]
    pub comment: String,
}

#[allow(clippy::from_over_into)]
impl Into<Symbol> for AddSym {
    fn into(self) -> Symbol {
        Symbol::with_comment(self.offset, self.name, self.comment)
    }
}

#[cfg_attr(feature = "cli", derive(Subcommand))]
#[derive(Clone, Debug)]
pub enum Commands {
    /// List every symbol of the image
    Dump {
        #[cfg_attr(feature = "cli", arg(long))]
        ron: bool,
    },
    /// Look up a symbol by name
    Find {
        name: String,
        #[cfg_attr(feature = "cli", arg(long, short, value_parser = parse_bank, allow_hyphen_values = true))]
        bank: Option<Bank>,
    },
    /// Look up the symbol at an absolute address
    At {
        #[cfg_attr(feature = "cli", arg(value_parser = parse_number))]
        address: Address,
    },
    /// Add a symbol and save
    Add(AddSym),
    /// Delete a symbol and save
    Del {
        #[cfg_attr(feature = "cli", arg(value_parser = parse_bank, allow_hyphen_values = true))]
        bank: Bank,
        #[cfg_attr(feature = "cli", arg(value_parser = parse_number))]
        offset: Offset,
    },
    /// Interactive symbol editor
    Shell,
}

impl Default for Commands {
    fn default() -> Self {
        Self::Dump { ron: false }
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(author, version, about, long_about = None))]
pub struct Config {
    #[cfg_attr(feature = "cli", command(subcommand))]
    pub command: Commands,

    // program image the nl files belong to
    #[cfg_attr(feature = "cli", clap(long, short))]
    pub rom: Option<PathBuf>,

    #[cfg_attr(feature = "cli", clap(long, short, value_parser = parse_usize, default_value = "0x4000"))]
    pub bank_size: usize,

    // overrides for the sizes read from the image header
    #[cfg_attr(feature = "cli", clap(long, value_parser = parse_usize))]
    pub header_size: Option<usize>,

    #[cfg_attr(feature = "cli", clap(long, value_parser = parse_usize))]
    pub prg_size: Option<usize>,

    #[cfg_attr(feature = "cli", clap(long, value_parser = parse_usize))]
    pub chr_size: Option<usize>,

    #[cfg_attr(feature = "cli", arg(short, long, action = clap::ArgAction::Count))]
    pub verbose: u8,

    #[cfg_attr(feature = "cli", clap(long, value_name = "SHELL"))]
    #[cfg(feature = "cli")]
    pub completions: Option<Shell>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: Default::default(),
            rom: None,
            bank_size: 0x4000,
            header_size: None,
            prg_size: None,
            chr_size: None,
            verbose: 0,
            #[cfg(feature = "cli")]
            completions: None,
        }
    }
}

impl Config {
    #[cfg(feature = "cli")]
    pub fn new() -> Self {
        Self::parse()
    }

    #[cfg(not(feature = "cli"))]
    pub fn new() -> Self {
        Default::default()
    }

    /// The image identifier with `~` and environment variables expanded
    #[cfg(feature = "cli")]
    pub fn rom_file(&self) -> NlResult<Option<String>> {
        self.rom
            .as_ref()
            .map(|path| {
                shellexpand::full(&path.to_string_lossy())
                    .map(|s| s.into_owned())
                    .map_err(|err| Error::Other(anyhow::anyhow!("{}", err)))
            })
            .transpose()
    }

    #[cfg(not(feature = "cli"))]
    pub fn rom_file(&self) -> NlResult<Option<String>> {
        Ok(self
            .rom
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned()))
    }

    #[cfg(feature = "log")]
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(feature = "cli")]
pub fn generate_completion<G: Generator>(gen: G) {
    generate(
        gen,
        &mut Config::command(),
        Config::command().get_name(),
        &mut std::io::stdout(),
    );
}

#[cfg(test)]
mod test {
    use crate::core::{
        error::Error,
        symbols::{Bank, RAM_BANK, REGISTER_BANK},
    };

    use super::{parse_bank, parse_number};

    #[test]
    fn numbers() {
        assert_eq!(0xC000, parse_number("$C000").unwrap());
        assert_eq!(0xC000, parse_number("0xc000").unwrap());
        assert_eq!(16, parse_number("16").unwrap());
        assert!(parse_number("C000").is_err());
        assert!(parse_number("$").is_err());
    }

    #[test]
    fn banks() {
        assert_eq!(RAM_BANK, parse_bank("ram").unwrap());
        assert_eq!(REGISTER_BANK, parse_bank("regs").unwrap());
        assert_eq!(RAM_BANK, parse_bank("-1").unwrap());
        assert_eq!(0x1F, parse_bank("$1F").unwrap());
        assert_eq!(3, parse_bank("3").unwrap());
        assert_eq!(Bank::MAX, parse_bank("0x7FFFFFFF").unwrap());
        assert_eq!(-Bank::MAX, parse_bank("-0x7FFFFFFF").unwrap());
    }

    #[test]
    fn banks_out_of_range() {
        for s in ["-0x80000000", "0xFFFFFFFF", "0x80000000", "-$FFFFFFFF"] {
            assert!(
                matches!(parse_bank(s), Err(Error::InvalidAddress(v)) if v == s),
                "{}",
                s
            );
        }
    }
}
