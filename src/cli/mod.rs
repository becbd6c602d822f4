pub mod interactive;

use std::collections::BTreeMap;

use console::style;

use crate::{
    core::{
        config::{generate_completion, AddSym},
        filename::nl_filename,
        image::{Address, Image, ImageInfo},
        symbols::{Bank, Offset, Symbol, RAM_BANK, REGISTER_BANK},
        table::Table,
    },
    prelude::{Commands, Config, Error, NlResult},
};

/// Hint for how a piece of output should be presented
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallbackKind {
    None,
    Bank,
    Offset,
    Name,
    Comment,
    Error,
}

pub type Callback<'a> = dyn FnMut(&str, CallbackKind) -> NlResult<()> + 'a;

pub fn default_callback(s: &str, kind: CallbackKind) -> NlResult<()> {
    match kind {
        CallbackKind::None => print!("{}", s),
        CallbackKind::Bank => print!("{}", style(s).cyan()),
        CallbackKind::Offset => print!("{}", style(s).yellow()),
        CallbackKind::Name => print!("{}", style(s).green().bold()),
        CallbackKind::Comment => print!("{}", style(s).dim()),
        CallbackKind::Error => eprint!("{}", style(s).red()),
    }
    Ok(())
}

pub fn bank_name(bank: Bank) -> String {
    match bank {
        RAM_BANK => "ram".into(),
        REGISTER_BANK => "regs".into(),
        bank => format!("{:X}", bank),
    }
}

/// Writes one symbol as `bank $offset name` followed by its comment lines
pub fn report_symbol(f: &mut Callback<'_>, bank: Bank, sym: &Symbol) -> NlResult<()> {
    f(&format!("{:>4}", bank_name(bank)), CallbackKind::Bank)?;
    f(" ", CallbackKind::None)?;
    f(&format!("${:04X}", sym.offset()), CallbackKind::Offset)?;
    f(" ", CallbackKind::None)?;
    f(sym.name(), CallbackKind::Name)?;
    f("\n", CallbackKind::None)?;
    for line in sym.comment().lines().filter(|l| !l.is_empty()) {
        f(&format!("            ; {}\n", line), CallbackKind::Comment)?;
    }
    Ok(())
}

pub fn init(cfg: &Config) -> NlResult<()> {
    simple_logger::SimpleLogger::new()
        .with_level(cfg.log_level())
        .init()
        .map_err(anyhow::Error::from)?;

    if let Some(shell) = cfg.completions {
        generate_completion(shell);
        std::process::exit(0);
    }

    let image = ImageInfo::from_config(cfg)?;
    let mut table = Table::new();
    table.load_game_symbols(&image)?;

    let mut f = default_callback;
    match &cfg.command {
        Commands::Dump { ron } => dump(&mut f, &table, *ron),
        Commands::Find { name, bank } => find(&mut f, &table, name, *bank),
        Commands::At { address } => at(&mut f, &table, &image, *address),
        Commands::Add(add) => add_symbol(&mut table, add.clone()),
        Commands::Del { bank, offset } => delete_symbol(&mut table, *bank, *offset),
        Commands::Shell => interactive::command_line(cfg, &image, table),
    }
}

fn dump(f: &mut Callback<'_>, table: &Table, ron: bool) -> NlResult<()> {
    if ron {
        let map: BTreeMap<Bank, Vec<&Symbol>> = table
            .pages()
            .map(|page| (page.bank(), page.symbols().collect()))
            .collect();
        let data = ron::ser::to_string_pretty(&map, ron::ser::PrettyConfig::default())?;
        f(&data, CallbackKind::None)?;
        return f("\n", CallbackKind::None);
    }

    for page in table.pages() {
        for sym in page.symbols() {
            report_symbol(f, page.bank(), sym)?;
        }
    }
    Ok(())
}

pub fn find(f: &mut Callback<'_>, table: &Table, name: &str, bank: Option<Bank>) -> NlResult<()> {
    let found = match bank {
        Some(bank) => table.get_symbol(bank, name).map(|sym| (bank, sym)),
        None => table.get_symbol_with_bank(name),
    };
    match found {
        Some((bank, sym)) => report_symbol(f, bank, sym),
        None => Err(Error::SymbolNameNotFound(name.into())),
    }
}

pub fn at(f: &mut Callback<'_>, table: &Table, image: &dyn Image, address: Address) -> NlResult<()> {
    match table.get_symbol_at_address(image, address) {
        Some((bank, sym)) => report_symbol(f, bank, sym),
        None => Err(Error::SymbolNotFound(address as Offset)),
    }
}

fn add_symbol(table: &mut Table, add: AddSym) -> NlResult<()> {
    let bank = add.bank;
    let offset = add.offset;
    table.add_symbol_at_bank_offset(bank, offset, add.into())?;
    save_page(table, bank)
}

fn delete_symbol(table: &mut Table, bank: Bank, offset: Offset) -> NlResult<()> {
    table.delete_symbol_at_bank_offset(bank, offset)?;
    save_page(table, bank)
}

/// Saves a single page. A page left empty has its file removed since
/// empty pages are never written.
pub fn save_page(table: &Table, bank: Bank) -> NlResult<()> {
    if bank == REGISTER_BANK {
        return Ok(());
    }
    let Some(page) = table.page(bank) else {
        return Ok(());
    };
    let rom_file = table.rom_file().ok_or(Error::NoImage)?;

    if page.is_empty() {
        let path = nl_filename(rom_file, bank);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    } else {
        page.save(Some(rom_file))
    }
}

/// Saves every page, removing the files of pages left empty
pub fn save_all(table: &Table) -> NlResult<()> {
    table
        .pages()
        .try_for_each(|page| save_page(table, page.bank()))
}
