use crate::{
    cli::{at, find, report_symbol, save_all, Callback, CallbackKind},
    core::{
        config::{parse_bank, parse_number},
        image::{Address, Image},
        symbols::{Bank, Offset, Symbol},
        table::Table,
    },
    prelude::{Error, NlResult},
};

pub fn default_actions() -> ActionList {
    ActionList {
        actions: vec![
            Action::new(
                "?",
                vec![Param::with_default("command", "")],
                help_parser,
                "Display help",
            ),
            Action::new("q", vec![], exit_parser, "Save and quit"),
            Action::new(
                "p",
                vec![Param::with_default("bank", "")],
                print_parser,
                "List symbols of one or all banks",
            ),
            Action::new(
                "f",
                vec![Param::new("name"), Param::with_default("bank", "")],
                find_parser,
                "Find a symbol by name",
            ),
            Action::new(
                "@",
                vec![Param::new("address")],
                at_parser,
                "Find the symbol at an absolute address",
            ),
            Action::new(
                "a",
                vec![
                    Param::new("bank"),
                    Param::new("offset"),
                    Param::new("name"),
                    Param::with_default("comment", ""),
                ],
                add_parser,
                "Add a symbol",
            ),
            Action::new(
                "c",
                vec![Param::new("bank"), Param::new("offset"), Param::new("comment")],
                comment_parser,
                "Replace the comment of a symbol",
            ),
            Action::new(
                "d",
                vec![Param::new("bank"), Param::new("offset")],
                delete_parser,
                "Delete a symbol",
            ),
            Action::new("w", vec![], save_parser, "Save all banks"),
        ],
    }
}

/// Command syntax:
/// An action name followed by its parameters, split like a shell
/// would split them. Quote names or comments containing spaces:
/// a 0 $8000 Reset "entry point"
pub struct ActionList {
    actions: Vec<Action>,
}

impl ActionList {
    pub fn eval(&self, input: &str) -> NlResult<Commands> {
        let words = shell_words::split(input).map_err(anyhow::Error::from)?;
        let Some((cmd, args)) = words.split_first() else {
            return Ok(Commands::Nop);
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let action = self
            .actions
            .iter()
            .find(|x| x.name == *cmd)
            .ok_or_else(|| Error::UnknownCommand(cmd.into()))?;

        action.eval(&args)
    }

    fn help(&self, f: &mut Callback<'_>, cmd: &str) -> NlResult<()> {
        let mut printed = false;
        for action in &self.actions {
            if action.name.starts_with(cmd) {
                printed = true;
                action.help(f)?;
            }
        }
        if printed {
            Ok(())
        } else {
            Err(Error::UnknownCommand(cmd.into()))
        }
    }
}

#[derive(Default)]
pub struct Param {
    name: String,
    default_value: Option<String>,
}

impl Param {
    fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            default_value: None,
        }
    }

    fn with_default(name: &str, default_value: &str) -> Self {
        Self {
            name: name.into(),
            default_value: Some(default_value.into()),
        }
    }
}

type CommandParser = fn(&[&str], &[Param]) -> NlResult<Commands>;

pub struct Action {
    help: String,
    name: String,
    params: Vec<Param>,
    parser: CommandParser,
}

impl Action {
    fn new(name: &str, params: Vec<Param>, parser: CommandParser, help: &str) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            params,
            parser,
        }
    }

    fn eval(&self, args: &[&str]) -> NlResult<Commands> {
        (self.parser)(args, &self.params)
    }

    fn help(&self, f: &mut Callback<'_>) -> NlResult<()> {
        f(&self.name, CallbackKind::Name)?;
        self.params.iter().try_for_each(|x| {
            if let Some(default_value) = &x.default_value {
                f(
                    &format!(" [{}='{}']", x.name, default_value),
                    CallbackKind::None,
                )
            } else {
                f(&format!(" [{}]", x.name), CallbackKind::None)
            }
        })?;
        f(&format!(" {}\n", self.help), CallbackKind::Comment)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Commands {
    Nop,
    Exit,
    Help(String),
    Print(Option<Bank>),
    Find(String, Option<Bank>),
    At(Address),
    Add(Bank, Symbol),
    Comment(Bank, Offset, String),
    Delete(Bank, Offset),
    Save,
}

impl Commands {
    /// Runs the command. Returns false once the shell should stop.
    pub fn execute(
        &self,
        f: &mut Callback<'_>,
        table: &mut Table,
        image: &dyn Image,
        actions: &ActionList,
    ) -> NlResult<bool> {
        match self {
            Commands::Nop => (),
            Commands::Exit => {
                save_all(table)?;
                return Ok(false);
            }
            Commands::Help(cmd) => actions.help(f, cmd)?,
            Commands::Print(bank) => {
                for page in table
                    .pages()
                    .filter(|page| bank.map_or(true, |b| b == page.bank()))
                {
                    page.symbols()
                        .try_for_each(|sym| report_symbol(f, page.bank(), sym))?;
                }
            }
            Commands::Find(name, bank) => find(f, table, name, *bank)?,
            Commands::At(address) => at(f, table, image, *address)?,
            Commands::Add(bank, sym) => {
                table.add_symbol_at_bank_offset(*bank, sym.offset(), sym.clone())?
            }
            Commands::Comment(bank, offset, comment) => table
                .page_mut(*bank)
                .ok_or(Error::PageNotFound(*bank))?
                .get_symbol_at_offset_mut(*offset)
                .ok_or(Error::SymbolNotFound(*offset))?
                .set_comment(comment.as_str()),
            Commands::Delete(bank, offset) => {
                table.delete_symbol_at_bank_offset(*bank, *offset)?;
            }
            Commands::Save => save_all(table)?,
        }
        Ok(true)
    }
}

/* Command parsers */

fn get_arg_or(args: &[&str], params: &[Param], index: usize) -> NlResult<String> {
    match (args.get(index), params.get(index)) {
        (Some(arg), Some(_)) => Ok(arg.to_string()),
        (None, Some(Param {
            default_value: Some(def),
            ..
        })) => Ok(def.into()),
        _ => Err(Error::InsufficientArguments),
    }
}

fn get_bank_or(args: &[&str], params: &[Param], index: usize) -> NlResult<Option<Bank>> {
    let arg = get_arg_or(args, params, index)?;
    if arg.is_empty() {
        Ok(None)
    } else {
        Ok(Some(parse_bank(&arg)?))
    }
}

fn has_too_many_args(args: &[&str], params: &[Param]) -> NlResult<()> {
    if args.len() > params.len() {
        Err(Error::TooManyArguments)
    } else {
        Ok(())
    }
}

fn help_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;

    let cmd = get_arg_or(args, params, 0)?;

    Ok(Commands::Help(cmd))
}

fn exit_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Exit)
}

fn print_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Print(get_bank_or(args, params, 0)?))
}

fn find_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Find(
        get_arg_or(args, params, 0)?,
        get_bank_or(args, params, 1)?,
    ))
}

fn at_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::At(parse_number(&get_arg_or(args, params, 0)?)?))
}

fn add_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    let bank = parse_bank(&get_arg_or(args, params, 0)?)?;
    let offset = parse_number(&get_arg_or(args, params, 1)?)?;
    let name = get_arg_or(args, params, 2)?;
    let comment = get_arg_or(args, params, 3)?;
    Ok(Commands::Add(
        bank,
        Symbol::with_comment(offset, name, comment),
    ))
}

fn comment_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Comment(
        parse_bank(&get_arg_or(args, params, 0)?)?,
        parse_number(&get_arg_or(args, params, 1)?)?,
        get_arg_or(args, params, 2)?,
    ))
}

fn delete_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Delete(
        parse_bank(&get_arg_or(args, params, 0)?)?,
        parse_number(&get_arg_or(args, params, 1)?)?,
    ))
}

fn save_parser(args: &[&str], params: &[Param]) -> NlResult<Commands> {
    has_too_many_args(args, params)?;
    Ok(Commands::Save)
}
