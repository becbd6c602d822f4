pub mod command;

use crate::{
    cli::{default_callback, save_all, Callback, CallbackKind},
    core::{image::Image, table::Table},
    prelude::{Config, NlResult},
};
use rustyline::error::ReadlineError;

use self::command::{default_actions, ActionList};

pub struct Interactive<'a> {
    pub actions: ActionList,
    pub table: Table,
    pub image: &'a dyn Image,
}

impl Interactive<'_> {
    /// Evaluates one input line. Returns false once the user quit.
    pub fn execute(&mut self, f: &mut Callback<'_>, line: &str) -> NlResult<bool> {
        let cmd = self.actions.eval(line)?;
        cmd.execute(f, &mut self.table, self.image, &self.actions)
    }
}

pub fn command_line(_cfg: &Config, image: &dyn Image, table: Table) -> NlResult<()> {
    let mut rl = rustyline::DefaultEditor::new().map_err(anyhow::Error::from)?;
    let actions = default_actions();
    let mut interactive = Interactive {
        actions,
        table,
        image,
    };
    let mut f = default_callback;
    loop {
        let readline = rl.readline(">> ");
        match readline {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                match interactive.execute(&mut f, &line) {
                    Ok(true) => (),
                    Ok(false) => return Ok(()),
                    Err(err) => f(&format!("{}\n", err), CallbackKind::Error)?,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                return save_all(&interactive.table)
            }
            Err(err) => f(&format!("{}\n", err), CallbackKind::Error)?,
        }
    }
}
