//! Line loop shared by the interactive prompt and script mode.

use std::io::{self, BufRead, Lines, StdinLock};

use rustyline::{error::ReadlineError, history::DefaultHistory, Cmd, Editor, KeyEvent};

use crate::cli::completion::WizardHelper;
use crate::cli::core::{CliError, CliMode, CliOptions, CommandError, LoopControl, ShellContext};
use crate::cli::output;

/// Where wizard commands are read from.
enum LineSource {
    Prompt(Box<Editor<WizardHelper, DefaultHistory>>),
    Script(Lines<StdinLock<'static>>),
}

impl LineSource {
    fn open(mode: CliMode, context: &ShellContext) -> Result<Self, CliError> {
        match mode {
            CliMode::Script => Ok(LineSource::Script(io::stdin().lock().lines())),
            CliMode::Interactive => {
                let mut editor = Editor::<WizardHelper, DefaultHistory>::new()?;
                editor.set_helper(Some(WizardHelper::new(context.command_names())));
                editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
                output::section("Listing Wizard");
                output::hint("Type `help` for commands, `next` to move through the steps.");
                Ok(LineSource::Prompt(Box::new(editor)))
            }
        }
    }

    /// Next line, or `None` once input is exhausted.
    fn next_line(&mut self, prompt: &str) -> Result<Option<String>, CliError> {
        match self {
            LineSource::Script(lines) => Ok(lines.next().transpose()?),
            LineSource::Prompt(editor) => loop {
                match editor.readline(prompt) {
                    Ok(line) => {
                        if !line.trim().is_empty() {
                            editor.add_history_entry(line.trim()).ok();
                        }
                        return Ok(Some(line));
                    }
                    Err(ReadlineError::Interrupted) => {
                        output::info("Interrupted. Type `exit` to leave the wizard.");
                    }
                    Err(ReadlineError::Eof) => {
                        output::info("Exiting wizard.");
                        return Ok(None);
                    }
                    Err(err) => return Err(err.into()),
                }
            },
        }
    }
}

pub fn run_cli(options: &CliOptions) -> Result<(), CliError> {
    let mut context = ShellContext::new(options)?;
    let mut source = LineSource::open(options.mode, &context)?;

    while context.running {
        let Some(line) = source.next_line(&context.prompt())? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match handle_line(&mut context, line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }

    context.session.teardown();
    Ok(())
}

pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not read that line: {err}"));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();

    context.last_command = Some(line.to_string());
    tracing::debug!(mode = ?context.mode, line, "wizard command");

    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}
