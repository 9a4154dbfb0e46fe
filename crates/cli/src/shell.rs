//! The interactive papercat shell.
//!
//! Lines are tokenized by whitespace and dispatched against the catalog
//! index. Malformed input reports the command's usage and keeps the loop
//! alive; only a readline failure ends the session from the inside.

use anyhow::{anyhow, Context as _, Result};
use colored::Colorize;
use std::process::Command;

use papercat_core::config::AppConfig;
use papercat_core::error::CatalogError;
use papercat_core::index::{Criterion, Index, Mutation};

use crate::render;

const LIST_USAGE: &str =
    "usage: list [<criterion>] — <criterion> is [t1,t2,...] (no spaces) or a partial name";
const TAG_USAGE: &str = "usage: tag <position|all> <tag>";
const UNTAG_USAGE: &str = "usage: untag <position> <tag>";
const TAG_IF_USAGE: &str =
    "usage: tag_if <condition> <tag> — <condition> is [t1,t2,...] (no spaces) or a partial name";
const UNTAG_IF_USAGE: &str =
    "usage: untag_if <condition> <tag> — <condition> is [t1,t2,...] (no spaces) or a partial name";
const OPEN_USAGE: &str = "usage: open <position>";

/// One interactive session: the catalog index plus the loaded config.
pub struct Session {
    index: Index,
    config: AppConfig,
}

#[derive(Debug)]
pub enum Control {
    Continue,
    Exit,
}

impl Session {
    pub fn new(index: Index, config: AppConfig) -> Session {
        Session { index, config }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Executes one shell line. Errors carry the usage text for malformed
    /// input; the caller decides whether they end the session (they never
    /// do interactively).
    pub fn dispatch(&mut self, line: &str) -> Result<Control> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Control::Continue);
        }
        let (cmd, arg) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (line, ""),
        };

        match cmd {
            "help" | "?" => {
                print_help();
                Ok(Control::Continue)
            }
            "bye" | "quit" | "exit" => {
                println!("come again.");
                Ok(Control::Exit)
            }
            "list" | "ls" => {
                self.cmd_list(arg)?;
                Ok(Control::Continue)
            }
            "tag" => {
                self.cmd_tag(arg)?;
                Ok(Control::Continue)
            }
            "untag" => {
                self.cmd_untag(arg)?;
                Ok(Control::Continue)
            }
            "tag_if" => {
                self.cmd_apply_if(arg, true)?;
                Ok(Control::Continue)
            }
            "untag_if" => {
                self.cmd_apply_if(arg, false)?;
                Ok(Control::Continue)
            }
            "tags" => {
                render::print_tag_grid(&self.index.all_tags());
                Ok(Control::Continue)
            }
            "open" => {
                self.cmd_open(arg)?;
                Ok(Control::Continue)
            }
            "refresh" => {
                self.cmd_refresh()?;
                Ok(Control::Continue)
            }
            "dump" => {
                self.cmd_dump()?;
                Ok(Control::Continue)
            }
            _ => Err(anyhow!("unknown command `{cmd}` (type `help`)")),
        }
    }

    fn cmd_list(&self, arg: &str) -> Result<()> {
        let criterion = Criterion::parse(arg).map_err(|e| boundary(e, LIST_USAGE))?;
        render::print_listing(&self.index.list(&criterion));
        Ok(())
    }

    fn cmd_tag(&mut self, arg: &str) -> Result<()> {
        let (target, tag) = two_args(arg, TAG_USAGE)?;
        if target == "all" {
            let changed = self
                .index
                .tag_all(tag)
                .map_err(|e| boundary(e, TAG_USAGE))?;
            println!("tagged {changed} entries");
        } else {
            let position = parse_position(target, TAG_USAGE)?;
            self.index
                .tag_at(position, tag)
                .map_err(|e| boundary(e, TAG_USAGE))?;
        }
        Ok(())
    }

    fn cmd_untag(&mut self, arg: &str) -> Result<()> {
        let (target, tag) = two_args(arg, UNTAG_USAGE)?;
        let position = parse_position(target, UNTAG_USAGE)?;
        self.index
            .untag_at(position, tag)
            .map_err(|e| boundary(e, UNTAG_USAGE))?;
        Ok(())
    }

    fn cmd_apply_if(&mut self, arg: &str, add: bool) -> Result<()> {
        let usage = if add { TAG_IF_USAGE } else { UNTAG_IF_USAGE };
        let (condition, tag) = two_args(arg, usage)?;
        let mutation = if add {
            Mutation::tag(tag)
        } else {
            Mutation::untag(tag)
        }
        .map_err(|e| boundary(e, usage))?;

        let changed = match Criterion::parse(condition).map_err(|e| boundary(e, usage))? {
            Criterion::Tags(required) => self.index.apply_by_tags(&mutation, &required),
            Criterion::Name(needle) => self.index.apply_by_name(&mutation, &needle),
            // Unreachable from a non-empty token, but harmless: an empty
            // needle matches every record.
            Criterion::All => self.index.apply_by_name(&mutation, ""),
        }
        .map_err(|e| boundary(e, usage))?;
        println!("changed {changed} entries");
        Ok(())
    }

    fn cmd_open(&self, arg: &str) -> Result<()> {
        let position = parse_position(one_arg(arg, OPEN_USAGE)?, OPEN_USAGE)?;
        let record = self
            .index
            .record_at(position)
            .map_err(|e| boundary(e, OPEN_USAGE))?;
        let viewer = &self.config.viewer.command;
        let status = Command::new(viewer)
            .arg(record.path())
            .status()
            .with_context(|| format!("failed to launch viewer `{viewer}`"))?;
        if !status.success() {
            tracing::warn!(%viewer, code = ?status.code(), "viewer exited with failure");
        }
        Ok(())
    }

    fn cmd_refresh(&mut self) -> Result<()> {
        let root = self.index.root().to_path_buf();
        // Build into a fresh value so a failed rescan leaves the old
        // catalog usable.
        let rebuilt = Index::build(&root, &self.config.catalog.exclude)?;
        self.index = rebuilt;
        println!("rescanned {} entries", self.index.len());
        Ok(())
    }

    fn cmd_dump(&self) -> Result<()> {
        let rows: Vec<serde_json::Value> = self
            .index
            .list(&Criterion::All)
            .into_iter()
            .map(|(position, record)| {
                serde_json::json!({
                    "position": position,
                    "name": record.name(),
                    "path": record.path(),
                    "tags": record.tags(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        Ok(())
    }
}

/// Usage-class catalog errors pick up the command's usage text; everything
/// else passes through unchanged.
fn boundary(err: CatalogError, usage: &str) -> anyhow::Error {
    if err.is_usage() {
        anyhow!("{err}\n{usage}")
    } else {
        err.into()
    }
}

fn one_arg<'a>(arg: &'a str, usage: &str) -> Result<&'a str> {
    let mut parts = arg.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(a), None) => Ok(a),
        _ => Err(anyhow!("expected one argument\n{usage}")),
    }
}

fn two_args<'a>(arg: &'a str, usage: &str) -> Result<(&'a str, &'a str)> {
    let mut parts = arg.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(anyhow!("expected two arguments\n{usage}")),
    }
}

fn parse_position(token: &str, usage: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| anyhow!("`{token}` is not a position\n{usage}"))
}

fn print_help() {
    println!(
        "\
Commands:
  list [<criterion>]        list entries; <criterion> is [t1,t2,...] (no
                            spaces) or a partial name
  ls [<criterion>]          short for list
  tag <position|all> <tag>  tag one entry, or every entry with `all`
  untag <position> <tag>    remove a tag from one entry
  tag_if <cond> <tag>       tag entries matching <cond> ([tags] or name part)
  untag_if <cond> <tag>     untag entries matching <cond>
  tags                      list every tag in the catalog
  open <position>           open an entry with the configured viewer
  refresh                   rescan the catalog directory
  dump                      print the catalog as JSON
  help, ?                   this text
  bye, quit, exit           leave papercat"
    );
}

/// The rustyline-backed interactive loop.
pub fn run_interactive(session: &mut Session) -> Result<()> {
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    println!("{}", "Welcome to PaperCat!".green().bold());
    println!("\n? for help.\n");

    let mut rl = DefaultEditor::new().map_err(|e| anyhow!("failed to init rustyline: {e}"))?;

    loop {
        let line = match rl.readline("papercat> ") {
            Ok(l) => l,
            Err(ReadlineError::Eof) => break,
            Err(ReadlineError::Interrupted) => continue,
            Err(e) => return Err(anyhow!("readline error: {e}")),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        rl.add_history_entry(line)
            .map_err(|e| anyhow!("failed to record history: {e}"))?;

        match session.dispatch(line) {
            Ok(Control::Continue) => {}
            Ok(Control::Exit) => break,
            Err(e) => eprintln!("{} {e}", "error:".red().bold()),
        }
    }

    Ok(())
}

/// Non-interactive execution of command lines against one session.
pub fn run_script(session: &mut Session, commands: &[String], keep_going: bool) -> Result<()> {
    for (idx, raw) in commands.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        println!("papercat> {line}");
        match session.dispatch(line) {
            Ok(Control::Continue) => {}
            Ok(Control::Exit) => break,
            Err(e) => {
                if keep_going {
                    eprintln!("{} {e}", "error:".red().bold());
                } else {
                    return Err(anyhow!("command {} failed: {e}", idx + 1));
                }
            }
        }
    }
    Ok(())
}
