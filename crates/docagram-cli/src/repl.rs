//! Interactive REPL (Read-Eval-Print Loop) mode.

use crate::cli::{
    AnalyzeArgs, Command, DeleteArgs, DiagramArgs, EntitiesArgs, FileArgs, InputArgs, OptionsAction,
    OptionsArgs, SelectArgs,
};
use crate::commands;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use docagram_domain::Direction;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::{Path, PathBuf};

/// Run the interactive REPL over `session`.
///
/// The session file is written after every command that changes it.
pub async fn run_repl(
    session: &mut Session,
    config: &mut Config,
    config_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    println!("{}", formatter.info("Docagram REPL - Type 'help' for commands, 'exit' to quit"));
    println!(
        "{}",
        formatter.info(&format!(
            "Session {} ({} relationships)",
            session.path().display(),
            session.store.len()
        ))
    );
    println!();

    let editor_config = rustyline::Config::builder()
        .max_history_size(config.settings.history_size)
        .map_err(|e| CliError::Config(format!("Invalid history size: {}", e)))?
        .build();
    let mut editor = DefaultEditor::with_config(editor_config)
        .map_err(|e| CliError::Io(std::io::Error::other(format!("Failed to initialize editor: {}", e))))?;

    let history_path = get_history_path()?;
    let _ = editor.load_history(&history_path);

    loop {
        let prompt = match session.store.selected_entity() {
            Some(name) => format!("docagram [{}]> ", name),
            None => "docagram> ".to_string(),
        };

        match editor.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                editor.add_history_entry(line).ok();

                match parse_repl_command(line) {
                    Ok(ReplCommand::Exit) => {
                        println!("{}", formatter.info("Goodbye!"));
                        break;
                    }
                    Ok(ReplCommand::Help) => {
                        print_help(formatter);
                    }
                    Ok(ReplCommand::Command(cmd)) => {
                        if let Err(e) = execute_command(cmd, session, config, config_path, formatter).await {
                            eprintln!("{}", formatter.error(&e.to_string()));
                        }
                    }
                    Err(e) => {
                        eprintln!("{}", formatter.error(&e.to_string()));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", formatter.info("Use 'exit' to quit"));
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("{}", formatter.error(&format!("Error: {}", err)));
                break;
            }
        }
    }

    editor.save_history(&history_path).ok();

    Ok(())
}

/// Execute one command against the session.
///
/// Shared by the REPL and one-shot invocations.
pub async fn execute_command(
    cmd: Command,
    session: &mut Session,
    config: &mut Config,
    config_path: Option<&Path>,
    formatter: &Formatter,
) -> Result<()> {
    match cmd {
        Command::Analyze(args) => {
            commands::execute_analyze(args, session, config, formatter).await?;
        }
        Command::Entities(args) => {
            commands::execute_entities(args, &session.store, &config.options, formatter)?;
        }
        Command::Relationships => {
            commands::execute_relationships(&session.store, formatter)?;
        }
        Command::Select(args) => {
            if commands::execute_select(args, &mut session.store, formatter)? {
                session.save()?;
            }
        }
        Command::Delete(args) => {
            if commands::execute_delete(args, &mut session.store, formatter)? {
                session.save()?;
            }
        }
        Command::Diagram(args) => {
            commands::execute_diagram(args, &session.store, formatter)?;
        }
        Command::Summarize(args) => {
            let model = config.build_model()?;
            commands::execute_summarize(args, &model, formatter).await?;
        }
        Command::Export(args) => {
            commands::execute_export(args, &session.store, formatter)?;
        }
        Command::Import(args) => {
            commands::execute_import(args, &mut session.store, formatter)?;
            session.save()?;
        }
        Command::Reset => {
            commands::execute_reset(&mut session.store, formatter)?;
            session.save()?;
        }
        Command::Options(args) => {
            commands::execute_options(args, config, config_path, formatter)?;
        }
        Command::Repl => {
            return Err(CliError::InvalidInput("Already in REPL mode".to_string()));
        }
    }

    Ok(())
}

/// REPL command type.
#[derive(Debug)]
enum ReplCommand {
    Exit,
    Help,
    Command(Command),
}

/// Parse a REPL command line.
///
/// Entity names may contain spaces; everything after the command word is
/// taken as the name.
fn parse_repl_command(line: &str) -> Result<ReplCommand> {
    let parts: Vec<&str> = line.split_whitespace().collect();

    if parts.is_empty() {
        return Err(CliError::InvalidInput("Empty command".to_string()));
    }

    let args = &parts[1..];
    let cmd = match parts[0] {
        "exit" | "quit" | "q" => return Ok(ReplCommand::Exit),
        "help" | "?" => return Ok(ReplCommand::Help),
        "analyze" => parse_analyze_command(args)?,
        "entities" => Command::Entities(EntitiesArgs {
            min: match args.first() {
                Some(n) => Some(
                    n.parse()
                        .map_err(|_| CliError::InvalidInput(format!("Invalid minimum count: {}", n)))?,
                ),
                None => None,
            },
        }),
        "relationships" | "rels" => Command::Relationships,
        "select" => Command::Select(SelectArgs {
            entity: entity_name(args, "Usage: select <entity>|all")?,
        }),
        "delete" => Command::Delete(DeleteArgs {
            entity: entity_name(args, "Usage: delete <entity>")?,
            yes: false,
        }),
        "diagram" => Command::Diagram(DiagramArgs {
            direction: match args.first() {
                Some(d) => d.parse::<Direction>().map_err(CliError::InvalidInput)?,
                None => Direction::default(),
            },
            entity: None,
        }),
        "summarize" => Command::Summarize(InputArgs {
            file: Some(file_arg(args, "Usage: summarize <file>")?),
        }),
        "export" => Command::Export(FileArgs {
            file: file_arg(args, "Usage: export <file>")?,
        }),
        "import" => Command::Import(FileArgs {
            file: file_arg(args, "Usage: import <file>")?,
        }),
        "reset" => Command::Reset,
        "options" => parse_options_command(args)?,
        other => {
            return Err(CliError::InvalidInput(format!(
                "Unknown command: {}. Type 'help' for available commands.",
                other
            )))
        }
    };

    Ok(ReplCommand::Command(cmd))
}

fn parse_analyze_command(args: &[&str]) -> Result<Command> {
    let mut file = None;
    let mut url = None;
    let mut summarize = false;
    let mut sections = false;

    for arg in args {
        match *arg {
            "--summarize" => summarize = true,
            "--sections" => sections = true,
            value if file.is_none() => file = Some(PathBuf::from(value)),
            value if url.is_none() => url = Some(value.to_string()),
            value => return Err(CliError::InvalidInput(format!("Unexpected argument: {}", value))),
        }
    }

    let file = file.ok_or_else(|| {
        CliError::InvalidInput("Usage: analyze <file> [url] [--summarize|--sections]".to_string())
    })?;
    if summarize && sections {
        return Err(CliError::InvalidInput(
            "--summarize and --sections cannot be combined".to_string(),
        ));
    }

    Ok(Command::Analyze(AnalyzeArgs {
        input: InputArgs { file: Some(file) },
        url,
        summarize,
        sections,
        save: None,
        diagram: false,
    }))
}

fn parse_options_command(args: &[&str]) -> Result<Command> {
    let action = match args.first().copied() {
        None | Some("show") => OptionsAction::Show,
        Some("reset") => OptionsAction::Reset,
        Some("set") if args.len() >= 3 => OptionsAction::Set {
            key: args[1].to_string(),
            value: args[2..].join(" "),
        },
        Some("set") => {
            return Err(CliError::InvalidInput("Usage: options set <key> <value>".to_string()))
        }
        Some(other) => return Err(CliError::InvalidInput(format!("Unknown options action: {}", other))),
    };

    Ok(Command::Options(OptionsArgs { action: Some(action) }))
}

fn entity_name(args: &[&str], usage: &str) -> Result<String> {
    if args.is_empty() {
        return Err(CliError::InvalidInput(usage.to_string()));
    }
    Ok(args.join(" "))
}

fn file_arg(args: &[&str], usage: &str) -> Result<PathBuf> {
    args.first()
        .map(PathBuf::from)
        .ok_or_else(|| CliError::InvalidInput(usage.to_string()))
}

fn get_history_path() -> Result<PathBuf> {
    let dir = Config::home_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir.join("history.txt"))
}

fn print_help(formatter: &Formatter) {
    println!("{}", formatter.info("Available commands:"));
    println!();
    println!("  analyze <file> [url] [--summarize|--sections]");
    println!("                                 - Analyze a text file into a fresh session");
    println!("  entities [min]                 - List entities named at least min times");
    println!("  relationships, rels            - Show relationships in view");
    println!("  select <entity>|all            - Focus on one entity, or show all");
    println!("  delete <entity>                - Delete an entity and its relationships");
    println!("  diagram [LR|RL|TD|BT]          - Print the Mermaid diagram");
    println!("  summarize <file>               - Summarize a text file");
    println!("  export <file>                  - Write the session to a file");
    println!("  import <file>                  - Load a session file");
    println!("  reset                          - Clear the session");
    println!("  options [show|set <k> <v>|reset] - Analysis options");
    println!("  help, ?                        - Show this help");
    println!("  exit, quit, q                  - Exit REPL");
    println!();
}
