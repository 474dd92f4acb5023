use anyhow::Result;
use console::{Term, style};
use std::io::BufRead;
use std::path::Path;

use crate::config::SessionConfig;
use crate::convert;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    WorkingDir(String),
    Backup(String),
    SortByDate(String),
    DateInName(String),
    LowRes(String),
    Convert,
    Help,
    Exit,
}

struct MenuEntry {
    key: char,
    label: &'static str,
    build: fn(&str) -> Command,
    current: fn(&SessionConfig) -> Option<String>,
}

const MENU: &[MenuEntry] = &[
    MenuEntry {
        key: 'w',
        label: "Working directory",
        build: |v| Command::WorkingDir(v.to_string()),
        current: |c| Some(c.working_dir.display().to_string()),
    },
    MenuEntry {
        key: 'b',
        label: "Create a backup",
        build: |v| Command::Backup(v.to_string()),
        current: |c| Some(yes_no(c.backup)),
    },
    MenuEntry {
        key: 's',
        label: "Sort photos by date",
        build: |v| Command::SortByDate(v.to_string()),
        current: |c| Some(yes_no(c.sort_by_date)),
    },
    MenuEntry {
        key: 'd',
        label: "Date in a filename",
        build: |v| Command::DateInName(v.to_string()),
        current: |c| Some(yes_no(c.date_in_name)),
    },
    MenuEntry {
        key: 'r',
        label: "Create lower resolution copy",
        build: |v| Command::LowRes(v.to_string()),
        current: |c| Some(yes_no(c.low_res)),
    },
    MenuEntry {
        key: 'c',
        label: "Start conversion",
        build: |_| Command::Convert,
        current: |_| None,
    },
    MenuEntry {
        key: 'h',
        label: "Help",
        build: |_| Command::Help,
        current: |_| None,
    },
    MenuEntry {
        key: 'e',
        label: "Exit",
        build: |_| Command::Exit,
        current: |_| None,
    },
];

fn yes_no(state: bool) -> String {
    let word = if state { "Yes" } else { "No" };
    word.to_string()
}

/// Parse one input line: a command letter, then an optional argument.
pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    let key = line.chars().next()?.to_ascii_lowercase();
    let value = line[line.chars().next()?.len_utf8()..].trim();
    MENU.iter()
        .find(|entry| entry.key == key)
        .map(|entry| (entry.build)(value))
}

/// `y…` / `n…` in any case; anything else is not an answer.
pub fn parse_toggle(value: &str) -> Option<bool> {
    match value.chars().next()?.to_ascii_lowercase() {
        'y' => Some(true),
        'n' => Some(false),
        _ => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Shell<R> {
    pub config: SessionConfig,
    input: R,
    term: Term,
}

impl<R: BufRead> Shell<R> {
    pub fn new(config: SessionConfig, input: R) -> Self {
        Self {
            config,
            input,
            term: Term::stdout(),
        }
    }

    /// Show the menu and run commands until `e` or end of input.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.clear();
            self.print_menu();
            let Some(line) = self.read_line()? else {
                return Ok(());
            };
            let Some(command) = parse_command(&line) else {
                continue;
            };
            if self.execute(command)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Exit => {
                self.clear();
                println!("Thank you for using photo-renumber. Have a nice day!");
                return Ok(Flow::Exit);
            }
            Command::Help => {
                self.clear();
                self.print_help();
                self.pause()?;
            }
            Command::WorkingDir(value) => {
                if let Err(e) = self.config.set_working_dir(Path::new(&value)) {
                    self.report_error(&e);
                    println!("Make sure the folder exists.");
                    self.pause()?;
                }
            }
            Command::Backup(value) => self.toggle(&value, |c| &mut c.backup)?,
            Command::SortByDate(value) => self.toggle(&value, |c| &mut c.sort_by_date)?,
            Command::DateInName(value) => self.toggle(&value, |c| &mut c.date_in_name)?,
            Command::LowRes(value) => self.toggle(&value, |c| &mut c.low_res)?,
            Command::Convert => {
                self.clear();
                match convert::run_conversion(&self.config) {
                    Ok(report) => convert::print_report(&report, &self.config),
                    Err(e) => self.report_error(&e),
                }
                self.pause()?;
            }
        }
        Ok(Flow::Continue)
    }

    fn toggle(&mut self, value: &str, field: fn(&mut SessionConfig) -> &mut bool) -> Result<()> {
        match parse_toggle(value) {
            Some(state) => *field(&mut self.config) = state,
            None => {
                self.clear();
                println!("Provided value is invalid. You should write y or n.");
                self.pause()?;
            }
        }
        Ok(())
    }

    fn print_menu(&self) {
        println!();
        println!(
            "  {}",
            style("~~~~~ photo-renumber: photo file manager ~~~~~").bold().cyan()
        );
        println!();
        println!("  {}", style("Commands and current settings").dim());
        for entry in MENU {
            match (entry.current)(&self.config) {
                Some(state) => println!(
                    "  {} - {}: {}",
                    style(entry.key).cyan().bold(),
                    entry.label,
                    style(state).white().bold()
                ),
                None => println!("  {} - {}", style(entry.key).cyan().bold(), entry.label),
            }
        }
        println!();
    }

    fn print_help(&self) {
        let p = &self.config.print;
        println!("This program organizes photos by date, renames them, and saves them.");
        println!("You can create a backup of your original images before any modifications.");
        println!(
            "Additionally, you can create a lower-resolution copy for 10x15 cm prints,\n\
             at {} DPI and a resolution of {}x{}.",
            p.dpi, p.long_side, p.short_side
        );
        println!("This program can also be used to number any files sequentially.");
        println!("Toggle settings with the command letter followed by y or n, e.g. `s n`.");
    }

    fn report_error(&self, e: &anyhow::Error) {
        println!("  {} {e:#}", style("✘").red().bold());
    }

    fn clear(&self) {
        if self.term.is_term() {
            let _ = self.term.clear_screen();
        }
    }

    fn pause(&mut self) -> Result<()> {
        println!("Press Enter to continue ...");
        self.read_line()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}
