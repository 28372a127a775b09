mod cli;
mod codec;
mod config;
mod edit;
mod history;
mod pending;
mod remote;
mod session;
mod transport;
mod types;

use std::io::{self, BufRead, Write};
use std::sync::mpsc;

use chrono::Local;

use crate::cli::{print_help, print_version};
use crate::config::load_config;
use crate::history::History;
use crate::remote::RemoteInterp;
use crate::session::{AcEdit, Session};
use crate::types::{LogLv, Output};

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut cfg = load_config();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return Ok(());
            }
            "-V" | "--version" => {
                print_version();
                return Ok(());
            }
            "-p" if i + 1 < args.len() => {
                cfg.port = args[i + 1].parse().map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "invalid port")
                })?;
                i += 2;
            }
            "-l" if i + 1 < args.len() => {
                cfg.loglv = Some(LogLv::from_letter(&args[i + 1]).ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        "log level must be one of v, d, i, w, e",
                    )
                })?);
                i += 2;
            }
            arg if !arg.starts_with('-') => {
                cfg.host = arg.to_string();
                i += 1;
            }
            arg => {
                eprintln!("unknown option: {}", arg);
                print_help();
                return Ok(());
            }
        }
    }

    let (tx, rx) = mpsc::channel::<Output>();
    let remote = match RemoteInterp::connect(&cfg.host, cfg.port, tx) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("can't connect to {}:{}: {}", cfg.host, cfg.port, e);
            std::process::exit(1);
        }
    };

    // Printer thread: drains the output sink so interpreter output and logs
    // appear whenever they arrive, independent of what the input loop is
    // doing. A dead connection ends the session.
    std::thread::spawn(move || {
        while let Ok(ev) = rx.recv() {
            match ev {
                Output::Print(text) => {
                    print!("{}", text);
                    let _ = io::stdout().flush();
                }
                Output::Log(text) => {
                    eprint!("{}", text);
                    let _ = io::stderr().flush();
                }
                Output::Closed(reason) => {
                    eprintln!("\nreplink: {}", reason);
                    std::process::exit(1);
                }
            }
        }
    });

    let mut session = Session::new(Box::new(remote), History::load());
    if let Some(lv) = cfg.loglv {
        session.set_log_level(lv)?;
    }

    println!("connected to {}:{}  (:help for commands)", cfg.host, cfg.port);
    run_console(&mut session)
}

/// The console loop: `:`-commands, otherwise source text accumulated until
/// parentheses balance and submitted as one interpret request.
fn run_console(session: &mut Session) -> io::Result<()> {
    let stdin = io::stdin();
    let mut acc = String::new();
    // The one-line edit buffer driven by :prev/:next/:swap/:ac.
    let mut edit_buf = String::new();

    prompt(&acc)?;
    for line in stdin.lock().lines() {
        let line = line?;
        if acc.is_empty() && line.starts_with(':') {
            if !handle_command(session, &line, &mut edit_buf)? {
                break;
            }
            prompt(&acc)?;
            continue;
        }

        acc.push_str(&line);
        acc.push('\n');
        if paren_depth(&acc) <= 0 {
            let src = acc.trim_end().to_string();
            acc.clear();
            if !src.is_empty() {
                submit(session, &src)?;
            }
        }
        prompt(&acc)?;
    }

    let _ = session.history.save();
    Ok(())
}

fn prompt(acc: &str) -> io::Result<()> {
    let mut out = io::stdout();
    write!(out, "{}", if acc.is_empty() { "> " } else { "… " })?;
    out.flush()
}

fn submit(session: &mut Session, src: &str) -> io::Result<()> {
    println!(
        "====================== Interpret [{}] ======================",
        Local::now().format("%H:%M:%S")
    );
    session.interpret(src)
}

/// Returns false when the session should end.
fn handle_command(
    session: &mut Session,
    line: &str,
    edit_buf: &mut String,
) -> io::Result<bool> {
    let (cmd, arg) = match line.split_once(' ') {
        Some((c, a)) => (c, a),
        None => (line, ""),
    };
    match cmd {
        ":help" => print_help(),
        ":exit" => {
            let _ = session.history.save();
            println!("Bye...");
            return Ok(false);
        }
        ":stop" => session.force_stop()?,
        ":loglv+" => match session.raise_verbosity()? {
            Some(lv) => println!(">>> Current Log Level : {}", lv.name()),
            None => println!(">>> Already at {}", session.log_level().name()),
        },
        ":loglv-" => match session.lower_verbosity()? {
            Some(lv) => println!(">>> Current Log Level : {}", lv.name()),
            None => println!(">>> Already at {}", session.log_level().name()),
        },
        ":prev" => {
            *edit_buf = session.history.older().unwrap_or_default();
            println!("[edit] {}", edit_buf);
        }
        ":next" => {
            *edit_buf = session.history.newer().unwrap_or_default();
            println!("[edit] {}", edit_buf);
        }
        ":swap" => {
            *edit_buf = session.swap.swap(std::mem::take(edit_buf));
            println!("[edit] {}", edit_buf);
        }
        ":run" => {
            if edit_buf.is_empty() {
                println!("[edit buffer is empty]");
            } else {
                let src = edit_buf.clone();
                submit(session, &src)?;
            }
        }
        ":ac" => {
            let text = if arg.is_empty() { edit_buf.clone() } else { arg.to_string() };
            match session.auto_complete(&text, text.len())? {
                AcEdit::Unchanged => println!("[edit] {}", text),
                AcEdit::Edited { text, .. } => {
                    println!("[edit] {}", text);
                    *edit_buf = text;
                }
            }
        }
        _ => println!("unknown command: {}  (:help for commands)", cmd),
    }
    Ok(true)
}

/// Net parenthesis depth of the accumulated input. Naive on purpose: the
/// interpreter itself is the authority on syntax; this only decides when a
/// chunk is worth submitting.
fn paren_depth(src: &str) -> i32 {
    let mut depth = 0;
    for c in src.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ => {}
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paren_depth() {
        assert_eq!(paren_depth("(print (foo))"), 0);
        assert_eq!(paren_depth("(print (foo"), 2);
        assert_eq!(paren_depth("bare-line\n"), 0);
        assert_eq!(paren_depth("))(("), 0);
    }
}
