use crate::types::VERSION;

pub fn get_program_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().to_string()))
        .unwrap_or_else(|| "replink".to_string())
        .to_lowercase()
}

pub fn print_help() {
    let prog = get_program_name();
    println!(
        r#"{prog} - console front-end for a remote interpreter daemon

USAGE:
    {prog} [OPTIONS] [HOST]

ARGS:
    HOST                Daemon host (default: 127.0.0.1)

OPTIONS:
    -p <port>           Daemon port (default: 9923)
    -l <level>          Initial log level: v, d, i, w, e
    -h, --help          Show this help message
    -V, --version       Show version information

CONSOLE COMMANDS (inside the session):
    :help               Show console command help
    :exit               Quit
    :stop               Force-stop the current evaluation
    :loglv+ / :loglv-   Raise / lower daemon log verbosity one step
    :prev / :next       Walk the command history
    :swap               Exchange the edit buffer with the alternate buffer
    :ac <text>          Autocomplete the token at the end of <text>

Anything else is interpreter source. Input accumulates until parentheses
balance, then is submitted as one request."#
    );
}

pub fn print_version() {
    println!("{} {}", get_program_name(), VERSION);
}
