use std::env;

use crate::types::{LogLv, DEFAULT_PORT};

/// Settings the console driver starts from, before command-line flags.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub loglv: Option<LogLv>,
}

impl Config {
    pub fn default() -> Config {
        Config { host: "127.0.0.1".to_string(), port: DEFAULT_PORT, loglv: None }
    }
}

/// Load `~/.replink.conf` if present. Unknown keys and malformed values are
/// ignored so an old config never blocks startup.
pub fn load_config() -> Config {
    let mut cfg = Config::default();
    let home = match env::var("HOME").or_else(|_| env::var("USERPROFILE")) {
        Ok(h) => h,
        Err(_) => return cfg,
    };
    let path = format!("{}/.replink.conf", home);
    if let Ok(content) = std::fs::read_to_string(&path) {
        parse_config_content(&mut cfg, &content);
    }
    cfg
}

pub fn parse_config_content(cfg: &mut Config, content: &str) {
    for line in content.lines() {
        parse_config_line(cfg, line);
    }
}

pub fn parse_config_line(cfg: &mut Config, line: &str) {
    let l = line.trim();
    if l.is_empty() || l.starts_with('#') {
        return;
    }
    let (key, val) = match l.split_once(char::is_whitespace) {
        Some((k, v)) => (k, v.trim()),
        None => return,
    };
    match key {
        "host" => cfg.host = val.to_string(),
        "port" => {
            if let Ok(p) = val.parse::<u16>() {
                cfg.port = p;
            }
        }
        "log-level" => cfg.loglv = LogLv::from_letter(val),
        _ => {}
    }
}
