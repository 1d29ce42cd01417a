//! Minimal line-based command dispatch.
//!
//! Stands in for the network front end: one whitespace-separated command per
//! line, routed by its first word.

use crate::command::config_cmd::ConfigCommand;
use crate::command::reply::Reply;
use crate::config::registry::Properties;

/// Dispatch one command line. Returns `None` for blank lines.
pub fn dispatch_line<T: Properties>(config: &ConfigCommand<T>, line: &str) -> Option<Reply> {
    let mut words = line.split_whitespace();
    let name = words.next()?;
    let args: Vec<&str> = words.collect();

    let reply = if name.eq_ignore_ascii_case("config") {
        config.execute(args.as_slice())
    } else {
        Reply::error(format!("ERR unknown command '{}'", name))
    };
    Some(reply)
}
