//! net2cl: interval net (stdin) -> reduced closure automaton (stdout).
use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use itpn::construct::closure::construct_closure_automaton;
use itpn::construct::region::construct_region_automaton;
use itpn::net::maximal::construct_maximal_net;
use itpn::options::{OutputFormat, init_logger, read_stdin};
use itpn::parse::net::parse_net;
use itpn::reduce::{mark_potential_deadlocks, remove_deadlocks, remove_unreachable_states};
use itpn::render::{dot, text};

fn main() -> Result<()> {
    init_logger();

    let matches = Command::new("net2cl")
        .about("Builds the reduced closure automaton of an interval-timed open workflow net")
        .arg(
            Arg::new("keepDeadlocks")
                .short('d')
                .long("keepDeadlocks")
                .action(ArgAction::SetTrue)
                .help("Mark potential deadlocks but keep them in the automaton"),
        )
        .arg(
            Arg::new("hideEmptyState")
                .short('e')
                .long("hideEmptyState")
                .action(ArgAction::SetTrue)
                .help("Suppress the empty closure state in dot output"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .default_value("text")
                .help("Output format: text or dot"),
        )
        .get_matches();

    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    let format: OutputFormat = match format.parse() {
        Ok(format) => format,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    let input = read_stdin()?;
    let mut net = parse_net(&input)?;
    construct_maximal_net(&mut net)?;

    let mut closure = construct_closure_automaton(&net)?;
    if matches.get_flag("keepDeadlocks") {
        mark_potential_deadlocks(&mut closure);
    } else {
        remove_deadlocks(&mut closure);
        remove_unreachable_states(&mut closure);
    }
    let regions = construct_region_automaton(&closure);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => text::write_anonymous(&closure, &mut out)?,
        OutputFormat::Dot => {
            let show_empty = !matches.get_flag("hideEmptyState");
            dot::write_closure(&net, &closure, Some(&regions), show_empty, &mut out)?;
        }
    }
    Ok(())
}
