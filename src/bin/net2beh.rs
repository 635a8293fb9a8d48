//! net2beh: interval net (stdin) -> behavior automaton (stdout).
use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use itpn::construct::behavior::ConstructBehavior;
use itpn::net::maximal::construct_maximal_net;
use itpn::options::{OutputFormat, init_logger, read_stdin};
use itpn::parse::net::parse_net;
use itpn::render::{dot, text};

fn main() -> Result<()> {
    init_logger();

    let matches = Command::new("net2beh")
        .about("Builds the behavior automaton of an interval-timed open workflow net")
        .arg(
            Arg::new("showBoundViolations")
                .short('b')
                .long("showBoundViolations")
                .action(ArgAction::SetTrue)
                .help("Route bound-violating successors to a dedicated state"),
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

    let mut construct = ConstructBehavior::new();
    if matches.get_flag("showBoundViolations") {
        construct = construct.with_bound_violation_state();
    }
    let behavior = construct.construct(&net)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => text::write_anonymous(&behavior, &mut out)?,
        OutputFormat::Dot => dot::write_behavior(&net, &behavior, &mut out)?,
    }
    Ok(())
}
