//! chksim: checks whether the first of two automata simulates the second.
use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use itpn::options::{init_logger, read_stdin};
use itpn::parse::automaton::{parse_automaton, split_automata};
use itpn::sim::{simulates, weakly_simulates};

fn main() -> Result<()> {
    init_logger();

    let matches = Command::new("chksim")
        .about("Checks whether the first automaton simulates the second")
        .arg(
            Arg::new("weak")
                .short('w')
                .long("weak")
                .action(ArgAction::SetTrue)
                .help("Check weak simulation (tau moves may pad each step)"),
        )
        .get_matches();

    let input = read_stdin()?;
    let (first, second) = split_automata(&input)?;
    let simulator = parse_automaton(first)?;
    let simulatee = parse_automaton(second)?;

    if matches.get_flag("weak") {
        if weakly_simulates(&simulator, &simulatee) {
            println!("First automaton weakly simulates second automaton");
        } else {
            println!("No weak simulation relation found");
        }
    } else if simulates(&simulator, &simulatee) {
        println!("First automaton simulates second automaton");
    } else {
        println!("No simulation relation found");
    }
    Ok(())
}
