pub mod automaton;
pub mod lexer;
pub mod net;

pub use automaton::{parse_automaton, split_automata};
pub use lexer::{Lexer, ParseError, Token, TokenKind};
pub use net::parse_net;
