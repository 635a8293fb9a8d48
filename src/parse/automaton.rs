//! Parser for the simple-automaton text format.
use crate::automaton::simple::{SimpleAutomaton, SimpleEdge, SimpleState};
use crate::parse::lexer::{Lexer, ParseError, Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "AUTOMATON",
    "STATES",
    "TRANSITION",
    "FROM",
    "TO",
    "INITIALSTATE",
    "FINALSTATES",
];

fn is_keyword(token: &Token) -> bool {
    token.kind == TokenKind::Word && KEYWORDS.contains(&token.text.as_str())
}

fn is_identifier(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Word | TokenKind::Number) && !is_keyword(token)
}

pub fn parse_automaton(input: &str) -> Result<SimpleAutomaton, ParseError> {
    AutomatonParser::new(input).parse()
}

/// Splits chksim input at the second occurrence of the `AUTOMATON` keyword.
pub fn split_automata(input: &str) -> Result<(&str, &str), ParseError> {
    let mut markers = input.match_indices("AUTOMATON");
    markers.next();
    match markers.next() {
        Some((offset, _)) => Ok((&input[..offset], &input[offset..])),
        None => Err(ParseError::new(
            1,
            1,
            "expected two automata separated by a second 'AUTOMATON' marker",
        )),
    }
}

struct AutomatonParser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> AutomatonParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input, false),
        }
    }

    fn parse(mut self) -> Result<SimpleAutomaton, ParseError> {
        let mut automaton = SimpleAutomaton::new();

        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            return Ok(automaton);
        }
        if !token.is_word("AUTOMATON") {
            return Err(ParseError::at(
                &token,
                format!("expected 'AUTOMATON', found {}", token.describe()),
            ));
        }

        loop {
            let token = self.lexer.next_token()?;
            if token.kind == TokenKind::Eof {
                return Ok(automaton);
            }
            if token.is_word("STATES") {
                self.parse_states(&mut automaton)?;
            } else if token.is_word("TRANSITION") {
                self.parse_transition(&mut automaton)?;
            } else if token.is_word("INITIALSTATE") {
                self.parse_initial_state(&mut automaton)?;
            } else if token.is_word("FINALSTATES") {
                self.parse_final_states(&mut automaton)?;
            } else {
                return Err(ParseError::at(
                    &token,
                    format!(
                        "expected 'STATES', 'TRANSITION', 'INITIALSTATE' or 'FINALSTATES', found {}",
                        token.describe()
                    ),
                ));
            }
        }
    }

    fn parse_states(&mut self, automaton: &mut SimpleAutomaton) -> Result<(), ParseError> {
        self.for_each_listed_state(|automaton, name| {
            automaton
                .create_state(SimpleState::new(name.text.clone()))
                .map_err(|_| {
                    ParseError::at(name, format!("duplicate state '{}'", name.text))
                })?;
            Ok(())
        }, automaton)
    }

    /// `TRANSITION label; FROM src; TO dst;`. An empty label denotes tau
    /// and is written as an immediate semicolon.
    fn parse_transition(&mut self, automaton: &mut SimpleAutomaton) -> Result<(), ParseError> {
        let token = self.lexer.next_token()?;
        let label = if token.kind == TokenKind::Semicolon {
            String::new()
        } else if is_identifier(&token) {
            let label = token.text.clone();
            self.expect(TokenKind::Semicolon)?;
            label
        } else {
            return Err(ParseError::at(
                &token,
                format!("expected transition label or ';', found {}", token.describe()),
            ));
        };

        self.expect_keyword("FROM")?;
        let from = self.lookup_state(automaton)?;
        self.expect(TokenKind::Semicolon)?;

        self.expect_keyword("TO")?;
        let to = self.lookup_state(automaton)?;
        self.expect(TokenKind::Semicolon)?;

        automaton.connect(from, to, SimpleEdge::new(label));
        Ok(())
    }

    fn parse_initial_state(&mut self, automaton: &mut SimpleAutomaton) -> Result<(), ParseError> {
        let idx = self.lookup_state(automaton)?;
        automaton.set_initial(idx);
        self.expect(TokenKind::Semicolon)?;
        Ok(())
    }

    fn parse_final_states(&mut self, automaton: &mut SimpleAutomaton) -> Result<(), ParseError> {
        self.for_each_listed_state(|automaton, name| {
            let idx = automaton.find(&name.text).ok_or_else(|| {
                ParseError::at(name, format!("unknown state '{}'", name.text))
            })?;
            automaton.state_mut(idx).set_final(true);
            Ok(())
        }, automaton)
    }

    fn for_each_listed_state(
        &mut self,
        mut handle: impl FnMut(&mut SimpleAutomaton, &Token) -> Result<(), ParseError>,
        automaton: &mut SimpleAutomaton,
    ) -> Result<(), ParseError> {
        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Semicolon {
            return Ok(());
        }
        self.lexer.push_back(token);

        loop {
            let name = self.expect_identifier()?;
            handle(automaton, &name)?;
            let sep = self.lexer.next_token()?;
            match sep.kind {
                TokenKind::Comma => continue,
                TokenKind::Semicolon => return Ok(()),
                _ => {
                    return Err(ParseError::at(
                        &sep,
                        format!("expected ',' or ';', found {}", sep.describe()),
                    ));
                }
            }
        }
    }

    fn lookup_state(
        &mut self,
        automaton: &SimpleAutomaton,
    ) -> Result<petgraph::stable_graph::NodeIndex, ParseError> {
        let name = self.expect_identifier()?;
        automaton
            .find(&name.text)
            .ok_or_else(|| ParseError::at(&name, format!("unknown state '{}'", name.text)))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let token = self.lexer.next_token()?;
        if token.kind != kind {
            return Err(ParseError::at(
                &token,
                format!("expected {}, found {}", kind, token.describe()),
            ));
        }
        Ok(token)
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ParseError> {
        let token = self.lexer.next_token()?;
        if !token.is_word(keyword) {
            return Err(ParseError::at(
                &token,
                format!("expected '{}', found {}", keyword, token.describe()),
            ));
        }
        Ok(())
    }

    fn expect_identifier(&mut self) -> Result<Token, ParseError> {
        let token = self.lexer.next_token()?;
        if !is_identifier(&token) {
            return Err(ParseError::at(
                &token,
                format!("expected identifier, found {}", token.describe()),
            ));
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::core::EdgePayload;
    use petgraph::visit::IntoEdgeReferences;
    use petgraph::visit::EdgeRef;

    #[test]
    fn parses_all_sections() {
        let automaton = parse_automaton(
            "AUTOMATON\n\
             STATES s0, s1, s2;\n\
             TRANSITION a; FROM s0; TO s1;\n\
             TRANSITION ; FROM s1; TO s2;\n\
             INITIALSTATE s0;\n\
             FINALSTATES s2;",
        )
        .unwrap();

        assert_eq!(automaton.state_count(), 3);
        assert_eq!(automaton.edge_count(), 2);
        let initial = automaton.initial().unwrap();
        assert_eq!(automaton.state(initial).name, "s0");
        assert_eq!(automaton.final_states().len(), 1);

        let tau_edges = automaton
            .graph()
            .edge_references()
            .filter(|e| e.weight().is_tau())
            .count();
        assert_eq!(tau_edges, 1);
    }

    #[test]
    fn numeric_state_names_are_identifiers() {
        let automaton = parse_automaton(
            "AUTOMATON STATES 0, 1; TRANSITION a; FROM 0; TO 1; INITIALSTATE 0;",
        )
        .unwrap();
        assert_eq!(automaton.state_count(), 2);
    }

    #[test]
    fn unknown_states_are_errors() {
        let err =
            parse_automaton("AUTOMATON STATES s0; TRANSITION a; FROM s0; TO s9;").unwrap_err();
        assert!(err.message.contains("unknown state 's9'"));
    }

    #[test]
    fn duplicate_states_are_errors() {
        let err = parse_automaton("AUTOMATON STATES s0, s0;").unwrap_err();
        assert!(err.message.contains("duplicate state"));
    }

    #[test]
    fn split_finds_the_second_marker() {
        let input = "AUTOMATON STATES a;\nAUTOMATON STATES b;";
        let (first, second) = split_automata(input).unwrap();
        assert!(first.contains("a;"));
        assert!(second.starts_with("AUTOMATON"));
        assert!(second.contains("b;"));
    }

    #[test]
    fn missing_second_marker_is_an_error() {
        assert!(split_automata("AUTOMATON STATES a;").is_err());
    }
}
