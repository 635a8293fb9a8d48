//! Parser for the line-oriented TIMENET format.
use crate::net::core::{Net, NetError};
use crate::net::structure::{Marking, TimeBound, TimeInterval};
use crate::parse::lexer::{Lexer, ParseError, Token, TokenKind};

const KEYWORDS: &[&str] = &[
    "TIMENET",
    "PLACE",
    "SAFE",
    "INPUT",
    "OUTPUT",
    "MARKING",
    "TRANSITION",
    "TIME",
    "CONSUME",
    "PRODUCE",
    "FINALMARKING",
];

fn is_keyword(token: &Token) -> bool {
    token.kind == TokenKind::Word && KEYWORDS.contains(&token.text.as_str())
}

fn is_identifier(token: &Token) -> bool {
    token.kind == TokenKind::Word && !is_keyword(token)
}

pub fn parse_net(input: &str) -> Result<Net, ParseError> {
    NetParser::new(input).parse()
}

struct NetParser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> NetParser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input, true),
        }
    }

    fn parse(mut self) -> Result<Net, ParseError> {
        let mut net = Net::empty();

        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Eof {
            return Ok(net);
        }
        if !token.is_word("TIMENET") {
            return Err(ParseError::at(
                &token,
                format!("expected 'TIMENET', found {}", token.describe()),
            ));
        }

        let mut token = self.lexer.next_token()?;
        if token.is_word("PLACE") {
            loop {
                token = self.lexer.next_token()?;
                if token.is_word("SAFE") || is_identifier(&token) {
                    self.lexer.push_back(token);
                    self.parse_place_group(&mut net)?;
                } else {
                    break;
                }
            }
        }

        if token.is_word("INPUT") {
            self.parse_io_places(&mut net, true)?;
            token = self.lexer.next_token()?;
        }
        if token.is_word("OUTPUT") {
            self.parse_io_places(&mut net, false)?;
            token = self.lexer.next_token()?;
        }

        if token.is_word("MARKING") {
            let at = token.clone();
            let marking = self.parse_marking(&net)?;
            net.set_initial_marking(marking)
                .map_err(|e| net_error(&at, e))?;
            token = self.lexer.next_token()?;
        }

        while token.is_word("TRANSITION") {
            self.parse_transition(&mut net)?;
            token = self.lexer.next_token()?;
        }

        while token.is_word("FINALMARKING") {
            let at = token.clone();
            let marking = self.parse_marking(&net)?;
            net.add_final_marking(marking)
                .map_err(|e| net_error(&at, e))?;
            token = self.lexer.next_token()?;
        }

        if token.kind != TokenKind::Eof {
            return Err(ParseError::at(
                &token,
                format!("expected end of input, found {}", token.describe()),
            ));
        }
        Ok(net)
    }

    /// `[SAFE [N :]] name, name, ... ;`. Plain groups are unbounded, SAFE
    /// without a number means bound 1, `SAFE 0:` is unbounded again.
    fn parse_place_group(&mut self, net: &mut Net) -> Result<(), ParseError> {
        let mut bound = 0;
        let token = self.lexer.next_token()?;
        if token.is_word("SAFE") {
            let token = self.lexer.next_token()?;
            if token.kind == TokenKind::Number {
                bound = token.to_number()?;
                self.expect(TokenKind::Colon)?;
            } else {
                bound = 1;
                self.lexer.push_back(token);
            }
        } else {
            self.lexer.push_back(token);
        }

        loop {
            let name = self.expect_identifier("place name")?;
            net.create_place(name.text.clone(), bound)
                .map_err(|e| net_error(&name, e))?;
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

    fn parse_io_places(&mut self, net: &mut Net, input: bool) -> Result<(), ParseError> {
        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Semicolon {
            return Ok(());
        }
        self.lexer.push_back(token);

        loop {
            let name = self.expect_identifier("place name")?;
            let place = net.find_place(&name.text).ok_or_else(|| {
                ParseError::at(&name, format!("unknown place '{}'", name.text))
            })?;
            let result = if input {
                net.set_input_place(place)
            } else {
                net.set_output_place(place)
            };
            result.map_err(|e| net_error(&name, e))?;

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

    /// `p:n, p:n, ... ;`. Places not mentioned stay at zero.
    fn parse_marking(&mut self, net: &Net) -> Result<Marking, ParseError> {
        let mut marking = Marking::new(net.places_len());
        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Semicolon {
            return Ok(marking);
        }
        self.lexer.push_back(token);

        loop {
            let name = self.expect_identifier("place name")?;
            let place = net.find_place(&name.text).ok_or_else(|| {
                ParseError::at(&name, format!("unknown place '{}'", name.text))
            })?;
            self.expect(TokenKind::Colon)?;
            let count = self.expect(TokenKind::Number)?;
            *marking.tokens_mut(place) = count.to_number()?;

            let sep = self.lexer.next_token()?;
            match sep.kind {
                TokenKind::Comma => continue,
                TokenKind::Semicolon => return Ok(marking),
                _ => {
                    return Err(ParseError::at(
                        &sep,
                        format!("expected ',' or ';', found {}", sep.describe()),
                    ));
                }
            }
        }
    }

    /// `TRANSITION t [TIME eft,lft;] [CONSUME arcs;] [PRODUCE arcs;]`
    fn parse_transition(&mut self, net: &mut Net) -> Result<(), ParseError> {
        let name = self.expect_identifier("transition name")?;

        let mut interval = TimeInterval::default();
        let mut token = self.lexer.next_token()?;
        if token.is_word("TIME") {
            token = self.lexer.next_token()?;
            if token.kind == TokenKind::Number {
                let eft = token.to_number()?;
                self.expect(TokenKind::Comma)?;
                let upper = self.lexer.next_token()?;
                let lft = match upper.kind {
                    TokenKind::Number => TimeBound::Finite(upper.to_number()?),
                    TokenKind::Star => TimeBound::Infinity,
                    _ => {
                        return Err(ParseError::at(
                            &upper,
                            format!("expected number or '*', found {}", upper.describe()),
                        ));
                    }
                };
                interval = TimeInterval::new(eft, lft).map_err(|e| net_error(&upper, e))?;
                self.expect(TokenKind::Semicolon)?;
            } else if token.kind != TokenKind::Semicolon {
                return Err(ParseError::at(
                    &token,
                    format!("expected number or ';', found {}", token.describe()),
                ));
            }
            token = self.lexer.next_token()?;
        }

        let transition = net
            .create_transition(name.text.clone(), interval)
            .map_err(|e| net_error(&name, e))?;

        if token.is_word("CONSUME") {
            self.parse_arcs(net, |net, place, token| {
                net.connect_place_to_transition(place, transition, 1)
                    .map_err(|e| net_error(token, e))
            })?;
            token = self.lexer.next_token()?;
        }
        if token.is_word("PRODUCE") {
            self.parse_arcs(net, |net, place, token| {
                net.connect_transition_to_place(transition, place, 1)
                    .map_err(|e| net_error(token, e))
            })?;
        } else {
            self.lexer.push_back(token);
        }
        Ok(())
    }

    fn parse_arcs(
        &mut self,
        net: &mut Net,
        mut connect: impl FnMut(&mut Net, crate::net::ids::PlaceId, &Token) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        let token = self.lexer.next_token()?;
        if token.kind == TokenKind::Semicolon {
            return Ok(());
        }
        self.lexer.push_back(token);

        loop {
            let name = self.expect_identifier("place name")?;
            let place = net.find_place(&name.text).ok_or_else(|| {
                ParseError::at(&name, format!("unknown place '{}'", name.text))
            })?;
            self.expect(TokenKind::Colon)?;
            let count = self.expect(TokenKind::Number)?;
            if count.to_number()? != 1 {
                return Err(ParseError::at(&count, "arc multiplicity must be 1"));
            }
            connect(net, place, &name)?;

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

    fn expect_identifier(&mut self, what: &str) -> Result<Token, ParseError> {
        let token = self.lexer.next_token()?;
        if !is_identifier(&token) {
            return Err(ParseError::at(
                &token,
                format!("expected {}, found {}", what, token.describe()),
            ));
        }
        Ok(token)
    }
}

fn net_error(token: &Token, error: NetError) -> ParseError {
    ParseError::at(token, error.to_string())
}
