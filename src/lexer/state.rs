use crate::lexer::{
    token::{check_keyword, is_identifier, is_index_char, Token},
    Lexer,
};

/// States in the lexer state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LexState {
    /// Between tokens, skipping whitespace
    Scan,
    /// Accumulating a word
    Word,
    /// Inside a quoted string opened by the given quote character
    Quoted(char),
    /// Comparison operator
    Operator,
    /// `#` comment running to end of line
    Comment,
    /// End of file reached
    Eof,
}

/// Characters that may appear in a bare word
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '_' | '.' | '/' | '*' | '-' | '~' | '$' | '@' | '+' | '\\' | '?' | '%'
        )
}

impl<'a> Lexer<'a> {
    /// Main lexing state - dispatches on the next character
    pub fn lex_scan(&mut self) -> Option<LexState> {
        loop {
            match self.peek_char() {
                None => return Some(LexState::Eof),
                Some(c) if c.is_whitespace() => {
                    self.next_char();
                    self.ignore();
                }
                Some('#') => return Some(LexState::Comment),
                Some(q @ ('"' | '\'')) => return Some(LexState::Quoted(q)),
                Some('<' | '>' | '=' | '!') => return Some(LexState::Operator),
                Some(c) if is_word_char(c) => return Some(LexState::Word),
                Some(c) => {
                    self.next_char();
                    let token = match c {
                        '(' => Token::SepLpar,
                        ')' => Token::SepRpar,
                        '[' => Token::SepLbrack,
                        ']' => Token::SepRbrack,
                        ',' => Token::SepComma,
                        ':' => Token::SepDef,
                        _ => Token::Unsupported,
                    };
                    self.emit(token);
                }
            }
        }
    }

    /// Lex a bare word and classify it
    pub fn lex_word(&mut self) -> Option<LexState> {
        while let Some(c) = self.next_char() {
            if !is_word_char(c) {
                self.backup();
                break;
            }
        }

        // Indexed field access such as `proc.aname[2]`
        if is_identifier(self.collected()) && self.remaining().starts_with('[') {
            let rest = &self.remaining()[1..];
            let inner = rest.find(|c: char| !is_index_char(c)).unwrap_or(rest.len());
            if inner > 0 && rest[inner..].starts_with(']') {
                self.position += inner + 2;
                self.width = 0;
            }
        }

        let token = check_keyword(self.collected());
        self.emit(token);
        Some(LexState::Scan)
    }

    /// Lex a quoted string; an unterminated quote degrades to an unsupported token
    pub fn lex_quoted(&mut self, quote: char) -> Option<LexState> {
        self.next_char();
        let opening_end = self.position;
        loop {
            match self.next_char() {
                None | Some('\n') => break,
                Some('\\') => {
                    if matches!(self.next_char(), None | Some('\n')) {
                        break;
                    }
                }
                Some(c) if c == quote => {
                    self.emit(Token::LitString);
                    return Some(LexState::Scan);
                }
                Some(_) => continue,
            }
        }

        self.position = opening_end;
        self.width = 0;
        self.emit(Token::Unsupported);
        Some(LexState::Scan)
    }

    /// Lex a comparison operator
    pub fn lex_operator(&mut self) -> Option<LexState> {
        let first = self.next_char();
        let followed_by_eq = self.peek_char() == Some('=');
        let token = match (first, followed_by_eq) {
            (Some('<'), true) => Token::OpLte,
            (Some('<'), false) => Token::OpLt,
            (Some('>'), true) => Token::OpGte,
            (Some('>'), false) => Token::OpGt,
            (Some('!'), true) => Token::OpNeq,
            (Some('='), _) => Token::OpEq,
            _ => Token::Unsupported,
        };
        if matches!(token, Token::OpLte | Token::OpGte | Token::OpNeq) {
            self.next_char();
        }
        self.emit(token);
        Some(LexState::Scan)
    }

    /// Skip a comment
    pub fn lex_comment(&mut self) -> Option<LexState> {
        while let Some(c) = self.next_char() {
            if c == '\n' {
                break;
            }
        }
        self.ignore();
        Some(LexState::Scan)
    }

    /// Lex end of file
    pub fn lex_eof(&mut self) -> Option<LexState> {
        self.ignore();
        self.emit(Token::LitEof);
        None
    }
}
