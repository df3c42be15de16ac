use crate::ast::Text;
use crate::parser::validate::is_text_terminator;
use crate::parser::{PResult, Parser, SyntaxError};

impl Parser<'_> {
    /// Parse a free-form text field
    ///
    /// Consumes tokens up to the next field keyword that can end a text
    /// (`desc`, `condition`, `action`, `output`, `priority`, `tags`) or the end
    /// of input. The result is the source slice from the first to the last
    /// consumed token, so spacing and punctuation are kept as written.
    pub fn parse_text(&mut self) -> PResult<Text> {
        let first = self.tokens.peek();
        if is_text_terminator(first.token) {
            return Err(SyntaxError::empty_text(first));
        }

        let start = first.span.start;
        let mut end = first.span.end;
        while !is_text_terminator(self.tokens.peek().token) {
            end = self.tokens.bump().span.end;
        }

        let text = Text::new(self.tokens.slice(start, end));
        if self.config.collapse_whitespace {
            Ok(text.collapsed())
        } else {
            Ok(text)
        }
    }
}
