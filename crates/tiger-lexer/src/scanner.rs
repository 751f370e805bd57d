use crate::token::{Span, Token, TokenKind};
use crate::LexError;

/// Width of the source window attached to lex errors, on each side of
/// the failure point.
const CONTEXT_WINDOW: usize = 20;

/// Tiger source scanner.
///
/// Performs a single left-to-right pass over the source, maintaining a
/// cursor and line/column counters (columns reset and lines increment
/// on `\n`). Whitespace between constructs is skipped and never
/// tokenized.
pub struct Scanner {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    /// Create a new scanner for the given source.
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the entire source into a vector of tokens.
    pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
        let mut scanner = Scanner::new(source);
        scanner.scan_tokens()?;
        Ok(scanner.tokens)
    }

    fn scan_tokens(&mut self) -> Result<(), LexError> {
        while !self.is_at_end() {
            let ch = self.peek();

            if ch.is_whitespace() {
                self.advance();
                continue;
            }

            if self.starts_with("{/*") {
                self.scan_comment()?;
                continue;
            }

            if ch == '<' {
                // Fragment delimiters take precedence over tag scanning.
                if self.starts_with("</>") {
                    let span = self.span();
                    self.skip(3);
                    self.emit(TokenKind::FragmentClose, span);
                } else if self.starts_with("<>") {
                    let span = self.span();
                    self.skip(2);
                    self.emit(TokenKind::FragmentOpen, span);
                } else if self.peek_next() == '/' {
                    self.scan_closing_tag()?;
                } else {
                    self.scan_opening_tag()?;
                }
                continue;
            }

            self.scan_text();
        }

        Ok(())
    }

    // --- Scanners ---

    /// Scan a brace comment `{/* ... */}`. The inner text is taken
    /// verbatim (not re-tokenized) and trimmed.
    fn scan_comment(&mut self) -> Result<(), LexError> {
        let span = self.span();
        self.skip(3); // consume `{/*`

        let mut content = String::new();
        while !self.is_at_end() && !self.starts_with("*/}") {
            content.push(self.advance());
        }

        if self.is_at_end() {
            return Err(LexError {
                message: "unterminated comment".into(),
                line: span.line,
                column: span.column,
                context: self.context(),
            });
        }

        self.skip(3); // consume `*/}`
        self.emit(TokenKind::Comment(content.trim().to_string()), span);
        Ok(())
    }

    /// Scan a closing tag `</name>`.
    fn scan_closing_tag(&mut self) -> Result<(), LexError> {
        let span = self.span();
        self.skip(2); // consume `</`

        let mut name = String::new();
        while !self.is_at_end() && self.peek() != '>' {
            name.push(self.advance());
        }

        if self.is_at_end() {
            return Err(self.error(format!("unterminated closing tag `{name}`")));
        }

        self.advance(); // consume `>`
        self.emit(TokenKind::TagClose(name), span);
        Ok(())
    }

    /// Scan an opening tag `<name attr="value" ...>` or `<name ... />`.
    /// A self-closing tag emits a `TagOpen` immediately followed by a
    /// synthetic `TagClose` with the same name.
    fn scan_opening_tag(&mut self) -> Result<(), LexError> {
        let span = self.span();
        self.advance(); // consume `<`

        let mut name = String::new();
        while !self.is_at_end() && !matches!(self.peek(), c if c.is_whitespace()) && self.peek() != '/' && self.peek() != '>' {
            name.push(self.advance());
        }

        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                return Err(self.error(format!("unexpected end of input in tag `{name}`")));
            }

            if self.peek() == '/' && self.peek_next() == '>' {
                self_closing = true;
                self.skip(2);
                break;
            }

            if self.peek() == '>' {
                self.advance();
                break;
            }

            attributes.push(self.scan_attribute(&name)?);
        }

        self.emit(TokenKind::TagOpen { name: name.clone(), attributes }, span);
        if self_closing {
            let close_span = self.span();
            self.emit(TokenKind::TagClose(name), close_span);
        }
        Ok(())
    }

    /// Scan one `name=value` attribute inside an opening tag.
    fn scan_attribute(&mut self, tag: &str) -> Result<(String, String), LexError> {
        let mut attr = String::new();
        while !self.is_at_end()
            && !self.peek().is_whitespace()
            && !matches!(self.peek(), '=' | '>' | '"' | '\'' | '/')
        {
            attr.push(self.advance());
        }

        self.skip_whitespace();

        if self.is_at_end() {
            return Err(self.error(format!("unexpected end of input after attribute `{attr}`")));
        }
        if self.peek() != '=' {
            return Err(self.error(format!(
                "expected `=` after attribute `{attr}` in tag `{tag}`"
            )));
        }
        self.advance(); // consume `=`
        self.skip_whitespace();

        if self.is_at_end() {
            return Err(self.error(format!("unexpected end of input in attribute `{attr}`")));
        }

        let value = if self.peek() == '"' || self.peek() == '\'' {
            let quote = self.peek();
            let open = self.span();
            self.advance();

            let mut value = String::new();
            while !self.is_at_end() && self.peek() != quote {
                // Newlines inside a quoted value are counted for line
                // tracking but excluded from the value.
                let c = self.advance();
                if c != '\n' {
                    value.push(c);
                }
            }

            if self.is_at_end() {
                return Err(LexError {
                    message: format!("unterminated quote in attribute `{attr}`"),
                    line: open.line,
                    column: open.column,
                    context: self.context(),
                });
            }

            self.advance(); // consume closing quote
            value
        } else {
            let mut value = String::new();
            while !self.is_at_end()
                && !self.peek().is_whitespace()
                && !matches!(self.peek(), '>' | '/')
            {
                value.push(self.advance());
            }
            value
        };

        Ok((attr, value))
    }

    /// Scan a text run up to the next `<`. Emits a `Text` token only if
    /// the trimmed content is non-empty.
    fn scan_text(&mut self) {
        let span = self.span();
        let mut text = String::new();
        while !self.is_at_end() && self.peek() != '<' {
            text.push(self.advance());
        }

        let trimmed = text.trim();
        if !trimmed.is_empty() {
            self.emit(TokenKind::Text(trimmed.to_string()), span);
        }
    }

    // --- Helpers ---

    fn emit(&mut self, kind: TokenKind, span: Span) {
        self.tokens.push(Token::new(kind, span));
    }

    fn span(&self) -> Span {
        Span::new(self.line, self.column)
    }

    fn peek(&self) -> char {
        self.chars.get(self.pos).copied().unwrap_or('\0')
    }

    fn peek_next(&self) -> char {
        self.chars.get(self.pos + 1).copied().unwrap_or('\0')
    }

    fn starts_with(&self, prefix: &str) -> bool {
        prefix
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i) == Some(&c))
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            if !self.is_at_end() {
                self.advance();
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.peek().is_whitespace() {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// A window of source around the current position, for error context.
    fn context(&self) -> String {
        let start = self.pos.saturating_sub(CONTEXT_WINDOW);
        let end = (self.pos + CONTEXT_WINDOW).min(self.chars.len());
        self.chars[start..end].iter().collect()
    }

    fn error(&self, message: String) -> LexError {
        LexError {
            message,
            line: self.line,
            column: self.column,
            context: self.context(),
        }
    }
}
