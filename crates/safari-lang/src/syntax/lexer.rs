use crate::error::{LexError, LexErrorKind};
use crate::syntax::token::{Token, TokenKind, keyword_or_ident};

/// Hand-written scanner. One `Lexer` scans exactly one source text, so line
/// state never carries over between inputs.
pub struct Lexer<'a> {
    text: &'a str,
    source: &'a [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { text: source, source: source.as_bytes(), pos: 0, line: 1, column: 1 }
    }

    /// Scan the whole input. Stops at the first error.
    ///
    /// The trailing `Eof` token is stamped with the line counter as it stands
    /// after the last byte, so input ending in `\n` puts `Eof` on the next line.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, "", self.line, self.column, self.pos));
                break;
            }

            if let Some(tok) = self.next_token()? {
                tokens.push(tok);
            }
        }

        tracing::debug!(count = tokens.len(), lines = self.line, "scanned source");
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        let start = self.pos;
        let line = self.line;
        let col = self.column;
        let ch = self.advance();

        let kind = match ch {
            b'+' => TokenKind::Plus,
            b'*' => TokenKind::Star,
            b'%' => TokenKind::Percent,
            b',' => TokenKind::Comma,
            b';' => TokenKind::Semicolon,
            b'.' => TokenKind::Dot,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b'[' => TokenKind::LBracket,
            b']' => TokenKind::RBracket,

            b'-' => {
                if self.peek() == b'>' { self.advance(); TokenKind::Arrow }
                else { TokenKind::Minus }
            }
            b'/' => {
                if self.peek() == b'/' { self.skip_line(); return Ok(None); }
                else if self.peek() == b'*' { self.skip_block_comment(line, col, start)?; return Ok(None); }
                else { TokenKind::Slash }
            }
            b'=' => {
                if self.peek() == b'=' { self.advance(); TokenKind::EqEq }
                else { TokenKind::Eq }
            }
            b'!' => {
                if self.peek() == b'=' { self.advance(); TokenKind::BangEq }
                else {
                    return Err(LexError::new(LexErrorKind::UnexpectedCharacter, line, col, start, 1,
                        "expected `!=`, bare `!` is not valid (use `not`)"));
                }
            }
            b'<' => {
                if self.peek() == b'=' { self.advance(); TokenKind::LtEq }
                else { TokenKind::Lt }
            }
            b'>' => {
                if self.peek() == b'=' { self.advance(); TokenKind::GtEq }
                else { TokenKind::Gt }
            }

            b'"' => TokenKind::Str(self.read_string(line, col, start)?),
            b'0'..=b'9' => self.read_number(line, col, start)?,
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => keyword_or_ident(self.read_ident(start)),

            _ => {
                // Re-decode so multi-byte characters are reported whole.
                let other = self.text[start..].chars().next().unwrap_or(ch as char);
                let width = other.len_utf8();
                for _ in 1..width { self.advance(); }
                return Err(LexError::new(LexErrorKind::UnexpectedCharacter, line, col, start, width,
                    format!("unexpected character `{other}`")));
            }
        };

        Ok(Some(Token::new(kind, &self.text[start..self.pos], line, col, start)))
    }

    // ─── Primitives ──────────────────────────────────────────────────────────

    fn advance(&mut self) -> u8 {
        let ch = self.source[self.pos];
        self.pos += 1;
        if ch == b'\n' { self.line += 1; self.column = 1; }
        else { self.column += 1; }
        ch
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() { 0 } else { self.source[self.pos] }
    }

    fn peek_next(&self) -> u8 {
        if self.pos + 1 >= self.source.len() { 0 } else { self.source[self.pos + 1] }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                b' ' | b'\t' | b'\r' | b'\n' => { self.advance(); }
                _ => break,
            }
        }
    }

    fn skip_line(&mut self) {
        while !self.is_at_end() && self.peek() != b'\n' { self.advance(); }
    }

    fn skip_block_comment(&mut self, line: usize, col: usize, start: usize) -> Result<(), LexError> {
        self.advance(); // consume *
        while !self.is_at_end() {
            if self.peek() == b'*' && self.peek_next() == b'/' {
                self.advance(); // *
                self.advance(); // /
                return Ok(());
            }
            self.advance();
        }
        Err(LexError::new(LexErrorKind::UnterminatedComment, line, col, start, 2,
            "unterminated block comment"))
    }

    // ─── Readers ─────────────────────────────────────────────────────────────

    fn read_string(&mut self, line: usize, col: usize, start: usize) -> Result<String, LexError> {
        let mut bytes = Vec::new();
        loop {
            if self.is_at_end() {
                return Err(LexError::new(LexErrorKind::UnterminatedString, line, col, start, 1,
                    "unterminated string literal"));
            }
            let esc_line = self.line;
            let esc_col = self.column;
            let esc_at = self.pos;
            let ch = self.advance();
            if ch == b'"' { break; }
            if ch != b'\\' {
                bytes.push(ch);
                continue;
            }
            if self.is_at_end() {
                return Err(LexError::new(LexErrorKind::UnterminatedString, line, col, start, 1,
                    "unterminated string literal"));
            }
            match self.advance() {
                b'n'  => bytes.push(b'\n'),
                b't'  => bytes.push(b'\t'),
                b'"'  => bytes.push(b'"'),
                b'\\' => bytes.push(b'\\'),
                other => {
                    return Err(LexError::new(LexErrorKind::InvalidEscape, esc_line, esc_col, esc_at, 2,
                        format!("unknown escape sequence `\\{}`", other as char)));
                }
            }
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn read_number(&mut self, line: usize, col: usize, start: usize) -> Result<TokenKind, LexError> {
        while self.peek().is_ascii_digit() { self.advance(); }

        // consume decimal only if followed by at least one digit
        // (avoids treating `.` in `zone.balls` as a decimal point)
        let is_decimal = self.peek() == b'.' && self.peek_next().is_ascii_digit();
        if is_decimal {
            self.advance();
            while self.peek().is_ascii_digit() { self.advance(); }
        }

        // `12abc` is one malformed literal, not a number glued to a name
        if self.peek().is_ascii_alphabetic() || self.peek() == b'_' {
            while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' { self.advance(); }
            let text = &self.text[start..self.pos];
            return Err(LexError::new(LexErrorKind::InvalidNumber, line, col, start, text.len(),
                format!("invalid numeric literal `{text}`")));
        }

        let text = &self.text[start..self.pos];
        let invalid = || LexError::new(LexErrorKind::InvalidNumber, line, col, start, text.len(),
            format!("invalid numeric literal `{text}`"));
        if is_decimal {
            text.parse::<f64>().map(TokenKind::Decimal).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(TokenKind::Int).map_err(|_| invalid())
        }
    }

    fn read_ident(&mut self, start: usize) -> String {
        while self.peek().is_ascii_alphanumeric() || self.peek() == b'_' {
            self.advance();
        }
        self.text[start..self.pos].to_string()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::token::Literal;

    fn lex(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn lex_err(src: &str) -> LexError {
        Lexer::new(src).tokenize().unwrap_err()
    }

    #[test]
    fn empty() {
        assert_eq!(lex(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn integer_literal() {
        for n in [0_i64, 7, 42, 1_000_000, i64::MAX] {
            let tokens = Lexer::new(&n.to_string()).tokenize().unwrap();
            assert_eq!(tokens.len(), 2);
            assert_eq!(tokens[0].literal(), Some(Literal::Int(n)));
            assert_eq!(tokens[1].kind, TokenKind::Eof);
        }
    }

    #[test]
    fn integer_overflow_is_invalid_number() {
        let e = lex_err("99999999999999999999");
        assert_eq!(e.kind, LexErrorKind::InvalidNumber);
    }

    #[test]
    fn digits_glued_to_letters_are_invalid() {
        let e = lex_err("var x = 12ab;");
        assert_eq!(e.kind, LexErrorKind::InvalidNumber);
        assert_eq!(e.column, 9);
    }

    #[test]
    fn decimal_literal() {
        assert_eq!(lex("3.25"), vec![TokenKind::Decimal(3.25), TokenKind::Eof]);
    }

    #[test]
    fn dot_not_consumed_by_number() {
        assert_eq!(
            lex("z.balls"),
            vec![TokenKind::Ident("z".into()), TokenKind::Dot, TokenKind::Ident("balls".into()), TokenKind::Eof]
        );
        assert_eq!(lex("1.x"), vec![TokenKind::Int(1), TokenKind::Dot, TokenKind::Ident("x".into()), TokenKind::Eof]);
    }

    #[test]
    fn keywords() {
        assert_eq!(lex("var"),       vec![TokenKind::Var,       TokenKind::Eof]);
        assert_eq!(lex("print"),     vec![TokenKind::Print,     TokenKind::Eof]);
        assert_eq!(lex("repeat"),    vec![TokenKind::Repeat,    TokenKind::Eof]);
        assert_eq!(lex("define"),    vec![TokenKind::Define,    TokenKind::Eof]);
        assert_eq!(lex("throwBall"), vec![TokenKind::ThrowBall, TokenKind::Eof]);
        assert_eq!(lex("run"),       vec![TokenKind::Run,       TokenKind::Eof]);
        assert_eq!(lex("null"),      vec![TokenKind::Null,      TokenKind::Eof]);
        // keywords are case-sensitive
        assert_eq!(lex("Run"), vec![TokenKind::Ident("Run".into()), TokenKind::Eof]);
        assert_eq!(lex("runner"), vec![TokenKind::Ident("runner".into()), TokenKind::Eof]);
    }

    #[test]
    fn bool_literals() {
        assert_eq!(lex("true"),  vec![TokenKind::Bool(true),  TokenKind::Eof]);
        assert_eq!(lex("false"), vec![TokenKind::Bool(false), TokenKind::Eof]);
    }

    #[test]
    fn identifiers_with_underscores_and_digits() {
        assert_eq!(lex("_my_zone2"), vec![TokenKind::Ident("_my_zone2".into()), TokenKind::Eof]);
    }

    #[test]
    fn two_char_operators() {
        assert_eq!(lex("=="), vec![TokenKind::EqEq,   TokenKind::Eof]);
        assert_eq!(lex("!="), vec![TokenKind::BangEq, TokenKind::Eof]);
        assert_eq!(lex("<="), vec![TokenKind::LtEq,   TokenKind::Eof]);
        assert_eq!(lex(">="), vec![TokenKind::GtEq,   TokenKind::Eof]);
        assert_eq!(lex("->"), vec![TokenKind::Arrow,  TokenKind::Eof]);
    }

    #[test]
    fn greedy_two_char_match() {
        assert_eq!(lex("a==-b"), vec![
            TokenKind::Ident("a".into()), TokenKind::EqEq, TokenKind::Minus, TokenKind::Ident("b".into()), TokenKind::Eof,
        ]);
        assert_eq!(lex("t->add"), vec![
            TokenKind::Ident("t".into()), TokenKind::Arrow, TokenKind::Ident("add".into()), TokenKind::Eof,
        ]);
        assert_eq!(lex("- >"), vec![TokenKind::Minus, TokenKind::Gt, TokenKind::Eof]);
    }

    #[test]
    fn line_comment_skipped() {
        assert_eq!(lex("// comment\n42"), vec![TokenKind::Int(42), TokenKind::Eof]);
    }

    #[test]
    fn block_comment_skipped() {
        assert_eq!(lex("/* comment */42"), vec![TokenKind::Int(42), TokenKind::Eof]);
        assert_eq!(lex("/* a\nb */42"), vec![TokenKind::Int(42), TokenKind::Eof]);
    }

    #[test]
    fn block_comment_counts_lines() {
        let tokens = Lexer::new("/* one\ntwo\nthree */ x").tokenize().unwrap();
        assert_eq!(tokens[0].line, 3);
    }

    #[test]
    fn unterminated_comment_error() {
        let e = lex_err("1 /* never closed\n");
        assert_eq!(e.kind, LexErrorKind::UnterminatedComment);
        assert_eq!((e.line, e.column), (1, 3));
    }

    #[test]
    fn string_literal() {
        assert_eq!(lex(r#""hello""#), vec![TokenKind::Str("hello".into()), TokenKind::Eof]);
    }

    #[test]
    fn string_escapes() {
        assert_eq!(lex(r#""a\nb""#),  vec![TokenKind::Str("a\nb".into()),  TokenKind::Eof]);
        assert_eq!(lex(r#""a\tb""#),  vec![TokenKind::Str("a\tb".into()),  TokenKind::Eof]);
        assert_eq!(lex(r#""a\\b""#),  vec![TokenKind::Str("a\\b".into()),  TokenKind::Eof]);
        assert_eq!(lex(r#""say \"hi\"""#), vec![TokenKind::Str("say \"hi\"".into()), TokenKind::Eof]);
    }

    #[test]
    fn string_keeps_lexeme() {
        let tokens = Lexer::new(r#""a\"b""#).tokenize().unwrap();
        assert_eq!(tokens[0].lexeme, r#""a\"b""#);
    }

    #[test]
    fn multiline_string_counts_lines() {
        let tokens = Lexer::new("\"a\nb\" x").tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str("a\nb".into()));
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unicode_in_string() {
        assert_eq!(lex("\"Pokémon\""), vec![TokenKind::Str("Pokémon".into()), TokenKind::Eof]);
    }

    #[test]
    fn unterminated_string_error() {
        let e = lex_err("\n\"oops");
        assert_eq!(e.kind, LexErrorKind::UnterminatedString);
        assert_eq!(e.line, 2);
    }

    #[test]
    fn invalid_escape_error() {
        let e = lex_err(r#""\q""#);
        assert_eq!(e.kind, LexErrorKind::InvalidEscape);
    }

    #[test]
    fn bare_bang_error() {
        assert_eq!(lex_err("!").kind, LexErrorKind::UnexpectedCharacter);
    }

    #[test]
    fn unexpected_character_reports_position() {
        let e = lex_err("var a = 1;\nvar b = @;");
        assert_eq!(e.kind, LexErrorKind::UnexpectedCharacter);
        assert_eq!((e.line, e.column), (2, 9));
        let e = lex_err("é");
        assert_eq!(e.len, 2);
    }

    #[test]
    fn line_and_column_tracking() {
        let tokens = Lexer::new("a\n  b").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
        assert_eq!(tokens[1].offset, 4);
    }

    #[test]
    fn eof_line_without_trailing_newline() {
        let tokens = Lexer::new("print 1;").tokenize().unwrap();
        assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
        assert_eq!(tokens.last().unwrap().line, 1);
    }

    #[test]
    fn eof_line_with_trailing_newline() {
        let tokens = Lexer::new("print 1;\n").tokenize().unwrap();
        assert_eq!(tokens.last().unwrap().line, 2);
        let tokens = Lexer::new("print 1;\n// tail comment").tokenize().unwrap();
        assert_eq!(tokens.last().unwrap().line, 2);
    }

    #[test]
    fn exactly_one_eof() {
        let tokens = Lexer::new("var x = 1;\n\n").tokenize().unwrap();
        assert_eq!(tokens.iter().filter(|t| t.kind == TokenKind::Eof).count(), 1);
    }

    #[test]
    fn fresh_lexer_resets_lines() {
        let first = Lexer::new("\n\n\nx").tokenize().unwrap();
        assert_eq!(first[0].line, 4);
        let second = Lexer::new("x").tokenize().unwrap();
        assert_eq!(second[0].line, 1);
    }

    #[test]
    fn statement_stream() {
        assert_eq!(
            lex("myZone->addBalls(5);"),
            vec![
                TokenKind::Ident("myZone".into()),
                TokenKind::Arrow,
                TokenKind::Ident("addBalls".into()),
                TokenKind::LParen,
                TokenKind::Int(5),
                TokenKind::RParen,
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_described_as_such() {
        assert_eq!(TokenKind::Repeat.describe(), "keyword `repeat`");
        assert_eq!(TokenKind::Plus.describe(), "`+`");
        assert_eq!(TokenKind::Ident("x".into()).describe(), "identifier `x`");
    }
}
