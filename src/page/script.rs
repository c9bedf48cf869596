//! Minimal script tokenizer
//!
//! Gallery pages carry their artwork listing inside an inline script, as the
//! value of a `"years"` property. Rather than pattern-matching raw text, the
//! script is split into tokens (so strings, comments, and regex literals
//! cannot fake a match) and the first double-quoted `"years":` key is
//! located. The value's source span is returned for JSON decoding.

/// Token categories the property search cares about
#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    /// Decoded string literal and its opening quote
    Str { value: String, quote: u8 },
    Number,
    Punct(&'static str),
    Other,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// Multi-character operators that must not be mistaken for `=`
const COMPOUND_OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", "=>", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=",
    "&&", "||", "??", "?.",
];

const SINGLE_PUNCT: &[&str] = &[
    "{", "}", "[", "]", "(", ")", ",", ";", ":", "=", ".", "?", "+", "-", "*", "/", "%", "<",
    ">", "!", "&", "|", "^", "~",
];

struct Lexer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            start,
            end: self.pos,
        });
    }

    /// A `/` starts a regex literal unless it follows something that ends an expression
    fn slash_starts_regex(&self) -> bool {
        match self.tokens.last().map(|t| &t.kind) {
            None => true,
            Some(TokenKind::Ident(_)) | Some(TokenKind::Str { .. }) | Some(TokenKind::Number) => {
                false
            }
            Some(TokenKind::Punct(p)) => !matches!(*p, ")" | "]" | "}"),
            Some(TokenKind::Other) => false,
        }
    }

    fn run(mut self) -> Vec<Token> {
        while let Some(b) = self.peek(0) {
            let start = self.pos;
            match b {
                b if b.is_ascii_whitespace() => self.pos += 1,
                b'/' if self.peek(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek(1) == Some(b'*') => self.skip_block_comment(),
                b'/' if self.slash_starts_regex() => {
                    self.skip_regex();
                    self.push(TokenKind::Other, start);
                }
                b'"' | b'\'' => {
                    let value = self.read_string(b);
                    self.push(TokenKind::Str { value, quote: b }, start);
                }
                b'`' => {
                    self.skip_template();
                    self.push(TokenKind::Other, start);
                }
                b if b.is_ascii_digit() => {
                    self.read_number();
                    self.push(TokenKind::Number, start);
                }
                b if b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80 => {
                    let ident = self.read_ident();
                    self.push(TokenKind::Ident(ident), start);
                }
                _ => {
                    let punct = self.read_punct();
                    self.push(punct, start);
                }
            }
        }
        self.tokens
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek(0) {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.peek(0) == Some(b'*') && self.peek(1) == Some(b'/') {
                self.pos += 2;
                return;
            }
            self.pos += 1;
        }
    }

    /// Steps over the character after a backslash, whatever its width
    fn skip_escaped(&mut self) {
        self.pos += self.src[self.pos..]
            .chars()
            .next()
            .map(char::len_utf8)
            .unwrap_or(0);
    }

    fn skip_regex(&mut self) {
        self.pos += 1;
        let mut in_class = false;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            match b {
                b'\\' => self.skip_escaped(),
                b'[' => in_class = true,
                b']' => in_class = false,
                b'/' if !in_class => break,
                b'\n' => break,
                _ => {}
            }
        }
        // flags
        while matches!(self.peek(0), Some(b) if b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
    }

    fn skip_template(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek(0) {
            self.pos += 1;
            match b {
                b'\\' => self.skip_escaped(),
                b'`' => break,
                _ => {}
            }
        }
    }

    /// Reads a quoted string, returning its decoded value
    fn read_string(&mut self, quote: u8) -> String {
        self.pos += 1;
        let mut value = String::new();
        let mut chars = self.src[self.pos..].char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                c if c as u32 == quote as u32 => {
                    self.pos += offset + 1;
                    return value;
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, other)) => value.push(other),
                    None => break,
                },
                c => value.push(c),
            }
        }

        // Unterminated string runs to the end of the script
        self.pos = self.bytes.len();
        value
    }

    fn read_number(&mut self) {
        while matches!(self.peek(0), Some(b) if b.is_ascii_alphanumeric() || b == b'.' || b == b'_')
        {
            self.pos += 1;
        }
    }

    fn read_ident(&mut self) -> String {
        let start = self.pos;
        let rest = &self.src[start..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == '$'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        // A non-ASCII, non-identifier character still has to make progress
        let len = if len == 0 {
            rest.chars().next().map(char::len_utf8).unwrap_or(1)
        } else {
            len
        };
        self.pos += len;
        self.src[start..self.pos].to_string()
    }

    fn read_punct(&mut self) -> TokenKind {
        let rest = &self.src[self.pos..];
        for op in COMPOUND_OPERATORS.iter().chain(SINGLE_PUNCT.iter()).copied() {
            if rest.starts_with(op) {
                self.pos += op.len();
                return TokenKind::Punct(op);
            }
        }
        self.pos += rest.chars().next().map(char::len_utf8).unwrap_or(1);
        TokenKind::Other
    }
}

fn tokenize(source: &str) -> Vec<Token> {
    Lexer::new(source).run()
}

/// Finds the value of the first `"name": <value>` property in a script
///
/// Only a double-quoted string key followed by `:` matches. Bare identifiers
/// (`var name = ...`, `{name: ...}`) and single-quoted keys are ignored. The
/// returned slice is the source text of the value expression, running until a
/// `,`, `;`, or unmatched closing bracket at nesting depth zero.
///
/// # Example
///
/// ```
/// use artsweep::page::find_property;
///
/// let script = r#"var cfg = {"years": {"2020": []}, "other": 1};"#;
/// assert_eq!(find_property(script, "years"), Some(r#"{"2020": []}"#));
/// ```
pub fn find_property<'a>(source: &'a str, name: &str) -> Option<&'a str> {
    let tokens = tokenize(source);
    tracing::trace!("Tokenized script into {} tokens", tokens.len());

    let target = tokens.windows(2).position(|pair| {
        let names_target = matches!(
            &pair[0].kind,
            TokenKind::Str { value, quote: b'"' } if value == name
        );
        names_target && pair[1].kind == TokenKind::Punct(":")
    })?;

    let value_tokens = &tokens[target + 2..];
    let first = value_tokens.first()?;

    let mut depth: usize = 0;
    let mut end = first.end;
    for token in value_tokens {
        match token.kind {
            TokenKind::Punct("{") | TokenKind::Punct("[") | TokenKind::Punct("(") => depth += 1,
            TokenKind::Punct("}") | TokenKind::Punct("]") | TokenKind::Punct(")") => {
                if depth == 0 {
                    break;
                }
                depth -= 1;
            }
            TokenKind::Punct(",") | TokenKind::Punct(";") if depth == 0 => break,
            _ => {}
        }
        end = token.end;
    }

    Some(source[first.start..end].trim())
}
