//! Glob-style key patterns.
//!
//! Supported syntax (same as the `KEYS` command):
//! - `*` matches any sequence, including the empty one
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]` match one character from the set
//! - `[^abc]` or `[!abc]` matches one character not in the set
//! - `\x` matches `x` literally
//!
//! Patterns are compiled once into tokens; matching backtracks only to the
//! most recent `*`, so it is linear in practice and never recursive.

use thiserror::Error;

/// Errors that can occur when compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("unterminated character class")]
    UnterminatedClass,

    #[error("trailing escape character")]
    TrailingEscape,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(char),
    AnyOne,
    AnyMany,
    Class { negated: bool, items: Vec<ClassItem> },
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    tokens: Vec<Token>,
    nocase: bool,
}

impl Pattern {
    /// Compile a case-sensitive pattern.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        Self::compile(pattern, false)
    }

    /// Compile a pattern that ignores ASCII case.
    pub fn new_nocase(pattern: &str) -> Result<Self, PatternError> {
        Self::compile(pattern, true)
    }

    fn compile(pattern: &str, nocase: bool) -> Result<Self, PatternError> {
        let fold = |c: char| if nocase { c.to_ascii_lowercase() } else { c };
        let mut tokens = Vec::new();
        let mut chars = pattern.chars().peekable();

        while let Some(c) = chars.next() {
            let token = match c {
                '*' => {
                    // Runs of stars are equivalent to one.
                    if tokens.last() == Some(&Token::AnyMany) {
                        continue;
                    }
                    Token::AnyMany
                }
                '?' => Token::AnyOne,
                '\\' => Token::Literal(fold(chars.next().ok_or(PatternError::TrailingEscape)?)),
                '[' => {
                    let negated = chars.next_if(|c| *c == '^' || *c == '!').is_some();
                    let mut items = Vec::new();
                    loop {
                        let c = match chars.next() {
                            None => return Err(PatternError::UnterminatedClass),
                            Some(']') => break,
                            Some('\\') => chars.next().ok_or(PatternError::UnterminatedClass)?,
                            Some(c) => c,
                        };
                        let c = fold(c);
                        // `a-z`, unless the dash closes the class: `[a-]`
                        if chars.peek() == Some(&'-') {
                            let mut lookahead = chars.clone();
                            lookahead.next();
                            match lookahead.next() {
                                Some(end) if end != ']' => {
                                    chars.next();
                                    chars.next();
                                    let end = fold(end);
                                    let (lo, hi) = if c <= end { (c, end) } else { (end, c) };
                                    items.push(ClassItem::Range(lo, hi));
                                    continue;
                                }
                                _ => {}
                            }
                        }
                        items.push(ClassItem::Char(c));
                    }
                    Token::Class { negated, items }
                }
                c => Token::Literal(fold(c)),
            };
            tokens.push(token);
        }

        Ok(Self {
            tokens,
            nocase,
        })
    }

    /// Check whether `text` matches this pattern as a whole.
    pub fn is_match(&self, text: &str) -> bool {
        let text: Vec<char> = if self.nocase {
            text.chars().map(|c| c.to_ascii_lowercase()).collect()
        } else {
            text.chars().collect()
        };

        let (mut t, mut p) = (0, 0);
        // (token after the last `*`, text position that `*` currently ends at)
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(Token::AnyMany) => {
                    p += 1;
                    backtrack = Some((p, t));
                    continue;
                }
                Some(token) if token.matches_char(text[t]) => {
                    p += 1;
                    t += 1;
                    continue;
                }
                _ => {}
            }

            match backtrack {
                Some((star_p, star_t)) => {
                    p = star_p;
                    t = star_t + 1;
                    backtrack = Some((star_p, t));
                }
                None => return false,
            }
        }

        self.tokens[p..].iter().all(|token| *token == Token::AnyMany)
    }
}

impl Token {
    fn matches_char(&self, c: char) -> bool {
        match self {
            Token::Literal(expected) => *expected == c,
            Token::AnyOne => true,
            Token::AnyMany => false,
            Token::Class { negated, items } => {
                let hit = items.iter().any(|item| match item {
                    ClassItem::Char(x) => *x == c,
                    ClassItem::Range(lo, hi) => (*lo..=*hi).contains(&c),
                });
                hit != *negated
            }
        }
    }
}
