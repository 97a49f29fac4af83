// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Parser for Traefik router rule expressions.
//!
//! A rule combines matcher calls with boolean operators:
//!
//! ```text
//! Host(`a.example.com`, `b.example.com`) && (PathPrefix(`/api`) || !Method(`POST`))
//! ```
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! expr    := and ( "||" and )*
//! and     := unary ( "&&" unary )*
//! unary   := "!" unary | "(" expr ")" | matcher
//! matcher := IDENT "(" [ STRING ( "," STRING )* ] ")"
//! STRING  := `raw` | "quoted with \" escapes"
//! ```
//!
//! Matcher names are accepted in their canonical form as well as all-lowercase,
//! all-uppercase and capitalized spellings (`Host`, `host`, `HOST`). Unknown
//! matchers are rejected.
//!
//! # Example
//!
//! ```rust
//! use switchboard::rule::parse_domains;
//!
//! let hosts = parse_domains("Host(`A.example.com`) && PathPrefix(`/api`)").unwrap();
//! assert_eq!(hosts, vec!["a.example.com".to_string()]);
//!
//! assert!(parse_domains("Host(`a.example.com`").is_err());
//! ```

use crate::constants::HOST_MATCHER;
use crate::errors::Error;

/// Matchers understood by Traefik HTTP routers (v2 and v3 names).
const KNOWN_MATCHERS: &[&str] = &[
    "ClientIP",
    "Header",
    "HeaderRegexp",
    "Headers",
    "HeadersRegexp",
    "Host",
    "HostHeader",
    "HostRegexp",
    "Method",
    "Path",
    "PathPrefix",
    "PathRegexp",
    "Query",
    "QueryRegexp",
];

/// Parsed rule expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rule {
    /// Every operand must match. Chained `&&` operators flatten into one node.
    And(Vec<Rule>),
    /// Any operand must match. Chained `||` operators flatten into one node.
    Or(Vec<Rule>),
    /// Negation of the inner rule.
    Not(Box<Rule>),
    /// A matcher call, with its canonical name and string arguments.
    Matcher {
        /// Canonical matcher name (e.g. `Host`)
        name: &'static str,
        /// Arguments in source order
        args: Vec<String>,
    },
}

impl Rule {
    /// Collects the arguments of every call to `matcher`, lowercased, in source order.
    ///
    /// Negated matchers are included: the rule still names those values.
    #[must_use]
    pub fn values_of(&self, matcher: &str) -> Vec<String> {
        let mut values = Vec::new();
        self.collect_values(matcher, &mut values);
        values
    }

    fn collect_values(&self, matcher: &str, values: &mut Vec<String>) {
        match self {
            Rule::And(operands) | Rule::Or(operands) => {
                for operand in operands {
                    operand.collect_values(matcher, values);
                }
            }
            Rule::Not(inner) => inner.collect_values(matcher, values),
            Rule::Matcher { name, args } => {
                if *name == matcher {
                    values.extend(args.iter().map(|arg| arg.to_lowercase()));
                }
            }
        }
    }
}

/// Parses a rule expression.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the expression is empty, contains an unknown matcher,
/// an unterminated string, unbalanced parentheses, trailing input, or nests
/// parentheses and negations deeper than [`MAX_NESTING_DEPTH`].
pub fn parse_rule(rule: &str) -> Result<Rule, Error> {
    let tokens = tokenize(rule)?;
    let mut parser = Parser {
        rule,
        tokens,
        pos: 0,
        depth: 0,
    };
    if parser.tokens.is_empty() {
        return Err(parse_error(rule, "empty rule"));
    }
    let expr = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(parse_error(
            rule,
            &format!("unexpected {} after end of expression", token.describe()),
        ));
    }
    Ok(expr)
}

/// Parses a rule expression and returns the hostnames of all `Host` matchers.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the expression is malformed, see [`parse_rule`].
pub fn parse_domains(rule: &str) -> Result<Vec<String>, Error> {
    Ok(parse_rule(rule)?.values_of(HOST_MATCHER))
}

fn parse_error(rule: &str, reason: &str) -> Error {
    Error::Parse {
        rule: rule.to_string(),
        reason: reason.to_string(),
    }
}

/// Resolves any accepted spelling of a matcher to its canonical name.
fn canonical_matcher(ident: &str) -> Option<&'static str> {
    KNOWN_MATCHERS.iter().copied().find(|name| {
        let lower = name.to_lowercase();
        let mut capitalized = lower.clone();
        if let Some(first) = capitalized.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        ident == *name || ident == lower || ident == name.to_uppercase() || ident == capitalized
    })
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Str(String),
    LParen,
    RParen,
    Comma,
    And,
    Or,
    Not,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(ident) => format!("identifier `{ident}`"),
            Token::Str(value) => format!("string `{value}`"),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::And => "`&&`".to_string(),
            Token::Or => "`||`".to_string(),
            Token::Not => "`!`".to_string(),
        }
    }
}

fn tokenize(rule: &str) -> Result<Vec<Token>, Error> {
    let mut tokens = Vec::new();
    let mut chars = rule.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '!' => {
                chars.next();
                tokens.push(Token::Not);
            }
            '&' | '|' => {
                chars.next();
                if chars.next() != Some(c) {
                    return Err(parse_error(rule, &format!("expected `{c}{c}`")));
                }
                tokens.push(if c == '&' { Token::And } else { Token::Or });
            }
            '`' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('`') => break,
                        Some(ch) => value.push(ch),
                        None => return Err(parse_error(rule, "unterminated raw string")),
                    }
                }
                tokens.push(Token::Str(value));
            }
            '"' => {
                chars.next();
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('"') => value.push('"'),
                            Some('\\') => value.push('\\'),
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(other) => {
                                return Err(parse_error(
                                    rule,
                                    &format!("unsupported escape `\\{other}`"),
                                ))
                            }
                            None => return Err(parse_error(rule, "unterminated string")),
                        },
                        Some(ch) => value.push(ch),
                        None => return Err(parse_error(rule, "unterminated string")),
                    }
                }
                tokens.push(Token::Str(value));
            }
            c if c.is_ascii_alphabetic() => {
                let mut ident = String::new();
                while let Some(&ch) = chars.peek() {
                    if ch.is_ascii_alphanumeric() || ch == '_' {
                        ident.push(ch);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(parse_error(rule, &format!("unexpected character `{other}`")));
            }
        }
    }

    Ok(tokens)
}

// ============================================================================
// Parser
// ============================================================================

/// Deepest allowed nesting of parenthesised and negated sub-expressions.
///
/// The parser and [`Rule`] are recursive, so an unbounded rule could exhaust the stack.
pub const MAX_NESTING_DEPTH: usize = 128;

struct Parser<'a> {
    rule: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<(), Error> {
        match self.next() {
            Some(ref token) if token == expected => Ok(()),
            Some(token) => Err(self.error(&format!(
                "expected {}, found {}",
                expected.describe(),
                token.describe()
            ))),
            None => Err(self.error(&format!(
                "expected {}, found end of rule",
                expected.describe()
            ))),
        }
    }

    fn error(&self, reason: &str) -> Error {
        parse_error(self.rule, reason)
    }

    fn parse_or(&mut self) -> Result<Rule, Error> {
        let mut operands = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.next();
            operands.push(self.parse_and()?);
        }
        Ok(flatten(operands, Rule::Or))
    }

    fn parse_and(&mut self) -> Result<Rule, Error> {
        let mut operands = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.next();
            operands.push(self.parse_unary()?);
        }
        Ok(flatten(operands, Rule::And))
    }

    fn parse_unary(&mut self) -> Result<Rule, Error> {
        match self.next() {
            Some(Token::Not) => {
                let inner = self.nested(Self::parse_unary)?;
                Ok(Rule::Not(Box::new(inner)))
            }
            Some(Token::LParen) => {
                let inner = self.nested(Self::parse_or)?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(ident)) => self.parse_matcher(&ident),
            Some(token) => Err(self.error(&format!(
                "expected matcher, found {}",
                token.describe()
            ))),
            None => Err(self.error("expected matcher, found end of rule")),
        }
    }

    /// Runs `parse` one nesting level deeper.
    fn nested(&mut self, parse: fn(&mut Self) -> Result<Rule, Error>) -> Result<Rule, Error> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self.error("rule nested too deeply"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_matcher(&mut self, ident: &str) -> Result<Rule, Error> {
        let name = canonical_matcher(ident)
            .ok_or_else(|| self.error(&format!("unknown matcher `{ident}`")))?;
        self.expect(&Token::LParen)?;

        let mut args = Vec::new();
        if self.peek() == Some(&Token::RParen) {
            self.next();
            return Ok(Rule::Matcher { name, args });
        }

        loop {
            match self.next() {
                Some(Token::Str(value)) => args.push(value),
                Some(token) => {
                    return Err(self.error(&format!(
                        "expected string argument to `{name}`, found {}",
                        token.describe()
                    )))
                }
                None => return Err(self.error("unterminated matcher arguments")),
            }
            match self.next() {
                Some(Token::Comma) => {}
                Some(Token::RParen) => break,
                Some(token) => {
                    return Err(self.error(&format!(
                        "expected `,` or `)`, found {}",
                        token.describe()
                    )))
                }
                None => return Err(self.error("unterminated matcher arguments")),
            }
        }

        Ok(Rule::Matcher { name, args })
    }
}

fn flatten(mut operands: Vec<Rule>, combine: fn(Vec<Rule>) -> Rule) -> Rule {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        combine(operands)
    }
}

#[cfg(test)]
#[path = "rule_tests.rs"]
mod rule_tests;
