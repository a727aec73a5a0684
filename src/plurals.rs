use std::sync::LazyLock;

use regex::Regex;

use crate::Error;

/// Shape of a Plural-Forms header. Only digits, `n`, operators, parentheses
/// and whitespace may appear in the expression.
// constant pattern, it cannot fail to compile
static PLURAL_FORMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^nplurals\s*=\s*([0-9]+)\s*;\s*plural\s*=([\s0-9n?|\&=!<>+*/%:()\-]+);$")
        .expect("plural forms pattern is valid")
});

/// Maps a count to the index of its plural form.
///
/// Built either from a Plural-Forms header with [`PluralForms::compile`]
/// or from a plain function.
#[derive(Clone, Debug)]
pub struct PluralForms {
    nplurals: Option<usize>,
    resolver: Resolver,
}

#[derive(Clone, Debug)]
enum Resolver {
    /// A parsed plural expression
    Expr(Ast),
    /// A function
    Function(fn(u64) -> usize),
}

/// The germanic rule used when a catalog declares none: `n != 1`.
pub fn default_resolver(n: u64) -> usize {
    if n == 1 {
        0
    } else {
        1
    }
}

impl Default for PluralForms {
    fn default() -> Self {
        PluralForms::from_fn(default_resolver)
    }
}

impl PluralForms {
    /// Compiles a header value such as `nplurals=2; plural=(n != 1);`.
    ///
    /// The trailing `;` is optional. Anything outside the plural grammar
    /// is rejected with [`Error::PluralRuleSyntax`].
    pub fn compile(rule: &str) -> Result<Self, Error> {
        let mut src = rule.trim().to_owned();
        if !src.ends_with(';') {
            src.push(';');
        }
        let syntax_error = || Error::PluralRuleSyntax(rule.to_owned());

        let caps = PLURAL_FORMS.captures(&src).ok_or_else(syntax_error)?;
        let nplurals = caps[1].parse::<usize>().map_err(|_| syntax_error())?;
        let ast = Ast::parse(&caps[2]).map_err(|_| syntax_error())?;

        Ok(PluralForms {
            nplurals: Some(nplurals),
            resolver: Resolver::Expr(ast),
        })
    }

    /// Wraps a plain function. The result carries no `nplurals` bound.
    pub fn from_fn(f: fn(u64) -> usize) -> Self {
        PluralForms {
            nplurals: None,
            resolver: Resolver::Function(f),
        }
    }

    /// The number of plural forms the rule declares, if it declares one.
    pub fn nplurals(&self) -> Option<usize> {
        self.nplurals
    }

    /// Returns the number of the correct plural form
    /// for `n` objects, as defined by the rule contained in this resolver.
    pub fn resolve(&self, n: u64) -> usize {
        match self.resolver {
            Resolver::Expr(ref ast) => usize::try_from(ast.resolve(n)).unwrap_or(0),
            Resolver::Function(f) => f(n),
        }
    }
}

use self::Ast::*;
#[derive(Clone, Debug, PartialEq)]
pub enum Ast {
    /// A ternary expression
    /// x ? a : b
    ///
    /// the three Ast are respectively x, a and b.
    Ternary(Box<Ast>, Box<Ast>, Box<Ast>),
    /// The n variable.
    N,
    /// Integer literals.
    Integer(u64),
    /// Binary operators.
    Op(Operator, Box<Ast>, Box<Ast>),
    /// ! operator.
    Not(Box<Ast>),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operator {
    Equal,
    NotEqual,
    GreaterOrEqual,
    SmallerOrEqual,
    Greater,
    Smaller,
    And,
    Or,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl Ast {
    /// Evaluates the expression with `n` bound to the count.
    /// Booleans are 1 and 0; division by zero yields 0.
    /// Evaluated in `i128` so that every `u64` count is exact.
    fn resolve(&self, n: u64) -> i128 {
        match *self {
            Ternary(ref cond, ref ok, ref nok) => {
                if cond.resolve(n) == 0 {
                    nok.resolve(n)
                } else {
                    ok.resolve(n)
                }
            }
            N => i128::from(n),
            Integer(x) => i128::from(x),
            Op(op, ref lhs, ref rhs) => {
                let l = lhs.resolve(n);
                match op {
                    // short-circuit like C does
                    Operator::And => (l != 0 && rhs.resolve(n) != 0) as i128,
                    Operator::Or => (l != 0 || rhs.resolve(n) != 0) as i128,
                    _ => op.apply(l, rhs.resolve(n)),
                }
            }
            Not(ref val) => match val.resolve(n) {
                0 => 1,
                _ => 0,
            },
        }
    }

    pub fn parse(src: &str) -> Result<Ast, Error> {
        let tokens = tokenize(src)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let ast = parser.ternary()?;
        if parser.pos != parser.tokens.len() {
            return Err(Error::PluralRuleSyntax(src.to_owned()));
        }
        Ok(ast)
    }
}

impl Operator {
    fn apply(self, l: i128, r: i128) -> i128 {
        match self {
            Operator::Equal => (l == r) as i128,
            Operator::NotEqual => (l != r) as i128,
            Operator::GreaterOrEqual => (l >= r) as i128,
            Operator::SmallerOrEqual => (l <= r) as i128,
            Operator::Greater => (l > r) as i128,
            Operator::Smaller => (l < r) as i128,
            Operator::And => (l != 0 && r != 0) as i128,
            Operator::Or => (l != 0 || r != 0) as i128,
            Operator::Plus => l.wrapping_add(r),
            Operator::Minus => l.wrapping_sub(r),
            Operator::Multiply => l.wrapping_mul(r),
            Operator::Divide => l.checked_div(r).unwrap_or(0),
            Operator::Modulo => l.checked_rem(r).unwrap_or(0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Int(u64),
    N,
    Op(Operator),
    Not,
    Question,
    Colon,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> Result<Vec<Token>, Error> {
    let err = || Error::PluralRuleSyntax(src.to_owned());
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let next = bytes.get(i + 1).copied();
        let (token, len) = match (bytes[i], next) {
            (b' ' | b'\t' | b'\r' | b'\n', _) => {
                i += 1;
                continue;
            }
            (b'0'..=b'9', _) => {
                let end = bytes[i..]
                    .iter()
                    .position(|b| !b.is_ascii_digit())
                    .map_or(bytes.len(), |p| i + p);
                let value = src[i..end].parse::<u64>().map_err(|_| err())?;
                (Token::Int(value), end - i)
            }
            (b'n', _) => (Token::N, 1),
            (b'=', Some(b'=')) => (Token::Op(Operator::Equal), 2),
            (b'!', Some(b'=')) => (Token::Op(Operator::NotEqual), 2),
            (b'>', Some(b'=')) => (Token::Op(Operator::GreaterOrEqual), 2),
            (b'<', Some(b'=')) => (Token::Op(Operator::SmallerOrEqual), 2),
            (b'&', Some(b'&')) => (Token::Op(Operator::And), 2),
            (b'|', Some(b'|')) => (Token::Op(Operator::Or), 2),
            (b'>', _) => (Token::Op(Operator::Greater), 1),
            (b'<', _) => (Token::Op(Operator::Smaller), 1),
            (b'+', _) => (Token::Op(Operator::Plus), 1),
            (b'-', _) => (Token::Op(Operator::Minus), 1),
            (b'*', _) => (Token::Op(Operator::Multiply), 1),
            (b'/', _) => (Token::Op(Operator::Divide), 1),
            (b'%', _) => (Token::Op(Operator::Modulo), 1),
            (b'!', _) => (Token::Not, 1),
            (b'?', _) => (Token::Question, 1),
            (b':', _) => (Token::Colon, 1),
            (b'(', _) => (Token::LParen, 1),
            (b')', _) => (Token::RParen, 1),
            _ => return Err(err()),
        };
        tokens.push(token);
        i += len;
    }
    Ok(tokens)
}

/// Deepest nesting of parentheses, ternaries and `!` a rule may use.
const MAX_DEPTH: usize = 64;

/// Recursive descent over C operator precedence, loosest binding first.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Result<Token, Error> {
        let token = self.peek().ok_or_else(|| self.error())?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: Token) -> Result<(), Error> {
        if self.next()? == expected {
            Ok(())
        } else {
            Err(self.error())
        }
    }

    fn error(&self) -> Error {
        Error::PluralRuleSyntax(format!("unexpected token at position {}", self.pos))
    }

    fn enter(&mut self) -> Result<(), Error> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(Error::PluralRuleSyntax(format!(
                "nested deeper than {} levels at position {}",
                MAX_DEPTH, self.pos
            )));
        }
        Ok(())
    }

    fn ternary(&mut self) -> Result<Ast, Error> {
        self.enter()?;
        let cond = self.binary(0)?;
        let ast = if self.peek() == Some(Token::Question) {
            self.pos += 1;
            let ok = self.ternary()?;
            self.expect(Token::Colon)?;
            let nok = self.ternary()?;
            Ternary(Box::new(cond), Box::new(ok), Box::new(nok))
        } else {
            cond
        };
        self.depth -= 1;
        Ok(ast)
    }

    /// Left-associative binary operators at `level` and tighter.
    fn binary(&mut self, level: usize) -> Result<Ast, Error> {
        if level == PRECEDENCE.len() {
            return self.unary();
        }
        let mut lhs = self.binary(level + 1)?;
        while let Some(Token::Op(op)) = self.peek() {
            if !PRECEDENCE[level].contains(&op) {
                break;
            }
            self.pos += 1;
            let rhs = self.binary(level + 1)?;
            lhs = Op(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Ast, Error> {
        match self.next()? {
            Token::Not => {
                self.enter()?;
                let inner = self.unary()?;
                self.depth -= 1;
                Ok(Not(Box::new(inner)))
            }
            Token::Int(x) => Ok(Integer(x)),
            Token::N => Ok(N),
            Token::LParen => {
                let inner = self.ternary()?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            _ => Err(self.error()),
        }
    }
}

const PRECEDENCE: [&[Operator]; 6] = [
    &[Operator::Or],
    &[Operator::And],
    &[Operator::Equal, Operator::NotEqual],
    &[
        Operator::Smaller,
        Operator::Greater,
        Operator::SmallerOrEqual,
        Operator::GreaterOrEqual,
    ],
    &[Operator::Plus, Operator::Minus],
    &[Operator::Multiply, Operator::Divide, Operator::Modulo],
];
