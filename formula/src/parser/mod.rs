//! Infix to postfix conversion (shunting-yard)

use crate::error::{EvalError, Result};
use crate::lexer::{CastTarget, Lexeme, Token, Tokens};
use crate::value::Value;
use std::fmt;

/// Binary and unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Intersect,
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    And,
    Or,
    Not,
}

impl Operator {
    fn from_token(token: Token) -> Option<Self> {
        Some(match token {
            Token::Plus => Operator::Add,
            Token::Minus => Operator::Sub,
            Token::Star => Operator::Mul,
            Token::Slash => Operator::Div,
            Token::Hash => Operator::Mod,
            Token::Caret => Operator::Intersect,
            Token::Eq => Operator::Eq,
            Token::NotEq => Operator::NotEq,
            Token::Gt => Operator::Gt,
            Token::Lt => Operator::Lt,
            Token::GtEq => Operator::GtEq,
            Token::LtEq => Operator::LtEq,
            Token::AndAnd | Token::And => Operator::And,
            Token::OrOr | Token::Or => Operator::Or,
            Token::Not => Operator::Not,
            _ => return None,
        })
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Mod => "#",
            Operator::Intersect => "^",
            Operator::Eq => "=",
            Operator::NotEq => "<>",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::GtEq => ">=",
            Operator::LtEq => "<=",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Not => "!",
        }
    }
}

/// One element of the postfix stream
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Literal(Value),
    Symbol(String),
    Method(String),
    Operator(Operator),
    Comma,
    Colon,
    Question,
    Cast(CastTarget),
    /// Closing `}`: index the collection below by the value on top
    Indexify,
    /// Closing `]`: turn the operand into a homogeneous list
    Listify,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Literal(Value::String(s)) => write!(f, "{s:?}"),
            Instruction::Literal(Value::Char(c)) => write!(f, "{c:?}"),
            Instruction::Literal(value) => write!(f, "{value}"),
            Instruction::Symbol(name) => write!(f, "{name}"),
            Instruction::Method(name) => write!(f, "{name}()"),
            Instruction::Operator(op) => write!(f, "{}", op.symbol()),
            Instruction::Comma => write!(f, ","),
            Instruction::Colon => write!(f, ":"),
            Instruction::Question => write!(f, "?"),
            Instruction::Cast(target) => write!(f, "<{target:?}>"),
            Instruction::Indexify => write!(f, "{{}}"),
            Instruction::Listify => write!(f, "[]"),
        }
    }
}

/// Postfix instruction stream; the evaluator consumes it from the tail
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Postfix(Vec<Instruction>);

impl Postfix {
    pub fn instructions(&self) -> &[Instruction] {
        &self.0
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Postfix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instruction) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}

/// Binding strength of tokens that go through the operator stack.
pub fn precedence(token: Token) -> Option<u8> {
    Some(match token {
        Token::LParen | Token::LBracket | Token::LBrace => 1,
        Token::Colon => 2,
        Token::Comma => 3,
        Token::OrOr | Token::Or => 4,
        Token::AndAnd | Token::And => 5,
        Token::Eq | Token::NotEq | Token::Gt | Token::Lt | Token::GtEq | Token::LtEq => 6,
        Token::Plus | Token::Minus => 7,
        Token::Star | Token::Slash | Token::Hash => 10,
        Token::Caret => 20,
        Token::Not => 40,
        Token::Method | Token::Question => 50,
        Token::Symbol => 70,
        Token::Cast(_) => 100,
        _ => return None,
    })
}

/// Tokens that start an operand; they wait on the stack without popping anything.
fn is_prefix(token: Token) -> bool {
    matches!(
        token,
        Token::Symbol | Token::Method | Token::Cast(_) | Token::Not | Token::Question
    )
}

const OPERAND_PRECEDENCE: u8 = 50;

/// Convert an infix token sequence to a postfix instruction stream.
///
/// Whitespace tokens are skipped.
pub fn to_postfix(tokens: &Tokens) -> Result<Postfix> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<&Lexeme> = Vec::new();
    let mut previous: Option<Token> = None;

    for lexeme in tokens.iter().filter(|l| l.token != Token::Whitespace) {
        let token = lexeme.token;
        if token.is_literal() {
            output.push(Instruction::Literal(parse_literal(lexeme)?));
        } else if token.is_open_bracket() {
            if token == Token::LBrace {
                // `Name{..}` and `Method(..){..}` index the finished operand
                while let Some(top) = stack.last().copied().filter(|top| stack_precedence(top) >= OPERAND_PRECEDENCE) {
                    output.push(to_instruction(top)?);
                    stack.pop();
                }
            }
            stack.push(lexeme);
        } else if token.is_close_bracket() {
            close_bracket(lexeme, &mut stack, &mut output, previous)?;
        } else if let Some(incoming) = precedence(token) {
            if !is_prefix(token) {
                while let Some(top) = stack.last().copied().filter(|top| stack_precedence(top) >= incoming) {
                    output.push(to_instruction(top)?);
                    stack.pop();
                }
            }
            stack.push(lexeme);
        } else {
            return Err(EvalError::parse(format!("unexpected token `{}`", lexeme.text), lexeme.span));
        }
        previous = Some(token);
    }

    while let Some(top) = stack.pop() {
        if top.token.is_open_bracket() {
            return Err(EvalError::unbalanced(format!("`{}` is never closed", top.text), top.span));
        }
        output.push(to_instruction(top)?);
    }

    tracing::debug!(instructions = output.len(), "built postfix stream");
    Ok(Postfix(output))
}

fn stack_precedence(lexeme: &Lexeme) -> u8 {
    precedence(lexeme.token).unwrap_or(0)
}

fn close_bracket<'a>(
    closing: &'a Lexeme,
    stack: &mut Vec<&'a Lexeme>,
    output: &mut Vec<Instruction>,
    previous: Option<Token>,
) -> Result<()> {
    loop {
        let Some(top) = stack.pop() else {
            return Err(EvalError::unbalanced(
                format!("`{}` has no matching open bracket", closing.text),
                closing.span,
            ));
        };
        if !top.token.is_open_bracket() {
            output.push(to_instruction(top)?);
            continue;
        }
        let span = top.span.merge(closing.span);
        return match (top.token, closing.token) {
            (Token::LParen, Token::RParen) if previous == Some(Token::LParen) => {
                // empty argument group of `Name()`
                output.push(Instruction::Literal(Value::CommaList(Vec::new())));
                Ok(())
            }
            (Token::LParen, Token::RParen) => Ok(()),
            (Token::LBracket, Token::RBracket) if previous == Some(Token::LBracket) => {
                output.push(Instruction::Literal(Value::List(Vec::new())));
                Ok(())
            }
            (Token::LBracket, Token::RBracket) => {
                output.push(Instruction::Listify);
                Ok(())
            }
            (Token::LBrace, Token::RBrace) => {
                output.push(Instruction::Indexify);
                Ok(())
            }
            _ => Err(EvalError::unbalanced(
                format!("`{}` closed by `{}`", top.text, closing.text),
                span,
            )),
        };
    }
}

fn to_instruction(lexeme: &Lexeme) -> Result<Instruction> {
    if let Some(op) = Operator::from_token(lexeme.token) {
        return Ok(Instruction::Operator(op));
    }
    match lexeme.token {
        Token::Symbol => Ok(Instruction::Symbol(lexeme.text.clone())),
        Token::Method => Ok(Instruction::Method(lexeme.text.clone())),
        Token::Comma => Ok(Instruction::Comma),
        Token::Colon => Ok(Instruction::Colon),
        Token::Question => Ok(Instruction::Question),
        Token::Cast(target) => Ok(Instruction::Cast(target)),
        _ => Err(EvalError::parse(format!("unexpected token `{}`", lexeme.text), lexeme.span)),
    }
}

/// Build the typed value of a literal token.
fn parse_literal(lexeme: &Lexeme) -> Result<Value> {
    let text = lexeme.text.as_str();
    let invalid = |what: &str| EvalError::parse(format!("invalid {what} literal `{text}`"), lexeme.span);
    match lexeme.token {
        Token::BoolLit => Ok(Value::Bool(text.eq_ignore_ascii_case("true"))),
        Token::IntLit => text.parse::<i64>().map(Value::Int).map_err(|_| invalid("integer")),
        Token::DoubleLit => text.parse::<f64>().map(Value::Double).map_err(|_| invalid("double")),
        Token::StringLit => Ok(Value::String(unescape(strip_quotes(text, '"')))),
        Token::CharLit => {
            let body = unescape(strip_quotes(text, '\''));
            let mut chars = body.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(invalid("char")),
            }
        }
        _ => Err(EvalError::parse(format!("`{text}` is not a literal"), lexeme.span)),
    }
}

fn strip_quotes(text: &str, quote: char) -> &str {
    text.strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .unwrap_or(text)
}

/// Resolve `\"`, `\\` and `\'`; any other backslash sequence is kept as written.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('"' | '\\' | '\'')) => out.push(escaped),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
