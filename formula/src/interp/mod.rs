//! Postfix evaluator
//!
//! The instruction stream is consumed from its tail: popping an operator
//! recursively pops its operands, right operand first.

pub mod ops;

use crate::config::{DEFAULT_MAX_DEPTH, EvalConfig};
use crate::error::{EvalError, Result};
use crate::intrinsic::IntrinsicRegistry;
use crate::lexer::{Tokens, tokenize};
use crate::parser::{Instruction, Operator, Postfix, to_postfix};
use crate::symbols::SymbolLookup;
use crate::util::find_similar_name;
use crate::value::{Value, homogenize};

/// Stack growth parameters for deeply nested formulas
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Evaluates postfix streams against a symbol table and an intrinsic registry.
///
/// Holds no mutable state, so one evaluator may serve any number of formulas.
pub struct Evaluator<'a> {
    symbols: &'a dyn SymbolLookup,
    intrinsics: &'a IntrinsicRegistry,
    max_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(symbols: &'a dyn SymbolLookup, intrinsics: &'a IntrinsicRegistry) -> Self {
        Evaluator {
            symbols,
            intrinsics,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit operand nesting; deeper formulas fail with `MaxDepthExceeded`
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_config(self, config: &EvalConfig) -> Self {
        self.with_max_depth(config.max_depth)
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Convert tokens to postfix and evaluate them.
    pub fn evaluate(&self, tokens: &Tokens) -> Result<Value> {
        self.run(to_postfix(tokens)?)
    }

    /// Evaluate a postfix stream to exactly one value.
    ///
    /// Instructions left over once the root value is built make the formula
    /// malformed. A top-level comma group is returned as a list.
    pub fn run(&self, postfix: Postfix) -> Result<Value> {
        let mut stack = postfix.into_instructions();
        if stack.is_empty() {
            return Err(EvalError::malformed("empty formula"));
        }
        let value = self.operand(&mut stack, 1)?;
        if !stack.is_empty() {
            return Err(EvalError::malformed(format!(
                "{} unused instruction(s) before `{}`",
                stack.len(),
                stack[stack.len() - 1]
            )));
        }
        let value = value.flatten();
        tracing::debug!(result = %value.type_name(), "evaluated formula");
        Ok(value)
    }

    /// Pop one operand with automatic stack growth for deep nesting
    fn operand(&self, stack: &mut Vec<Instruction>, depth: usize) -> Result<Value> {
        if depth > self.max_depth {
            return Err(EvalError::max_depth(self.max_depth));
        }
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.operand_inner(stack, depth))
    }

    fn operand_inner(&self, stack: &mut Vec<Instruction>, depth: usize) -> Result<Value> {
        let Some(instruction) = stack.pop() else {
            return Err(EvalError::malformed("an operator is missing an operand"));
        };
        let next = depth + 1;

        match instruction {
            Instruction::Literal(value) => Ok(value),
            Instruction::Symbol(name) => self.lookup(&name),
            Instruction::Comma => self.chain(Join::Comma, stack, next),
            Instruction::Colon => {
                let right = self.operand(stack, next)?;
                let left = self.operand(stack, next)?;
                pair(left, right)
            }
            Instruction::Question => match self.operand(stack, next)? {
                Value::Conditional { cond, on_true, on_false } => Ok(if cond { *on_true } else { *on_false }),
                other => Err(EvalError::expected("ConditionalValue after `?`", &other.type_name())),
            },
            Instruction::Operator(Operator::Not) => ops::not(&self.operand(stack, next)?),
            Instruction::Operator(op) => self.chain(Join::Binary(op), stack, next),
            Instruction::Indexify => {
                let index = self.operand(stack, next)?;
                let collection = self.operand(stack, next)?.flatten();
                ops::index(collection, index)
            }
            Instruction::Listify => {
                let items = match self.operand(stack, next)? {
                    Value::CommaList(items) => items,
                    single => vec![single],
                };
                Ok(Value::List(homogenize(items)?))
            }
            Instruction::Method(name) => {
                let args = self.operand(stack, next)?.into_args();
                self.intrinsics.call(&name, args)
            }
            Instruction::Cast(target) => self.operand(stack, next)?.cast(target.kind()),
        }
    }

    /// Reduce a left-leaning run of binary nodes (`1 + 2 - 3`, `a, b, c`).
    ///
    /// The left operand of each node is the node below it in the stream, so
    /// the run is walked in a loop and only right operands recurse. Long flat
    /// lists and sums therefore stay at one level of depth.
    fn chain(&self, first: Join, stack: &mut Vec<Instruction>, depth: usize) -> Result<Value> {
        let mut pending = vec![(first, self.operand(stack, depth)?)];
        while let Some(join) = stack.last().and_then(Join::from_instruction) {
            stack.pop();
            pending.push((join, self.operand(stack, depth)?));
        }

        let mut acc = self.operand(stack, depth)?;
        while let Some((join, right)) = pending.pop() {
            acc = join.apply(acc, right)?;
        }
        Ok(acc)
    }

    fn lookup(&self, name: &str) -> Result<Value> {
        self.symbols.lookup(name).ok_or_else(|| {
            let known = self.symbols.names();
            let hint = find_similar_name(name, known.iter().map(String::as_str), 2);
            EvalError::unknown_symbol(name, hint)
        })
    }
}

/// A binary node whose left operand may itself be a binary node
#[derive(Clone, Copy)]
enum Join {
    Comma,
    Binary(Operator),
}

impl Join {
    fn from_instruction(instruction: &Instruction) -> Option<Self> {
        match instruction {
            Instruction::Comma => Some(Join::Comma),
            Instruction::Operator(Operator::Not) => None,
            Instruction::Operator(op) => Some(Join::Binary(*op)),
            _ => None,
        }
    }

    fn apply(self, left: Value, right: Value) -> Result<Value> {
        match self {
            Join::Comma => Ok(Value::comma(left, right)),
            Join::Binary(op @ (Operator::And | Operator::Or)) => ops::logical(op, &left, &right),
            Join::Binary(op) => ops::binary(op, left.flatten(), right.flatten()),
        }
    }
}

/// `a:b` builds an index range from two Ints or a conditional from a Bool and a pair.
///
/// The branches must be a bare comma group `(onTrue, onFalse)`; a list
/// literal such as `[1, 2]` is a value, not a pair of branches.
fn pair(left: Value, right: Value) -> Result<Value> {
    match (left, right) {
        (Value::Int(from), Value::Int(to)) => Ok(Value::IntRange { from, to }),
        (Value::Bool(cond), Value::CommaList(mut branches)) if branches.len() == 2 => {
            let on_false = branches.pop();
            let on_true = branches.pop();
            match (on_true, on_false) {
                (Some(on_true), Some(on_false)) => Ok(Value::Conditional {
                    cond,
                    on_true: Box::new(on_true),
                    on_false: Box::new(on_false),
                }),
                _ => Err(EvalError::invalid_operands("conditional needs two branches")),
            }
        }
        (left, right) => Err(EvalError::invalid_operands(format!(
            "`:` needs Int:Int or Bool:(onTrue, onFalse), got {} and {}",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Evaluate already-lexed tokens with default limits.
pub fn evaluate(tokens: &Tokens, symbols: &dyn SymbolLookup, intrinsics: &IntrinsicRegistry) -> Result<Value> {
    Evaluator::new(symbols, intrinsics).evaluate(tokens)
}

/// Lex, convert and evaluate formula text.
pub fn eval_str(source: &str, symbols: &dyn SymbolLookup, intrinsics: &IntrinsicRegistry) -> Result<Value> {
    evaluate(&tokenize(source)?, symbols, intrinsics)
}
