//! Constant expression evaluation.
//!
//! Consumes a token sequence collected by the caller (`#if`/`#elif`
//! bodies, `$eval*` parenthesized expressions) and produces an integer
//! or double value. Values and operators are gathered left-to-right into
//! two index-linked lists; reduction then repeatedly applies the
//! operator with the highest `(parenthesis depth, precedence)` pair.

use bitflags::bitflags;

use crisp_lex::{NumFlags, Punct, Token, TokenKind};
use crisp_util::{Error, Result};

use crate::macros::MacroTable;

bitflags! {
    /// Behavior switches for [`ExprEvaluator`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EvalFlags: u32 {
        /// Result type follows the computed value.
        const DETECT_TYPE = 1 << 0;
        /// Render the result as an integer.
        const FORCE_INT = 1 << 1;
        /// Render the result as a double.
        const FORCE_FLOAT = 1 << 2;
        /// Resolve unary math function names.
        const ALLOW_MATH_FUNCS = 1 << 3;
        /// Resolve named math constants.
        const ALLOW_MATH_CONSTS = 1 << 4;
        /// Unresolved identifiers evaluate to zero instead of failing.
        const UNDEFINED_CONSTS_ARE_ZERO = 1 << 5;
    }
}

/// Unary double -> double math functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MathFn {
    Abs,
    Sqrt,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Ceil,
    Floor,
    Round,
    Exp,
    Exp2,
    Ln,
    Log2,
    Log10,
}

impl MathFn {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => MathFn::Abs,
            "sqrt" => MathFn::Sqrt,
            "sin" => MathFn::Sin,
            "cos" => MathFn::Cos,
            "tan" => MathFn::Tan,
            "asin" => MathFn::Asin,
            "acos" => MathFn::Acos,
            "atan" => MathFn::Atan,
            "ceil" => MathFn::Ceil,
            "floor" => MathFn::Floor,
            "round" => MathFn::Round,
            "exp" => MathFn::Exp,
            "exp2" => MathFn::Exp2,
            "ln" => MathFn::Ln,
            "log2" => MathFn::Log2,
            "log10" => MathFn::Log10,
            _ => return None,
        })
    }

    fn apply(self, x: f64) -> f64 {
        match self {
            MathFn::Abs => x.abs(),
            MathFn::Sqrt => x.sqrt(),
            MathFn::Sin => x.sin(),
            MathFn::Cos => x.cos(),
            MathFn::Tan => x.tan(),
            MathFn::Asin => x.asin(),
            MathFn::Acos => x.acos(),
            MathFn::Atan => x.atan(),
            MathFn::Ceil => x.ceil(),
            MathFn::Floor => x.floor(),
            MathFn::Round => x.round(),
            MathFn::Exp => x.exp(),
            MathFn::Exp2 => x.exp2(),
            MathFn::Ln => x.ln(),
            MathFn::Log2 => x.log2(),
            MathFn::Log10 => x.log10(),
        }
    }
}

fn math_const(name: &str) -> Option<f64> {
    Some(match name {
        "PI" => std::f64::consts::PI,
        "E" => std::f64::consts::E,
        "TAU" => std::f64::consts::TAU,
        "INV_TAU" => 1.0 / std::f64::consts::TAU,
        "HALF_PI" => std::f64::consts::FRAC_PI_2,
        "INV_PI" => std::f64::consts::FRAC_1_PI,
        "DEG2RAD" => std::f64::consts::PI / 180.0,
        "RAD2DEG" => 180.0 / std::f64::consts::PI,
        _ => return None,
    })
}

/// An evaluated expression value: integer or double.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Value {
    pub int: i64,
    pub float: f64,
    pub is_float: bool,
}

impl Value {
    pub fn from_int(int: i64) -> Self {
        Self {
            int,
            float: int as f64,
            is_float: false,
        }
    }

    pub fn from_float(float: f64) -> Self {
        Self {
            int: float as i64,
            float,
            is_float: true,
        }
    }

    fn from_bool(value: bool) -> Self {
        Self::from_int(i64::from(value))
    }

    fn negated(self) -> Self {
        if self.is_float {
            Self::from_float(-self.float)
        } else {
            Self::from_int(-self.int)
        }
    }

    fn as_float(&self) -> f64 {
        if self.is_float {
            self.float
        } else {
            self.int as f64
        }
    }

    /// Nonzero test, used by the conditional directives.
    pub fn truthy(&self) -> bool {
        if self.is_float {
            self.float != 0.0
        } else {
            self.int != 0
        }
    }

    /// Renders the value as a number token per the evaluator flags:
    /// `FORCE_INT` as a decimal integer, `FORCE_FLOAT` with twenty
    /// fractional digits, `DETECT_TYPE` by the value's own type.
    pub fn render(&self, flags: EvalFlags) -> Token {
        let as_float =
            flags.contains(EvalFlags::FORCE_FLOAT) || (!flags.contains(EvalFlags::FORCE_INT) && self.is_float);
        if as_float {
            Token::new(
                TokenKind::Number,
                format!("{:.20}", self.as_float()),
                NumFlags::DECIMAL | NumFlags::FLOAT | NumFlags::DOUBLE,
            )
        } else {
            let int = if self.is_float { self.float as i64 } else { self.int };
            Token::new(
                TokenKind::Number,
                int.to_string(),
                NumFlags::DECIMAL | NumFlags::INTEGER | NumFlags::SIGNED,
            )
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpKind {
    Func(MathFn),
    Not,
    BitNot,
    Mul,
    Div,
    Mod,
    Add,
    Sub,
    Shl,
    Shr,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    NotEq,
    BitAnd,
    BitXor,
    BitOr,
    LogicAnd,
    LogicOr,
    Question,
    Colon,
}

impl OpKind {
    fn precedence(self) -> u8 {
        match self {
            OpKind::Func(_) => 18,
            OpKind::Not => 17,
            OpKind::BitNot => 16,
            OpKind::Mul | OpKind::Div | OpKind::Mod => 15,
            OpKind::Add | OpKind::Sub => 14,
            OpKind::Shl | OpKind::Shr => 13,
            OpKind::Less | OpKind::Greater | OpKind::LessEq | OpKind::GreaterEq => 12,
            OpKind::EqEq | OpKind::NotEq => 11,
            OpKind::BitAnd => 10,
            OpKind::BitXor => 9,
            OpKind::BitOr => 8,
            OpKind::LogicAnd => 7,
            OpKind::LogicOr => 6,
            OpKind::Question | OpKind::Colon => 5,
        }
    }

    fn is_unary(self) -> bool {
        matches!(self, OpKind::Not | OpKind::BitNot | OpKind::Func(_))
    }

    fn symbol(self) -> &'static str {
        match self {
            OpKind::Func(_) => "call",
            OpKind::Not => "!",
            OpKind::BitNot => "~",
            OpKind::Mul => "*",
            OpKind::Div => "/",
            OpKind::Mod => "%",
            OpKind::Add => "+",
            OpKind::Sub => "-",
            OpKind::Shl => "<<",
            OpKind::Shr => ">>",
            OpKind::Less => "<",
            OpKind::Greater => ">",
            OpKind::LessEq => "<=",
            OpKind::GreaterEq => ">=",
            OpKind::EqEq => "==",
            OpKind::NotEq => "!=",
            OpKind::BitAnd => "&",
            OpKind::BitXor => "^",
            OpKind::BitOr => "|",
            OpKind::LogicAnd => "&&",
            OpKind::LogicOr => "||",
            OpKind::Question => "?",
            OpKind::Colon => ":",
        }
    }
}

/// Linked value node.
#[derive(Clone, Copy)]
struct Val {
    v: Value,
    prev: i32,
    next: i32,
}

/// Linked operator node.
#[derive(Clone, Copy)]
struct Op {
    kind: OpKind,
    prec: u8,
    depth: u32,
    /// Index of the value to the left, or -1 for unary operators.
    left: i32,
    /// For unary operators: the value the operator applies to.
    operand: i32,
    prev: i32,
    next: i32,
}

/// Evaluates token sequences into numeric values.
pub struct ExprEvaluator<'a> {
    flags: EvalFlags,
    macros: Option<&'a MacroTable>,
}

impl<'a> ExprEvaluator<'a> {
    pub fn new(flags: EvalFlags) -> Self {
        Self {
            flags,
            macros: None,
        }
    }

    /// Resolves `defined(X)` and single-token numeric macros against
    /// `table`.
    pub fn with_macros(mut self, table: &'a MacroTable) -> Self {
        self.macros = Some(table);
        self
    }

    /// Evaluates `tokens` to a value.
    ///
    /// Errors are returned, not reported; the caller owns diagnostics.
    pub fn evaluate(&self, tokens: &[Token]) -> Result<Value> {
        let mut build = Builder {
            flags: self.flags,
            macros: self.macros,
            vals: Vec::new(),
            ops: Vec::new(),
            depth: 0,
            negate: false,
            last_was_value: false,
        };
        build.collect(tokens)?;
        build.reduce()
    }
}

struct Builder<'a> {
    flags: EvalFlags,
    macros: Option<&'a MacroTable>,
    vals: Vec<Val>,
    ops: Vec<Op>,
    depth: u32,
    negate: bool,
    last_was_value: bool,
}

impl<'a> Builder<'a> {
    fn collect(&mut self, tokens: &[Token]) -> Result<()> {
        let mut index = 0;
        while index < tokens.len() {
            let token = &tokens[index];
            match token.kind() {
                TokenKind::Number => {
                    let value = if token.flags().contains(NumFlags::FLOAT) {
                        Value::from_float(token.as_double())
                    } else {
                        Value::from_int(token.as_int())
                    };
                    self.push_value(value, token.text())?;
                }
                TokenKind::Identifier => index = self.collect_identifier(tokens, index)?,
                TokenKind::Punctuation(p) => self.collect_punct(p, token.text())?,
                _ => {
                    return Err(Error::Grammar(format!(
                        "unexpected '{}' in expression",
                        token.text()
                    )))
                }
            }
            index += 1;
        }

        if self.depth > 0 {
            return Err(Error::Grammar("missing ')' in expression".into()));
        }
        if self.vals.is_empty() {
            return Err(Error::Grammar("empty expression".into()));
        }
        if !self.last_was_value || self.negate {
            return Err(Error::Grammar("expression ends with an operator".into()));
        }
        Ok(())
    }

    /// Handles one identifier token; returns the index of the last token
    /// consumed.
    fn collect_identifier(&mut self, tokens: &[Token], index: usize) -> Result<usize> {
        let name = tokens[index].text();

        if name == "defined" {
            return self.collect_defined(tokens, index);
        }
        if name == "true" || name == "false" {
            self.push_value(Value::from_bool(name == "true"), name)?;
            return Ok(index);
        }

        if self.flags.contains(EvalFlags::ALLOW_MATH_FUNCS) {
            if let Some(func) = MathFn::from_name(name) {
                if self.negate {
                    // `-f(x)` becomes `(-1) * f(x)`.
                    self.negate = false;
                    self.push_value(Value::from_int(-1), "-1")?;
                    self.push_binary(OpKind::Mul)?;
                }
                self.push_unary(OpKind::Func(func));
                return Ok(index);
            }
        }

        if let Some(table) = self.macros {
            if let Some(mac) = table.find_name(name) {
                let body = table.body(mac);
                if mac.builtin.is_none() && body.len() == 1 && body[0].kind() == TokenKind::Number {
                    let token = &body[0];
                    let value = if token.flags().contains(NumFlags::FLOAT) {
                        Value::from_float(token.as_double())
                    } else {
                        Value::from_int(token.as_int())
                    };
                    let text = token.text().to_string();
                    self.push_value(value, &text)?;
                    return Ok(index);
                }
                return Err(Error::Semantic(format!(
                    "macro '{name}' does not expand to a single numeric value"
                )));
            }
        }

        if self.flags.contains(EvalFlags::ALLOW_MATH_CONSTS) {
            if let Some(value) = math_const(name) {
                self.push_value(Value::from_float(value), name)?;
                return Ok(index);
            }
        }

        if self.flags.contains(EvalFlags::UNDEFINED_CONSTS_ARE_ZERO) {
            self.push_value(Value::from_int(0), name)?;
            return Ok(index);
        }
        Err(Error::Semantic(format!("undefined constant '{name}'")))
    }

    /// `defined NAME` or `defined(NAME)`.
    fn collect_defined(&mut self, tokens: &[Token], index: usize) -> Result<usize> {
        let mut cursor = index + 1;
        let parenthesized = tokens
            .get(cursor)
            .is_some_and(|t| t.is_punct(Punct::OpenParen));
        if parenthesized {
            cursor += 1;
        }

        let name = match tokens.get(cursor) {
            Some(t) if t.kind() == TokenKind::Identifier => t.text(),
            _ => {
                return Err(Error::Grammar(
                    "expected an identifier after 'defined'".into(),
                ))
            }
        };
        let defined = self.macros.is_some_and(|table| table.is_defined(name));

        if parenthesized {
            cursor += 1;
            if !tokens
                .get(cursor)
                .is_some_and(|t| t.is_punct(Punct::CloseParen))
            {
                return Err(Error::Grammar("missing ')' after 'defined'".into()));
            }
        }

        self.push_value(Value::from_bool(defined), "defined")?;
        Ok(cursor)
    }

    fn collect_punct(&mut self, p: Punct, text: &str) -> Result<()> {
        match p {
            Punct::OpenParen => {
                if self.negate {
                    // `-(expr)` becomes `(-1) * (expr)`.
                    self.negate = false;
                    self.push_value(Value::from_int(-1), "-1")?;
                    self.push_binary(OpKind::Mul)?;
                }
                self.depth += 1;
            }
            Punct::CloseParen => {
                if self.depth == 0 {
                    return Err(Error::Grammar("too many ')' in expression".into()));
                }
                self.depth -= 1;
            }
            Punct::LogicNot => self.push_prefix(OpKind::Not)?,
            Punct::BitNot => self.push_prefix(OpKind::BitNot)?,
            Punct::Sub => {
                if self.last_was_value {
                    self.push_binary(OpKind::Sub)?;
                } else {
                    self.negate = !self.negate;
                }
            }
            Punct::Add => {
                if self.last_was_value {
                    self.push_binary(OpKind::Add)?;
                }
                // A unary plus is a no-op.
            }
            Punct::Mul => self.push_binary(OpKind::Mul)?,
            Punct::Div => self.push_binary(OpKind::Div)?,
            Punct::Mod => self.push_binary(OpKind::Mod)?,
            Punct::Shl => self.push_binary(OpKind::Shl)?,
            Punct::Shr => self.push_binary(OpKind::Shr)?,
            Punct::Less => self.push_binary(OpKind::Less)?,
            Punct::Greater => self.push_binary(OpKind::Greater)?,
            Punct::LessEq => self.push_binary(OpKind::LessEq)?,
            Punct::GreaterEq => self.push_binary(OpKind::GreaterEq)?,
            Punct::EqEq => self.push_binary(OpKind::EqEq)?,
            Punct::NotEq => self.push_binary(OpKind::NotEq)?,
            Punct::BitAnd => self.push_binary(OpKind::BitAnd)?,
            Punct::BitXor => self.push_binary(OpKind::BitXor)?,
            Punct::BitOr => self.push_binary(OpKind::BitOr)?,
            Punct::LogicAnd => self.push_binary(OpKind::LogicAnd)?,
            Punct::LogicOr => self.push_binary(OpKind::LogicOr)?,
            Punct::Question => self.push_binary(OpKind::Question)?,
            Punct::Colon => self.push_binary(OpKind::Colon)?,
            _ => {
                return Err(Error::Grammar(format!(
                    "unexpected '{text}' in expression"
                )))
            }
        }
        Ok(())
    }

    fn push_value(&mut self, value: Value, text: &str) -> Result<()> {
        if self.last_was_value {
            return Err(Error::Grammar(format!(
                "expected an operator before '{text}'"
            )));
        }
        let value = if self.negate {
            self.negate = false;
            value.negated()
        } else {
            value
        };
        self.vals.push(Val {
            v: value,
            prev: -1,
            next: -1,
        });
        self.last_was_value = true;
        Ok(())
    }

    fn push_binary(&mut self, kind: OpKind) -> Result<()> {
        if !self.last_was_value {
            return Err(Error::Grammar(format!(
                "operator '{}' without a value to apply to",
                kind.symbol()
            )));
        }
        self.ops.push(Op {
            kind,
            prec: kind.precedence(),
            depth: self.depth,
            left: self.vals.len() as i32 - 1,
            operand: -1,
            prev: -1,
            next: -1,
        });
        self.last_was_value = false;
        Ok(())
    }

    /// Pushes `!` or `~`, which expect a following value.
    fn push_prefix(&mut self, kind: OpKind) -> Result<()> {
        if self.last_was_value {
            return Err(Error::Grammar(format!(
                "operator '{}' after a value",
                kind.symbol()
            )));
        }
        if self.negate {
            self.negate = false;
            self.push_value(Value::from_int(-1), "-1")?;
            self.push_binary(OpKind::Mul)?;
        }
        self.push_unary(kind);
        Ok(())
    }

    fn push_unary(&mut self, kind: OpKind) {
        self.ops.push(Op {
            kind,
            prec: kind.precedence(),
            depth: self.depth,
            left: -1,
            operand: self.vals.len() as i32,
            prev: -1,
            next: -1,
        });
    }

    /// Applies operators in `(depth, precedence)` order until one value
    /// remains.
    fn reduce(&mut self) -> Result<Value> {
        for i in 0..self.vals.len() {
            self.vals[i].prev = i as i32 - 1;
            self.vals[i].next = if i + 1 < self.vals.len() {
                i as i32 + 1
            } else {
                -1
            };
        }
        for i in 0..self.ops.len() {
            self.ops[i].prev = i as i32 - 1;
            self.ops[i].next = if i + 1 < self.ops.len() {
                i as i32 + 1
            } else {
                -1
            };
        }
        let mut op_head: i32 = if self.ops.is_empty() { -1 } else { 0 };

        while op_head >= 0 {
            let mut best = op_head;
            let mut cursor = self.ops[op_head as usize].next;
            while cursor >= 0 {
                let candidate = &self.ops[cursor as usize];
                let current = &self.ops[best as usize];
                if (candidate.depth, candidate.prec) > (current.depth, current.prec) {
                    best = cursor;
                }
                cursor = candidate.next;
            }
            op_head = self.apply(best, op_head)?;
        }

        let alive = self
            .vals
            .iter()
            .enumerate()
            .find(|(_, v)| v.prev == -1)
            .map(|(i, _)| i);
        match alive {
            Some(first) if self.vals[first].next == -1 => Ok(self.vals[first].v),
            _ => Err(Error::Grammar("malformed expression".into())),
        }
    }

    fn apply(&mut self, op_idx: i32, op_head: i32) -> Result<i32> {
        let op = self.ops[op_idx as usize];
        match op.kind {
            OpKind::Not => {
                let target = self.operand_slot(op.operand)?;
                let v = self.vals[target].v;
                self.vals[target].v = Value::from_bool(!v.truthy());
            }
            OpKind::BitNot => {
                let target = self.operand_slot(op.operand)?;
                let v = self.vals[target].v;
                if v.is_float {
                    return Err(Error::Semantic("'~' is not defined on floats".into()));
                }
                self.vals[target].v = Value::from_int(!v.int);
            }
            OpKind::Func(func) => {
                let target = self.operand_slot(op.operand)?;
                let v = self.vals[target].v;
                self.vals[target].v = Value::from_float(func.apply(v.as_float()));
            }
            OpKind::Question => return self.apply_ternary(op_idx, op_head),
            OpKind::Colon => {
                return Err(Error::Grammar("':' without a matching '?'".into()));
            }
            kind => {
                let left = op.left;
                if left < 0 {
                    return Err(Error::Grammar(format!(
                        "operator '{}' without a left operand",
                        kind.symbol()
                    )));
                }
                let right = self.vals[left as usize].next;
                if right < 0 {
                    return Err(Error::Grammar(format!(
                        "operator '{}' without a right operand",
                        kind.symbol()
                    )));
                }
                let l = self.vals[left as usize].v;
                let r = self.vals[right as usize].v;
                self.vals[left as usize].v = apply_binary(kind, l, r)?;
                self.unlink_val(right);
                self.repoint(right, left);
            }
        }
        Ok(self.unlink_op(op_idx, op_head))
    }

    /// Redirects operators whose left-value reference was just unlinked
    /// to the surviving node of the merge.
    fn repoint(&mut self, from: i32, to: i32) {
        for op in &mut self.ops {
            if op.left == from {
                op.left = to;
            }
        }
    }

    /// `cond ? a : b` reduces as two adjacent operators: the `?` holds
    /// the condition, the following `:` selects between the next two
    /// values.
    fn apply_ternary(&mut self, op_idx: i32, op_head: i32) -> Result<i32> {
        let op = self.ops[op_idx as usize];
        let colon_idx = op.next;
        if colon_idx < 0 || self.ops[colon_idx as usize].kind != OpKind::Colon {
            return Err(Error::Grammar("'?' without a matching ':'".into()));
        }

        let cond = op.left;
        if cond < 0 {
            return Err(Error::Grammar("'?' without a condition".into()));
        }
        let a = self.vals[cond as usize].next;
        let b = if a >= 0 { self.vals[a as usize].next } else { -1 };
        if a < 0 || b < 0 {
            return Err(Error::Grammar("'?' without both branch values".into()));
        }

        let chosen = if self.vals[cond as usize].v.truthy() {
            self.vals[a as usize].v
        } else {
            self.vals[b as usize].v
        };
        self.vals[cond as usize].v = chosen;
        self.unlink_val(b);
        self.unlink_val(a);
        self.repoint(b, cond);
        self.repoint(a, cond);

        let head = self.unlink_op(colon_idx, op_head);
        Ok(self.unlink_op(op_idx, head))
    }

    fn operand_slot(&self, operand: i32) -> Result<usize> {
        if operand < 0 || operand as usize >= self.vals.len() {
            return Err(Error::Grammar("unary operator without an operand".into()));
        }
        Ok(operand as usize)
    }

    fn unlink_val(&mut self, idx: i32) {
        let (prev, next) = {
            let v = &self.vals[idx as usize];
            (v.prev, v.next)
        };
        if prev >= 0 {
            self.vals[prev as usize].next = next;
        }
        if next >= 0 {
            self.vals[next as usize].prev = prev;
        }
        // Mark unlinked so the final aliveness scan skips it.
        self.vals[idx as usize].prev = i32::MIN;
        self.vals[idx as usize].next = i32::MIN;
    }

    fn unlink_op(&mut self, idx: i32, head: i32) -> i32 {
        let (prev, next) = {
            let o = &self.ops[idx as usize];
            (o.prev, o.next)
        };
        if prev >= 0 {
            self.ops[prev as usize].next = next;
        }
        if next >= 0 {
            self.ops[next as usize].prev = prev;
        }
        if head == idx {
            next
        } else {
            head
        }
    }
}

fn apply_binary(kind: OpKind, l: Value, r: Value) -> Result<Value> {
    let float = l.is_float || r.is_float;

    // Bitwise, shift, and modulo operators reject double operands.
    if float
        && matches!(
            kind,
            OpKind::Mod | OpKind::Shl | OpKind::Shr | OpKind::BitAnd | OpKind::BitXor | OpKind::BitOr
        )
    {
        return Err(Error::Semantic(format!(
            "'{}' is not defined on floats",
            kind.symbol()
        )));
    }

    Ok(match kind {
        OpKind::Add => {
            if float {
                Value::from_float(l.as_float() + r.as_float())
            } else {
                Value::from_int(l.int.wrapping_add(r.int))
            }
        }
        OpKind::Sub => {
            if float {
                Value::from_float(l.as_float() - r.as_float())
            } else {
                Value::from_int(l.int.wrapping_sub(r.int))
            }
        }
        OpKind::Mul => {
            if float {
                Value::from_float(l.as_float() * r.as_float())
            } else {
                Value::from_int(l.int.wrapping_mul(r.int))
            }
        }
        OpKind::Div => {
            if float {
                if r.as_float() == 0.0 {
                    return Err(Error::Semantic("division by zero in expression".into()));
                }
                Value::from_float(l.as_float() / r.as_float())
            } else {
                if r.int == 0 {
                    return Err(Error::Semantic("division by zero in expression".into()));
                }
                Value::from_int(l.int.wrapping_div(r.int))
            }
        }
        OpKind::Mod => {
            if r.int == 0 {
                return Err(Error::Semantic("modulo by zero in expression".into()));
            }
            Value::from_int(l.int.wrapping_rem(r.int))
        }
        OpKind::Shl => Value::from_int(l.int.wrapping_shl((r.int & 63) as u32)),
        OpKind::Shr => Value::from_int(l.int.wrapping_shr((r.int & 63) as u32)),
        OpKind::Less => Value::from_bool(if float {
            l.as_float() < r.as_float()
        } else {
            l.int < r.int
        }),
        OpKind::Greater => Value::from_bool(if float {
            l.as_float() > r.as_float()
        } else {
            l.int > r.int
        }),
        OpKind::LessEq => Value::from_bool(if float {
            l.as_float() <= r.as_float()
        } else {
            l.int <= r.int
        }),
        OpKind::GreaterEq => Value::from_bool(if float {
            l.as_float() >= r.as_float()
        } else {
            l.int >= r.int
        }),
        OpKind::EqEq => Value::from_bool(if float {
            l.as_float() == r.as_float()
        } else {
            l.int == r.int
        }),
        OpKind::NotEq => Value::from_bool(if float {
            l.as_float() != r.as_float()
        } else {
            l.int != r.int
        }),
        OpKind::BitAnd => Value::from_int(l.int & r.int),
        OpKind::BitXor => Value::from_int(l.int ^ r.int),
        OpKind::BitOr => Value::from_int(l.int | r.int),
        OpKind::LogicAnd => Value::from_bool(l.truthy() && r.truthy()),
        OpKind::LogicOr => Value::from_bool(l.truthy() || r.truthy()),
        OpKind::Func(_) | OpKind::Not | OpKind::BitNot | OpKind::Question | OpKind::Colon => {
            return Err(Error::Grammar(format!(
                "'{}' applied as a binary operator",
                kind.symbol()
            )))
        }
    })
}
