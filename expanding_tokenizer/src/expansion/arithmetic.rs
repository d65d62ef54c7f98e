//! Integer expressions inside `$( ... )`
//!
//! Operator precedence, tightest first: `* / %`, then `+ -`, then `< >`
//! (minimum and maximum). Operators of equal precedence associate to the
//! left. A leading `-` negates the operand that follows.

use super::Expander;
use crate::error::{EofContext, ExpandError, ExpandResult};
use crate::utils::{parse_integer, Location};

const OPERAND_EXPECTED: &str = "a number, '$', '(' or '-'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,
}

impl BinaryOperator {
    /// Lower binds tighter
    pub fn precedence(self) -> u32 {
        match self {
            Self::Mul | Self::Div | Self::Mod => 1,
            Self::Add | Self::Sub => 2,
            Self::Min | Self::Max => 3,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Mod => '%',
            Self::Min => '<',
            Self::Max => '>',
        }
    }

    /// Checked integer evaluation; division and remainder truncate toward zero
    pub fn apply(self, left: i64, right: i64, location: &Location) -> ExpandResult<i64> {
        let overflow = || ExpandError::ArithmeticOverflow {
            location: location.clone(),
        };

        match self {
            Self::Add => left.checked_add(right).ok_or_else(overflow),
            Self::Sub => left.checked_sub(right).ok_or_else(overflow),
            Self::Mul => left.checked_mul(right).ok_or_else(overflow),
            Self::Div | Self::Mod if right == 0 => Err(ExpandError::DivisionByZero {
                location: location.clone(),
            }),
            Self::Div => left.checked_div(right).ok_or_else(overflow),
            Self::Mod => left.checked_rem(right).ok_or_else(overflow),
            Self::Min => Ok(left.min(right)),
            Self::Max => Ok(left.max(right)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticKind {
    LeftParen,
    RightParen,
    Operator(BinaryOperator),
    Number,
}

impl ArithmeticKind {
    /// A closing parenthesis reduces every pending operator
    pub const RIGHT_PAREN_PRECEDENCE: u32 = 999;

    pub fn from_glyph(c: char) -> Option<Self> {
        let kind = match c {
            '(' => Self::LeftParen,
            ')' => Self::RightParen,
            '+' => Self::Operator(BinaryOperator::Add),
            '-' => Self::Operator(BinaryOperator::Sub),
            '*' => Self::Operator(BinaryOperator::Mul),
            '/' => Self::Operator(BinaryOperator::Div),
            '%' => Self::Operator(BinaryOperator::Mod),
            '<' => Self::Operator(BinaryOperator::Min),
            '>' => Self::Operator(BinaryOperator::Max),
            _ => return None,
        };
        Some(kind)
    }

    pub fn precedence(self) -> Option<u32> {
        match self {
            Self::Operator(operator) => Some(operator.precedence()),
            Self::RightParen => Some(Self::RIGHT_PAREN_PRECEDENCE),
            Self::LeftParen | Self::Number => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticToken {
    pub location: Location,
    pub kind: ArithmeticKind,
    pub text: String,
    /// Set for numbers whose value is known
    pub value: Option<i64>,
}

impl ArithmeticToken {
    fn glyph(location: Location, kind: ArithmeticKind, c: char) -> Self {
        Self {
            location,
            kind,
            text: c.to_string(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Value(i64),
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
        location: Location,
    },
}

impl Expr {
    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr, location: Location) -> Self {
        Self::Binary {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            location,
        }
    }

    /// `0 - operand`
    pub fn negate(operand: Expr, location: Location) -> Self {
        Self::binary(BinaryOperator::Sub, Self::Value(0), operand, location)
    }

    pub fn evaluate(&self) -> ExpandResult<i64> {
        match self {
            Self::Value(value) => Ok(*value),
            Self::Binary {
                operator,
                left,
                right,
                location,
            } => operator.apply(left.evaluate()?, right.evaluate()?, location),
        }
    }
}

impl<'r, 'a> Expander<'r, 'a> {
    /// `$( ... )` with the `(` already consumed. Speculative expansion only
    /// checks syntax and yields an empty string.
    pub fn expand_arithmetic(&mut self, at: &Location, should_resolve: bool) -> ExpandResult<String> {
        let mut parser = ArithmeticParser {
            expander: self,
            start: at.clone(),
            should_resolve,
        };
        let expr = parser.parse_group()?;

        if !should_resolve {
            return Ok(String::new());
        }
        Ok(expr.evaluate()?.to_string())
    }
}

struct ArithmeticParser<'x, 'r, 'a> {
    expander: &'x mut Expander<'r, 'a>,
    start: Location,
    should_resolve: bool,
}

impl ArithmeticParser<'_, '_, '_> {
    /// Next non-whitespace character and its location
    fn next_char(&mut self) -> ExpandResult<(char, Location)> {
        loop {
            let at = self.expander.reader.at();
            match self.expander.reader.get()? {
                Some(c) if c.is_whitespace() => continue,
                Some(c) => return Ok((c, at)),
                None => {
                    return Err(ExpandError::unexpected_eof(
                        EofContext::Expression,
                        self.start.clone(),
                    ))
                }
            }
        }
    }

    fn next_token(&mut self) -> ExpandResult<ArithmeticToken> {
        let (c, at) = self.next_char()?;

        if let Some(kind) = ArithmeticKind::from_glyph(c) {
            return Ok(ArithmeticToken::glyph(at, kind, c));
        }

        if c.is_ascii_alphanumeric() {
            let mut text = c.to_string();
            let reader = &mut *self.expander.reader;
            while let Some(c) = reader.get()? {
                if !c.is_ascii_alphanumeric() {
                    reader.unget()?;
                    break;
                }
                text.push(c);
            }

            let value = parse_integer(&text).ok_or_else(|| ExpandError::NotANumber {
                text: text.clone(),
                location: at.clone(),
            })?;
            return Ok(ArithmeticToken {
                location: at,
                kind: ArithmeticKind::Number,
                text,
                value: Some(value),
            });
        }

        if c == '$' {
            let text = self.expander.expand(&at, self.should_resolve)?;
            let value = if self.should_resolve {
                Some(coerce_number(&text, &at)?)
            } else {
                None
            };
            return Ok(ArithmeticToken {
                location: at,
                kind: ArithmeticKind::Number,
                text,
                value,
            });
        }

        Err(ExpandError::unexpected_character(c, "an arithmetic token", at))
    }

    /// Parse up to and including the `)` closing the current group
    fn parse_group(&mut self) -> ExpandResult<Expr> {
        let mut values: Vec<Expr> = Vec::new();
        let mut operators: Vec<(BinaryOperator, Location)> = Vec::new();

        loop {
            let operand = self.parse_operand()?;
            values.push(operand);

            let token = self.next_token()?;
            let precedence = token.kind.precedence().ok_or_else(|| {
                ExpandError::unexpected_token(&token.text, "an operator or ')'", token.location.clone())
            })?;

            while let Some((operator, _)) = operators.last() {
                if operator.precedence() > precedence {
                    break;
                }
                if let Some((operator, location)) = operators.pop() {
                    reduce(&mut values, operator, location)?;
                }
            }

            match token.kind {
                ArithmeticKind::Operator(operator) => operators.push((operator, token.location)),
                _ => {
                    return values.pop().ok_or_else(|| {
                        ExpandError::unexpected_token(&token.text, OPERAND_EXPECTED, token.location)
                    })
                }
            }
        }
    }

    /// A number or a parenthesized group, after any run of unary `-`.
    /// Each `-` toggles the sign, so the run yields at most one negation.
    fn parse_operand(&mut self) -> ExpandResult<Expr> {
        let mut negation: Option<Location> = None;
        let mut token = self.next_token()?;
        while token.kind == ArithmeticKind::Operator(BinaryOperator::Sub) {
            negation = match negation {
                Some(_) => None,
                None => Some(token.location),
            };
            token = self.next_token()?;
        }

        let operand = match token.kind {
            ArithmeticKind::Number => Expr::Value(token.value.unwrap_or_default()),
            ArithmeticKind::LeftParen => {
                self.expander.descend(&token.location)?;
                let group = self.parse_group();
                self.expander.ascend();
                group?
            }
            _ => {
                return Err(ExpandError::unexpected_token(
                    &token.text,
                    OPERAND_EXPECTED,
                    token.location,
                ))
            }
        };

        Ok(match negation {
            Some(location) => Expr::negate(operand, location),
            None => operand,
        })
    }
}

fn reduce(values: &mut Vec<Expr>, operator: BinaryOperator, location: Location) -> ExpandResult<()> {
    match (values.pop(), values.pop()) {
        (Some(right), Some(left)) => {
            values.push(Expr::binary(operator, left, right, location));
            Ok(())
        }
        _ => Err(ExpandError::unexpected_token(
            &operator.glyph().to_string(),
            OPERAND_EXPECTED,
            location,
        )),
    }
}

/// Expanded text as an operand: leading `-` signs toggle negation
fn coerce_number(text: &str, at: &Location) -> ExpandResult<i64> {
    let digits = text.trim_start_matches('-');
    let negative = (text.len() - digits.len()) % 2 == 1;

    let value = parse_integer(digits).ok_or_else(|| ExpandError::NotANumber {
        text: text.to_string(),
        location: at.clone(),
    })?;

    if negative {
        value.checked_neg().ok_or_else(|| ExpandError::ArithmeticOverflow {
            location: at.clone(),
        })
    } else {
        Ok(value)
    }
}
