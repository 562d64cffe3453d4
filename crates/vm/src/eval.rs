//! Arithmetic / comparison / boolean expression evaluator.
//!
//! Conditions and value fields are single-line textual expressions. Before
//! parsing, two classes of dynamic values are substituted into the text:
//! the cell sensor `t.getCurrentValue()` (replaced by the machine's current
//! cell value) and variable names (replaced longest-name-first so one name
//! never clobbers a prefix of another).
//!
//! Grammar, lowest to highest precedence:
//!
//! ```text
//! or_expr    = and_expr ('or' and_expr)*
//! and_expr   = not_expr ('and' not_expr)*
//! not_expr   = 'not' not_expr | comparison
//! comparison = additive (('=='|'!='|'>='|'<='|'>'|'<') additive)?
//! additive   = term (('+'|'-') term)*
//! term       = factor (('*'|'/') factor)*
//! factor     = number | '(' or_expr ')' | '-' factor
//! ```
//!
//! Comparison does not chain: `a < b < c` evaluates `a < b` and leaves
//! `< c` unconsumed (warned, not an error). Division by zero yields 0.
//! A non-integral final number rounds to nearest. Malformed input logs a
//! diagnostic and yields 0; the evaluator never unwinds past its caller.

use crate::machine::Machine;
use crate::store::VariableStore;

/// An evaluation result: a number or a comparison/logical truth value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Num(f64),
    Bool(bool),
}

impl Value {
    pub fn truthy(self) -> bool {
        match self {
            Value::Num(n) => n != 0.0,
            Value::Bool(b) => b,
        }
    }

    pub fn number(self) -> f64 {
        match self {
            Value::Num(n) => n,
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
        }
    }
}

/// Evaluate an expression against the machine's cell sensor and the store.
pub fn evaluate(expr: &str, machine: &Machine, store: &VariableStore) -> Value {
    let substituted = substitute(expr, machine, store);
    match run(&substituted) {
        Ok(value) => round_value(value),
        Err(err) => {
            tracing::warn!(expr = %substituted, error = %err, "expression evaluation failed");
            Value::Num(0.0)
        }
    }
}

/// Evaluate and coerce to a whole number.
pub fn evaluate_i64(expr: &str, machine: &Machine, store: &VariableStore) -> i64 {
    evaluate(expr, machine, store).number().round() as i64
}

/// Evaluate and coerce to a condition.
pub fn evaluate_truthy(expr: &str, machine: &Machine, store: &VariableStore) -> bool {
    evaluate(expr, machine, store).truthy()
}

/// Replace the cell sensor and variable names with numeric literals.
fn substitute(expr: &str, machine: &Machine, store: &VariableStore) -> String {
    let mut text = expr.trim().to_string();

    if text.contains("t.getCurrentValue()") {
        text = text.replace("t.getCurrentValue()", &machine.cell_value().to_string());
    }

    let mut names: Vec<&str> = store.variables().map(|(name, _)| name).collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    for name in names {
        if text.contains(name) {
            // get cannot fail: the name came from the store itself.
            let value = store.get(name).unwrap_or(0);
            text = text.replace(name, &value.to_string());
        }
    }

    text
}

/// The final-result rounding policy: every non-integral number rounds to
/// nearest (the domain is whole-number grid coordinates and counters).
fn round_value(value: Value) -> Value {
    match value {
        Value::Num(n) if n.fract() != 0.0 => Value::Num(n.round()),
        other => other,
    }
}

fn run(text: &str) -> Result<Value, EvalError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.or_expr()?;
    if parser.pos < parser.tokens.len() {
        tracing::warn!(expr = %text, at = parser.pos, "unparsed trailing input ignored");
    }
    Ok(value)
}

type EvalError = String;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    LParen,
    RParen,
    Plus,
    Minus,
    Star,
    Slash,
    Eq,
    Ne,
    Ge,
    Le,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

fn tokenize(text: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '=' | '!' | '<' | '>' => {
                let two = chars.get(i + 1) == Some(&'=');
                tokens.push(match (c, two) {
                    ('=', true) => Token::Eq,
                    ('!', true) => Token::Ne,
                    ('<', true) => Token::Le,
                    ('>', true) => Token::Ge,
                    ('<', false) => Token::Lt,
                    ('>', false) => Token::Gt,
                    _ => return Err(format!("unexpected character '{c}'")),
                });
                i += if two { 2 } else { 1 };
            }
            _ if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                if chars.get(i) == Some(&'.')
                    && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())
                {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                let n = literal
                    .parse::<f64>()
                    .map_err(|_| format!("bad number '{literal}'"))?;
                tokens.push(Token::Num(n));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                tokens.push(match word.to_ascii_lowercase().as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "not" => Token::Not,
                    _ => return Err(format!("unknown name '{word}'")),
                });
            }
            _ => return Err(format!("unexpected character '{c}'")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<Value, EvalError> {
        let mut left = self.and_expr()?;
        while self.consume(&Token::Or) {
            let right = self.and_expr()?;
            // Operand-preserving logic: `a or b` keeps a if truthy, else b.
            if !left.truthy() {
                left = right;
            }
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Value, EvalError> {
        let mut left = self.not_expr()?;
        while self.consume(&Token::And) {
            let right = self.not_expr()?;
            if left.truthy() {
                left = right;
            }
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Value, EvalError> {
        if self.consume(&Token::Not) {
            let operand = self.not_expr()?;
            return Ok(Value::Bool(!operand.truthy()));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Value, EvalError> {
        let left = self.additive()?;
        let op = match self.peek() {
            Some(Token::Eq) => Token::Eq,
            Some(Token::Ne) => Token::Ne,
            Some(Token::Ge) => Token::Ge,
            Some(Token::Le) => Token::Le,
            Some(Token::Gt) => Token::Gt,
            Some(Token::Lt) => Token::Lt,
            _ => return Ok(left),
        };
        self.pos += 1;
        let right = self.additive()?;
        let (a, b) = (left.number(), right.number());
        Ok(Value::Bool(match op {
            Token::Eq => a == b,
            Token::Ne => a != b,
            Token::Ge => a >= b,
            Token::Le => a <= b,
            Token::Gt => a > b,
            _ => a < b,
        }))
    }

    fn additive(&mut self) -> Result<Value, EvalError> {
        let mut left = self.term()?.number();
        loop {
            if self.consume(&Token::Plus) {
                left += self.term()?.number();
            } else if self.consume(&Token::Minus) {
                left -= self.term()?.number();
            } else {
                break;
            }
        }
        Ok(Value::Num(left))
    }

    fn term(&mut self) -> Result<Value, EvalError> {
        let mut left = self.factor()?.number();
        loop {
            if self.consume(&Token::Star) {
                left *= self.factor()?.number();
            } else if self.consume(&Token::Slash) {
                let right = self.factor()?.number();
                left = if right != 0.0 { left / right } else { 0.0 };
            } else {
                break;
            }
        }
        Ok(Value::Num(left))
    }

    fn factor(&mut self) -> Result<Value, EvalError> {
        if self.consume(&Token::LParen) {
            let value = self.or_expr()?;
            if !self.consume(&Token::RParen) {
                return Err("missing closing parenthesis".to_string());
            }
            return Ok(value);
        }
        if self.consume(&Token::Minus) {
            let value = self.factor()?;
            return Ok(Value::Num(-value.number()));
        }
        match self.peek() {
            Some(Token::Num(n)) => {
                let n = *n;
                self.pos += 1;
                Ok(Value::Num(n))
            }
            other => Err(format!("expected number, found {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kame_common::RunConfig;

    fn fixtures() -> (Machine, VariableStore) {
        (Machine::grid(RunConfig::default()), VariableStore::new())
    }

    fn eval(expr: &str) -> Value {
        let (machine, store) = fixtures();
        evaluate(expr, &machine, &store)
    }

    #[test]
    fn precedence_and_parentheses() {
        assert_eq!(eval("2 + 3 * 4"), Value::Num(14.0));
        assert_eq!(eval("(2 + 3) * 4"), Value::Num(20.0));
    }

    #[test]
    fn division_rounds_and_by_zero_yields_zero() {
        assert_eq!(eval("10 / 3"), Value::Num(3.0));
        assert_eq!(eval("10 / 0"), Value::Num(0.0));
        assert_eq!(eval("7 / 2"), Value::Num(4.0)); // 3.5 rounds up
    }

    #[test]
    fn comparisons_and_logic() {
        assert_eq!(eval("5 > 3 and 2 < 1"), Value::Bool(false));
        assert_eq!(eval("not (1 == 1)"), Value::Bool(false));
        assert_eq!(eval("1 <= 1 or 0 > 5"), Value::Bool(true));
        assert_eq!(eval("3 != 4"), Value::Bool(true));
    }

    #[test]
    fn logic_preserves_operand_values() {
        assert_eq!(eval("0 or 7"), Value::Num(7.0));
        assert_eq!(eval("3 and 5"), Value::Num(5.0));
        assert_eq!(eval("0 and 5"), Value::Num(0.0));
    }

    #[test]
    fn comparison_does_not_chain() {
        // `1 < 2 < 3` evaluates `1 < 2`; the rest is warned and ignored.
        assert_eq!(eval("1 < 2 < 3"), Value::Bool(true));
    }

    #[test]
    fn unary_negation() {
        assert_eq!(eval("-3 + 5"), Value::Num(2.0));
        assert_eq!(eval("--4"), Value::Num(4.0));
    }

    #[test]
    fn malformed_input_yields_zero() {
        assert_eq!(eval(""), Value::Num(0.0));
        assert_eq!(eval("2 +"), Value::Num(0.0));
        assert_eq!(eval("(1 + 2"), Value::Num(0.0));
        assert_eq!(eval("banana"), Value::Num(0.0));
    }

    #[test]
    fn variables_substitute_before_parsing() {
        let (machine, mut store) = fixtures();
        store.set("箱A", 10);
        assert_eq!(evaluate("箱A == 10", &machine, &store), Value::Bool(true));
        store.set("箱A", 3);
        assert_eq!(evaluate("箱A * 箱A", &machine, &store), Value::Num(9.0));
    }

    #[test]
    fn longer_variable_names_substitute_first() {
        let (machine, mut store) = fixtures();
        store.set("箱A", 2);
        store.set("箱AB", 5);
        assert_eq!(evaluate("箱AB + 箱A", &machine, &store), Value::Num(7.0));
    }

    #[test]
    fn sensor_substitutes_current_cell_value() {
        let (mut machine, store) = fixtures();
        machine.set_cell_value(4);
        assert_eq!(
            evaluate("t.getCurrentValue() + 1", &machine, &store),
            Value::Num(5.0)
        );
    }

    #[test]
    fn unknown_variable_text_is_a_parse_failure() {
        let (machine, store) = fixtures();
        // 箱D is not a reserved slot and was never created.
        assert_eq!(evaluate("箱D + 1", &machine, &store), Value::Num(0.0));
    }

    #[test]
    fn negative_numbers_compare() {
        assert_eq!(eval("-1 < 0"), Value::Bool(true));
        assert_eq!(eval("0 - 5 == -5"), Value::Bool(true));
    }
}
