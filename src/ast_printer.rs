//! Debug pretty-printer: renders an expression tree in parenthesized
//! prefix form, e.g. `1 + 2 * 3` → `(+ 1 (* 2 3))`. Not needed for
//! execution; used by the `parse` subcommand and the parser tests to
//! check precedence and associativity.

use crate::ast::{Expr, LiteralValue};

pub struct AstPrinter;

impl AstPrinter {
    pub fn print(expr: &Expr) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::True => "true".into(),

                LiteralValue::False => "false".into(),

                LiteralValue::Nil => "nil".into(),

                LiteralValue::Str(s) => s.clone(),

                // Same convention as runtime stringify: 3.0 → "3".
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.0}", n)
                    } else {
                        n.to_string()
                    }
                }
            },

            Expr::Grouping(inner) => format!("(group {})", Self::print(inner)),

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, Self::print(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                Self::print(left),
                Self::print(right)
            ),

            Expr::Variable { name, .. } => name.lexeme.clone(),

            Expr::Assign { name, value, .. } => {
                format!("(= {} {})", name.lexeme, Self::print(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut s = format!("(call {}", Self::print(callee));

                for argument in arguments {
                    s.push(' ');
                    s.push_str(&Self::print(argument));
                }

                s.push(')');
                s
            }

            Expr::Get { object, name } => {
                format!("(. {} {})", Self::print(object), name.lexeme)
            }

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(.= {} {} {})",
                Self::print(object),
                name.lexeme,
                Self::print(value)
            ),

            Expr::This { .. } => "this".into(),
        }
    }
}
