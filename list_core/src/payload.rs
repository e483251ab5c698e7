//! Numeric payloads and the per-list policy that shapes them
//!
//! Payload text is never rejected. Missing values become 0, surplus values
//! are dropped, and anything outside the policy's range is clamped. Each
//! correction is reported against the line it came from.

use crate::report::FieldContext;
use std::fmt::Write as _;

/// How many values each entry of a list carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Any non-zero number of values
    Any,
    /// Exactly this many values (0 for identity-only lists)
    Exactly(usize),
}

/// Arity and value range for the entries of one list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePolicy {
    pub arity: Arity,
    pub min: f64,
    pub max: f64,
}

impl Default for ValuePolicy {
    fn default() -> Self {
        ValuePolicy {
            arity: Arity::Any,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl ValuePolicy {
    /// Exactly one value per entry, between 0 and 1
    pub fn single_percent(self) -> Self {
        self.single_value().range_0_to_1()
    }

    /// Identification only; entries carry no values
    pub fn no_values(self) -> Self {
        self.multi_value(0)
    }

    pub fn single_value(self) -> Self {
        self.multi_value(1)
    }

    pub fn multi_value(mut self, count: usize) -> Self {
        self.arity = Arity::Exactly(count);
        self
    }

    pub fn range_0_to_1(self) -> Self {
        self.range(0.0, 1.0)
    }

    /// Any value >= 0
    pub fn range_positive(self) -> Self {
        self.range(0.0, f64::INFINITY)
    }

    /// Bound values to `[min, max]`, inclusive. 0 should lie within the range.
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Required value count: -1 for any non-zero count, otherwise the exact count
    pub fn required_values(&self) -> i64 {
        match self.arity {
            Arity::Any => -1,
            Arity::Exactly(n) => n as i64,
        }
    }

    pub fn allows_values(&self) -> bool {
        self.arity != Arity::Exactly(0)
    }

    /// Line format hint, e.g. `[ "namespace:registry_name value1 value2", ... ]`
    pub fn field_format(&self) -> String {
        let mut format = String::from("[ \"namespace:registry_name");
        match self.arity {
            Arity::Any => format.push_str(" value1 value2 ..."),
            Arity::Exactly(1) => format.push_str(" value"),
            Arity::Exactly(n) => {
                for i in 1..=n {
                    let _ = write!(format, " value{}", i);
                }
            }
        }
        format.push_str("\", ... ]");
        format
    }

    /// Comment lines describing this policy
    pub fn field_info(&self) -> Vec<String> {
        let mut lines = vec![format!("   Format: {}", self.field_format())];
        if self.allows_values() {
            lines.push(format!(
                "   Range for Values: {} ~ {}",
                format_bound(self.min),
                format_bound(self.max)
            ));
        }
        lines
    }

    /// Parse the value tokens that follow an entry's identity token
    pub fn parse_values(&self, ctx: &FieldContext, line: &str, args: &[&str]) -> Payload {
        let mut values = Vec::new();

        match self.arity {
            Arity::Any => {
                if args.is_empty() {
                    ctx.warn(
                        "Entry has too few values! Expected at least one value. Replacing missing value with 0",
                        line,
                    );
                    values.push(0.0);
                } else {
                    values.extend(args.iter().map(|arg| self.parse_value(ctx, line, arg)));
                }
            }
            Arity::Exactly(required) => {
                if required > args.len() {
                    ctx.warn(
                        &format!(
                            "Entry has too few values! Expected {} values, but detected {}. Replacing missing values with 0",
                            required,
                            args.len()
                        ),
                        line,
                    );
                } else if required < args.len() {
                    ctx.warn(
                        &format!(
                            "Entry has too many values! Expected {} values, but detected {}. Deleting additional values",
                            required,
                            args.len()
                        ),
                        line,
                    );
                }
                for i in 0..required {
                    match args.get(i) {
                        Some(arg) => values.push(self.parse_value(ctx, line, arg)),
                        None => values.push(0.0),
                    }
                }
            }
        }

        Payload(values)
    }

    /// Parse one value token, falling back to 0 and clamping into range
    fn parse_value(&self, ctx: &FieldContext, line: &str, arg: &str) -> f64 {
        let value = match arg.parse::<f64>() {
            Ok(v) if !v.is_nan() => v,
            _ => {
                ctx.warn("Invalid value! Falling back to 0", line);
                0.0
            }
        };
        self.clamp(ctx, line, value)
    }

    fn clamp(&self, ctx: &FieldContext, line: &str, value: f64) -> f64 {
        if value < self.min {
            ctx.warn(
                &format!(
                    "Value is below the minimum ({})! Clamping value. Invalid value: {}",
                    format_value(self.min),
                    format_value(value)
                ),
                line,
            );
            self.min
        } else if value > self.max {
            ctx.warn(
                &format!(
                    "Value is above the maximum ({})! Clamping value. Invalid value: {}",
                    format_value(self.max),
                    format_value(value)
                ),
                line,
            );
            self.max
        } else {
            value
        }
    }
}

/// Ordered numeric values attached to an entry
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload(Vec<f64>);

impl Payload {
    pub fn new(values: Vec<f64>) -> Self {
        Payload(values)
    }

    pub fn empty() -> Self {
        Payload(Vec::new())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// First value, or 0 when there is none
    pub fn first_or_zero(&self) -> f64 {
        self.0.first().copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append ` value0 value1 ...` to `out`
    pub(crate) fn render_onto(&self, out: &mut String) {
        for value in &self.0 {
            out.push(' ');
            out.push_str(&format_value(*value));
        }
    }
}

impl From<Vec<f64>> for Payload {
    fn from(values: Vec<f64>) -> Self {
        Payload(values)
    }
}

impl<const N: usize> From<[f64; N]> for Payload {
    fn from(values: [f64; N]) -> Self {
        Payload(values.to_vec())
    }
}

/// Render a value so that whole numbers keep one decimal (`5.0`, `0.25`)
pub(crate) fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn format_bound(value: f64) -> String {
    if value == f64::INFINITY {
        "+∞".to_string()
    } else if value == f64::NEG_INFINITY {
        "-∞".to_string()
    } else {
        format_value(value)
    }
}
