//! Relational operators and the allow-lists that define the two parsing modes

use std::fmt;
use std::str::FromStr;

use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,         // =
    NotEquals,      // !=
    Less,           // <
    LessOrEqual,    // <=
    Greater,        // >
    GreaterOrEqual, // >=
    Like,           // LIKE, ~~
    NotLike,        // NOT LIKE, !~~
    ILike,          // ILIKE, ~~*
    NotILike,       // NOT ILIKE, !~~*
    Regex,          // ~
    IRegex,         // ~*
    NotRegex,       // !~
    NotIRegex,      // !~*
    Contains,       // ?
    In,             // IN
    NotIn,          // NOT IN
}

impl Operator {
    /// Canonical spelling, as accepted by the grammar
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::ILike => "ILIKE",
            Operator::NotILike => "NOT ILIKE",
            Operator::Regex => "~",
            Operator::IRegex => "~*",
            Operator::NotRegex => "!~",
            Operator::NotIRegex => "!~*",
            Operator::Contains => "?",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
        }
    }

    /// `IN` / `NOT IN`, whose operand is a parenthesized list
    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    /// The six comparison operators shared by ordered types
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Equals
                | Operator::NotEquals
                | Operator::Less
                | Operator::LessOrEqual
                | Operator::Greater
                | Operator::GreaterOrEqual
        )
    }

    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Equals | Operator::NotEquals)
    }

    /// Apply a comparison operator to an already computed ordering.
    ///
    /// Returns `None` for operators that are not comparisons.
    pub fn compare<T: PartialOrd + ?Sized>(&self, left: &T, right: &T) -> Option<bool> {
        let result = match self {
            Operator::Equals => left == right,
            Operator::NotEquals => left != right,
            Operator::Less => left < right,
            Operator::LessOrEqual => left <= right,
            Operator::Greater => left > right,
            Operator::GreaterOrEqual => left >= right,
            _ => return None,
        };
        Some(result)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operator: {}", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // "NOT   IN" and "NOT IN" are the same operator
        let normalized = s.split_whitespace().join(" ");
        let op = match normalized.as_str() {
            "=" => Operator::Equals,
            "!=" => Operator::NotEquals,
            "<" => Operator::Less,
            "<=" => Operator::LessOrEqual,
            ">" => Operator::Greater,
            ">=" => Operator::GreaterOrEqual,
            "LIKE" | "~~" => Operator::Like,
            "NOT LIKE" | "!~~" => Operator::NotLike,
            "ILIKE" | "~~*" => Operator::ILike,
            "NOT ILIKE" | "!~~*" => Operator::NotILike,
            "~" => Operator::Regex,
            "~*" => Operator::IRegex,
            "!~" => Operator::NotRegex,
            "!~*" => Operator::NotIRegex,
            "?" => Operator::Contains,
            "IN" => Operator::In,
            "NOT IN" => Operator::NotIn,
            _ => return Err(UnknownOperator(s.to_string())),
        };
        Ok(op)
    }
}

/// Which of the two where-filter grammars is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Resource selection queries
    Standard,
    /// Bulk-import filter and option queries
    Import,
}

impl ParseMode {
    pub fn operators(&self) -> &'static OperatorSet {
        match self {
            ParseMode::Standard => &STANDARD_OPERATORS,
            ParseMode::Import => &IMPORT_OPERATORS,
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseMode::Standard => f.write_str("standard"),
            ParseMode::Import => f.write_str("import"),
        }
    }
}

/// Allow-list of operators accepted by one parsing mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSet {
    operators: &'static [Operator],
}

pub static STANDARD_OPERATORS: OperatorSet = OperatorSet {
    operators: &[
        Operator::Equals,
        Operator::NotEquals,
        Operator::Less,
        Operator::LessOrEqual,
        Operator::Greater,
        Operator::GreaterOrEqual,
        Operator::Like,
        Operator::NotLike,
        Operator::ILike,
        Operator::NotILike,
        Operator::Regex,
        Operator::IRegex,
        Operator::NotRegex,
        Operator::NotIRegex,
        Operator::Contains,
    ],
};

pub static IMPORT_OPERATORS: OperatorSet = OperatorSet {
    operators: &[
        Operator::Equals,
        Operator::NotEquals,
        Operator::In,
        Operator::NotIn,
    ],
};

impl OperatorSet {
    pub fn contains(&self, op: Operator) -> bool {
        self.operators.contains(&op)
    }

    pub fn iter(&self) -> impl Iterator<Item = Operator> + '_ {
        self.operators.iter().copied()
    }

    /// Comma separated list of the accepted spellings, for error messages
    pub fn describe(&self) -> String {
        self.operators.iter().map(Operator::as_str).join(", ")
    }
}
