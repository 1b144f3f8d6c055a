use crate::operator::Operator;
use crate::operator::OperatorName;
use crate::operator::OPERATORS;
use crate::token::TT;

/// The binary, postfix-position or ternary operator a token starts, if any.
pub fn multary_operator(tt: TT) -> Option<&'static Operator> {
  use OperatorName::*;
  let name = match tt {
    TT::Ampersand => BitwiseAnd,
    TT::AmpersandAmpersand => LogicalAnd,
    TT::AmpersandAmpersandEquals => AssignmentLogicalAnd,
    TT::AmpersandEquals => AssignmentBitwiseAnd,
    TT::Asterisk => Multiplication,
    TT::AsteriskAsterisk => Exponentiation,
    TT::AsteriskAsteriskEquals => AssignmentExponentiation,
    TT::AsteriskEquals => AssignmentMultiplication,
    TT::Bar => BitwiseOr,
    TT::BarBar => LogicalOr,
    TT::BarBarEquals => AssignmentLogicalOr,
    TT::BarEquals => AssignmentBitwiseOr,
    TT::BracketOpen => ComputedMemberAccess,
    TT::Caret => BitwiseXor,
    TT::CaretEquals => AssignmentBitwiseXor,
    TT::ChevronLeft => LessThan,
    TT::ChevronLeftChevronLeft => BitwiseLeftShift,
    TT::ChevronLeftChevronLeftEquals => AssignmentBitwiseLeftShift,
    TT::ChevronLeftEquals => LessThanOrEqual,
    TT::ChevronRight => GreaterThan,
    TT::ChevronRightChevronRight => BitwiseRightShift,
    TT::ChevronRightChevronRightChevronRight => BitwiseUnsignedRightShift,
    TT::ChevronRightChevronRightChevronRightEquals => AssignmentBitwiseUnsignedRightShift,
    TT::ChevronRightChevronRightEquals => AssignmentBitwiseRightShift,
    TT::ChevronRightEquals => GreaterThanOrEqual,
    TT::Comma => Comma,
    TT::Dot => MemberAccess,
    TT::Equals => Assignment,
    TT::EqualsEquals => Equality,
    TT::EqualsEqualsEquals => StrictEquality,
    TT::ExclamationEquals => Inequality,
    TT::ExclamationEqualsEquals => StrictInequality,
    TT::Hyphen => Subtraction,
    TT::HyphenEquals => AssignmentSubtraction,
    TT::KeywordIn => In,
    TT::KeywordInstanceof => Instanceof,
    TT::ParenthesisOpen => Call,
    TT::Percent => Remainder,
    TT::PercentEquals => AssignmentRemainder,
    TT::Plus => Addition,
    TT::PlusEquals => AssignmentAddition,
    TT::Question => Conditional,
    TT::QuestionDot => OptionalChainingMemberAccess,
    TT::QuestionDotBracketOpen => OptionalChainingComputedMemberAccess,
    TT::QuestionDotParenthesisOpen => OptionalChainingCall,
    TT::QuestionQuestion => NullishCoalescing,
    TT::QuestionQuestionEquals => AssignmentNullishCoalescing,
    TT::Slash => Division,
    TT::SlashEquals => AssignmentDivision,
    _ => return None,
  };
  OPERATORS.get(&name)
}

/// The prefix operator a token starts, if any. Postfix `++`/`--` and `yield*` are handled by the
/// caller.
pub fn unary_operator(tt: TT) -> Option<&'static Operator> {
  use OperatorName::*;
  let name = match tt {
    TT::Exclamation => LogicalNot,
    TT::Hyphen => UnaryNegation,
    TT::HyphenHyphen => PrefixDecrement,
    TT::KeywordAwait => Await,
    TT::KeywordDelete => Delete,
    TT::KeywordNew => New,
    TT::KeywordTypeof => Typeof,
    TT::KeywordVoid => Void,
    TT::KeywordYield => Yield,
    TT::Plus => UnaryPlus,
    TT::PlusPlus => PrefixIncrement,
    TT::Tilde => BitwiseNot,
    _ => return None,
  };
  OPERATORS.get(&name)
}
