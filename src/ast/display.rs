//! `Display` impls that reconstruct shell source from an AST.
//!
//! These are not a pretty-printer: they exist so that
//! `tokenize(&parse(src).to_string())` round-trips to (structurally)
//! the same tree, which is how the parser's own tests check
//! reassembly (spec §8's round-trip law applied one layer up, at the
//! AST instead of the token stream). Matches the teacher's pattern of
//! joining sibling lists with [`itertools::Itertools::format`] rather
//! than building an intermediate `String`.

use super::*;
use itertools::Itertools;
use std::fmt;

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lexeme)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Word(w) => write!(f, "{w}"),
            Operand::ProcessSubstitution(p) => {
                let dir = match p.direction {
                    ProcessSubstitutionDirection::In => '<',
                    ProcessSubstitutionDirection::Out => '>',
                };
                write!(f, "{dir}({})", p.command_text)
            }
        }
    }
}

impl fmt::Display for AssignValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignValue::Scalar(w) => write!(f, "{w}"),
            AssignValue::Array(words) => write!(f, "({})", words.iter().format(" ")),
            AssignValue::Element(index, w) => write!(f, "[{index}]={w}"),
        }
    }
}

impl fmt::Display for Assign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            AssignValue::Element(index, w) => write!(f, "{}[{index}]={w}", self.name),
            other => write!(f, "{}={other}", self.name),
        }
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RedirOp::In => "<",
            RedirOp::Out => ">",
            RedirOp::Append => ">>",
            RedirOp::Clobber => ">|",
            RedirOp::ReadWrite => "<>",
            RedirOp::DupIn => "<&",
            RedirOp::DupOut => ">&",
            RedirOp::OutErr => "&>",
            RedirOp::HereDoc => "<<",
            RedirOp::HereDocStripTabs => "<<-",
            RedirOp::HereString => "<<<",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectTarget::Word(w) => write!(f, "{w}"),
            RedirectTarget::Fd(DupTarget::Fd(n)) => write!(f, "{n}"),
            RedirectTarget::Fd(DupTarget::Close) => write!(f, "-"),
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(fd) = self.fd {
            write!(f, "{fd}")?;
        }
        write!(f, "{}{}", self.operator, self.target)
    }
}

impl fmt::Display for SimpleCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for a in &self.assigns {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{a}")?;
            first = false;
        }
        for w in &self.words {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{w}")?;
            first = false;
        }
        for r in &self.redirects {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{r}")?;
            first = false;
        }
        Ok(())
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            write!(f, "! ")?;
        }
        write!(f, "{}", self.commands.iter().format(" | "))
    }
}

impl fmt::Display for AndOrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if *self == AndOrOp::And { "&&" } else { "||" })
    }
}

impl fmt::Display for AndOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ops = self.operators.iter();
        for (i, p) in self.pipelines.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", ops.next().unwrap())?;
            }
            write!(f, "{p}")?;
        }
        Ok(())
    }
}

impl fmt::Display for StatementListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.and_or)?;
        match self.separator {
            Some(Separator::Background) => write!(f, " &"),
            Some(Separator::Sequential) => write!(f, ";"),
            None => Ok(()),
        }
    }
}

impl fmt::Display for StatementList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.items.iter().format(" "))
    }
}

impl fmt::Display for CaseTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseTerminator::Break => ";;",
            CaseTerminator::FallThrough => ";&",
            CaseTerminator::FallThroughTest => ";;&",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for CaseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}) {} {}",
            self.patterns.iter().format(" | "),
            self.body,
            self.terminator
        )
    }
}

impl fmt::Display for CompoundCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundCommandKind::Subshell(s) => write!(f, "( {} )", s.body),
            CompoundCommandKind::BraceGroup(b) => write!(f, "{{ {} }}", b.body),
            CompoundCommandKind::If(i) => {
                write!(f, "if {} then {}", i.condition, i.then_body)?;
                for e in &i.elifs {
                    write!(f, " elif {} then {}", e.condition, e.body)?;
                }
                if let Some(e) = &i.else_body {
                    write!(f, " else {e}")?;
                }
                write!(f, " fi")
            }
            CompoundCommandKind::While(w) => write!(f, "while {} do {} done", w.condition, w.body),
            CompoundCommandKind::Until(u) => write!(f, "until {} do {} done", u.condition, u.body),
            CompoundCommandKind::For(fl) => match &fl.words {
                Some(words) => write!(
                    f,
                    "for {} in {}; do {} done",
                    fl.variable,
                    words.iter().format(" "),
                    fl.body
                ),
                None => write!(f, "for {} do {} done", fl.variable, fl.body),
            },
            CompoundCommandKind::CStyleFor(c) => write!(
                f,
                "for (({}; {}; {})) do {} done",
                c.init, c.condition, c.update, c.body
            ),
            CompoundCommandKind::Case(c) => {
                write!(f, "case {} in {} esac", c.subject, c.items.iter().format(" "))
            }
            CompoundCommandKind::Select(s) => match &s.words {
                Some(words) => write!(
                    f,
                    "select {} in {}; do {} done",
                    s.variable,
                    words.iter().format(" "),
                    s.body
                ),
                None => write!(f, "select {} do {} done", s.variable, s.body),
            },
            CompoundCommandKind::Arithmetic(a) => write!(f, "(({}))", a.expression),
            CompoundCommandKind::Test(t) => write!(f, "[[ {} ]]", t.expr),
        }
    }
}

impl fmt::Display for CompoundCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for r in &self.redirects {
            write!(f, " {r}")?;
        }
        Ok(())
    }
}

impl fmt::Display for BinaryTestOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryTestOp::Eq => "==",
            BinaryTestOp::NotEq => "!=",
            BinaryTestOp::Less => "<",
            BinaryTestOp::Greater => ">",
            BinaryTestOp::Match => "=~",
            BinaryTestOp::NotMatch => "!~",
            BinaryTestOp::IntEq => "-eq",
            BinaryTestOp::IntNotEq => "-ne",
            BinaryTestOp::IntLess => "-lt",
            BinaryTestOp::IntLessEq => "-le",
            BinaryTestOp::IntGreater => "-gt",
            BinaryTestOp::IntGreaterEq => "-ge",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for TestExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestExpression::Unary { flag, operand, .. } => write!(f, "{flag} {operand}"),
            TestExpression::Binary {
                op, left, right, ..
            } => write!(f, "{left} {op} {right}"),
            TestExpression::Group(inner, _) => write!(f, "( {inner} )"),
            TestExpression::And(a, b, _) => write!(f, "{a} && {b}"),
            TestExpression::Or(a, b, _) => write!(f, "{a} || {b}"),
            TestExpression::Not(inner, _) => write!(f, "! {inner}"),
            TestExpression::Word(w) => write!(f, "{w}"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Simple(c) => write!(f, "{c}"),
            Command::Compound(c) => write!(f, "{c}"),
            Command::FunctionDef(fun) => write!(f, "{}() {}", fun.name, fun.body),
            Command::Break(b, _) => match b.level {
                Some(n) => write!(f, "break {n}"),
                None => write!(f, "break"),
            },
            Command::Continue(c, _) => match c.level {
                Some(n) => write!(f, "continue {n}"),
                None => write!(f, "continue"),
            },
        }
    }
}

impl fmt::Display for TopLevelItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopLevelItem::FunctionDef(fun) => write!(f, "{}() {}", fun.name, fun.body),
            TopLevelItem::Statement(s) => write!(f, "{s}"),
        }
    }
}

impl fmt::Display for TopLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.items.iter().format("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn word(s: &str) -> Word {
        Word {
            position: Position::dummy(),
            lexeme: s.to_string(),
            parts: None,
            quote_type: QuoteType::None,
        }
    }

    #[test]
    fn simple_command_displays_words_in_order() {
        let cmd = SimpleCommand {
            assigns: vec![],
            words: vec![Operand::Word(word("echo")), Operand::Word(word("hi"))],
            redirects: vec![],
            position: Position::dummy(),
        };
        assert_eq!(cmd.to_string(), "echo hi");
    }

    #[test]
    fn pipeline_joins_with_pipe() {
        let cmd = |w: &str| {
            Command::Simple(SimpleCommand {
                assigns: vec![],
                words: vec![Operand::Word(word(w))],
                redirects: vec![],
                position: Position::dummy(),
            })
        };
        let p = Pipeline {
            negate: false,
            commands: vec![cmd("a"), cmd("b")],
            position: Position::dummy(),
        };
        assert_eq!(p.to_string(), "a | b");
    }
}
