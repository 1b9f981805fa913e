//! Abstract syntax tree produced by the [parser](crate::parser) (spec
//! §3.4).
//!
//! Every case the specification calls out is modeled as a variant of
//! a closed sum type rather than as a class hierarchy (spec §9,
//! "Tagged variants over class hierarchy"): the parser and a future
//! executor can both switch over [`Command`] and [`TestExpression`]
//! exhaustively instead of probing for optional fields.
//!
//! The tree owns its nodes outright (spec §3.4 "Ownership"): each
//! parent holds its children by value or `Vec`, with `Rc` reserved
//! for the one case that is genuinely shared — a here-document body
//! cell that both a [`Redirect`] and the heredoc collector need to
//! reach (see [`crate::heredoc`]).

pub mod display;

use crate::position::Position;
use crate::token::{QuoteType, Token, TokenPart};

/// A word: the AST-level counterpart of a lexer [`Token`], stripped
/// of the fields (`fd`, `dup_fd`) that only make sense for
/// redirection operators.
#[derive(Clone, Debug, PartialEq)]
pub struct Word {
    pub position: Position,
    pub lexeme: String,
    pub parts: Option<Vec<TokenPart>>,
    pub quote_type: QuoteType,
}

impl Word {
    /// Whether this word contains no unquoted expansion or variable
    /// part, i.e. the executor can treat it as a literal.
    pub fn is_literal(&self) -> bool {
        match &self.parts {
            None => true,
            Some(parts) => parts
                .iter()
                .all(|p| matches!(p.kind, crate::token::PartKind::Literal | crate::token::PartKind::Tilde)),
        }
    }
}

impl From<Token> for Word {
    fn from(token: Token) -> Self {
        Word {
            position: token.position,
            lexeme: token.lexeme,
            parts: token.parts,
            quote_type: token.quote_type,
        }
    }
}

impl From<&Token> for Word {
    fn from(token: &Token) -> Self {
        Word {
            position: token.position,
            lexeme: token.lexeme.clone(),
            parts: token.parts.clone(),
            quote_type: token.quote_type,
        }
    }
}

/// `<(cmd)` / `>(cmd)`, treated as a filename-valued operand (spec
/// glossary, §3.4).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProcessSubstitutionDirection {
    In,
    Out,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessSubstitution {
    pub direction: ProcessSubstitutionDirection,
    pub command_text: String,
    pub position: Position,
}

/// One operand in a simple command's word list: either a plain word
/// or a process substitution (spec §3.4, glossary "Process
/// substitution").
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Word(Word),
    ProcessSubstitution(ProcessSubstitution),
}

impl Operand {
    pub fn position(&self) -> Position {
        match self {
            Operand::Word(w) => w.position,
            Operand::ProcessSubstitution(p) => p.position,
        }
    }
}

/// A prefix assignment in a simple command (`NAME=value`,
/// `NAME=(1 2 3)`, `NAME[i]=value`), kept distinct from ordinary
/// operands (SPEC_FULL §3, "Assignment words").
#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    pub name: String,
    pub value: AssignValue,
    pub position: Position,
}

/// The right-hand side of an [`Assign`] (SPEC_FULL §3, "Array
/// assignment"): plain scalars, whole-array initializers
/// (`arr=(1 2 3)`), and single-element array assignments
/// (`arr[2]=x`) are three shapes of the same prefix-assignment
/// production, not three different AST nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum AssignValue {
    Scalar(Word),
    Array(Vec<Word>),
    Element(Word, Word),
}

/// File-descriptor-duplication or close target of `N>&M` / `N>&-`
/// forms, re-exported at the AST layer from [`crate::token`].
pub use crate::token::DupTarget;

/// The kind of redirection operator (spec §3.2's closed token set,
/// narrowed to what a [`Redirect`] node needs once FD digits and
/// dup targets have already been peeled off by the lexer).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    In,
    Out,
    Append,
    Clobber,
    ReadWrite,
    DupIn,
    DupOut,
    OutErr,
    HereDoc,
    HereDocStripTabs,
    HereString,
}

/// What a [`Redirect`] points its file descriptor at.
#[derive(Clone, Debug, PartialEq)]
pub enum RedirectTarget {
    Word(Word),
    Fd(DupTarget),
}

/// A single redirection (spec §3.4, §4.5.2).
///
/// `heredoc_content` and `heredoc_quoted` start `None`/`false` when
/// the parser builds the node and are filled in by
/// [`crate::heredoc::collect`] before the token stream reaches the
/// parser — see that module for why the fill happens *before*
/// parsing here rather than in a separate tree walk afterward.
#[derive(Clone, Debug, PartialEq)]
pub struct Redirect {
    pub fd: Option<u32>,
    pub operator: RedirOp,
    pub target: RedirectTarget,
    pub heredoc_content: Option<String>,
    pub heredoc_quoted: bool,
    pub position: Position,
}

/// Whether a compound construct runs in the caller's process or must
/// fork (spec §3.4, §4.5.5).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecutionContext {
    Statement,
    Pipeline,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Separator {
    /// `;` or a newline: the two are interchangeable everywhere the
    /// grammar accepts one (spec §4.5.1).
    Sequential,
    /// `&`: run the preceding and-or list in the background.
    Background,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatementListItem {
    pub and_or: AndOrList,
    pub separator: Option<Separator>,
    pub position: Position,
}

/// Spec §3.4 `StatementList`: "ordered statements with separators".
#[derive(Clone, Debug, PartialEq)]
pub struct StatementList {
    pub items: Vec<StatementListItem>,
    pub position: Position,
}

impl StatementList {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOrOp {
    And,
    Or,
}

/// Spec §3.4 `AndOrList`. Invariant: `pipelines.len() ==
/// operators.len() + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct AndOrList {
    pub pipelines: Vec<Pipeline>,
    pub operators: Vec<AndOrOp>,
    pub position: Position,
}

impl AndOrList {
    /// Checks the invariant spec §3.4 states for this node.
    pub fn is_well_formed(&self) -> bool {
        self.pipelines.len() == self.operators.len() + 1
    }
}

/// Spec §3.4 `Pipeline`. Invariant: `commands` is non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    pub negate: bool,
    pub commands: Vec<Command>,
    pub position: Position,
}

/// Spec §3.4 `SimpleCommand`.
///
/// Carries no background flag of its own: `&` always applies to a
/// whole statement (spec §4.5.1), so it lives on
/// [`StatementListItem::separator`] instead.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SimpleCommand {
    pub assigns: Vec<Assign>,
    pub words: Vec<Operand>,
    pub redirects: Vec<Redirect>,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SubshellGroup {
    pub body: StatementList,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BraceGroup {
    pub body: StatementList,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub body: Box<CompoundCommand>,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElifClause {
    pub condition: StatementList,
    pub body: StatementList,
    pub position: Position,
}

/// Spec §3.4 `IfConditional`. Invariant: every elif clause has a
/// non-empty condition and body.
#[derive(Clone, Debug, PartialEq)]
pub struct IfConditional {
    pub condition: StatementList,
    pub then_body: StatementList,
    pub elifs: Vec<ElifClause>,
    pub else_body: Option<StatementList>,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileLoop {
    pub condition: StatementList,
    pub body: StatementList,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UntilLoop {
    pub condition: StatementList,
    pub body: StatementList,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForLoop {
    pub variable: String,
    /// `None` means the `in word_list` clause was omitted, which
    /// means "iterate over `$@`" to the executor.
    pub words: Option<Vec<Operand>>,
    pub body: StatementList,
    pub position: Position,
}

/// Spec §3.4 `CStyleForLoop`: `for ((init; condition; update))`. Each
/// of the three clauses is raw arithmetic text, like
/// [`ArithmeticEvaluation`]; the parser's job is only correct
/// delimitation (spec §4.5.4).
#[derive(Clone, Debug, PartialEq)]
pub struct CStyleForLoop {
    pub init: String,
    pub condition: String,
    pub update: String,
    pub body: StatementList,
    pub position: Position,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CaseTerminator {
    /// `;;`
    Break,
    /// `;&`: fall through to the next item unconditionally.
    FallThrough,
    /// `;;&`: fall through but re-test the next item's patterns.
    FallThroughTest,
}

/// Spec §3.4 `CaseItem`. Invariant: `patterns` is non-empty.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseItem {
    pub patterns: Vec<Word>,
    pub body: StatementList,
    pub terminator: CaseTerminator,
    pub position: Position,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaseConditional {
    pub subject: Word,
    pub items: Vec<CaseItem>,
    pub position: Position,
}

/// SPEC_FULL §4.5 supplement: `select` loops, symmetric with
/// [`ForLoop`], named in the spec's AST table (§3.4) but omitted from
/// the condensed grammar block.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectLoop {
    pub variable: String,
    pub words: Option<Vec<Operand>>,
    pub body: StatementList,
    pub position: Position,
}

/// `(( expr ))` used as a command (spec §4.5.4): the parser only
/// delimits the expression text; evaluating it is the executor's job.
#[derive(Clone, Debug, PartialEq)]
pub struct ArithmeticEvaluation {
    pub expression: String,
    pub position: Position,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnaryTestOp {
    /// `-f`, `-d`, `-e`, `-r`, `-w`, `-x`, `-s`, `-z`, `-n`, ... one
    /// opcode per recognized flag letter/word; the concrete flag is
    /// carried in [`TestExpression::Unary`] alongside this marker so
    /// new flags don't require a new enum variant.
    FileOrStringTest,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinaryTestOp {
    Eq,
    NotEq,
    Less,
    Greater,
    Match,
    NotMatch,
    IntEq,
    IntNotEq,
    IntLess,
    IntLessEq,
    IntGreater,
    IntGreaterEq,
}

/// Spec §4.5.3: precedence `||` (lowest) < `&&` < `!` (unary) <
/// binary operators.
#[derive(Clone, Debug, PartialEq)]
pub enum TestExpression {
    Unary {
        op: UnaryTestOp,
        flag: String,
        operand: Word,
        position: Position,
    },
    Binary {
        op: BinaryTestOp,
        left: Word,
        right: Word,
        /// The right operand's quote type: the executor treats `==`
        /// as a glob match iff this is `QuoteType::None` (spec
        /// §4.5.3, scenario 5).
        rhs_quote_type: QuoteType,
        position: Position,
    },
    Group(Box<TestExpression>, Position),
    And(Box<TestExpression>, Box<TestExpression>, Position),
    Or(Box<TestExpression>, Box<TestExpression>, Position),
    Not(Box<TestExpression>, Position),
    /// A bare word used as a test of its own emptiness (`[[ $x ]]`).
    Word(Word),
}

impl TestExpression {
    pub fn position(&self) -> Position {
        match self {
            TestExpression::Unary { position, .. }
            | TestExpression::Binary { position, .. }
            | TestExpression::Group(_, position)
            | TestExpression::And(_, _, position)
            | TestExpression::Or(_, _, position)
            | TestExpression::Not(_, position) => *position,
            TestExpression::Word(w) => w.position,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnhancedTestStatement {
    pub expr: TestExpression,
    pub position: Position,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BreakStatement {
    pub level: Option<u32>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContinueStatement {
    pub level: Option<u32>,
}

/// The closed set of compound-command shapes (spec §3.4).
#[derive(Clone, Debug, PartialEq)]
pub enum CompoundCommandKind {
    Subshell(SubshellGroup),
    BraceGroup(BraceGroup),
    If(IfConditional),
    While(WhileLoop),
    Until(UntilLoop),
    For(ForLoop),
    CStyleFor(CStyleForLoop),
    Case(CaseConditional),
    Select(SelectLoop),
    Arithmetic(ArithmeticEvaluation),
    Test(EnhancedTestStatement),
}

/// A compound command together with the trailing redirections the
/// parser attaches to the construct itself, never to its body (spec
/// §4.5.5), and the [`ExecutionContext`] decided by where the parser
/// found it (spec §4.5.5, §4.5.6).
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundCommand {
    pub kind: CompoundCommandKind,
    pub redirects: Vec<Redirect>,
    pub context: ExecutionContext,
    pub position: Position,
}

/// The `command` production (spec §4.5.1): one element of a
/// [`Pipeline`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound(CompoundCommand),
    FunctionDef(FunctionDef),
    Break(BreakStatement, Position),
    Continue(ContinueStatement, Position),
}

impl Command {
    pub fn position(&self) -> Position {
        match self {
            Command::Simple(c) => c.position,
            Command::Compound(c) => c.position,
            Command::FunctionDef(c) => c.position,
            Command::Break(_, p) | Command::Continue(_, p) => *p,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TopLevelItem {
    FunctionDef(FunctionDef),
    Statement(StatementList),
}

/// Spec §3.4 `TopLevel`: the root of a parse.
#[derive(Clone, Debug, PartialEq)]
pub struct TopLevel {
    pub items: Vec<TopLevelItem>,
    pub position: Position,
}

impl TopLevel {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_or_list_invariant_holds_for_single_pipeline() {
        let p = Pipeline {
            negate: false,
            commands: vec![],
            position: Position::dummy(),
        };
        let list = AndOrList {
            pipelines: vec![p],
            operators: vec![],
            position: Position::dummy(),
        };
        assert!(list.is_well_formed());
    }

    #[test]
    fn and_or_list_invariant_catches_mismatch() {
        let p = Pipeline {
            negate: false,
            commands: vec![],
            position: Position::dummy(),
        };
        let list = AndOrList {
            pipelines: vec![p.clone(), p],
            operators: vec![],
            position: Position::dummy(),
        };
        assert!(!list.is_well_formed());
    }
}
