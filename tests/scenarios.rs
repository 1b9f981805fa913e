//! Integration tests exercising the crate's four public entry points
//! end to end, covering the concrete scenarios spec §8 calls out.
//! Per-pass unit tests (lexer, parser, heredoc, keyword, brace
//! expansion) live beside their modules; this file only checks the
//! pipeline wired together through `shfront::{parse, tokenize,
//! is_complete}`.

use shfront::ast::{
    Command, CompoundCommandKind, Operand, RedirOp, TopLevelItem,
};
use shfront::token::TokenKind;
use shfront::{is_complete, parse, tokenize, Config};

fn parse_ok(text: &str) -> shfront::ast::TopLevel {
    parse(text, &Config::bash_compat()).unwrap_or_else(|e| panic!("{text:?} failed to parse: {e}"))
}

fn only_command(ast: &shfront::ast::TopLevel) -> &Command {
    assert_eq!(ast.items.len(), 1);
    let TopLevelItem::Statement(list) = &ast.items[0] else {
        panic!("expected a statement, got a function definition");
    };
    assert_eq!(list.items.len(), 1);
    let pipeline = &list.items[0].and_or.pipelines[0];
    assert_eq!(pipeline.commands.len(), 1);
    &pipeline.commands[0]
}

fn word_strs(words: &[Operand]) -> Vec<&str> {
    words
        .iter()
        .map(|op| match op {
            Operand::Word(w) => w.lexeme.as_str(),
            Operand::ProcessSubstitution(_) => panic!("unexpected process substitution"),
        })
        .collect()
}

#[test]
fn scenario_1_pipeline_of_two_simple_commands() {
    let ast = parse_ok("echo hello | grep txt");
    let list = match &ast.items[0] {
        TopLevelItem::Statement(list) => list,
        _ => panic!("expected a statement"),
    };
    let pipeline = &list.items[0].and_or.pipelines[0];
    assert_eq!(pipeline.commands.len(), 2);
    let Command::Simple(first) = &pipeline.commands[0] else { panic!("expected a simple command") };
    let Command::Simple(second) = &pipeline.commands[1] else { panic!("expected a simple command") };
    assert_eq!(word_strs(&first.words), vec!["echo", "hello"]);
    assert_eq!(word_strs(&second.words), vec!["grep", "txt"]);
}

#[test]
fn scenario_2_if_else_statement_context() {
    let ast = parse_ok("if true; then echo yes; else echo no; fi");
    let Command::Compound(compound) = only_command(&ast) else { panic!("expected a compound command") };
    let CompoundCommandKind::If(if_cond) = &compound.kind else { panic!("expected an if conditional") };
    assert!(if_cond.else_body.is_some());
    assert_eq!(compound.context, shfront::ast::ExecutionContext::Statement);
}

#[test]
fn scenario_3_heredoc_body_attaches_to_redirect() {
    let ast = parse_ok("cat << EOF\nhello\nworld\nEOF\n");
    let Command::Simple(cmd) = only_command(&ast) else { panic!("expected a simple command") };
    assert_eq!(word_strs(&cmd.words), vec!["cat"]);
    assert_eq!(cmd.redirects.len(), 1);
    let redirect = &cmd.redirects[0];
    assert_eq!(redirect.operator, RedirOp::HereDoc);
    assert_eq!(redirect.heredoc_content.as_deref(), Some("hello\nworld\n"));
    assert!(!redirect.heredoc_quoted);
}

#[test]
fn scenario_4_array_initialization_assignment() {
    let ast = parse_ok("arr=(1 2 3)");
    let Command::Simple(cmd) = only_command(&ast) else { panic!("expected a simple command") };
    assert!(cmd.words.is_empty());
    assert_eq!(cmd.assigns.len(), 1);
    let assign = &cmd.assigns[0];
    assert_eq!(assign.name, "arr");
    let shfront::ast::AssignValue::Array(values) = &assign.value else { panic!("expected an array assignment") };
    let values: Vec<&str> = values.iter().map(|w| w.lexeme.as_str()).collect();
    assert_eq!(values, vec!["1", "2", "3"]);
}

#[test]
fn scenario_5_enhanced_test_equality_is_literal_when_quoted() {
    let ast = parse_ok(r#"[[ "$x" == "value" ]]"#);
    let Command::Compound(compound) = only_command(&ast) else { panic!("expected a compound command") };
    let CompoundCommandKind::Test(test_stmt) = &compound.kind else { panic!("expected an enhanced test") };
    let shfront::ast::TestExpression::Binary { op, rhs_quote_type, .. } = &test_stmt.expr else {
        panic!("expected a binary test expression")
    };
    assert_eq!(*op, shfront::ast::BinaryTestOp::Eq);
    assert_eq!(*rhs_quote_type, shfront::token::QuoteType::Double);
}

#[test]
fn scenario_6_fd_duplication_is_single_token() {
    let tokens = tokenize("2>&1", &Config::bash_compat()).unwrap();
    let redirects: Vec<_> = tokens.iter().filter(|t| t.kind == TokenKind::GreatAnd).collect();
    assert_eq!(redirects.len(), 1);
    assert_eq!(redirects[0].fd, Some(2));
    assert_eq!(redirects[0].dup_fd, Some(shfront::token::DupTarget::Fd(1)));
}

#[test]
fn fd_duplication_attaches_to_preceding_command() {
    let ast = parse_ok("echo hi 2>&1");
    let Command::Simple(cmd) = only_command(&ast) else { panic!("expected a simple command") };
    assert_eq!(cmd.redirects.len(), 1);
    assert_eq!(cmd.redirects[0].fd, Some(2));
}

#[test]
fn empty_input_parses_to_empty_top_level() {
    let ast = parse_ok("");
    assert!(ast.is_empty());
}

#[test]
fn whitespace_only_input_parses_to_empty() {
    let ast = parse_ok("   \n\t\n  ");
    assert!(ast.is_empty());
}

#[test]
fn comment_only_line_produces_no_statements() {
    let ast = parse_ok("# just a comment\n");
    assert!(ast.is_empty());
}

#[test]
fn brace_expansion_runs_before_lexing() {
    // `echo a{1,2}b` only has one command in the *source*, but brace
    // expansion (spec §4.1) must have already turned it into three
    // distinct words by the time the lexer sees it.
    let ast = parse_ok("echo a{1,2,3}b");
    let Command::Simple(cmd) = only_command(&ast) else { panic!("expected a simple command") };
    assert_eq!(word_strs(&cmd.words), vec!["echo", "a1b", "a2b", "a3b"]);
}

#[test]
fn brace_expansion_does_not_cross_quote_boundaries() {
    let ast = parse_ok("echo '{a,b}'");
    let Command::Simple(cmd) = only_command(&ast) else { panic!("expected a simple command") };
    assert_eq!(word_strs(&cmd.words), vec!["echo", "{a,b}"]);
}

#[test]
fn keyword_promotion_is_positional() {
    // `if` is only a keyword in command position; as a plain argument
    // to `echo` it stays a `Word`/operand (spec §4.3).
    let ast = parse_ok("echo if");
    let Command::Simple(cmd) = only_command(&ast) else { panic!("expected a simple command") };
    assert_eq!(word_strs(&cmd.words), vec!["echo", "if"]);
}

#[test]
fn completeness_probe_flags_open_constructs() {
    assert!(!is_complete("if true; then\n"));
    assert!(!is_complete("echo 'unterminated"));
    assert!(!is_complete("cat <<EOF\nbody\n"));
    assert!(!is_complete("echo hi \\\n"));
    assert!(is_complete("if true; then echo hi; fi\n"));
    assert!(is_complete("echo hi\n"));
}

#[test]
fn parse_collecting_recovers_across_errors() {
    // A stray closing keyword with nothing to close is a genuine
    // syntax error, not something more input would fix. Collecting
    // mode should record it, resynchronize at the next statement
    // boundary, and still pick up the trailing `echo after` statement
    // instead of dropping it silently.
    let (ast, errors) = shfront::parse_collecting("fi\necho after\n", &Config::permissive());
    assert!(!errors.is_empty());
    let Some(TopLevelItem::Statement(list)) = ast.items.first() else {
        panic!("expected a recovered statement, got {:?}", ast.items);
    };
    assert_eq!(list.items.len(), 1);
    let Command::Simple(cmd) = &list.items[0].and_or.pipelines[0].commands[0] else {
        panic!("expected a simple command")
    };
    assert_eq!(word_strs(&cmd.words), vec!["echo", "after"]);
}
