use crate::parse_program;
use basic_ast::{BinOp, Expression, LValue, Statement, Value};
use pretty_assertions::assert_eq;

fn first_statement(source: &str) -> Statement {
    let program = parse_program(source).expect("parse should succeed");
    program.get(0).expect("at least one line").statement.clone()
}

#[test]
fn parses_hello_world() {
    let stmt = first_statement("10 PRINT \"HELLO\"\n");
    match stmt {
        Statement::Print(items) => assert_eq!(items.len(), 1),
        other => panic!("expected Print, got {other:?}"),
    }
}

#[test]
fn auto_numbers_unnumbered_source() {
    let program = parse_program("PRINT \"A\"\nPRINT \"B\"\n").unwrap();
    assert_eq!(program.len(), 2);
    assert_eq!(program.line_number_at(0), Some(10));
    assert_eq!(program.line_number_at(1), Some(20));
}

#[test]
fn rejects_mixed_numbering() {
    let err = parse_program("10 PRINT \"A\"\nPRINT \"B\"\n");
    assert!(err.is_err());
}

#[test]
fn parses_assignment_with_precedence() {
    let stmt = first_statement("10 LET X = 1 + 2 * 3\n");
    match stmt {
        Statement::Let { target, value } => {
            assert_eq!(target, LValue::Variable("X".to_string()));
            match value {
                Expression::Binary { op: BinOp::Add, right, .. } => match *right {
                    Expression::Binary { op: BinOp::Mul, .. } => {}
                    other => panic!("expected nested multiply, got {other:?}"),
                },
                other => panic!("expected a top-level add, got {other:?}"),
            }
        }
        other => panic!("expected Let, got {other:?}"),
    }
}

#[test]
fn parses_implicit_let() {
    let stmt = first_statement("10 X = 5\n");
    assert!(matches!(stmt, Statement::Let { .. }));
}

#[test]
fn parses_for_next() {
    let program = parse_program("10 FOR I = 1 TO 10 STEP 2\n20 NEXT I\n").unwrap();
    assert_eq!(program.len(), 2);
    match &program.get(0).unwrap().statement {
        Statement::For { var, step, .. } => {
            assert_eq!(var, "I");
            assert!(step.is_some());
        }
        other => panic!("expected For, got {other:?}"),
    }
}

#[test]
fn parses_block_if_and_inline_if() {
    let block = first_statement("10 IF X > 0 THEN\n");
    assert!(matches!(
        block,
        Statement::If { then: basic_ast::ThenBranch::Block, .. }
    ));

    let inline = first_statement("10 IF X > 0 THEN PRINT \"POS\" ELSE PRINT \"NEG\"\n");
    match inline {
        Statement::If { then: basic_ast::ThenBranch::Inline(_), else_branch: Some(_), .. } => {}
        other => panic!("expected inline If with Else, got {other:?}"),
    }
}

#[test]
fn parses_then_line_number_sugar() {
    let stmt = first_statement("10 IF X = 1 THEN 100\n");
    match stmt {
        Statement::If { then: basic_ast::ThenBranch::Inline(boxed), .. } => {
            assert!(matches!(*boxed, Statement::Goto(_)));
        }
        other => panic!("expected inline goto sugar, got {other:?}"),
    }
}

#[test]
fn parses_select_case() {
    let program = parse_program(
        "10 SELECT CASE X\n20 CASE 1\n30 PRINT \"ONE\"\n40 CASE ELSE\n50 PRINT \"OTHER\"\n60 END SELECT\n",
    )
    .unwrap();
    assert_eq!(program.len(), 6);
    assert!(matches!(program.get(1).unwrap().statement, Statement::Case(_)));
    assert!(matches!(program.get(3).unwrap().statement, Statement::CaseElse));
}

#[test]
fn parses_dim_with_dimensions_and_type() {
    let stmt = first_statement("10 DIM A(10, 20) AS INTEGER\n");
    match stmt {
        Statement::Dim(decls) => {
            assert_eq!(decls.len(), 1);
            assert_eq!(decls[0].dims.len(), 2);
            assert_eq!(decls[0].as_type.as_deref(), Some("INTEGER"));
        }
        other => panic!("expected Dim, got {other:?}"),
    }
}

#[test]
fn parses_data_and_read_and_restore() {
    let program = parse_program("10 DATA 1, 2, 3\n20 READ A, B, C\n30 RESTORE 10\n").unwrap();
    match &program.get(0).unwrap().statement {
        Statement::Data(raw) => assert!(raw.contains('1')),
        other => panic!("expected Data, got {other:?}"),
    }
    match &program.get(1).unwrap().statement {
        Statement::Read(targets) => assert_eq!(targets.len(), 3),
        other => panic!("expected Read, got {other:?}"),
    }
    assert!(matches!(
        program.get(2).unwrap().statement,
        Statement::Restore(Some(_))
    ));
}

#[test]
fn parses_sub_and_call() {
    let program = parse_program(
        "10 DECLARE SUB GREET (NAME$)\n20 CALL GREET(\"WORLD\")\n30 SUB GREET (NAME$)\n40 PRINT NAME$\n50 END SUB\n",
    )
    .unwrap();
    assert_eq!(program.len(), 5);
    assert!(matches!(program.get(0).unwrap().statement, Statement::Declare { .. }));
    assert!(matches!(program.get(1).unwrap().statement, Statement::CallSub { .. }));
    assert!(matches!(program.get(2).unwrap().statement, Statement::Sub { .. }));
}

#[test]
fn parses_screen_and_pset() {
    let program = parse_program("10 SCREEN 13\n20 PSET (10, 20), 4\n").unwrap();
    assert!(matches!(
        program.get(0).unwrap().statement,
        Statement::Screen { .. }
    ));
    match &program.get(1).unwrap().statement {
        Statement::Pset { point, color } => {
            assert!(!point.step);
            assert!(color.is_some());
        }
        other => panic!("expected Pset, got {other:?}"),
    }
}

#[test]
fn parses_line_graphics_vs_line_input() {
    let program = parse_program(
        "10 LINE (0, 0)-(10, 10), 1, BF\n20 LINE INPUT \"NAME\"; N$\n",
    )
    .unwrap();
    match &program.get(0).unwrap().statement {
        Statement::Line { is_box, filled, .. } => {
            assert!(is_box);
            assert!(filled);
        }
        other => panic!("expected Line, got {other:?}"),
    }
    assert!(matches!(
        program.get(1).unwrap().statement,
        Statement::LineInput { .. }
    ));
}

#[test]
fn parses_open_close_and_field() {
    let program = parse_program(
        "10 OPEN \"DATA.TXT\" FOR RANDOM AS #1 LEN = 64\n20 FIELD #1, 20 AS NAME$, 44 AS REST$\n30 CLOSE #1\n",
    )
    .unwrap();
    match &program.get(0).unwrap().statement {
        Statement::Open { mode, record_len, .. } => {
            assert_eq!(*mode, basic_ast::OpenMode::Random);
            assert!(record_len.is_some());
        }
        other => panic!("expected Open, got {other:?}"),
    }
    match &program.get(1).unwrap().statement {
        Statement::Field { fields, .. } => assert_eq!(fields.len(), 2),
        other => panic!("expected Field, got {other:?}"),
    }
}

#[test]
fn parses_string_literal_expression() {
    match first_statement("10 LET A$ = \"HI\"\n") {
        Statement::Let { value: Expression::Literal(Value::Text(s)), .. } => {
            assert_eq!(s, "HI");
        }
        other => panic!("expected string literal Let, got {other:?}"),
    }
}

#[test]
fn parses_error_handling_statements() {
    let program = parse_program("10 ON ERROR GOTO 100\n20 RESUME NEXT\n").unwrap();
    assert!(matches!(
        program.get(0).unwrap().statement,
        Statement::OnError(_)
    ));
    assert!(matches!(
        program.get(1).unwrap().statement,
        Statement::Resume { .. }
    ));
}
