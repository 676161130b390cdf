use basic_ast::{Literal, TokenKind};
use basic_lexer::Lexer;

fn kinds(src: &str) -> Vec<TokenKind> {
    Lexer::tokenize(src)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn hello_line() {
    let toks = Lexer::tokenize("10 PRINT \"HELLO\"\n").unwrap();
    let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::NumberLiteral,
            TokenKind::Print,
            TokenKind::StringLiteral,
            TokenKind::NewLine,
            TokenKind::Eof,
        ]
    );
    assert_eq!(toks[2].literal, Literal::Text("HELLO".into()));
}

#[test]
fn sigil_identifiers() {
    let toks = Lexer::tokenize("A$ = B%\n").unwrap();
    assert_eq!(toks[0].lexeme, "A$");
    assert_eq!(toks[0].kind, TokenKind::Identifier);
    assert_eq!(toks[2].lexeme, "B%");
}

#[test]
fn hex_and_octal_literals() {
    let toks = Lexer::tokenize("&HFF &O17\n").unwrap();
    assert_eq!(toks[0].literal, Literal::Number(255.0));
    assert_eq!(toks[1].literal, Literal::Number(15.0));
}

#[test]
fn scientific_number() {
    let toks = Lexer::tokenize("1.5E+10\n").unwrap();
    assert_eq!(toks[0].literal, Literal::Number(1.5e10));
}

#[test]
fn rem_and_apostrophe_swallow_to_eol() {
    let toks = kinds("10 PRINT 1 ' a comment\n20 REM another\n30 PRINT 2\n");
    // Comments vanish entirely; only PRINT 1 / PRINT 2 survive, each on its own line.
    assert_eq!(
        toks,
        vec![
            TokenKind::NumberLiteral,
            TokenKind::Print,
            TokenKind::NumberLiteral,
            TokenKind::NewLine,
            TokenKind::NumberLiteral,
            TokenKind::NewLine,
            TokenKind::NumberLiteral,
            TokenKind::Print,
            TokenKind::NumberLiteral,
            TokenKind::NewLine,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn data_statement_keeps_raw_tail() {
    let toks = Lexer::tokenize("10 DATA 1,2,\"three\"\n").unwrap();
    let data_tok = &toks[1];
    assert_eq!(data_tok.kind, TokenKind::Data);
    assert_eq!(
        data_tok.literal,
        Literal::Text(" 1,2,\"three\"".into())
    );
}

#[test]
fn unterminated_string_is_fatal() {
    let err = Lexer::tokenize("10 PRINT \"oops\n").unwrap_err();
    assert!(err.message.contains("unterminated"));
}

#[test]
fn relational_operators() {
    let toks = kinds("<= >= <> < > =\n");
    assert_eq!(
        toks,
        vec![
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::NotEqual,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Equal,
            TokenKind::NewLine,
            TokenKind::Eof,
        ]
    );
}
