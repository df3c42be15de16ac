use sfpl_rs::lexer::{token::Token, tokenize, Lexer};

struct LexTestCase {
    expr: &'static str,
    tokens: Vec<Token>,
}

#[test]
fn test_lexer_cases() {
    let test_cases = vec![
        LexTestCase {
            expr: "- rule: Shell",
            tokens: vec![
                Token::SepDecl,
                Token::KeywordRule,
                Token::SepDef,
                Token::Identifier,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "proc.name in (bash, sh)",
            tokens: vec![
                Token::Identifier,
                Token::KeywordIn,
                Token::SepLpar,
                Token::Identifier,
                Token::SepComma,
                Token::Identifier,
                Token::SepRpar,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "fd.num<=3 and evt.dir=<",
            tokens: vec![
                Token::Identifier,
                Token::OpLte,
                Token::LitNumber,
                Token::KeywordAnd,
                Token::Identifier,
                Token::OpEq,
                Token::OpLt,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "priority: CRITICAL",
            tokens: vec![
                Token::KeywordPriority,
                Token::SepDef,
                Token::LitSeverity,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "output: %proc.name /bin/sh 'quoted str'",
            tokens: vec![
                Token::KeywordOutput,
                Token::SepDef,
                Token::LitPath,
                Token::LitPath,
                Token::LitString,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "not a exists",
            tokens: vec![
                Token::KeywordNot,
                Token::Identifier,
                Token::KeywordExists,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "x pmatch (a) or y endswith .so",
            tokens: vec![
                Token::Identifier,
                Token::KeywordPMatch,
                Token::SepLpar,
                Token::Identifier,
                Token::SepRpar,
                Token::KeywordOr,
                Token::Identifier,
                Token::KeywordEndsWith,
                Token::LitPath,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "a ; b",
            tokens: vec![
                Token::Identifier,
                Token::Unsupported,
                Token::Identifier,
                Token::LitEof,
            ],
        },
        LexTestCase {
            expr: "-1 - -",
            tokens: vec![
                Token::LitNumber,
                Token::SepDecl,
                Token::SepDecl,
                Token::LitEof,
            ],
        },
    ];

    for (index, case) in test_cases.iter().enumerate() {
        let tokens: Vec<Token> = Lexer::new(case.expr)
            .scan()
            .items()
            .iter()
            .map(|item| item.token)
            .collect();

        assert_eq!(
            tokens, case.tokens,
            "Test case {} failed: expression '{}'",
            index, case.expr
        );
    }
}

#[test]
fn test_simple_identifier() {
    let stream = tokenize("spawned_process");
    let items = stream.items();
    assert_eq!(items[0].token, Token::Identifier);
    assert_eq!(items[0].value, "spawned_process");
    assert_eq!(items[1].token, Token::LitEof);
}

#[test]
fn test_keywords_are_case_sensitive() {
    let cases = vec![
        ("and", Token::KeywordAnd),
        ("AND", Token::Identifier),
        ("or", Token::KeywordOr),
        ("Or", Token::Identifier),
        ("contains", Token::KeywordContains),
        ("icontains", Token::KeywordIContains),
        ("startswith", Token::KeywordStartsWith),
    ];

    for (input, expected) in cases {
        let stream = tokenize(input);
        assert_eq!(
            stream.items()[0].token,
            expected,
            "Failed to lex keyword: {}",
            input
        );
    }
}

#[test]
fn test_severity_any_case() {
    for input in ["emergency", "Alert", "INFORMATIONAL", "debug", "Medium"] {
        let stream = tokenize(input);
        assert_eq!(
            stream.items()[0].token,
            Token::LitSeverity,
            "Failed to lex severity: {}",
            input
        );
    }
}

#[test]
fn test_positions_across_lines() {
    let stream = tokenize("- list: shells\n  items: [bash,\n    zsh]");
    let zsh = stream
        .items()
        .iter()
        .find(|i| i.value == "zsh")
        .expect("zsh token");
    assert_eq!(zsh.span.line, 3);
    assert_eq!(zsh.span.column, 5);
    assert_eq!(&stream.source()[zsh.span.start..zsh.span.end], "zsh");

    let eof = stream.items().last().expect("end marker");
    assert_eq!(eof.token, Token::LitEof);
    assert_eq!(eof.span.start, stream.source().len());
}

#[test]
fn test_comment_lines() {
    let stream = tokenize("# policy header\n- macro: m # trailing\n  condition: a");
    let tokens: Vec<Token> = stream.items().iter().map(|i| i.token).collect();
    assert_eq!(
        tokens,
        vec![
            Token::SepDecl,
            Token::KeywordMacro,
            Token::SepDef,
            Token::Identifier,
            Token::KeywordCondition,
            Token::SepDef,
            Token::Identifier,
            Token::LitEof,
        ]
    );
}
