//! Behavioral tests for the minifier on small web assets.

use webgz_minify::{MinifyMode, MinifyOptions, minify, minify_str, minify_str_with};

#[test]
fn test_whitespace_collapse() {
    for mode in [MinifyMode::Default, MinifyMode::Css] {
        assert_eq!(minify_str("a   b\n", mode), "a b\n");
        assert_eq!(minify_str("a ;\n", mode), "a;\n");
        assert_eq!(minify_str("\t a \t\n", mode), "a\n");
    }
}

#[test]
fn test_javascript_keyword_boundary() {
    assert_eq!(minify_str("return   x\n", MinifyMode::JavaScript), "return x\n");
    assert_eq!(minify_str("a   +   b\n", MinifyMode::JavaScript), "a+b\n");
    assert_eq!(
        minify_str("const  el = new   Map ( ) ;\n", MinifyMode::JavaScript),
        "const el=new Map();\n"
    );
}

#[test]
fn test_quote_safety() {
    assert_eq!(minify_str("x = '  a  '\n", MinifyMode::JavaScript), "x='  a  '\n");
    assert_eq!(
        minify_str("msg = \"/* not a comment */\"\n", MinifyMode::JavaScript),
        "msg=\"/* not a comment */\"\n"
    );
}

#[test]
fn test_comments_become_separators() {
    assert_eq!(minify_str("a/**/b\n", MinifyMode::Default), "a b\n");
    assert_eq!(minify_str("a/**/b\n", MinifyMode::Html), "a/**/b\n");
}

#[test]
fn test_multiline_comment() {
    let css = "a {\n/* multi\n line */\ncolor: red;\n}\n";
    assert_eq!(minify_str(css, MinifyMode::Css), "a{\n\ncolor:red;\n}\n");
}

#[test]
fn test_blank_line_rules() {
    assert_eq!(minify_str("\n\n\na\n\n\n\nb\n", MinifyMode::Default), "a\n\nb\n");
    let lines = ["   \n", "\t\n"];
    assert!(minify(&lines, MinifyMode::Html).is_empty());
}

#[test]
fn test_css_media_query() {
    assert_eq!(
        minify_str("@media (max-width: 600px) {\n", MinifyMode::Css),
        "@media (max-width:600px){\n"
    );
}

#[test]
fn test_crlf_input() {
    assert_eq!(minify_str("a  ;\r\nb\r\n", MinifyMode::Default), "a;\nb\n");
}

#[test]
fn test_idempotent() {
    let samples = [
        (MinifyMode::Css, "\n\nbody {\n    margin: 0;  /* reset */\n}\n"),
        (MinifyMode::Css, "@media (max-width: 600px) {\n  h1 ,\n  h2 { color : red ; }\n}\n"),
        (MinifyMode::JavaScript, "function f(x) {\n    return   x + ' ! ';\n}\n"),
        (
            MinifyMode::JavaScript,
            "x = new Foo();\nif (!ok) return   err;\nconst t = typeof   v;\n",
        ),
        (MinifyMode::Html, "<p>  a \t b  </p>\n\n\n<div>\n  text\n</div>\n"),
        (MinifyMode::Default, "{ \"name\" : \"ui\" ,\n  \"size\" : [ 1 , 2 ] }\n"),
    ];

    for (mode, text) in samples {
        let once = minify_str(text, mode);
        let twice = minify_str(&once, mode);
        assert_eq!(once, twice, "{mode} output changed on a second pass");
    }
}

#[test]
fn test_javascript_keyword_after_operator_survives_second_pass() {
    let once = minify_str("x = new Foo()\n", MinifyMode::JavaScript);
    assert_eq!(once, "x=new Foo()\n");
    assert_eq!(minify_str(&once, MinifyMode::JavaScript), once);

    let once = minify_str("if (done) return   value;\n", MinifyMode::JavaScript);
    assert_eq!(once, "if (done)return value;\n");
    assert_eq!(minify_str(&once, MinifyMode::JavaScript), once);
}

#[test]
fn test_custom_keywords() {
    let options = MinifyOptions {
        keywords: vec!["emit".to_string()],
        ..MinifyOptions::default()
    };
    assert_eq!(
        minify_str_with("emit   x\nreturn   y\n", MinifyMode::JavaScript, &options),
        "emit x\nreturny\n"
    );
}
