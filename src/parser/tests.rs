#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::imports::Import;

#[test]
fn test_parse_minimal_main() {
    let file = parse(
        "package main

        func main() {
            print(\"Hello\")
        }
        ",
    )
    .unwrap();
    assert_eq!(file.package, "main");
    assert_eq!(file.methods.len(), 1);
    assert_eq!(file.methods[0].name, "main");
    assert!(file.methods[0].receiver.is_none());
    assert!(file.methods[0].body.contains("print(\"Hello\")"));
}

#[test]
fn test_parse_service_interface() {
    let file = parse(
        "package parser

import ct \"context\"
// My service
type Hi struct {}
type MyService interface{
	Foo(ctx ct.Context, s map[string]string) ([]string, *Hi, error)
}",
    )
    .unwrap();

    assert_eq!(file.interfaces.len(), 1);
    let svc = file.interface("MyService").unwrap();
    assert_eq!(svc.methods.len(), 1);
    let m = &svc.methods[0];
    assert_eq!(m.name, "Foo");
    assert_eq!(m.parameters.len(), 2);
    assert_eq!(m.parameters[0], NamedTypeValue::new("ctx", "ct.Context"));
    assert_eq!(m.parameters[1], NamedTypeValue::new("s", "map[string]string"));
    assert_eq!(
        m.results,
        vec![
            NamedTypeValue::new("s0", "[]string"),
            NamedTypeValue::new("h1", "*Hi"),
            NamedTypeValue::new("e2", "error"),
        ]
    );
    assert!(file
        .imports
        .contains(&Import::aliased("ct", "context")));
}

#[test]
fn test_parse_struct_method_receiver() {
    let file = parse(
        "package main
		type Hi struct{}
		func (a *Hi) hello(){
		print(\"hello\")
		}",
    )
    .unwrap();
    assert_eq!(file.methods.len(), 1);
    let recv = file.methods[0].receiver.as_ref().unwrap();
    assert_eq!(recv.name, "a");
    assert_eq!(recv.ty, "*Hi");
    assert_eq!(file.methods[0].id(), DeclId::method("hello", "Hi"));
}

#[test]
fn test_parse_vars_and_constants() {
    let file = parse(
        "package main
		var hi = \"Hello there\"
		var (
		no_value int
		abc string = \"hi\"
		)
		const (
			my_const = 2
			hello_there float = 4.23
		)
		func main() {
			print(hi)
			print(my_const)
		}
		",
    )
    .unwrap();
    assert_eq!(file.vars.len(), 3);
    assert_eq!(file.constants.len(), 2);
    assert_eq!(
        file.vars[0],
        NamedTypeValue::with_value("hi", "", "\"Hello there\"")
    );
    assert!(!file.vars[1].has_value());
    assert_eq!(file.vars[1].ty, "int");
    assert_eq!(file.constants[1].value.as_deref(), Some("4.23"));
}

#[test]
fn test_parse_middleware_func_type() {
    let file = parse(
        "package main
			type Middleware func(int) int
		",
    )
    .unwrap();
    let ft = file.func_type.unwrap();
    assert_eq!(ft.name, "Middleware");
    assert_eq!(ft.parameters, vec![NamedTypeValue::new("i0", "int")]);
    assert_eq!(ft.results, vec![NamedTypeValue::new("i0", "int")]);
}

#[test]
fn test_only_first_func_type_is_kept() {
    let file = parse(
        "package main
type A func(int) int
type B func(string)
",
    )
    .unwrap();
    assert_eq!(file.func_type.as_ref().unwrap().name, "A");
    assert!(file.contains(&DeclId::type_decl("B")));
}

#[test]
fn test_grouped_parameter_names_share_type() {
    let file = parse(
        "package svc
type S interface {
	Sum(ctx context.Context, a, b int, rest ...string) (total int, err error)
}
",
    )
    .unwrap();
    let m = &file.interfaces[0].methods[0];
    let params: Vec<_> = m
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.ty.as_str()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("ctx", "context.Context"),
            ("a", "int"),
            ("b", "int"),
            ("rest", "...string"),
        ]
    );
    assert!(m.has_context());
    assert!(m.returns_error());
}

#[test]
fn test_anonymous_names_are_deterministic() {
    let src = "package p\nfunc f(int, string, []byte, *os.File) {}\n";
    let first = parse(src).unwrap();
    let second = parse(src).unwrap();
    let names: Vec<_> = first.methods[0]
        .parameters
        .iter()
        .map(|p| p.name.clone())
        .collect();
    assert_eq!(names, vec!["i0", "s1", "b2", "o3"]);
    assert_eq!(first, second);
}

#[test]
fn test_import_forms_and_spans() {
    let src = "package p

import \"fmt\"
import (
	\"net/http\"
	http1 \"github.com/go-kit/kit/transport/http\"
	_ \"embed\"
)

func f() {}
";
    let file = parse(src).unwrap();
    assert_eq!(file.import_decls.len(), 2);
    assert_eq!(&src[file.import_decls[0].clone()], "import \"fmt\"");
    assert!(src[file.import_decls[1].clone()].ends_with(')'));
    assert_eq!(file.imports.len(), 4);
    assert!(file
        .imports
        .contains(&Import::aliased("http1", "github.com/go-kit/kit/transport/http")));
    assert!(file.imports.contains(&Import::aliased("_", "embed")));
    assert_eq!(&src[..file.package_end], "package p");
}

#[test]
fn test_struct_fields_tags_and_embedding() {
    let file = parse(
        "package model
type User struct {
	db.BaseModel
	*Extra
	Name, Nick string `json:\"name\"`
	Tags       []string
	Meta       map[string]interface{}
}
",
    )
    .unwrap();
    let fields: Vec<_> = file.structures[0]
        .fields
        .iter()
        .map(|f| (f.name.as_str(), f.ty.as_str()))
        .collect();
    assert_eq!(
        fields,
        vec![
            ("BaseModel", "db.BaseModel"),
            ("Extra", "*Extra"),
            ("Name", "string"),
            ("Nick", "string"),
            ("Tags", "[]string"),
            ("Meta", "map[string]interface{}"),
        ]
    );
}

#[test]
fn test_function_bodies_are_opaque() {
    let file = parse(
        "package p
func (l loggingMiddleware) Foo(ctx context.Context) (r string, err error) {
	defer func() {
		l.logger.Log(\"method\", \"Foo\", \"}\", r)
	}()
	return l.next.Foo(ctx)
}
var handlers = map[string]func(){
	\"a\": func() { x := 1; _ = x },
}
",
    )
    .unwrap();
    assert_eq!(file.methods.len(), 1);
    assert!(file.methods[0].body.contains("return l.next.Foo(ctx)"));
    assert_eq!(file.vars.len(), 1);
    assert!(file.vars[0].value.as_deref().unwrap().starts_with("map[string]func(){"));
}

#[test]
fn test_generic_declarations() {
    let file = parse(
        "package p
type List[T any] struct { items []T }
type Arr [4]int
func Map[T, U any](xs []T, f func(T) U) []U { return nil }
",
    )
    .unwrap();
    assert_eq!(file.structures[0].name, "List");
    assert!(file.other_types.contains(&"Arr".to_string()));
    let m = &file.methods[0];
    assert_eq!(m.parameters[1].ty, "func(T) U");
    assert_eq!(m.results[0].ty, "[]U");
}

#[test]
fn test_embedded_interface_elements_are_skipped() {
    let file = parse(
        "package p
type ReadCloser interface {
	io.Reader
	Close() error
}
",
    )
    .unwrap();
    let iface = &file.interfaces[0];
    assert_eq!(iface.methods.len(), 1);
    assert_eq!(iface.methods[0].name, "Close");
}

#[test]
fn test_syntax_errors_report_position() {
    let err = parse("package p\n\nfunc f( {\n").unwrap_err();
    let ParseError::Syntax { line, .. } = err;
    assert_eq!(line, 3);

    assert!(parse("func main() {}").is_err());
    assert!(parse("package p\nx := 1\n").is_err());
    assert!(parse("package p\nfunc f() { ( }\n").is_err());
    assert!(parse("package p\n/* open").is_err());
    assert!(parse("package p\nvar s = \"open\n").is_err());
}

#[test]
fn test_duplicate_functions_keep_first() {
    let file = parse("package p\nfunc A() { one() }\nfunc A() { two() }\n").unwrap();
    assert_eq!(file.methods.len(), 1);
    assert!(file.methods[0].body.contains("one"));
}

#[test]
fn test_tokenize_inserts_semicolons() {
    let toks = tokenize("x := 1\nreturn\n}").unwrap();
    let kinds: Vec<_> = toks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            Tok::Ident,
            Tok::Define,
            Tok::Number,
            Tok::Semi,
            Tok::KwReturn,
            Tok::Semi,
            Tok::RBrace,
            Tok::Semi,
        ]
    );
    assert!(toks[3].implicit);
}

#[test]
fn test_synthetic_name() {
    assert_eq!(synthetic_name("[]string", 0), "s0");
    assert_eq!(synthetic_name("*Hi", 1), "h1");
    assert_eq!(synthetic_name("...*pkg.T", 2), "p2");
    assert_eq!(synthetic_name("map[string]int", 3), "m3");
}
