use tagtree::{Document, ParserOptions, Scalar, Value};

const SRC: &str = include_str!("good.xml");
const CMP: &str = include_str!("good.json");

fn options() -> ParserOptions {
    ParserOptions::new()
        .ignore_attributes(false)
        .allow_boolean_attributes(true)
}

#[test]
fn test_good() {
    let document = match Document::parse_with(SRC, &options()) {
        Ok(doc) => doc,
        Err(e) => panic!("{e}"),
    };

    let parsed = serde_json::to_value(&document).unwrap();
    let expected: serde_json::Value = serde_json::from_str(CMP).unwrap();
    if parsed != expected {
        eprintln!("Expected: {expected:#}");
        eprintln!("Got: {parsed:#}");
        panic!("Parsed document does not match expected output");
    }
}

#[test]
fn test_order_is_kept() {
    let document = Document::parse_with(SRC, &options()).unwrap();
    let json = serde_json::to_string(&document).unwrap();

    let keys = ["\"@_category\"", "\"@_available\"", "\"title\"", "\"author\"", "\"year\""];
    let positions: Vec<_> = keys.iter().map(|key| json.find(key).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_tree_access() {
    let document = Document::parse_with(SRC, &options()).unwrap();
    let bookstore = document.root().unwrap();
    assert_eq!(bookstore.tag_name(), "bookstore");

    let books = bookstore.get("book").and_then(Value::as_list).unwrap();
    let second = books[1].as_node().unwrap();
    assert_eq!(second.attribute("@_category"), Some(&Scalar::from("web")));

    let year = second.get("year").and_then(Value::as_node).unwrap();
    assert_eq!(year.get("#text").and_then(Value::as_scalar), Some(&Scalar::Integer(2003)));
}

#[test]
fn test_parse_is_repeatable() {
    let options = options();
    let first = Document::parse_with(SRC, &options).unwrap();
    let second = Document::parse_with(SRC, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_deeply_nested_document() {
    let depth = 100_000;
    let src = format!("{}x{}", "<a>".repeat(depth), "</a>".repeat(depth));
    let document = Document::parse(&src).unwrap();

    let mut node = document.root().unwrap();
    let mut levels = 1;
    while let Some(child) = node.get("a").and_then(Value::as_node) {
        node = child;
        levels += 1;
    }
    assert_eq!(levels, depth);
    assert_eq!(node.get("#text").and_then(Value::as_scalar), Some(&Scalar::from("x")));

    let again = Document::parse(&src).unwrap();
    assert!(document == again);
    drop(document);
    drop(again);
}
