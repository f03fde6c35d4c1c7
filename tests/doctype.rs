use serde_json::json;
use tagtree::{Document, ParserOptions};

fn parse(src: &str, options: &ParserOptions) -> serde_json::Value {
    match Document::parse_with(src, options) {
        Ok(doc) => serde_json::to_value(&doc).unwrap(),
        Err(e) => panic!("{e}"),
    }
}

#[test]
fn test_default_entities_in_attributes_and_text() {
    let src = "<a:root xmlns:a=\"urn:none\">\r\n  <a:a attr=\"2foo&ampbar&apos;\">1</a:a>\r\n  <a:c>test&amp;\r\nтест&lt;\r\ntest</a:c>\r\n</a:root>";
    let options = ParserOptions::new()
        .ignore_attributes(false)
        .allow_boolean_attributes(true);

    assert_eq!(
        parse(src, &options),
        json!({
            "a:root": {
                "@_xmlns:a": "urn:none",
                "a:a": { "@_attr": "2foo&ampbar'", "#text": 1 },
                "a:c": { "#text": "test&\nтест<\ntest" }
            }
        })
    );
}

#[test]
fn test_cdata_is_not_resolved() {
    let src = "<el><![CDATA[<a>&lt;<a/>&lt;b&gt;2</b>]]]]>\n<![CDATA[]]]]><![CDATA[>&amp;]]>a</el>";
    assert_eq!(
        parse(src, &ParserOptions::default()),
        json!({
            "el": {
                "#text": ["<a>&lt;<a/>&lt;b&gt;2</b>]]", "]]", ">&amp;", "a"]
            }
        })
    );
}

#[test]
fn test_other_numeric_references_are_kept() {
    let src = "<s>&#x441;&#x442; &#60;</s>";
    assert_eq!(
        parse(src, &ParserOptions::default()),
        json!({ "s": { "#text": "&#x441;&#x442; <" } })
    );

    let options = ParserOptions::new().html_entities(true);
    assert_eq!(
        parse(src, &options),
        json!({ "s": { "#text": "ст <" } })
    );
}

#[test]
fn test_external_doctype() {
    let src = "<?xml version='1.0' standalone='no'?>\n<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\" >\n<svg>\n    <metadata>[test]</metadata>\n</svg>";
    assert_eq!(
        parse(src, &ParserOptions::default()),
        json!({ "svg": { "metadata": { "#text": "[test]" } } })
    );
}

#[test]
fn test_internal_subset_with_comments() {
    let src = "<?xml version=\"1.0\" standalone=\"yes\" ?>\
        <!--open the DOCTYPE declaration -  the open square bracket indicates an internal DTD-->\
        <!DOCTYPE foo [\
        <!--define the internal DTD-->\
        <!ELEMENT foo (#PCDATA)>\
        <!--close the DOCTYPE declaration-->\
        ]>\
        <foo>Hello World.</foo>";
    assert_eq!(
        parse(src, &ParserOptions::default()),
        json!({ "foo": { "#text": "Hello World." } })
    );
}

#[test]
fn test_declared_entities() {
    let src = r#"
        <?xml version="1.0" encoding="UTF-8"?>

        <!DOCTYPE note [
        <!ENTITY nbsp "&#xA0;">
        <!ENTITY writer "Writer: Donald Duck.">
        <!ENTITY copyright "Copyright: W3Schools.">
        ]>

        <note>
            <to>Tove</to>
            <body attr="&writer;">Don't forget me this weekend!</body>
            <footer>&writer;&nbsp;&copyright;</footer>
        </note> "#;
    let options = ParserOptions::new()
        .attribute_name_prefix("")
        .ignore_attributes(false);

    assert_eq!(
        parse(src, &options),
        json!({
            "note": {
                "to": { "#text": "Tove" },
                "body": {
                    "attr": "Writer: Donald Duck.",
                    "#text": "Don't forget me this weekend!"
                },
                "footer": { "#text": "Writer: Donald Duck.&#xA0;Copyright: W3Schools." }
            }
        })
    );

    let options = options.html_entities(true);
    assert_eq!(
        parse(src, &options)["note"]["footer"]["#text"],
        json!("Writer: Donald Duck.\u{a0}Copyright: W3Schools.")
    );
}

#[test]
fn test_entities_do_not_leak_between_documents() {
    let with_dtd = "<!DOCTYPE a [<!ENTITY x \"y\">]><a>&x;</a>";
    let without = "<a>&x;</a>";
    let options = ParserOptions::default();

    assert_eq!(parse(with_dtd, &options), json!({ "a": { "#text": "y" } }));
    assert_eq!(parse(without, &options), json!({ "a": { "#text": "&x;" } }));
}

#[test]
fn test_unclosed_doctype() {
    let err = Document::parse("<?xml version=\"1.0\"?><!DOCTYPE ").unwrap_err();
    assert_eq!(err.message(), "Unclosed DOCTYPE");

    let err = Document::parse("<!DOCTYPE a [<!ENTITY b \"c\">]").unwrap_err();
    assert_eq!(err.message(), "Unclosed DOCTYPE");
}

#[test]
fn test_invalid_doctype() {
    let err = Document::parse("<!DOCTYPE a [<b>]><a/>").unwrap_err();
    assert_eq!(err.message(), "Invalid DOCTYPE");
}
