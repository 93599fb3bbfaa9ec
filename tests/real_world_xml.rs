//! Integration tests parsing real-world XML formats.
//!
//! These serve as smoke tests ensuring the parser handles common patterns
//! found in Atom feeds, SVG, XHTML, Maven POMs, and Android manifests.

#![allow(clippy::unwrap_used)]

use craftxml::{Document, NodeId, NodeType, ParseFlags, ParseStatus};
use pretty_assertions::assert_eq;

fn parse_with_all_flags(input: &str) -> Document {
    let doc = Document::parse_str(input).unwrap_or_else(|e| panic!("parse failed: {e}"));
    // Retention flags must not change what is accepted.
    for flags in [
        ParseFlags::MINIMAL,
        ParseFlags::FULL.merge_blank(true),
        ParseFlags::FULL.escape_char(false),
    ] {
        let outcome = Document::load_str(input, flags);
        assert_eq!(outcome.status, ParseStatus::NoError, "flags: {flags:?}");
        assert_eq!(
            outcome.document.tag(outcome.document.root_element()),
            doc.tag(doc.root_element()),
            "root element mismatch with {flags:?}"
        );
    }
    doc
}

fn element_children(doc: &Document, id: NodeId) -> Vec<NodeId> {
    doc.find_children_by_type(id, NodeType::Element)
}

// --- Atom / RSS ---

#[test]
fn test_atom_feed() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Feed</title>
  <link href="http://example.org/"/>
  <updated>2025-12-13T18:30:02Z</updated>
  <author>
    <name>John Doe</name>
  </author>
  <id>urn:uuid:60a76c80-d399-11d9-b93C-0003939e0af6</id>
  <entry>
    <title>Atom-Powered Robots Run Amok</title>
    <link href="http://example.org/2003/12/13/atom03"/>
    <id>urn:uuid:1225c695-cfb8-4ebb-aaaa-80da344efa6a</id>
    <updated>2025-12-13T18:30:02Z</updated>
    <summary>Some text.</summary>
  </entry>
</feed>"#;

    let doc = parse_with_all_flags(xml);
    assert_eq!(doc.version.as_deref(), Some("1.0"));
    assert_eq!(doc.encoding.as_deref(), Some("UTF-8"));

    let root = doc.root_element();
    assert_eq!(doc.tag(root), "feed");
    assert_eq!(
        doc.attribute(root, "xmlns"),
        Some("http://www.w3.org/2005/Atom")
    );
    let title = doc.find_first_child_by_tag_name(root, "title");
    assert_eq!(doc.content(title), "Example Feed");

    let entry = doc.find_first_child_by_tag_name(root, "entry");
    let link = doc.find_first_child_by_tag_name(entry, "link");
    assert_eq!(
        doc.attribute(link, "href"),
        Some("http://example.org/2003/12/13/atom03")
    );
}

#[test]
fn test_rss_feed() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Example RSS</title>
    <link>http://example.org</link>
    <description>An example RSS feed</description>
    <item>
      <title>First Post</title>
      <link>http://example.org/first</link>
      <description>Hello &amp; welcome!</description>
    </item>
  </channel>
</rss>"#;

    let doc = parse_with_all_flags(xml);
    let root = doc.root_element();
    assert_eq!(doc.tag(root), "rss");
    assert_eq!(doc.attribute(root, "version"), Some("2.0"));

    let channel = doc.find_first_child_by_tag_name(root, "channel");
    let item = doc.find_first_child_by_tag_name(channel, "item");
    let description = doc.find_first_child_by_tag_name(item, "description");
    assert_eq!(doc.content(description), "Hello & welcome!");
}

// --- SVG ---

#[test]
fn test_svg_document() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     xmlns:xlink="http://www.w3.org/1999/xlink"
     viewBox="0 0 100 100"
     width="100" height="100">
  <defs>
    <linearGradient id="grad1" x1="0%" y1="0%" x2="100%" y2="0%">
      <stop offset="0%" style="stop-color:rgb(255,255,0);stop-opacity:1"/>
      <stop offset="100%" style="stop-color:rgb(255,0,0);stop-opacity:1"/>
    </linearGradient>
  </defs>
  <circle cx="50" cy="50" r="40" fill="url(#grad1)"/>
  <text x="50" y="55" text-anchor="middle" fill="white">SVG</text>
  <!-- A comment in SVG -->
  <rect x="10" y="10" width="80" height="80" fill="none" stroke="black"/>
</svg>"#;

    let doc = parse_with_all_flags(xml);
    let root = doc.root_element();
    assert_eq!(doc.tag(root), "svg");
    assert_eq!(doc.attribute(root, "width"), Some("100"));
    assert_eq!(
        doc.attribute(root, "xmlns:xlink"),
        Some("http://www.w3.org/1999/xlink")
    );

    let tags: Vec<&str> = element_children(&doc, root)
        .into_iter()
        .map(|id| doc.tag(id))
        .collect();
    assert_eq!(tags, vec!["defs", "circle", "text", "rect"]);

    let comment = doc.find_first_child_by_type(root, NodeType::Comment);
    assert_eq!(doc.content(comment), " A comment in SVG ");

    let gradient = doc.find_first_child_by_tag_name(
        doc.find_first_child_by_tag_name(root, "defs"),
        "linearGradient",
    );
    assert_eq!(doc.find_children_by_tag_name(gradient, "stop").len(), 2);
}

// --- XHTML ---

#[test]
fn test_xhtml_document() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN"
  "http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd">
<html xmlns="http://www.w3.org/1999/xhtml" xml:lang="en" lang="en">
  <head>
    <meta http-equiv="Content-Type" content="text/html; charset=UTF-8"/>
    <title>Test Page</title>
  </head>
  <body>
    <h1>Hello, World!</h1>
    <p>This is a <em>test</em> page with &amp; entities.</p>
    <div id="content">
      <ul>
        <li>Item 1</li>
        <li>Item 2</li>
        <li>Item 3</li>
      </ul>
    </div>
  </body>
</html>"#;

    let doc = parse_with_all_flags(xml);
    let doctype = doc.find_first_child_by_type(doc.root(), NodeType::Doctype);
    assert_eq!(
        doc.content(doctype),
        "html PUBLIC \"-//W3C//DTD XHTML 1.0 Strict//EN\"\n  \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-strict.dtd\""
    );

    let root = doc.root_element();
    assert_eq!(doc.tag(root), "html");
    assert_eq!(doc.attribute(root, "lang"), Some("en"));
    assert_eq!(doc.attribute(root, "xml:lang"), Some("en"));

    let body = doc.find_first_child_by_tag_name(root, "body");
    let p = doc.find_first_child_by_tag_name(body, "p");
    assert_eq!(doc.text_content(p), "This is a test page with & entities.");
    assert_eq!(doc.content(p), "This is a ");

    let ul = doc.find_first_child_by_tag_name(doc.find_first_child_by_tag_name(body, "div"), "ul");
    let items: Vec<&str> = doc
        .find_children_by_tag_name(ul, "li")
        .into_iter()
        .map(|li| doc.content(li))
        .collect();
    assert_eq!(items, vec!["Item 1", "Item 2", "Item 3"]);
}

// --- Maven POM ---

#[test]
fn test_maven_pom() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0"
         xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
         xsi:schemaLocation="http://maven.apache.org/POM/4.0.0
           http://maven.apache.org/xsd/maven-4.0.0.xsd">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.example</groupId>
  <artifactId>my-app</artifactId>
  <version>1.0-SNAPSHOT</version>
  <packaging>jar</packaging>
  <name>My Application</name>
  <dependencies>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.13.2</version>
      <scope>test</scope>
    </dependency>
  </dependencies>
  <build>
    <plugins>
      <plugin>
        <groupId>org.apache.maven.plugins</groupId>
        <artifactId>maven-compiler-plugin</artifactId>
        <version>3.8.1</version>
        <configuration>
          <source>11</source>
          <target>11</target>
        </configuration>
      </plugin>
    </plugins>
  </build>
</project>"#;

    let doc = parse_with_all_flags(xml);
    let root = doc.root_element();
    assert_eq!(doc.tag(root), "project");
    assert_eq!(
        doc.attribute(root, "xsi:schemaLocation"),
        Some("http://maven.apache.org/POM/4.0.0\n           http://maven.apache.org/xsd/maven-4.0.0.xsd")
    );
    let version = doc.find_first_child_by_tag_name(root, "version");
    assert_eq!(doc.content(version), "1.0-SNAPSHOT");

    let versions: Vec<&str> = doc
        .descendants(root)
        .filter(|&id| doc.tag(id) == "version")
        .map(|id| doc.content(id))
        .collect();
    assert_eq!(versions, vec!["1.0-SNAPSHOT", "4.13.2", "3.8.1"]);
}

// --- Android Manifest ---

#[test]
fn test_android_manifest() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android"
          package="com.example.app">
  <uses-permission android:name="android.permission.INTERNET"/>
  <application
      android:label="My App"
      android:icon="@mipmap/ic_launcher"
      android:theme="@style/AppTheme">
    <activity
        android:name=".MainActivity"
        android:exported="true">
      <intent-filter>
        <action android:name="android.intent.action.MAIN"/>
        <category android:name="android.intent.category.LAUNCHER"/>
      </intent-filter>
    </activity>
  </application>
</manifest>"#;

    let doc = parse_with_all_flags(xml);
    let root = doc.root_element();
    assert_eq!(doc.tag(root), "manifest");
    assert_eq!(doc.attribute(root, "package"), Some("com.example.app"));

    let application = doc.find_first_child_by_tag_name(root, "application");
    assert_eq!(doc.attribute(application, "android:label"), Some("My App"));
    let activity = doc.find_first_child_by_tag_name(application, "activity");
    let ancestors: Vec<&str> = doc.ancestors(activity).map(|id| doc.tag(id)).collect();
    assert_eq!(ancestors, vec!["activity", "application", "manifest", ""]);
}

// --- SOAP Envelope (prefixed names) ---

#[test]
fn test_soap_envelope() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
               xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <soap:Header>
    <auth xmlns="http://example.com/auth">
      <token>abc123</token>
    </auth>
  </soap:Header>
  <soap:Body>
    <GetUserResponse xmlns="http://example.com/api">
      <user>
        <name>Jane Doe</name>
        <email>jane@example.com</email>
      </user>
    </GetUserResponse>
  </soap:Body>
</soap:Envelope>"#;

    let doc = parse_with_all_flags(xml);
    let root = doc.root_element();
    assert_eq!(doc.tag(root), "soap:Envelope");
    let body = doc.find_first_child_by_tag_name(root, "soap:Body");
    assert!(!body.is_null());
    assert!(doc.find_first_child_by_tag_name(root, "Body").is_null());
}

// --- Edge cases ---

#[test]
fn test_cdata_and_entities_mixed() {
    let xml = r#"<root>
  Text with &amp; entities &lt;here&gt;
  <![CDATA[Raw <data> & more]]>
  <!-- A comment here -->
  <?pi some processing instruction?>
  <child attr="value with &quot;quotes&quot;"/>
</root>"#;

    let doc = parse_with_all_flags(xml);
    let root = doc.root_element();
    assert_eq!(
        doc.content(root),
        "\n  Text with & entities <here>\n  "
    );
    let cdata = doc.find_first_child_by_type(root, NodeType::CData);
    assert_eq!(doc.content(cdata), "Raw <data> & more");
    let pi = doc.find_first_child_by_type(root, NodeType::ProcessingInstruction);
    assert_eq!(doc.tag(pi), "pi");
    assert_eq!(doc.content(pi), "some processing instruction");
    let child = doc.find_first_child_by_tag_name(root, "child");
    assert_eq!(doc.attribute(child, "attr"), Some("value with \"quotes\""));
}

#[test]
fn test_deeply_nested() {
    use std::fmt::Write;
    let mut xml = String::new();
    for i in 0..50 {
        let _ = write!(xml, "<level{i}>");
    }
    xml.push_str("leaf");
    for i in (0..50).rev() {
        let _ = write!(xml, "</level{i}>");
    }

    let doc = parse_with_all_flags(&xml);
    let root = doc.root_element();
    assert_eq!(doc.tag(root), "level0");
    assert_eq!(doc.text_content(root), "leaf");
    let leaf_parent = doc.descendants(root).last().map(|id| doc.parent(id)).unwrap();
    assert_eq!(doc.tag(leaf_parent), "level49");
}

#[test]
fn test_many_attributes() {
    use std::fmt::Write;
    let mut xml = String::from("<root");
    for i in 0..100 {
        let _ = write!(xml, " attr{i}=\"value{i}\"");
    }
    xml.push_str("/>");

    let doc = parse_with_all_flags(&xml);
    let root = doc.root_element();
    assert_eq!(doc.attributes(root).len(), 100);
    assert_eq!(doc.attribute(root, "attr0"), Some("value0"));
    assert_eq!(doc.attribute(root, "attr99"), Some("value99"));
}

#[test]
fn test_unicode_content() {
    let xml = r"<root>
  <japanese>日本語テスト</japanese>
  <chinese>中文测试</chinese>
  <emoji>Hello 🌍</emoji>
  <arabic>مرحبا</arabic>
  <math>∀x∈ℝ: x² ≥ 0</math>
</root>";

    let doc = parse_with_all_flags(xml);
    let elements = element_children(&doc, doc.root_element());
    assert_eq!(elements.len(), 5);
    assert_eq!(doc.text_content(elements[0]), "日本語テスト");
    assert_eq!(doc.text_content(elements[4]), "∀x∈ℝ: x² ≥ 0");
}

#[test]
fn test_xml_with_byte_order_mark() {
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice(b"<root>hello</root>");

    let outcome = Document::load_bytes(&bytes, ParseFlags::FULL);
    assert_eq!(outcome.status, ParseStatus::NoError);
    let doc = outcome.document;
    assert_eq!(doc.tag(doc.root_element()), "root");
    assert_eq!(doc.text_content(doc.root_element()), "hello");
}

#[test]
fn test_empty_elements_and_self_closing() {
    let xml = r"<root>
  <br/>
  <hr/>
  <empty></empty>
  <space> </space>
</root>";

    let doc = Document::parse_str(xml).unwrap();
    let children = element_children(&doc, doc.root_element());
    assert_eq!(children.len(), 4);
    assert_eq!(doc.tag(children[0]), "br");
    assert!(doc.first_child(children[0]).is_null());
    assert_eq!(doc.tag(children[2]), "empty");
    assert!(doc.first_child(children[2]).is_null());
    assert_eq!(doc.content(children[3]), " ");
}
