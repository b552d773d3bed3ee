//! xml_select - Print the text of elements selected by tag paths.
//!
//! Each `--path` is a `/`-separated list of element names starting at the
//! document root. The paths are compiled into one dispatch tree, so the
//! input is read once, in a single streaming pass.
//!
//! # Usage
//!
//! ```bash
//! xml_select [OPTIONS] <FILENAME>
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Print every entry title of an Atom feed
//! xml_select --path feed/entry/title feed.xml
//!
//! # Several paths at once, prefixed with the path that matched
//! xml_select --path feed/title --path feed/entry/id --label feed.xml
//!
//! # Only check that the document is well formed
//! xml_select --check feed.xml
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::{self, Write};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kroki_xml::dispatch::{TagDispatchTree, TagDispatchTreeBuilder};
use kroki_xml::reader::XmlEventReader;
use kroki_xml::{EventCursor, Result};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Print the text of elements selected by tag paths.
#[derive(Parser, Debug)]
#[command(name = "xml_select")]
#[command(version = VERSION)]
#[command(about = "Print the text of elements selected by tag paths")]
#[command(
    long_about = "Streams an XML document once and prints the text content of \
    every element matching one of the given root-anchored tag paths."
)]
struct Args {
    /// Input XML file to process
    filename: String,

    /// Root-anchored path such as `feed/entry/title` (repeatable)
    #[arg(long = "path", short = 'p')]
    paths: Vec<String>,

    /// Only check that the document is well formed
    #[arg(long)]
    check: bool,

    /// Prefix every line with the path that matched
    #[arg(long)]
    label: bool,

    /// Enable debug output
    ///
    /// Logs dispatch decisions to stderr. `RUST_LOG` overrides this.
    #[arg(long)]
    debug: bool,
}

/// Paths merged into a prefix tree of element names.
#[derive(Default, Debug)]
struct PathNode {
    children: BTreeMap<String, PathNode>,
    /// Full path when a `--path` ends here
    selected: Option<String>,
}

impl PathNode {
    fn insert(&mut self, path: &str) {
        let mut node = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            node = node.children.entry(segment.to_string()).or_default();
        }
        node.selected = Some(path.to_string());
    }
}

/// Registers `node`'s children on `builder`.
///
/// A selected node that also has selected descendants is printed as a whole
/// (its text, descendants' tags ignored) since a handler owns its element.
fn register<'h>(
    builder: &mut TagDispatchTreeBuilder<'h>,
    node: &'h PathNode,
    out: &'h RefCell<Vec<(String, String)>>,
) -> Result<()> {
    for (name, child) in &node.children {
        match &child.selected {
            Some(path) => {
                builder.use_tag(name.as_str(), move |events| {
                    let mut text = String::new();
                    while events.has_next() {
                        if let kroki_xml::Event::Text(t) = events.next_event()? {
                            text.push_str(&t);
                        }
                    }
                    debug!(path = %path, "selected element");
                    out.borrow_mut().push((path.clone(), text));
                    Ok(())
                })?;
            }
            None => {
                builder.tag(name.as_str(), |nested| register(nested, child, out))?;
            }
        }
    }
    Ok(())
}

fn init_logging(debug: bool) {
    let default = if debug { "kroki_xml=debug,xml_select=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Streams `events` once through a tree compiled from `paths`, returning
/// the selected `(path, text)` pairs in document order.
fn select_paths(events: &mut dyn EventCursor, paths: &[String]) -> Result<Vec<(String, String)>> {
    let mut root = PathNode::default();
    for path in paths {
        root.insert(path);
    }

    let lines = RefCell::new(Vec::new());
    let tree: TagDispatchTree<'_> = {
        let mut builder = TagDispatchTreeBuilder::new();
        register(&mut builder, &root, &lines)?;
        builder.build()?
    };
    debug!(tree = ?tree, "compiled dispatch tree");

    tree.parse(events)?;
    drop(tree);
    Ok(lines.into_inner())
}

fn run(args: &Args) -> Result<()> {
    let mut events = XmlEventReader::from_file(&args.filename)?;

    if args.check {
        select_paths(&mut events, &[])?;
        info!(file = %args.filename, "document is well formed");
        println!("{}: ok", args.filename);
        return Ok(());
    }

    let lines = select_paths(&mut events, &args.paths)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (path, text) in lines {
        if args.label {
            writeln!(out, "{}\t{}", path, text)?;
        } else {
            writeln!(out, "{}", text)?;
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.debug);

    if let Err(e) = run(&args) {
        eprintln!("Error processing {}: {}", args.filename, e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FEED: &str = r#"<?xml version="1.0"?>
<feed>
  <title>News</title>
  <entry><id>1</id><title>First</title></entry>
  <other><entry><title>Hidden</title></entry></other>
  <entry><id>2</id><title>Second</title></entry>
</feed>"#;

    fn select(paths: &[&str]) -> Vec<(String, String)> {
        select_in(FEED, paths)
    }

    fn select_in(doc: &str, paths: &[&str]) -> Vec<(String, String)> {
        let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        select_paths(&mut XmlEventReader::from_reader(Cursor::new(doc)), &paths).unwrap()
    }

    #[test]
    fn test_select_single_path() {
        let lines = select(&["feed/entry/title"]);
        let texts: Vec<_> = lines.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["First", "Second"]);
    }

    #[test]
    fn test_select_several_paths() {
        let lines = select(&["feed/title", "/feed/entry/id"]);
        assert_eq!(
            lines,
            vec![
                ("feed/title".to_string(), "News".to_string()),
                ("/feed/entry/id".to_string(), "1".to_string()),
                ("/feed/entry/id".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_mixed_content() {
        let lines = select_in("<doc>\n  <p>Hello <b>big</b> world</p>\n</doc>", &["doc/p"]);
        assert_eq!(lines, vec![("doc/p".to_string(), "Hello big world".to_string())]);
    }

    #[test]
    fn test_no_paths_only_drains() {
        assert!(select(&[]).is_empty());
    }

    #[test]
    fn test_run_returns_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<feed><title>x</feed>").unwrap();

        let args = Args {
            filename: file.path().to_string_lossy().into_owned(),
            paths: vec!["feed/title".to_string()],
            check: true,
            label: false,
            debug: false,
        };
        assert!(matches!(run(&args), Err(kroki_xml::Error::XmlParse(_))));
    }
}
