//! Markdown files as route data.
//!
//! [`MarkdownProcessor`] turns a `.md` file into a [`MarkdownDocument`]:
//!
//! - `slug`: the filename without `.md` (`hello-world.md` → `hello-world`)
//! - `content`: rendered HTML, front matter excluded
//! - `toc`: a nested `<ul>` linking to the headings, up to `toc_max_depth`
//! - front matter, decoded on demand into any `serde` type
//!
//! ## Front Matter
//!
//! The block must open on the very first line, and the closing delimiter must
//! match the opening one:
//!
//! ```text
//! ---                          +++
//! title: Hello                 title = "Hello"
//! tags: [rust]                 tags = ["rust"]
//! ---                          +++
//! ```
//!
//! `---` is YAML, `+++` is TOML. A block that is never closed is treated as
//! ordinary content.
//!
//! ## Heading Ids
//!
//! Every heading gets an `id` so the table of contents can link to it. An
//! explicit `{#id}` attribute wins; otherwise the id is derived from the
//! heading text (lowercase, words joined by `-`) and repeated ids are suffixed
//! `-1`, `-2`, ...

use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html as md_html};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension, without the dot, of files treated as markdown.
pub const MARKDOWN_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum MarkdownError {
    #[error("not an md file: {}", .0.display())]
    NotMarkdown(PathBuf),
    #[error("error reading {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("error scanning for markdown in {}: {source}", .path.display())]
    Scan { path: PathBuf, source: io::Error },
    #[error("front matter not found")]
    FrontMatterMissing,
    #[error("YAML front matter error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("TOML front matter error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Delimiter types for front matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontMatterFormat {
    /// YAML delimited by `---`.
    Yaml,
    /// TOML delimited by `+++`.
    Toml,
}

impl FrontMatterFormat {
    pub fn delimiter(self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Raw front matter block, decoded lazily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub format: FrontMatterFormat,
    pub raw: String,
}

impl FrontMatter {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, MarkdownError> {
        match self.format {
            FrontMatterFormat::Yaml => Ok(serde_yaml::from_str(&self.raw)?),
            FrontMatterFormat::Toml => Ok(toml::from_str(&self.raw)?),
        }
    }
}

/// One heading collected for the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub text: String,
    pub id: String,
}

/// Everything extracted from one markdown file.
#[derive(Debug, Clone)]
pub struct MarkdownDocument {
    /// Filename without the `.md` extension.
    pub slug: String,
    /// Rendered HTML body.
    pub content: String,
    /// Rendered table of contents, empty when there are no headings.
    pub toc: String,
    /// Headings within the TOC depth, in document order.
    pub headings: Vec<TocEntry>,
    front_matter: Option<FrontMatter>,
}

impl MarkdownDocument {
    /// Decode the front matter into `T`.
    ///
    /// Fails with [`MarkdownError::FrontMatterMissing`] when the file had no
    /// front matter block.
    pub fn front_matter<T: DeserializeOwned>(&self) -> Result<T, MarkdownError> {
        self.front_matter
            .as_ref()
            .ok_or(MarkdownError::FrontMatterMissing)?
            .decode()
    }

    pub fn raw_front_matter(&self) -> Option<&FrontMatter> {
        self.front_matter.as_ref()
    }

    /// Rendered content as pre-escaped markup.
    pub fn content_markup(&self) -> Markup {
        PreEscaped(self.content.clone())
    }

    /// Rendered table of contents as pre-escaped markup.
    pub fn toc_markup(&self) -> Markup {
        PreEscaped(self.toc.clone())
    }
}

/// Markdown parser with front matter and table-of-contents support.
#[derive(Debug, Clone)]
pub struct MarkdownProcessor {
    /// Deepest heading level listed in the table of contents.
    pub toc_max_depth: u8,
    options: Options,
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            toc_max_depth: 3,
            options,
        }
    }
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom set of pulldown-cmark options.
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Parse one `.md` file.
    pub fn parse_file(&self, path: &Path) -> Result<MarkdownDocument, MarkdownError> {
        if !is_markdown(path) {
            return Err(MarkdownError::NotMarkdown(path.to_path_buf()));
        }
        let slug = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let source = fs::read_to_string(path).map_err(|source| MarkdownError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse_str(slug, &source))
    }

    /// Parse every `.md` file directly inside `dir`, in filename order.
    pub fn parse_dir(&self, dir: &Path) -> Result<Vec<MarkdownDocument>, MarkdownError> {
        let mut docs = Vec::new();
        scan_for_markdown(dir, |path| {
            docs.push(self.parse_file(path)?);
            Ok(())
        })?;
        Ok(docs)
    }

    /// Parse markdown source that did not come from a file.
    pub fn parse_str(&self, slug: impl Into<String>, source: &str) -> MarkdownDocument {
        let (front_matter, body) = split_front_matter(source);
        let (content, headings) = self.render(body);
        let toc = if headings.is_empty() {
            String::new()
        } else {
            render_toc(&nest(&headings)).into_string()
        };

        MarkdownDocument {
            slug: slug.into(),
            content,
            toc,
            headings,
            front_matter,
        }
    }

    fn render(&self, body: &str) -> (String, Vec<TocEntry>) {
        let mut events: Vec<Event> = Parser::new_ext(body, self.options).collect();

        // (event index, level, text) for each heading
        let mut found = Vec::new();
        let mut open: Option<(usize, u8, String)> = None;
        for (i, event) in events.iter().enumerate() {
            match event {
                Event::Start(Tag::Heading { level, .. }) => {
                    open = Some((i, *level as u8, String::new()));
                }
                Event::End(TagEnd::Heading(_)) => {
                    if let Some(heading) = open.take() {
                        found.push(heading);
                    }
                }
                Event::Text(text) | Event::Code(text) => {
                    if let Some((_, _, buf)) = open.as_mut() {
                        buf.push_str(text);
                    }
                }
                _ => {}
            }
        }

        let mut ids = HeadingIds::default();
        let mut toc = Vec::new();
        for (index, level, text) in found {
            if let Event::Start(Tag::Heading { id, .. }) = &mut events[index] {
                let resolved = match id.as_deref() {
                    Some(explicit) => ids.claim(explicit.to_string()),
                    None => ids.claim(heading_id(&text)),
                };
                *id = Some(CowStr::from(resolved.clone()));
                if level <= self.toc_max_depth {
                    toc.push(TocEntry {
                        level,
                        text,
                        id: resolved,
                    });
                }
            }
        }

        let mut html = String::new();
        md_html::push_html(&mut html, events.into_iter());
        (html, toc)
    }
}

/// Call `f` with the path of every `.md` file directly inside `dir`.
///
/// Subdirectories and other files are skipped. Paths are visited in filename
/// order. Errors from `f` stop the scan and are returned as-is.
pub fn scan_for_markdown<F>(dir: &Path, mut f: F) -> Result<(), MarkdownError>
where
    F: FnMut(&Path) -> Result<(), MarkdownError>,
{
    let scan_err = |source| MarkdownError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();
        if path.is_file() && is_markdown(&path) {
            paths.push(path);
        }
    }
    paths.sort();

    for path in &paths {
        f(path)?;
    }
    Ok(())
}

fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == MARKDOWN_EXTENSION)
}

/// Split a leading front matter block from the body.
fn split_front_matter(source: &str) -> (Option<FrontMatter>, &str) {
    let content = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return (None, source);
    };

    let format = match first.trim_end() {
        "---" => FrontMatterFormat::Yaml,
        "+++" => FrontMatterFormat::Toml,
        _ => return (None, source),
    };

    let mut offset = first.len();
    for line in lines {
        if line.trim_end() == format.delimiter() {
            let raw = content[first.len()..offset].to_string();
            let body = &content[offset + line.len()..];
            return (Some(FrontMatter { format, raw }), body);
        }
        offset += line.len();
    }

    (None, source)
}

/// Derive an anchor id from heading text.
fn heading_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }
    if id.is_empty() {
        "heading".to_string()
    } else {
        id
    }
}

#[derive(Default)]
struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    fn claim(&mut self, base: String) -> String {
        let count = self.seen.entry(base.clone()).or_insert(0);
        let id = if *count == 0 {
            base
        } else {
            format!("{base}-{count}")
        };
        *count += 1;
        id
    }
}

struct TocNode<'a> {
    entry: &'a TocEntry,
    children: Vec<TocNode<'a>>,
}

/// Nest a flat heading list: each entry owns the following deeper entries.
fn nest(entries: &[TocEntry]) -> Vec<TocNode<'_>> {
    let mut nodes = Vec::new();
    let mut i = 0;
    while i < entries.len() {
        let level = entries[i].level;
        let end = entries[i + 1..]
            .iter()
            .position(|e| e.level <= level)
            .map(|p| i + 1 + p)
            .unwrap_or(entries.len());
        nodes.push(TocNode {
            entry: &entries[i],
            children: nest(&entries[i + 1..end]),
        });
        i = end;
    }
    nodes
}

fn render_toc(nodes: &[TocNode<'_>]) -> Markup {
    html! {
        ul {
            @for node in nodes {
                li {
                    a href={ "#" (node.entry.id) } { (node.entry.text) }
                    @if !node.children.is_empty() {
                        (render_toc(&node.children))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Post {
        title: String,
        #[serde(default)]
        tags: Vec<String>,
    }

    fn parse(source: &str) -> MarkdownDocument {
        MarkdownProcessor::default().parse_str("test", source)
    }

    #[test]
    fn renders_markdown() {
        let doc = parse("This is **bold** and *italic*.");
        assert!(doc.content.contains("<strong>bold</strong>"));
        assert!(doc.content.contains("<em>italic</em>"));
        assert!(doc.raw_front_matter().is_none());
    }

    #[test]
    fn yaml_front_matter() {
        let doc = parse("---\ntitle: Hello\ntags: [rust, web]\n---\n# Body\n");
        let post: Post = doc.front_matter().unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.tags, vec!["rust", "web"]);
        assert!(!doc.content.contains("title:"));
        assert!(doc.content.contains("Body</h1>"));
    }

    #[test]
    fn toml_front_matter() {
        let doc = parse("+++\ntitle = \"Hello\"\n+++\nText\n");
        let post: Post = doc.front_matter().unwrap();
        assert_eq!(
            post,
            Post {
                title: "Hello".into(),
                tags: vec![]
            }
        );
        assert_eq!(
            doc.raw_front_matter().unwrap().format,
            FrontMatterFormat::Toml
        );
    }

    #[test]
    fn missing_front_matter_is_error() {
        let doc = parse("# Just content\n");
        assert!(matches!(
            doc.front_matter::<Post>(),
            Err(MarkdownError::FrontMatterMissing)
        ));
    }

    #[test]
    fn unterminated_front_matter_is_content() {
        let doc = parse("---\ntitle: x\n");
        assert!(doc.raw_front_matter().is_none());
    }

    #[test]
    fn indented_delimiter_is_not_front_matter() {
        let doc = parse(" ---\ntitle: x\n---\n");
        assert!(doc.raw_front_matter().is_none());
    }

    #[test]
    fn bad_front_matter_is_decode_error() {
        let doc = parse("---\ntitle: [unclosed\n---\n");
        assert!(matches!(
            doc.front_matter::<Post>(),
            Err(MarkdownError::Yaml(_))
        ));
    }

    #[test]
    fn headings_get_ids() {
        let doc = parse("# Hello World\n\n## Hello World\n");
        assert!(doc.content.contains(r#"<h1 id="hello-world">"#));
        assert!(doc.content.contains(r#"<h2 id="hello-world-1">"#));
    }

    #[test]
    fn explicit_heading_id_wins() {
        let doc = parse("# Intro {#start}\n");
        assert!(doc.content.contains(r#"id="start""#));
        assert_eq!(doc.headings[0].id, "start");
    }

    #[test]
    fn heading_id_rules() {
        assert_eq!(heading_id("Hello, World!"), "hello-world");
        assert_eq!(heading_id("  spaced   out  "), "spaced-out");
        assert_eq!(heading_id("snake_case-name"), "snake-case-name");
        assert_eq!(heading_id("???"), "heading");
    }

    #[test]
    fn toc_respects_max_depth() {
        let doc = parse("# A\n## B\n### C\n#### D\n");
        let levels: Vec<u8> = doc.headings.iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![1, 2, 3]);
        assert!(!doc.toc.contains("#d"));
    }

    #[test]
    fn toc_is_nested() {
        let doc = parse("# A\n## B\n## C\n# D\n");
        assert_eq!(
            doc.toc,
            concat!(
                r##"<ul><li><a href="#a">A</a><ul>"##,
                r##"<li><a href="#b">B</a></li><li><a href="#c">C</a></li></ul></li>"##,
                r##"<li><a href="#d">D</a></li></ul>"##
            )
        );
    }

    #[test]
    fn toc_empty_without_headings() {
        let doc = parse("just text");
        assert_eq!(doc.toc, "");
    }

    #[test]
    fn inline_code_counts_toward_heading_text() {
        let doc = parse("## The `chunk` function\n");
        assert_eq!(doc.headings[0].text, "The chunk function");
        assert_eq!(doc.headings[0].id, "the-chunk-function");
    }

    #[test]
    fn parse_file_uses_filename_as_slug() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("hello-world.md");
        fs::write(&path, "---\ntitle: Hi\n---\ntext").unwrap();

        let doc = MarkdownProcessor::default().parse_file(&path).unwrap();
        assert_eq!(doc.slug, "hello-world");
    }

    #[test]
    fn parse_file_rejects_other_extensions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("notes.txt");
        fs::write(&path, "text").unwrap();

        assert!(matches!(
            MarkdownProcessor::default().parse_file(&path),
            Err(MarkdownError::NotMarkdown(_))
        ));
    }

    #[test]
    fn parse_file_missing_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = MarkdownProcessor::default()
            .parse_file(&tmp.path().join("gone.md"))
            .unwrap_err();
        assert!(matches!(err, MarkdownError::Read { .. }));
    }

    #[test]
    fn parse_dir_skips_non_markdown_and_sorts() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.md"), "b").unwrap();
        fs::write(tmp.path().join("a.md"), "a").unwrap();
        fs::write(tmp.path().join("c.txt"), "c").unwrap();
        fs::create_dir(tmp.path().join("d.md")).unwrap();

        let docs = MarkdownProcessor::default().parse_dir(tmp.path()).unwrap();
        let slugs: Vec<&str> = docs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["a", "b"]);
    }

    #[test]
    fn scan_missing_dir_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan_for_markdown(&tmp.path().join("missing"), |_| Ok(()));
        assert!(matches!(result, Err(MarkdownError::Scan { .. })));
    }

    #[test]
    fn scan_stops_on_callback_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "a").unwrap();
        fs::write(tmp.path().join("b.md"), "b").unwrap();

        let mut visited = 0;
        let result = scan_for_markdown(tmp.path(), |_| {
            visited += 1;
            Err(MarkdownError::FrontMatterMissing)
        });
        assert!(result.is_err());
        assert_eq!(visited, 1);
    }
}
