// src/feed/parser.rs
use metrics::{counter, histogram};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{ExportError, Result};
use crate::feed::types::{Feed, FeedEntry, FeedFormat};

/// Parse an RSS 2.0, RSS 1.0 (RDF) or Atom document into its entries.
///
/// The parser is lenient about content: unknown elements are ignored, text and
/// CDATA (including text inside nested markup) are concatenated and trimmed.
/// It is strict about structure: malformed XML or a non-feed root element is an error.
pub fn parse_feed(xml: &str) -> Result<Feed> {
    let t0 = std::time::Instant::now();
    let xml_clean = scrub_html_entities_for_xml(xml);
    let mut reader = Reader::from_str(&xml_clean);

    let mut st = ParseState::default();
    loop {
        let event = match reader.read_event() {
            Ok(ev) => ev,
            Err(source) => {
                return Err(ExportError::Xml {
                    position: reader.buffer_position() as u64,
                    source,
                })
            }
        };
        match event {
            Event::Start(e) => st.open(&e)?,
            Event::Empty(e) => {
                st.open(&e)?;
                st.close();
            }
            Event::End(_) => st.close(),
            Event::Text(e) => {
                if st.capturing() {
                    let text = match e.unescape() {
                        Ok(t) => t.into_owned(),
                        Err(_) => String::from_utf8_lossy(&e).into_owned(),
                    };
                    st.push_text(&text);
                }
            }
            Event::CData(e) => {
                if st.capturing() {
                    st.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let format = st.format.ok_or_else(|| ExportError::NotAFeed {
        root: "(none)".to_string(),
    })?;

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_entries_total").increment(st.entries.len() as u64);
    tracing::debug!(
        format = format.as_str(),
        entries = st.entries.len(),
        "parsed feed in {ms:.1} ms"
    );

    Ok(Feed {
        format,
        title: st.feed_title,
        entries: st.entries,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    FeedTitle,
    Title,
    Link,
    Guid,
    Published,
    Summary,
    /// `content:encoded` / Atom `<content>`; summary when none is given.
    Content,
}

struct Capture {
    field: Field,
    /// Stack depth of the captured element itself.
    depth: usize,
    text: String,
}

#[derive(Default)]
struct EntryBuilder {
    title: Option<String>,
    link: Option<String>,
    guid_link: Option<String>,
    published: Option<String>,
    summary: Option<String>,
    content: Option<String>,
}

impl EntryBuilder {
    fn build(self) -> FeedEntry {
        FeedEntry {
            title: self.title,
            link: self.link.or(self.guid_link),
            published: self.published,
            summary: self.summary.or(self.content),
        }
    }
}

#[derive(Default)]
struct ParseState {
    format: Option<FeedFormat>,
    feed_title: Option<String>,
    entries: Vec<FeedEntry>,
    /// Qualified names of the currently open elements.
    stack: Vec<String>,
    entry: Option<EntryBuilder>,
    entry_depth: usize,
    capture: Option<Capture>,
}

impl ParseState {
    fn capturing(&self) -> bool {
        self.capture.is_some()
    }

    fn push_text(&mut self, text: &str) {
        if let Some(c) = self.capture.as_mut() {
            c.text.push_str(text);
        }
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let depth = self.stack.len();

        if self.format.is_none() {
            self.format = Some(detect_format(&name)?);
        }

        // Markup nested inside a captured element only contributes its text.
        if self.capture.is_none() {
            if self.entry.is_none() {
                if matches!(local_name(&name), "item" | "entry") {
                    self.entry = Some(EntryBuilder::default());
                    self.entry_depth = depth;
                } else if classify(&name) == Some(Field::Title) && self.feed_title.is_none() {
                    let parent = self.stack.last().map(|p| local_name(p));
                    if matches!(parent, Some("channel" | "feed")) {
                        self.begin(Field::FeedTitle, depth);
                    }
                }
            } else if depth == self.entry_depth + 1 {
                self.open_entry_child(&name, e, depth);
            }
        }

        self.stack.push(name);
        Ok(())
    }

    fn open_entry_child(&mut self, name: &str, e: &BytesStart<'_>, depth: usize) {
        let Some(field) = classify(name) else {
            return;
        };
        match field {
            Field::Link => match attr(e, b"href") {
                // Atom: <link rel="alternate" href="..."/>
                Some(href) => {
                    let rel = attr(e, b"rel");
                    if matches!(rel.as_deref(), None | Some("alternate")) {
                        if let Some(entry) = self.entry.as_mut() {
                            set_first(&mut entry.link, href.trim().to_string());
                        }
                    }
                }
                None => self.begin(Field::Link, depth),
            },
            Field::Guid => {
                let permalink = attr(e, b"isPermaLink");
                if matches!(permalink.as_deref(), None | Some("true")) {
                    self.begin(Field::Guid, depth);
                }
            }
            // Out-of-line Atom content has nothing to capture.
            Field::Content if attr(e, b"src").is_some() => {}
            other => self.begin(other, depth),
        }
    }

    fn begin(&mut self, field: Field, depth: usize) {
        self.capture = Some(Capture {
            field,
            depth,
            text: String::new(),
        });
    }

    fn close(&mut self) {
        self.stack.pop();
        let depth = self.stack.len();

        if self.capture.as_ref().is_some_and(|c| c.depth == depth) {
            if let Some(c) = self.capture.take() {
                self.finish_capture(c);
            }
            return;
        }

        if self.entry.is_some() && depth == self.entry_depth {
            if let Some(builder) = self.entry.take() {
                self.entries.push(builder.build());
            }
        }
    }

    fn finish_capture(&mut self, c: Capture) {
        let value = c.text.trim().to_string();
        if c.field == Field::FeedTitle {
            set_first(&mut self.feed_title, value);
            return;
        }
        let Some(entry) = self.entry.as_mut() else {
            return;
        };
        let slot = match c.field {
            Field::Title => &mut entry.title,
            Field::Link => &mut entry.link,
            Field::Guid => &mut entry.guid_link,
            Field::Published => &mut entry.published,
            Field::Summary => &mut entry.summary,
            Field::Content => &mut entry.content,
            Field::FeedTitle => return,
        };
        set_first(slot, value);
    }
}

fn detect_format(root: &str) -> Result<FeedFormat> {
    match local_name(root) {
        "rss" => Ok(FeedFormat::Rss2),
        "RDF" => Ok(FeedFormat::Rss1),
        "feed" => Ok(FeedFormat::Atom),
        _ => Err(ExportError::NotAFeed {
            root: root.to_string(),
        }),
    }
}

/// Map an entry child element to the field it feeds. Prefixed names are only
/// accepted for the namespaces that carry one of our fields.
fn classify(name: &str) -> Option<Field> {
    match name {
        "title" | "atom:title" => Some(Field::Title),
        "link" | "atom:link" => Some(Field::Link),
        "guid" => Some(Field::Guid),
        "pubDate" | "published" | "atom:published" | "dcterms:issued" => Some(Field::Published),
        "description" | "summary" | "atom:summary" | "itunes:summary" => Some(Field::Summary),
        "content:encoded" | "content" | "atom:content" => Some(Field::Content),
        _ => None,
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| match a.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&a.value).into_owned(),
        })
}

fn set_first(slot: &mut Option<String>, value: String) {
    if slot.is_none() {
        *slot = Some(value);
    }
}

/// HTML named entities are not defined in XML; feeds that embed them unescaped
/// would otherwise lose the whole text node. CDATA sections are copied verbatim.
fn scrub_html_entities_for_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("<![CDATA[") {
        out.push_str(&scrub_entities(&rest[..start]));
        let section = &rest[start..];
        match section.find("]]>") {
            Some(end) => {
                out.push_str(&section[..end + 3]);
                rest = &section[end + 3..];
            }
            None => {
                out.push_str(section);
                rest = "";
            }
        }
    }
    out.push_str(&scrub_entities(rest));
    out
}

fn scrub_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
