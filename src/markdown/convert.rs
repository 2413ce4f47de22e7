//! Markdown to HTML conversion using pulldown-cmark.
//!
//! Renders the event stream directly to an HTML string, injecting classes
//! from the [`ClassMap`] on mapped element tags. Raw HTML in the source
//! passes through untouched.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::utils::html::{escape, escape_attr};

use super::ClassMap;

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Render markdown to an HTML string with class injection.
pub fn render_markdown(markdown: &str, classes: &ClassMap, options: &MarkdownOptions) -> String {
    let parser = Parser::new_ext(markdown, options.to_pulldown_options());
    let mut renderer = HtmlRenderer::new(classes);

    for event in parser {
        renderer.handle_event(event);
    }

    renderer.out
}

/// Captured state for an image element (alt text arrives as child events).
struct ImageCapture {
    dest: String,
    title: String,
    alt: String,
}

/// Event-stream HTML renderer.
struct HtmlRenderer<'a> {
    out: String,
    classes: &'a ClassMap,
    /// End tags for open elements.
    ends: Vec<String>,
    /// Inside `<thead>`: cells render as `<th>`.
    in_table_head: bool,
    /// Currently collecting an image's alt text.
    image: Option<ImageCapture>,
}

impl<'a> HtmlRenderer<'a> {
    fn new(classes: &'a ClassMap) -> Self {
        Self {
            out: String::new(),
            classes,
            ends: Vec::new(),
            in_table_head: false,
            image: None,
        }
    }

    /// Handle a single pulldown-cmark event
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(text.as_ref()),
            Event::Code(code) => self.add_inline_code(code.as_ref()),
            Event::Html(html) | Event::InlineHtml(html) => self.out.push_str(html.as_ref()),
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => self.write_void("br", vec![]),
            Event::Rule => self.write_void("hr", vec![]),
            Event::FootnoteReference(name) => self.add_footnote_ref(name.as_ref()),
            Event::TaskListMarker(checked) => self.add_task_marker(checked),
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => self.open("p", vec![]),
            Tag::Heading { level, id, .. } => {
                let attrs = id
                    .map(|id| vec![("id".to_string(), id.to_string())])
                    .unwrap_or_default();
                self.open(heading_level_to_tag(level), attrs);
            }
            Tag::BlockQuote(_) => self.open("blockquote", vec![]),
            Tag::CodeBlock(kind) => self.open_code_block(&kind),
            Tag::List(Some(start)) => {
                let attrs = if start != 1 {
                    vec![("start".to_string(), start.to_string())]
                } else {
                    vec![]
                };
                self.open("ol", attrs);
            }
            Tag::List(None) => self.open("ul", vec![]),
            Tag::Item => self.open("li", vec![]),
            Tag::FootnoteDefinition(name) => self.open(
                "div",
                vec![
                    ("class".to_string(), "footnote".to_string()),
                    ("id".to_string(), format!("fn-{name}")),
                ],
            ),
            Tag::Table(_) => self.open("table", vec![]),
            Tag::TableHead => {
                self.in_table_head = true;
                self.out.push_str("<thead><tr>");
            }
            Tag::TableRow => self.open("tr", vec![]),
            Tag::TableCell => {
                let cell = if self.in_table_head { "th" } else { "td" };
                self.open(cell, vec![]);
            }
            Tag::Emphasis => self.open("em", vec![]),
            Tag::Strong => self.open("strong", vec![]),
            Tag::Strikethrough => self.open("del", vec![]),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut attrs = vec![("href".to_string(), dest_url.to_string())];
                if !title.is_empty() {
                    attrs.push(("title".to_string(), title.to_string()));
                }
                self.open("a", attrs);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(ImageCapture {
                    dest: dest_url.to_string(),
                    title: title.to_string(),
                    alt: String::new(),
                });
            }
            // Transparent containers (html blocks, metadata)
            _ => self.ends.push(String::new()),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Image => self.emit_image(),
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.out.push_str("</tr></thead><tbody>");
            }
            TagEnd::Table => self.out.push_str("</tbody></table>"),
            TagEnd::CodeBlock => self.out.push_str("</code></pre>"),
            _ => {
                if let Some(end) = self.ends.pop() {
                    self.out.push_str(&end);
                }
            }
        }
    }

    /// Write an open tag with mapped classes and push the matching end tag.
    fn open(&mut self, name: &str, attrs: Vec<(String, String)>) {
        self.write_open_tag(name, attrs);
        if name != "table" {
            self.ends.push(format!("</{name}>"));
        }
        // `table` closes via TagEnd::Table (after the injected tbody)
    }

    /// Write a void element (no end tag).
    fn write_void(&mut self, name: &str, attrs: Vec<(String, String)>) {
        self.write_open_tag(name, attrs);
    }

    /// Write `<name ...>`, merging mapped classes into any class attribute.
    fn write_open_tag(&mut self, name: &str, attrs: Vec<(String, String)>) {
        self.out.push('<');
        self.out.push_str(name);

        let mapped = self.classes.get(name);
        let mut class_written = false;

        for (key, value) in &attrs {
            if key == "class" {
                let merged = match mapped {
                    Some(extra) => format!("{value} {extra}"),
                    None => value.clone(),
                };
                self.out
                    .push_str(&format!(" class=\"{}\"", escape_attr(&merged)));
                class_written = true;
            } else {
                self.out
                    .push_str(&format!(" {key}=\"{}\"", escape_attr(value)));
            }
        }

        if !class_written && let Some(extra) = mapped {
            self.out
                .push_str(&format!(" class=\"{}\"", escape_attr(extra)));
        }

        self.out.push('>');
    }

    /// `<pre><code>` with a `language-*` class on fenced blocks.
    fn open_code_block(&mut self, kind: &CodeBlockKind) {
        self.write_open_tag("pre", vec![]);

        let attrs = match kind {
            CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                vec![("class".to_string(), format!("language-{lang}"))]
            }
            _ => vec![],
        };
        self.write_open_tag("code", attrs);
        // end written by TagEnd::CodeBlock
    }

    fn add_text(&mut self, text: &str) {
        if let Some(image) = &mut self.image {
            image.alt.push_str(text);
            return;
        }
        self.out.push_str(&escape(text));
    }

    fn add_inline_code(&mut self, code: &str) {
        if let Some(image) = &mut self.image {
            image.alt.push_str(code);
            return;
        }
        self.write_open_tag("code", vec![]);
        self.out.push_str(&escape(code));
        self.out.push_str("</code>");
    }

    /// Emit the buffered image as an `<img>` element. The alt attribute is
    /// always written, even when empty.
    fn emit_image(&mut self) {
        let Some(image) = self.image.take() else {
            return;
        };

        let mut attrs = vec![
            ("src".to_string(), image.dest),
            ("alt".to_string(), image.alt),
        ];
        if !image.title.is_empty() {
            attrs.push(("title".to_string(), image.title));
        }
        self.write_void("img", attrs);
    }

    fn add_footnote_ref(&mut self, name: &str) {
        self.out.push_str(&format!(
            "<sup class=\"footnote-ref\"><a href=\"#fn-{name}\" id=\"fnref-{name}\">[{name}]</a></sup>"
        ));
    }

    fn add_task_marker(&mut self, checked: bool) {
        let checked = if checked { " checked" } else { "" };
        self.out
            .push_str(&format!("<input type=\"checkbox\" disabled{checked}>"));
    }
}

/// Convert heading level to tag name
fn heading_level_to_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}
