//! HTML Tokenizer with ScanHandler Trait
//!
//! Splits the input into start tags, end tags, text, raw text, comments
//! and doctypes, and reports each one to a [`ScanHandler`] as spans into
//! the input. Nothing is copied and nothing is decoded here.
//!
//! Tree construction (implicit closes, void elements) is the handler's
//! job; the tokenizer only knows which elements switch it into raw text
//! mode.

use super::attributes::{scan_attributes, Attribute, TagEnd};
use super::scanner::Scanner;
use crate::dom::Span;
use memchr::memchr;

/// Trait for handling scan events
///
/// The tokenizer calls these methods as it walks the input, passing spans
/// (byte offsets) instead of string copies.
pub trait ScanHandler {
    /// Called when an element starts
    ///
    /// # Arguments
    /// * `name` - Span of the tag name in the input
    /// * `attrs` - Attributes in source order, duplicates included
    /// * `self_closing` - True if the tag ended with `/>`
    /// * `tag` - Span of the whole tag, `<` through `>`
    fn start_element(&mut self, name: Span, attrs: &[Attribute], self_closing: bool, tag: Span);

    /// Called when an end tag is seen
    ///
    /// # Arguments
    /// * `name` - Span of the tag name in the input
    /// * `tag` - Span of the whole tag, `</` through `>`
    fn end_element(&mut self, name: Span, tag: Span);

    /// Called for text content
    ///
    /// # Arguments
    /// * `span` - Span of the text in the input
    /// * `needs_entity_decode` - True if the text contains a `&`
    fn text(&mut self, span: Span, needs_entity_decode: bool);

    /// Called for text that must never be entity-decoded: the contents of
    /// `script`/`style` style elements and CDATA sections
    fn raw_text(&mut self, span: Span);

    /// Called for comments (optional, default does nothing)
    ///
    /// # Arguments
    /// * `span` - Span of the comment content (excluding `<!--` and `-->`)
    fn comment(&mut self, _span: Span) {}

    /// Called for DOCTYPE (optional, default does nothing)
    fn doctype(&mut self, _content: Span) {}
}

/// How an element's content is tokenized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentModel {
    /// Nothing but the matching end tag ends the content; no decoding
    RawText,
    /// Like `RawText`, but character references are decoded
    EscapableRawText,
}

fn content_model(name: &[u8]) -> Option<ContentModel> {
    const RAW: [&[u8]; 6] = [b"script", b"style", b"xmp", b"iframe", b"noembed", b"noframes"];
    const ESCAPABLE: [&[u8]; 2] = [b"textarea", b"title"];

    if RAW.iter().any(|raw| raw.eq_ignore_ascii_case(name)) {
        Some(ContentModel::RawText)
    } else if ESCAPABLE.iter().any(|esc| esc.eq_ignore_ascii_case(name)) {
        Some(ContentModel::EscapableRawText)
    } else {
        None
    }
}

/// HTML tokenizer that dispatches events to a [`ScanHandler`]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    /// Reusable attribute buffer to avoid per-element allocations
    attrs_buf: Vec<Attribute>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the input
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            scanner: Scanner::new(input),
            attrs_buf: Vec::with_capacity(8), // Most elements have < 8 attrs
        }
    }

    /// Scan the entire document, calling handler methods for each token
    pub fn scan<H: ScanHandler>(&mut self, handler: &mut H) {
        while !self.scanner.is_eof() {
            if self.scanner.peek() == Some(b'<') && self.at_markup() {
                self.scan_markup(handler);
            } else {
                self.scan_text(handler);
            }
        }
    }

    /// Whether the '<' under the cursor opens markup rather than being a
    /// literal character
    fn at_markup(&self) -> bool {
        match self.scanner.peek_at(1) {
            Some(b'!' | b'?') => true,
            Some(b'/') => self.scanner.peek_at(2).is_some(),
            Some(c) => c.is_ascii_alphabetic(),
            None => false,
        }
    }

    /// Scan markup starting with '<'
    fn scan_markup<H: ScanHandler>(&mut self, handler: &mut H) {
        let start = self.scanner.position();
        self.scanner.advance(1); // Skip '<'

        match self.scanner.peek() {
            Some(b'/') => {
                self.scanner.advance(1);
                self.scan_end_tag(start, handler);
            }
            Some(b'!') => {
                self.scanner.advance(1);
                if self.scanner.starts_with(b"--") {
                    self.scanner.advance(2);
                    self.scan_comment(handler);
                } else if self.scanner.starts_with(b"[CDATA[") {
                    self.scanner.advance(7);
                    self.scan_cdata(handler);
                } else if self.scanner.starts_with_ignore_case(b"doctype") {
                    self.scan_doctype(handler);
                } else {
                    self.skip_bogus_comment();
                }
            }
            Some(b'?') => self.skip_bogus_comment(),
            _ => self.scan_start_tag(start, handler),
        }
    }

    /// Scan a start tag; `start` is the offset of its '<'
    fn scan_start_tag<H: ScanHandler>(&mut self, start: usize, handler: &mut H) {
        let Some((name_start, name_end)) = self.scanner.read_tag_name() else {
            return;
        };
        let name_span = Span::between(name_start, name_end);

        let Some(end) = scan_attributes(&mut self.scanner, &mut self.attrs_buf) else {
            // EOF inside the tag: the tag is dropped
            return;
        };

        let self_closing = end == TagEnd::SelfClosing;
        let tag = Span::between(start, self.scanner.position());
        handler.start_element(name_span, &self.attrs_buf, self_closing, tag);

        if !self_closing {
            let input = self.input;
            let name = &input[name_start..name_end];
            if let Some(model) = content_model(name) {
                self.scan_raw_content(name, model, handler);
            }
        }
    }

    /// Consume the content of a raw text element up to (not including)
    /// its end tag, which the main loop then tokenizes normally
    fn scan_raw_content<H: ScanHandler>(&mut self, name: &[u8], model: ContentModel, handler: &mut H) {
        let content_start = self.scanner.position();
        let content_end = self
            .scanner
            .find_raw_text_end(name)
            .unwrap_or(self.input.len());

        if content_end > content_start {
            let span = Span::between(content_start, content_end);
            match model {
                ContentModel::RawText => handler.raw_text(span),
                ContentModel::EscapableRawText => {
                    let needs_decode = memchr(b'&', span.slice(self.input)).is_some();
                    handler.text(span, needs_decode);
                }
            }
        }
        self.scanner.set_position(content_end);
    }

    /// Scan an end tag; the cursor sits after `</`
    fn scan_end_tag<H: ScanHandler>(&mut self, start: usize, handler: &mut H) {
        let Some((name_start, name_end)) = self.scanner.read_tag_name() else {
            // `</>` is dropped, anything else is a bogus comment
            if self.scanner.peek() == Some(b'>') {
                self.scanner.advance(1);
            } else {
                self.skip_bogus_comment();
            }
            return;
        };

        // End tags cannot carry attributes; skip whatever is there
        let Some(gt) = self.scanner.find_byte(b'>') else {
            self.scanner.set_position(self.input.len());
            return;
        };
        self.scanner.set_position(gt + 1);

        handler.end_element(
            Span::between(name_start, name_end),
            Span::between(start, gt + 1),
        );
    }

    /// Scan text content, up to the next '<' that opens markup
    fn scan_text<H: ScanHandler>(&mut self, handler: &mut H) {
        let start = self.scanner.position();
        // The first byte is text even if it is a stray '<'
        self.scanner.advance(1);

        loop {
            match self.scanner.find_tag_start() {
                Some(lt) => {
                    self.scanner.set_position(lt);
                    if self.at_markup() {
                        break;
                    }
                    self.scanner.advance(1);
                }
                None => {
                    self.scanner.set_position(self.input.len());
                    break;
                }
            }
        }

        let end = self.scanner.position();
        let span = Span::between(start, end);
        let needs_decode = memchr(b'&', span.slice(self.input)).is_some();
        handler.text(span, needs_decode);
    }

    /// Scan a comment; the cursor sits after `<!--`
    fn scan_comment<H: ScanHandler>(&mut self, handler: &mut H) {
        let content_start = self.scanner.position();

        // `<!-->` and `<!--->` are complete (empty) comments
        for abrupt in [&b">"[..], &b"->"[..]] {
            if self.scanner.starts_with(abrupt) {
                self.scanner.advance(abrupt.len());
                handler.comment(Span::empty_at(content_start as u32));
                return;
            }
        }

        match self.scanner.find_sequence(b"-->") {
            Some(pos) => {
                self.scanner.set_position(pos + 3);
                handler.comment(Span::between(content_start, pos));
            }
            None => {
                // Unterminated comment runs to end of input
                self.scanner.set_position(self.input.len());
                handler.comment(Span::between(content_start, self.input.len()));
            }
        }
    }

    /// Scan a CDATA section; the cursor sits after `<![CDATA[`
    fn scan_cdata<H: ScanHandler>(&mut self, handler: &mut H) {
        let content_start = self.scanner.position();
        let content_end = self
            .scanner
            .find_sequence(b"]]>")
            .unwrap_or(self.input.len());

        if content_end > content_start {
            handler.raw_text(Span::between(content_start, content_end));
        }
        self.scanner.set_position(content_end + 3);
    }

    /// Scan DOCTYPE; the cursor sits on the `doctype` keyword
    fn scan_doctype<H: ScanHandler>(&mut self, handler: &mut H) {
        let start = self.scanner.position();
        let end = self.scanner.find_byte(b'>').unwrap_or(self.input.len());
        handler.doctype(Span::between(start, end));
        self.scanner.set_position(end + 1);
    }

    /// Skip to the end of a bogus comment (`<?...>`, `<!x...>`, `</1...>`)
    fn skip_bogus_comment(&mut self) {
        match self.scanner.find_byte(b'>') {
            Some(pos) => self.scanner.set_position(pos + 1),
            None => self.scanner.set_position(self.input.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test handler that records events as readable strings
    struct TestHandler<'a> {
        input: &'a [u8],
        events: Vec<String>,
    }

    impl<'a> TestHandler<'a> {
        fn run(input: &'a [u8]) -> Vec<String> {
            let mut handler = TestHandler {
                input,
                events: Vec::new(),
            };
            Tokenizer::new(input).scan(&mut handler);
            handler.events
        }

        fn s(&self, span: Span) -> String {
            String::from_utf8_lossy(span.slice(self.input)).into_owned()
        }
    }

    impl ScanHandler for TestHandler<'_> {
        fn start_element(&mut self, name: Span, attrs: &[Attribute], self_closing: bool, _tag: Span) {
            let mut event = format!("<{}", self.s(name));
            for attr in attrs {
                event.push(' ');
                event.push_str(&self.s(attr.name));
                if let Some(value) = attr.value {
                    event.push_str(&format!("={}", self.s(value)));
                }
            }
            event.push_str(if self_closing { "/>" } else { ">" });
            self.events.push(event);
        }

        fn end_element(&mut self, name: Span, _tag: Span) {
            let event = format!("</{}>", self.s(name));
            self.events.push(event);
        }

        fn text(&mut self, span: Span, needs_decode: bool) {
            let event = format!("text{}:{}", if needs_decode { "&" } else { "" }, self.s(span));
            self.events.push(event);
        }

        fn raw_text(&mut self, span: Span) {
            let event = format!("raw:{}", self.s(span));
            self.events.push(event);
        }

        fn comment(&mut self, span: Span) {
            let event = format!("comment:{}", self.s(span));
            self.events.push(event);
        }

        fn doctype(&mut self, _content: Span) {
            self.events.push("doctype".to_string());
        }
    }

    #[test]
    fn test_nested_elements_and_text() {
        let events = TestHandler::run(b"<div id=\"a\">Hi <b>there</b></div>");
        assert_eq!(
            events,
            vec!["<div id=a>", "text:Hi ", "<b>", "text:there", "</b>", "</div>"]
        );
    }

    #[test]
    fn test_entity_detection() {
        let events = TestHandler::run(b"<p>fish &amp; chips</p>");
        assert_eq!(events[1], "text&:fish &amp; chips");
    }

    #[test]
    fn test_stray_lt_stays_in_text() {
        let events = TestHandler::run(b"<p>1 < 2 <3</p>");
        assert_eq!(events, vec!["<p>", "text:1 < 2 <3", "</p>"]);
    }

    #[test]
    fn test_script_is_raw_text() {
        let events = TestHandler::run(b"<script>if (a<b) { x = '</div>'; }</SCRIPT>");
        assert_eq!(
            events,
            vec!["<script>", "raw:if (a<b) { x = '</div>'; }", "</SCRIPT>"]
        );

        let events = TestHandler::run(b"<style>a > b { color: red }</style><i>x</i>");
        assert_eq!(
            events,
            vec!["<style>", "raw:a > b { color: red }", "</style>", "<i>", "text:x", "</i>"]
        );
    }

    #[test]
    fn test_raw_text_end_tag_cut_off_at_eof() {
        let events = TestHandler::run(b"<style>a{}</style");
        assert_eq!(events, vec!["<style>", "raw:a{}</style"]);

        let events = TestHandler::run(b"<title>x</title");
        assert_eq!(events, vec!["<title>", "text:x</title"]);
    }

    #[test]
    fn test_title_is_escapable_raw_text() {
        let events = TestHandler::run(b"<title>A <b> &amp; B</title>");
        assert_eq!(events, vec!["<title>", "text&:A <b> &amp; B", "</title>"]);
    }

    #[test]
    fn test_comments_doctype_and_cdata() {
        let events = TestHandler::run(
            b"<!DOCTYPE html><!-- a -- b --><!--><?php x ?><p><![CDATA[<x>]]></p>",
        );
        assert_eq!(
            events,
            vec![
                "doctype",
                "comment: a -- b ",
                "comment:",
                "<p>",
                "raw:<x>",
                "</p>",
            ]
        );
    }

    #[test]
    fn test_unterminated_comment() {
        let events = TestHandler::run(b"<p>a<!-- never closed <b>");
        assert_eq!(events, vec!["<p>", "text:a", "comment: never closed <b>"]);
    }

    #[test]
    fn test_self_closing_and_end_tag_junk() {
        let events = TestHandler::run(b"<br/><img src=x /></p foo=\"bar\"></>");
        assert_eq!(events, vec!["<br/>", "<img src=x/>", "</p>"]);
    }

    #[test]
    fn test_invalid_markup_as_text() {
        let events = TestHandler::run(b"<1invalid/><good/>");
        assert_eq!(events, vec!["text:<1invalid/>", "<good/>"]);
    }

    #[test]
    fn test_eof_inside_start_tag_drops_it() {
        let events = TestHandler::run(b"<p>x<a href=\"y");
        assert_eq!(events, vec!["<p>", "text:x"]);
    }
}
