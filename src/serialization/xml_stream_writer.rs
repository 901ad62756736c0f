use std::io::Write;

use super::TextStream;

/// An attribute or element body value.
///
/// Numeric variants are written in the same canonical form as
/// [`TextStream`]; text is XML-escaped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Double(f64),
    Text(&'a str),
}

impl From<i32> for Value<'_> {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value<'_> {
    fn from(v: u32) -> Self {
        Self::UInt(v)
    }
}

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<u64> for Value<'_> {
    fn from(v: u64) -> Self {
        Self::ULong(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Self::Text(v)
    }
}

/// A named attribute: `name="value"`.
pub type Attribute<'a> = (&'a str, Value<'a>);

#[doc = r#"
Indenting, escaping XML writer over a buffered [`TextStream`].

The writer keeps a stack of currently open element names; every call to
[`start_element`](Self::start_element) must be matched by a call to
[`end_element`](Self::end_element). Dropping the writer with open
elements force-closes them and raises a debug assertion, since that is a
caller bug rather than a data error. Element names must be non-empty and
contain no space; violations panic.
"#]
pub struct XmlStreamWriter<'a, W: Write> {
    stream: TextStream<'a, W>,
    element_stack: Vec<String>,
}

impl<'a, W: Write> XmlStreamWriter<'a, W> {
    /// Borrow a writable sink.
    pub fn new(device: &'a mut W) -> Self {
        Self {
            stream: TextStream::new(device),
            element_stack: Vec::new(),
        }
    }

    /// Write out everything buffered so far.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush()
    }

    /// Emit the XML 1.0 / UTF-8 prolog.
    pub fn start_document(&mut self) {
        self.stream
            .write_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    }

    /// Emit a `<!DOCTYPE ...>` declaration. The text is written raw.
    pub fn write_doctype(&mut self, doctype: &str) {
        self.stream.write_str("<!DOCTYPE ").write_str(doctype).write_str(">\n");
    }

    /// Open an element; must be matched by [`end_element`](Self::end_element).
    pub fn start_element(&mut self, name: &str, attrs: &[Attribute<'_>]) {
        check_name(name);

        self.write_indent();
        self.stream.write_char('<').write_str(name);
        self.write_attributes(attrs);
        self.stream.write_str(">\n");

        self.element_stack.push(name.to_owned());
    }

    /// Close the most recently opened element.
    ///
    /// The closing tag is indented at the depth that was current while the
    /// element was still open.
    pub fn end_element(&mut self) {
        if self.element_stack.is_empty() {
            debug_assert!(false, "end_element() without a matching start_element()");
            return;
        }

        self.write_indent();
        let name = self.element_stack.pop().unwrap_or_default();
        self.stream.write_str("</").write_str(&name).write_str(">\n");
    }

    /// Emit a self-closing element: `<name attr="..."/>`.
    pub fn element(&mut self, name: &str, attrs: &[Attribute<'_>]) {
        check_name(name);

        self.write_indent();
        self.stream.write_char('<').write_str(name);
        self.write_attributes(attrs);
        self.stream.write_str("/>\n");
    }

    /// Emit an element with a body: `<name attr="...">body</name>`.
    pub fn element_with_body(&mut self, name: &str, body: impl Into<Value<'a>>, attrs: &[Attribute<'_>]) {
        check_name(name);

        self.write_indent();
        self.stream.write_char('<').write_str(name);
        self.write_attributes(attrs);
        self.stream.write_char('>');
        self.write_value(body.into());
        self.stream.write_str("</").write_str(name).write_str(">\n");
    }

    /// Emit an element with a body, unless the body equals `default`, in
    /// which case nothing is written.
    pub fn element_with_default(
        &mut self,
        name: &str,
        body: impl Into<Value<'a>>,
        default: impl Into<Value<'a>>,
    ) {
        let body = body.into();
        if body == default.into() {
            return;
        }

        self.element_with_body(name, body, &[]);
    }

    /// Emit `<!-- text -->`. The text is written raw.
    pub fn comment(&mut self, text: &str) {
        self.write_indent();
        self.stream.write_str("<!-- ").write_str(text).write_str(" -->\n");
    }

    fn write_attributes(&mut self, attrs: &[Attribute<'_>]) {
        for (name, value) in attrs {
            self.stream.write_char(' ').write_str(name).write_str("=\"");
            self.write_value(*value);
            self.stream.write_char('"');
        }
    }

    fn write_value(&mut self, value: Value<'_>) {
        match value {
            Value::Int(v) => self.stream.write_i32(v),
            Value::UInt(v) => self.stream.write_u32(v),
            Value::Long(v) => self.stream.write_i64(v),
            Value::ULong(v) => self.stream.write_u64(v),
            Value::Double(v) => self.stream.write_f64(v),
            Value::Text(v) => self.stream.write_str(&escape(v)),
        };
    }

    fn write_indent(&mut self) {
        for _ in 0..self.element_stack.len() {
            self.stream.write_str("  ");
        }
    }
}

impl<W: Write> Drop for XmlStreamWriter<'_, W> {
    fn drop(&mut self) {
        let unbalanced = !self.element_stack.is_empty();
        while !self.element_stack.is_empty() {
            self.end_element();
        }

        if unbalanced && !std::thread::panicking() {
            debug_assert!(false, "missing calls to end_element()");
        }
    }
}

fn check_name(name: &str) {
    assert!(!name.is_empty(), "element name must not be empty");
    assert!(!name.contains(' '), "element name must not contain a space: {name:?}");
}

/// Escape text for use in attribute values and element bodies.
///
/// `<`, `>`, `&` and `"` become entities; characters below 0x20 other
/// than tab/LF/CR are not legal in XML 1.0 and are dropped; everything
/// else passes through as UTF-8.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            c if (c as u32) < 0x20 && c != '\t' && c != '\n' && c != '\r' => {}
            c => escaped.push(c),
        }
    }

    escaped
}
