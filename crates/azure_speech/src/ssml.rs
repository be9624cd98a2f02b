//! SSML document model
//!
//! A closed tree of markup nodes rooted at [`SsmlDocument`]. Parents own their
//! children outright; there is no sharing and no back reference.
//!
//! Rendering is deterministic: attributes are written in a fixed order, unset
//! optional attributes are left out, and all text and attribute values are
//! XML-escaped. Nesting is not validated locally; the service is the judge of
//! which element combinations it accepts.
//!
//! # Example
//!
//! ```
//! use azure_speech::ssml::{ExpressAs, SsmlDocument, Voice};
//!
//! let doc = SsmlDocument::new().with_lang("zh-CN").child(
//!     Voice::new("zh-CN-XiaomoNeural")
//!         .child(ExpressAs::new("calm").role("YoungAdultFemale").text("你好"))
//!         .child(ExpressAs::new("calm").role("OlderAdultMale").text("再见")),
//! );
//! assert!(doc.render().contains(r#"<mstts:express-as role="OlderAdultMale" style="calm">"#));
//! ```

use std::fmt;

use quick_xml::escape::escape;

pub const SSML_VERSION: &str = "1.0";
pub const SYNTHESIS_NAMESPACE: &str = "http://www.w3.org/2001/10/synthesis";
pub const MSTTS_NAMESPACE: &str = "http://www.w3.org/2001/mstts";
pub const DEFAULT_LANG: &str = "en-US";

/// Root `<speak>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsmlDocument {
    lang: String,
    children: Vec<SsmlNode>,
}

/// Any node that may appear below the document root
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SsmlNode {
    Voice(Voice),
    ExpressAs(ExpressAs),
    Lang(Lang),
    Prosody(Prosody),
    Emphasis(Emphasis),
    /// Literal text, escaped on output
    Text(String),
}

/// Audio post-processing applied to a voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceEffect {
    /// High-fidelity speech in cars, buses and other enclosed vehicles
    Car,
    /// Narrowband telephony; best with an 8kHz output format
    Telecom,
}

impl VoiceEffect {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Car => "eq_car",
            Self::Telecom => "eq_telecomhp8k",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmphasisLevel {
    Reduced,
    None,
    Moderate,
    Strong,
}

impl EmphasisLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reduced => "reduced",
            Self::None => "none",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
        }
    }
}

/// `<voice name="..">`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    name: String,
    effect: Option<VoiceEffect>,
    children: Vec<SsmlNode>,
}

/// `<mstts:express-as style="..">` speaking style and role-play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressAs {
    style: String,
    role: Option<String>,
    style_degree: Option<String>,
    children: Vec<SsmlNode>,
}

/// `<lang xml:lang="..">` language switch for multilingual voices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lang {
    lang: String,
    children: Vec<SsmlNode>,
}

/// `<prosody>` pitch, contour, range and rate adjustments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prosody {
    contour: Option<String>,
    pitch: Option<String>,
    rate: Option<String>,
    range: Option<String>,
    children: Vec<SsmlNode>,
}

/// `<emphasis>` word-level stress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Emphasis {
    level: Option<EmphasisLevel>,
    children: Vec<SsmlNode>,
}

macro_rules! impl_children {
    ($($ty:ty),+ $(,)?) => {$(
        impl $ty {
            /// Append a child node
            #[must_use]
            pub fn child(mut self, node: impl Into<SsmlNode>) -> Self {
                self.children.push(node.into());
                self
            }

            /// Append a literal text run
            #[must_use]
            pub fn text(self, text: impl Into<String>) -> Self {
                self.child(SsmlNode::Text(text.into()))
            }

            #[must_use]
            pub fn children(&self) -> &[SsmlNode] {
                &self.children
            }
        }
    )+};
}

impl_children!(SsmlDocument, Voice, ExpressAs, Lang, Prosody, Emphasis);

impl Default for SsmlDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SsmlDocument {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            children: Vec::new(),
        }
    }

    /// Set the document's `xml:lang`
    #[must_use]
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    #[must_use]
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// Render the document as SSML text
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(256);
        open_tag(
            &mut out,
            "speak",
            &[
                ("version", Some(SSML_VERSION)),
                ("xmlns", Some(SYNTHESIS_NAMESPACE)),
                ("xmlns:mstts", Some(MSTTS_NAMESPACE)),
                ("xml:lang", Some(self.lang.as_str())),
            ],
        );
        write_children(&mut out, &self.children);
        close_tag(&mut out, "speak");
        out
    }

    /// Render the document as a UTF-8 request body
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.render().into_bytes()
    }
}

impl fmt::Display for SsmlDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl SsmlNode {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }
}

impl Voice {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            effect: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub const fn effect(mut self, effect: VoiceEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ExpressAs {
    #[must_use]
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            role: None,
            style_degree: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    /// Style intensity, "0.01" to "2"
    #[must_use]
    pub fn style_degree(mut self, degree: impl Into<String>) -> Self {
        self.style_degree = Some(degree.into());
        self
    }
}

impl Lang {
    #[must_use]
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            children: Vec::new(),
        }
    }
}

impl Prosody {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contour(mut self, contour: impl Into<String>) -> Self {
        self.contour = Some(contour.into());
        self
    }

    #[must_use]
    pub fn pitch(mut self, pitch: impl Into<String>) -> Self {
        self.pitch = Some(pitch.into());
        self
    }

    #[must_use]
    pub fn rate(mut self, rate: impl Into<String>) -> Self {
        self.rate = Some(rate.into());
        self
    }

    #[must_use]
    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }
}

impl Emphasis {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn level(mut self, level: EmphasisLevel) -> Self {
        self.level = Some(level);
        self
    }
}

impl From<Voice> for SsmlNode {
    fn from(node: Voice) -> Self {
        Self::Voice(node)
    }
}

impl From<ExpressAs> for SsmlNode {
    fn from(node: ExpressAs) -> Self {
        Self::ExpressAs(node)
    }
}

impl From<Lang> for SsmlNode {
    fn from(node: Lang) -> Self {
        Self::Lang(node)
    }
}

impl From<Prosody> for SsmlNode {
    fn from(node: Prosody) -> Self {
        Self::Prosody(node)
    }
}

impl From<Emphasis> for SsmlNode {
    fn from(node: Emphasis) -> Self {
        Self::Emphasis(node)
    }
}

impl From<String> for SsmlNode {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for SsmlNode {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

fn open_tag(out: &mut String, name: &str, attributes: &[(&str, Option<&str>)]) {
    out.push('<');
    out.push_str(name);
    for &(key, value) in attributes {
        // Unset and empty attributes are omitted, never written as key=""
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            push_escaped(out, value, true);
            out.push('"');
        }
    }
    out.push('>');
}

/// XML 1.0 `Char` production; surrogates cannot occur in a `char`
const fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{FFFD}' | '\u{10000}'..)
}

/// Entity-escape `value`, replacing characters XML cannot carry with U+FFFD
///
/// Carriage returns are written as character references so parsers do not
/// normalize them away; inside attributes tabs and newlines are too.
fn push_escaped(out: &mut String, value: &str, in_attribute: bool) {
    let clean: String = value
        .chars()
        .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
        .collect();

    for c in escape(clean.as_str()).chars() {
        match c {
            '\r' => out.push_str("&#xD;"),
            '\n' if in_attribute => out.push_str("&#xA;"),
            '\t' if in_attribute => out.push_str("&#x9;"),
            c => out.push(c),
        }
    }
}

fn close_tag(out: &mut String, name: &str) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_children(out: &mut String, children: &[SsmlNode]) {
    for child in children {
        write_node(out, child);
    }
}

fn write_node(out: &mut String, node: &SsmlNode) {
    let (name, children) = match node {
        SsmlNode::Text(text) => {
            push_escaped(out, text, false);
            return;
        },
        SsmlNode::Voice(voice) => {
            open_tag(
                out,
                "voice",
                &[
                    ("name", Some(voice.name.as_str())),
                    ("effect", voice.effect.as_ref().map(VoiceEffect::as_str)),
                ],
            );
            ("voice", &voice.children)
        },
        SsmlNode::ExpressAs(express) => {
            open_tag(
                out,
                "mstts:express-as",
                &[
                    ("role", express.role.as_deref()),
                    ("style", Some(express.style.as_str())),
                    ("styledegree", express.style_degree.as_deref()),
                ],
            );
            ("mstts:express-as", &express.children)
        },
        SsmlNode::Lang(lang) => {
            open_tag(out, "lang", &[("xml:lang", Some(lang.lang.as_str()))]);
            ("lang", &lang.children)
        },
        SsmlNode::Prosody(prosody) => {
            open_tag(
                out,
                "prosody",
                &[
                    ("contour", prosody.contour.as_deref()),
                    ("pitch", prosody.pitch.as_deref()),
                    ("rate", prosody.rate.as_deref()),
                    ("range", prosody.range.as_deref()),
                ],
            );
            ("prosody", &prosody.children)
        },
        SsmlNode::Emphasis(emphasis) => {
            open_tag(
                out,
                "emphasis",
                &[("level", emphasis.level.as_ref().map(EmphasisLevel::as_str))],
            );
            ("emphasis", &emphasis.children)
        },
    };
    write_children(out, children);
    close_tag(out, name);
}
