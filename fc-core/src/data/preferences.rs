//! XML preferences store
//!
//! Holds the global settings. The element layout is fixed:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <settings>
//!     <!--documentation comment-->
//!     <farenheit>false</farenheit>
//!     <logger>hwmon0/pwm1</logger>
//!     <loggerinterval>60</loggerinterval>
//!     <names>
//!         <hwmon0_pwm1>CPU fan</hwmon0_pwm1>
//!     </names>
//! </settings>
//! ```
//!
//! Element text uses the same scalar inference as attribute reads. The
//! documentation comment is read back out of the existing file on every
//! rewrite so user edits to it survive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, info, warn};

use crate::attribute::Scalar;
use crate::constants::preferences::*;
use crate::data::overlay::is_xml_name;
use crate::data::{dir_writable, write_atomic};
use crate::data::GlobalSettings;
use fc_error::{FanConfigError, Result};

// Minimal element tree; only what the schema needs.
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

/// A parsed preferences document
#[derive(Debug, Clone, PartialEq)]
pub struct PreferencesDocument {
    pub settings: GlobalSettings,
    /// First comment directly inside the root element
    pub comment: Option<String>,
}

fn parse_tree(text: &str) -> std::result::Result<(Node, Option<String>), String> {
    // Untrimmed: display names keep their surrounding whitespace.
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<Node> = Vec::new();
    let mut root: Option<Node> = None;
    let mut comment: Option<String> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| format!("{} at byte {}", e, reader.buffer_position()))?;
        match event {
            Event::Start(e) => {
                if root.is_some() {
                    return Err("content after the root element".to_string());
                }
                stack.push(Node {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..Default::default()
                });
            }
            Event::Empty(e) => {
                let node = Node {
                    name: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                    ..Default::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None if root.is_none() => root = Some(node),
                    None => return Err("content after the root element".to_string()),
                }
            }
            Event::Text(t) => {
                let unescaped = t.unescape().map_err(|e| e.to_string())?;
                match stack.last_mut() {
                    Some(node) => node.text.push_str(&unescaped),
                    None if unescaped.trim().is_empty() => {}
                    None => return Err("text outside the root element".to_string()),
                }
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Comment(c) => {
                if stack.len() == 1 && comment.is_none() {
                    comment = Some(String::from_utf8_lossy(&c).into_owned());
                }
            }
            Event::End(_) => {
                let node = stack.pop().ok_or("unbalanced end tag")?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => root = Some(node),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of file".to_string());
    }
    let root = root.ok_or("missing root element")?;
    Ok((root, comment))
}

fn settings_from_tree(root: &Node) -> GlobalSettings {
    let mut settings = GlobalSettings::default();
    for child in &root.children {
        match child.name.as_str() {
            FAHRENHEIT => settings.use_fahrenheit = Scalar::parse(child.text.trim()).is_truthy(),
            LOGGER => {
                let fan = child.text.trim();
                settings.default_logger_fan = (!fan.is_empty()).then(|| fan.to_string());
            }
            LOGGER_INTERVAL => match Scalar::parse(child.text.trim()).as_i64() {
                Some(v) => settings.logger_interval_seconds = v,
                None => warn!(value = %child.text, "invalid loggerinterval, using default"),
            },
            NAMES => {
                settings.display_names = child
                    .children
                    .iter()
                    .map(|n| (n.name.clone(), n.text.clone()))
                    .collect();
            }
            other => debug!(element = other, "ignoring unknown preferences element"),
        }
    }
    settings
}

/// Parse preferences XML
pub fn parse(text: &str) -> std::result::Result<PreferencesDocument, String> {
    let (root, comment) = parse_tree(text)?;
    Ok(PreferencesDocument { settings: settings_from_tree(&root), comment })
}

fn write_leaf(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> quick_xml::Result<()> {
    if value.is_empty() {
        return writer.write_event(Event::Empty(BytesStart::new(name)));
    }
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

/// Render settings as a preferences document with `comment` inside the root.
pub fn render(settings: &GlobalSettings, comment: &str) -> quick_xml::Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some(ENCODING), None)))?;
    writer.write_event(Event::Start(BytesStart::new(ROOT)))?;
    writer.write_event(Event::Comment(BytesText::from_escaped(comment)))?;

    write_leaf(&mut writer, FAHRENHEIT, &Scalar::Bool(settings.use_fahrenheit).to_string())?;
    write_leaf(&mut writer, LOGGER, settings.default_logger_fan.as_deref().unwrap_or(""))?;
    write_leaf(&mut writer, LOGGER_INTERVAL, &settings.logger_interval_seconds.to_string())?;

    if settings.display_names.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(NAMES)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(NAMES)))?;
        for (key, name) in &settings.display_names {
            if !is_xml_name(key) {
                warn!(key = %key, "names key is not a valid element name, not saved");
                continue;
            }
            write_leaf(&mut writer, key, name)?;
        }
        writer.write_event(Event::End(BytesEnd::new(NAMES)))?;
    }

    writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
    let mut out = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    out.push('\n');
    Ok(out)
}

/// The preferences file on disk
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the settings. Malformed XML is fatal.
    pub fn load(&self) -> Result<GlobalSettings> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| FanConfigError::FileRead { path: self.path.clone(), source: e })?;
        let doc = parse(&text).map_err(|reason| FanConfigError::PreferencesParse {
            path: self.path.clone(),
            reason,
        })?;
        debug!(path = %self.path.display(), names = doc.settings.display_names.len(), "Loaded preferences");
        Ok(doc.settings)
    }

    /// Comment currently stored in the file, if it can be read.
    pub fn read_comment(&self) -> Option<String> {
        let text = fs::read_to_string(&self.path).ok()?;
        parse_tree(&text).ok()?.1
    }

    /// Rewrite the file, keeping the existing documentation comment.
    pub fn save(&self, settings: &GlobalSettings) -> Result<()> {
        let comment = self.read_comment().unwrap_or_else(|| DEFAULT_COMMENT.to_string());
        self.write(settings, &comment)
    }

    /// Create a fresh file with default settings when the containing
    /// directory is writable. Returns whether the file was created.
    pub fn create_default(&self) -> Result<bool> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !dir_writable(dir) {
            warn!(dir = %dir.display(), "Preferences directory not writable, using defaults");
            return Ok(false);
        }
        self.write(&GlobalSettings::default(), DEFAULT_COMMENT)?;
        info!(path = %self.path.display(), "Created default preferences file");
        Ok(true)
    }

    fn write(&self, settings: &GlobalSettings, comment: &str) -> Result<()> {
        let xml = render(settings, comment).map_err(|e| {
            FanConfigError::write(&self.path, io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
        })?;
        write_atomic(&self.path, xml.as_bytes())
    }
}
