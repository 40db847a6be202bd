//! Small helpers over quick-xml shared by every file we hand to SUMO

use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;

pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// A tab-indented document built element by element
pub struct XmlDocument {
    writer: Writer<Vec<u8>>,
}

impl XmlDocument {
    pub fn new() -> Result<Self> {
        let mut writer = Writer::new_with_indent(Vec::new(), b'\t', 1);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
        Ok(Self { writer })
    }

    /// Opens an element that will contain children
    pub fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attribute in attributes {
            start.push_attribute(*attribute);
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    /// Writes a self-closing element
    pub fn empty<S: AsRef<str>>(&mut self, name: &str, attributes: &[(&str, S)]) -> Result<()> {
        let mut element = BytesStart::new(name);
        for (key, value) in attributes {
            element.push_attribute((*key, value.as_ref()));
        }
        self.writer.write_event(Event::Empty(element))?;
        Ok(())
    }

    pub fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    pub fn finish(self) -> Result<String> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        String::from_utf8(bytes).context("Generated XML is not valid UTF-8")
    }
}

/// Writes `contents` to `path`, creating the parent directory if needed
pub fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Couldn't create directory {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("Couldn't write {}", path.display()))
}
