use std::fs;
use std::io::Cursor;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::Config;
use crate::error::FeedError;
use crate::record::ProductVariantRecord;

pub const GOOGLE_NS: &str = "http://base.google.com/ns/1.0";
const FIELD_PREFIX: &str = "g:";
const MISSING_VALUE: &str = "None";

/// Renders collected records as an RSS 2.0 merchant feed.
pub struct FeedSerializer {
    title: String,
    description: String,
    currency: String,
}

impl FeedSerializer {
    pub fn new(title: &str, description: &str, currency: &str) -> Self {
        Self {
            title: title.to_owned(),
            description: description.to_owned(),
            currency: currency.to_owned(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.feed_title, &config.feed_description, &config.currency)
    }

    /// Serializes the whole feed document, declaration included.
    pub fn render(&self, records: &[ProductVariantRecord]) -> Result<Vec<u8>, FeedError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
        let rss = BytesStart::new("rss")
            .with_attributes([("version", "2.0"), ("xmlns:g", GOOGLE_NS)]);
        write(&mut writer, Event::Start(rss))?;
        write(&mut writer, Event::Start(BytesStart::new("channel")))?;
        write_text_element(&mut writer, "title", &self.title)?;
        write_text_element(&mut writer, "description", &self.description)?;

        for record in records {
            write(&mut writer, Event::Start(BytesStart::new("item")))?;
            for (name, value) in record.fields() {
                let tag = format!("{}{}", FIELD_PREFIX, name);
                let text = self.render_value(name, value);
                write_text_element(&mut writer, &tag, &text)?;
            }
            write(&mut writer, Event::End(BytesEnd::new("item")))?;
        }

        write(&mut writer, Event::End(BytesEnd::new("channel")))?;
        write(&mut writer, Event::End(BytesEnd::new("rss")))?;
        Ok(writer.into_inner().into_inner())
    }

    /// Writes the feed to `path`, replacing any previous file in one step.
    pub fn write_to(&self, path: &Path, records: &[ProductVariantRecord]) -> Result<(), FeedError> {
        let document = self.render(records)?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        fs::write(&tmp, &document)?;
        if let Err(e) = fs::rename(&tmp, path) {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::warn!("Failed to remove {}: {}", Path::new(&tmp).display(), cleanup);
            }
            return Err(e.into());
        }
        log::info!("Wrote {} items to {}", records.len(), path.display());
        Ok(())
    }

    fn render_value(&self, name: &str, value: Option<&str>) -> String {
        match value {
            None | Some("") => MISSING_VALUE.to_owned(),
            Some(v) if name == ProductVariantRecord::PRICE_FIELD => format!("{} {}", v, self.currency),
            Some(v) => v.to_owned(),
        }
    }
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event) -> Result<(), FeedError> {
    writer
        .write_event(event)
        .map_err(|e| FeedError::Xml(e.to_string()))
}

fn write_text_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    tag: &str,
    text: &str,
) -> Result<(), FeedError> {
    write(writer, Event::Start(BytesStart::new(tag)))?;
    write(writer, Event::Text(BytesText::new(text)))?;
    write(writer, Event::End(BytesEnd::new(tag)))
}
