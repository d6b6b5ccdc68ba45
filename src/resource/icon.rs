//! Icon views
//!
//! Renders an `<img>` tag pointing at a published image resource.

use super::url::{resource_url, SiteUrls};

/// Describes one icon; cheap to clone into views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconViewFactory {
    rname: String,
    alt: String,
    width: u32,
    height: u32,
}

impl IconViewFactory {
    pub fn new(rname: impl Into<String>, alt: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            rname: rname.into(),
            alt: alt.into(),
            width,
            height,
        }
    }

    pub fn create(&self) -> IconView {
        IconView {
            rname: self.rname.clone(),
            alt: self.alt.clone(),
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconView {
    rname: String,
    alt: String,
    width: u32,
    height: u32,
}

impl IconView {
    /// Name of the image resource
    pub fn resource_name(&self) -> &str {
        &self.rname
    }

    pub fn url(&self, site: &dyn SiteUrls) -> String {
        resource_url(&self.rname, site)
    }

    pub fn render(&self, site: &dyn SiteUrls) -> String {
        format!(
            r#"<img src="{}" alt="{}" width="{}" height="{}" border="0" />"#,
            escape_attr(&self.url(site)),
            escape_attr(&self.alt),
            self.width,
            self.height,
        )
    }
}

/// Escape text for a double-quoted HTML attribute
fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::url::StaticSite;

    #[test]
    fn test_render() {
        let site = StaticSite::new("http://127.0.0.1", None);
        let view = IconViewFactory::new("++resource++book.png", "Book", 16, 16).create();

        assert_eq!(view.resource_name(), "++resource++book.png");
        assert_eq!(view.url(&site), "http://127.0.0.1/@@/book.png");
        assert_eq!(
            view.render(&site),
            r#"<img src="http://127.0.0.1/@@/book.png" alt="Book" width="16" height="16" border="0" />"#
        );
    }

    #[test]
    fn test_render_escapes_alt() {
        let site = StaticSite::new("http://127.0.0.1", None);
        let view = IconViewFactory::new("x.png", "Tom & \"Jerry\" <3", 1, 2).create();
        assert!(view
            .render(&site)
            .contains(r#"alt="Tom &amp; &quot;Jerry&quot; &lt;3""#));
    }
}
