//! Language-negotiated file resources
//!
//! One published name maps to several files keyed by language tag. Each
//! request is answered by the variant the client's `Accept-Language` picks,
//! falling back to the default language.

use std::collections::HashMap;
use std::sync::Arc;

use super::file::{FileRecord, FileResource};
use super::{Checked, NamesChecker, Resource, ResourceFactory, ResourceRequest, ResourceResponse};
use crate::error::ResourceError;
use crate::http::cache::CacheControl;
use crate::http::negotiation::{Negotiator, PreferenceNegotiator};

type Variants = Arc<HashMap<String, Arc<FileRecord>>>;

/// Publishes a set of language variants under one name
pub struct I18nFileResourceFactory {
    name: String,
    variants: Variants,
    default_language: String,
    default_record: Arc<FileRecord>,
    checker: Arc<NamesChecker>,
    negotiator: Arc<dyn Negotiator>,
    cache: CacheControl,
}

impl I18nFileResourceFactory {
    /// `default_language` must be one of the variant keys
    pub fn new(
        variants: HashMap<String, FileRecord>,
        default_language: &str,
        checker: Arc<NamesChecker>,
        name: &str,
    ) -> Result<Self, ResourceError> {
        let variants: Variants = Arc::new(
            variants
                .into_iter()
                .map(|(lang, record)| (lang, Arc::new(record)))
                .collect(),
        );
        let default_record = check_language(&variants, default_language)?;

        Ok(Self {
            name: name.to_string(),
            variants,
            default_language: default_language.to_string(),
            default_record,
            checker,
            negotiator: Arc::new(PreferenceNegotiator),
            cache: CacheControl::default(),
        })
    }

    #[must_use]
    pub fn with_negotiator(mut self, negotiator: Arc<dyn Negotiator>) -> Self {
        self.negotiator = negotiator;
        self
    }

    #[must_use]
    pub fn with_cache_control(mut self, cache: CacheControl) -> Self {
        self.cache = cache;
        self
    }

    pub fn available_languages(&self) -> Vec<&str> {
        sorted_languages(&self.variants)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Change the fallback language; unknown languages are rejected and
    /// leave the current default in place
    pub fn set_default_language(&mut self, language: &str) -> Result<(), ResourceError> {
        self.default_record = check_language(&self.variants, language)?;
        self.default_language = language.to_string();
        Ok(())
    }

    pub fn variant(&self, language: &str) -> Option<&Arc<FileRecord>> {
        self.variants.get(language)
    }

    /// Build the unchecked resource bound to `request`
    pub fn bind(&self, request: ResourceRequest) -> I18nFileResource {
        I18nFileResource {
            name: self.name.clone(),
            variants: Arc::clone(&self.variants),
            default_language: self.default_language.clone(),
            default_record: Arc::clone(&self.default_record),
            negotiator: Arc::clone(&self.negotiator),
            request,
            cache: self.cache,
        }
    }
}

impl ResourceFactory for I18nFileResourceFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(&self, request: ResourceRequest) -> Checked {
        Checked::new(Box::new(self.bind(request)), Arc::clone(&self.checker))
    }
}

/// Language variants bound to one request
pub struct I18nFileResource {
    name: String,
    variants: Variants,
    default_language: String,
    default_record: Arc<FileRecord>,
    negotiator: Arc<dyn Negotiator>,
    request: ResourceRequest,
    cache: CacheControl,
}

impl I18nFileResource {
    pub fn available_languages(&self) -> Vec<&str> {
        sorted_languages(&self.variants)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn set_default_language(&mut self, language: &str) -> Result<(), ResourceError> {
        self.default_record = check_language(&self.variants, language)?;
        self.default_language = language.to_string();
        Ok(())
    }

    /// The language this request is answered in
    pub fn select_language(&self) -> &str {
        self.negotiated()
            .map_or(self.default_language.as_str(), |(lang, _)| lang.as_str())
    }

    /// The file resource of the selected variant
    pub fn selected(&self) -> FileResource {
        let record = self
            .negotiated()
            .map_or(&self.default_record, |(_, record)| record);

        FileResource::new(
            self.name.clone(),
            Arc::clone(record),
            self.request.clone(),
            self.cache,
        )
    }

    /// The variant the negotiator picked, if it picked an existing one
    fn negotiated(&self) -> Option<(&String, &Arc<FileRecord>)> {
        let available = self.available_languages();
        let chosen = self.negotiator.negotiate(
            &available,
            &self.request.preferred_languages(),
            &self.request.preferred_charsets(),
        )?;
        self.variants.get_key_value(&chosen)
    }
}

impl Resource for I18nFileResource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self) -> ResourceResponse {
        self.selected().get()
    }

    fn head(&self) -> ResourceResponse {
        self.selected().head()
    }

    fn publish_traverse(&self, name: &str) -> Result<Box<dyn Resource>, ResourceError> {
        self.selected().publish_traverse(name)
    }
}

fn sorted_languages(variants: &HashMap<String, Arc<FileRecord>>) -> Vec<&str> {
    let mut languages: Vec<&str> = variants.keys().map(String::as_str).collect();
    languages.sort_unstable();
    languages
}

/// The record for `language`, or `InvalidLanguage` if there is none
fn check_language(
    variants: &HashMap<String, Arc<FileRecord>>,
    language: &str,
) -> Result<Arc<FileRecord>, ResourceError> {
    variants
        .get(language)
        .map(Arc::clone)
        .ok_or_else(|| ResourceError::InvalidLanguage {
            language: language.to_string(),
            available: sorted_languages(variants).join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::cache::ETagPolicy;
    use hyper::header::{ACCEPT_LANGUAGE, CONTENT_TYPE, ETAG, IF_NONE_MATCH};
    use hyper::StatusCode;

    const TEXT: &[u8] = b"test data\n";
    const HTML: &[u8] = b"<html><body>test</body></html>\n";
    const HTML_FR: &[u8] = b"<html><body>essai</body></html>\n";

    fn my_etag(_: Option<i64>, _: &[u8]) -> Option<String> {
        Some("myetag".to_string())
    }

    fn record(name: &str, data: &'static [u8]) -> FileRecord {
        let policy: &dyn ETagPolicy = &my_etag;
        FileRecord::from_parts(name, data, Some(1_000_000_000), Some(policy))
    }

    fn variants(en: (&str, &'static [u8]), fr: (&str, &'static [u8])) -> HashMap<String, FileRecord> {
        HashMap::from([
            ("en".to_string(), record(en.0, en.1)),
            ("fr".to_string(), record(fr.0, fr.1)),
        ])
    }

    fn three_languages() -> I18nFileResourceFactory {
        let variants = HashMap::from([
            ("en".to_string(), record("test.txt", TEXT)),
            ("lt".to_string(), record("test.txt", TEXT)),
            ("fr".to_string(), record("test.txt", TEXT)),
        ]);
        I18nFileResourceFactory::new(variants, "fr", Arc::new(NamesChecker::default()), "test").unwrap()
    }

    fn text_factory() -> I18nFileResourceFactory {
        I18nFileResourceFactory::new(
            variants(("test.txt", TEXT), ("test.txt", TEXT)),
            "en",
            Arc::new(NamesChecker::default()),
            "test",
        )
        .unwrap()
    }

    fn html_factory() -> I18nFileResourceFactory {
        I18nFileResourceFactory::new(
            variants(("test.html", HTML), ("test2.html", HTML_FR)),
            "en",
            Arc::new(NamesChecker::default()),
            "test",
        )
        .unwrap()
    }

    fn accepting(language: &str) -> ResourceRequest {
        ResourceRequest::default().with_header(ACCEPT_LANGUAGE, language)
    }

    #[test]
    fn test_default_language() {
        let factory = three_languages();
        assert_eq!(factory.default_language(), "fr");
        assert_eq!(factory.available_languages(), vec!["en", "fr", "lt"]);
    }

    #[test]
    fn test_set_default_language() {
        let mut factory = three_languages();
        factory.set_default_language("lt").unwrap();
        assert_eq!(factory.default_language(), "lt");
    }

    #[test]
    fn test_set_unknown_default_language() {
        let mut factory = three_languages();
        let err = factory.set_default_language("ru").unwrap_err();
        assert!(matches!(err, ResourceError::InvalidLanguage { ref language, .. } if language == "ru"));
        assert_eq!(factory.default_language(), "fr");
    }

    #[test]
    fn test_constructor_rejects_unknown_default() {
        let result = I18nFileResourceFactory::new(
            variants(("test.txt", TEXT), ("test.txt", TEXT)),
            "ru",
            Arc::new(NamesChecker::default()),
            "test",
        );
        assert!(matches!(result, Err(ResourceError::InvalidLanguage { .. })));
    }

    #[test]
    fn test_bound_resource_default_language() {
        let mut resource = three_languages().bind(ResourceRequest::default());
        assert_eq!(resource.default_language(), "fr");
        assert!(resource.set_default_language("ru").is_err());
        assert_eq!(resource.default_language(), "fr");
        resource.set_default_language("en").unwrap();
        assert_eq!(resource.select_language(), "en");
    }

    #[test]
    fn test_no_traversal() {
        let resource = text_factory().create(ResourceRequest::default());
        let err = resource.resource().publish_traverse("_testData").err();
        assert!(matches!(err, Some(ResourceError::NotFound { .. })));
        assert!(matches!(resource.traverse("_testData"), Err(ResourceError::NotFound { .. })));
    }

    #[test]
    fn test_file_get() {
        // No language preference: en
        let response = text_factory().create(ResourceRequest::default()).resource().get();
        assert_eq!(response.body().as_ref(), TEXT);
        assert_eq!(response.header(CONTENT_TYPE), Some("text/plain"));

        // Prefers lt, only en and fr exist: en
        let response = text_factory().create(accepting("lt")).resource().get();
        assert_eq!(response.body().as_ref(), TEXT);
        assert_eq!(response.header(CONTENT_TYPE), Some("text/plain"));

        // Prefers fr: fr
        let response = html_factory().create(accepting("fr")).resource().get();
        assert_eq!(response.body().as_ref(), HTML_FR);
        assert_eq!(response.header(CONTENT_TYPE), Some("text/html"));

        let response = html_factory().create(accepting("de, en;q=0.5")).resource().get();
        assert_eq!(response.body().as_ref(), HTML);
    }

    #[test]
    fn test_file_head() {
        let response = text_factory().create(ResourceRequest::default()).resource().head();
        assert!(response.body().is_empty());
        assert_eq!(response.header(CONTENT_TYPE), Some("text/plain"));

        let response = text_factory().create(accepting("lt")).resource().head();
        assert!(response.body().is_empty());
        assert_eq!(response.header(CONTENT_TYPE), Some("text/plain"));

        let response = html_factory().create(accepting("fr")).resource().head();
        assert!(response.body().is_empty());
        assert_eq!(response.header(CONTENT_TYPE), Some("text/html"));
    }

    #[test]
    fn test_conditional_get_on_variant() {
        let request = accepting("fr").with_header(IF_NONE_MATCH, "\"myetag\"");
        let response = html_factory().create(request).resource().get();
        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(response.header(ETAG), Some("\"myetag\""));
        assert!(response.body().is_empty());
    }

    struct Always(&'static str);

    impl Negotiator for Always {
        fn negotiate(&self, _: &[&str], _: &[String], _: &[String]) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    #[test]
    fn test_custom_negotiator() {
        let factory = html_factory().with_negotiator(Arc::new(Always("fr")));
        let resource = factory.bind(ResourceRequest::default());
        assert_eq!(resource.select_language(), "fr");
        assert_eq!(resource.get().body().as_ref(), HTML_FR);

        // A negotiator naming an unknown language falls back to the default
        let factory = html_factory().with_negotiator(Arc::new(Always("ja")));
        assert_eq!(factory.bind(ResourceRequest::default()).select_language(), "en");
    }

    #[test]
    fn test_variant_lookup() {
        let factory = html_factory();
        assert_eq!(factory.variant("fr").map(|r| r.content_type()), Some("text/html"));
        assert!(factory.variant("de").is_none());
    }
}
