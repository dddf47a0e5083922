//! Product extraction from page markup
//!
//! Each field is resolved independently:
//! - **identifier**: first inline element inside the product container, first
//!   run of decimal digits in its text
//! - **name**: full text of the title element, verbatim
//! - **price**: first grouped-thousands or bare number in the price element
//!
//! Elements are located with an exact element-kind + class lookup in
//! document order; the first match wins and later matches are never
//! consulted.

use crate::config::{ElementTarget, ExtractorConfig};
use crate::crawler::product::Product;
use regex::Regex;
use scraper::{ElementRef, Html};
use std::fmt;

/// Any run of decimal digits
const IDENTIFIER_PATTERN: &str = r"[0-9]+";

/// `123,456,789,000` or just `214`
const PRICE_PATTERN: &str = r"(\d{0,3},)*\d{1,3}";

/// A page from which no product could be composed
///
/// Holds whatever was resolved so the failing fields can be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub price: Option<String>,
}

impl ExtractionError {
    /// Comma separated list of the fields that did not resolve
    pub fn missing_fields(&self) -> String {
        [
            ("id", self.id.is_none()),
            ("name", self.name.is_none()),
            ("price", self.price.is_none()),
        ]
        .iter()
        .filter(|(_, missing)| *missing)
        .map(|(field, _)| *field)
        .collect::<Vec<_>>()
        .join(", ")
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to resolve {} (id: {:?}, name: {:?}, price: {:?})",
            self.missing_fields(),
            self.id,
            self.name,
            self.price
        )
    }
}

impl std::error::Error for ExtractionError {}

/// Extracts products from page markup using configured element targets
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    targets: ExtractorConfig,
    identifier_pattern: Regex,
    price_pattern: Regex,
}

impl ProductExtractor {
    /// Creates an extractor for the given targets
    pub fn new(targets: &ExtractorConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            targets: targets.clone(),
            identifier_pattern: Regex::new(IDENTIFIER_PATTERN)?,
            price_pattern: Regex::new(PRICE_PATTERN)?,
        })
    }

    /// Parses the markup and composes a product from it
    ///
    /// # Returns
    ///
    /// * `Ok(Product)` - All three fields resolved
    /// * `Err(ExtractionError)` - At least one field is missing
    ///
    /// # Example
    ///
    /// ```
    /// use product_parser::config::ExtractorConfig;
    /// use product_parser::crawler::ProductExtractor;
    ///
    /// let html = r#"<div class="shouhinmei"><span>SKU 12</span></div>
    ///     <h1 class="shouhin_name">Lamp</h1><span class="price">980</span>"#;
    /// let extractor = ProductExtractor::new(&ExtractorConfig::default()).unwrap();
    /// let product = extractor.extract(html).unwrap();
    /// assert_eq!(product.to_string(), r#"12,Lamp,"980""#);
    /// ```
    pub fn extract(&self, html: &str) -> Result<Product, ExtractionError> {
        let document = Html::parse_document(html);

        let id = self.extract_identifier(&document);
        let name = self.extract_name(&document);
        let price = self.extract_price(&document);

        match (id, name, price) {
            (Some(id), Some(name), Some(price)) => {
                Product::new(id, name.clone(), price.clone()).ok_or(ExtractionError {
                    id: Some(id),
                    name: Some(name),
                    price: Some(price),
                })
            }
            (id, name, price) => Err(ExtractionError { id, name, price }),
        }
    }

    /// First digit run inside the identifier element, if non-zero
    ///
    /// Runs that do not fit a signed 64-bit integer count as missing.
    fn extract_identifier(&self, document: &Html) -> Option<u64> {
        let target = &self.targets.identifier;
        let container = find_first_element(document, &target.container)?;
        let inner_name = target.inner_element.to_ascii_lowercase();

        let inner = container
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == inner_name)?;

        let text: String = inner.text().collect();
        let digits = self.identifier_pattern.find(&text)?;

        digits
            .as_str()
            .parse::<i64>()
            .ok()
            .and_then(|id| u64::try_from(id).ok())
            .filter(|id| *id != 0)
    }

    /// Inner text of the name element, untrimmed
    ///
    /// Character references are decoded by the HTML parser, so `A &amp; B`
    /// yields `A & B`.
    fn extract_name(&self, document: &Html) -> Option<String> {
        let element = find_first_element(document, &self.targets.name)?;
        let name: String = element.text().collect();
        Some(name).filter(|name| !name.is_empty())
    }

    /// Numeric portion of the price element text
    fn extract_price(&self, document: &Html) -> Option<String> {
        let element = find_first_element(document, &self.targets.price)?;
        let text: String = element.text().collect();
        self.price_pattern
            .find(&text)
            .map(|m| m.as_str().to_string())
            .filter(|price| !price.is_empty())
    }
}

/// Finds the first element of the given kind whose `class` attribute equals
/// the target class exactly
///
/// Traversal is depth-first in document order.
pub fn find_first_element<'a>(document: &'a Html, target: &ElementTarget) -> Option<ElementRef<'a>> {
    let element_name = target.element.to_ascii_lowercase();

    document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|element| {
            element.value().name() == element_name
                && element.value().attr("class") == Some(target.class.as_str())
        })
}
