//! Product record produced by a successful extraction

use std::fmt;
use std::num::NonZeroU64;

/// Header line written before records in a new output file
pub const CSV_HEADER: &str = "Id,Name,Price";

/// A product extracted from a page
///
/// A `Product` can only be built from a non-zero identifier within the signed
/// 64-bit range, a non-empty name and a non-empty price, so a value of this
/// type is always reportable and storable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Product {
    id: NonZeroU64,
    name: String,
    price: String,
}

impl Product {
    /// Builds a product, returning `None` if any field is missing
    ///
    /// The price is kept as text so that source formatting such as thousands
    /// separators survives untouched.
    pub fn new(id: u64, name: impl Into<String>, price: impl Into<String>) -> Option<Self> {
        i64::try_from(id).ok()?;
        let id = NonZeroU64::new(id)?;
        let name = name.into();
        let price = price.into();

        if name.is_empty() || price.is_empty() {
            return None;
        }

        Some(Self { id, name, price })
    }

    pub fn id(&self) -> u64 {
        self.id.get()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> &str {
        &self.price
    }
}

/// Renders the record as `Id,Name,"Price"`
///
/// The name is written unquoted and the price double-quoted, exactly as
/// earlier output files were laid out.
impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},\"{}\"", self.id, self.name, self.price)
    }
}
