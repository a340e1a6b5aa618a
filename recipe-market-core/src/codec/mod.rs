//! Tabular codec - catalog trees to and from delimited text
//!
//! A catalog file has one header row and one row per listing:
//!
//! ```text
//! ecosystem,packageName,name,displayName,description,category1,category2
//! maven,com.x:foo,foo,Foo Recipe,,Sub,Top
//! ```
//!
//! Decoding classifies header cells dynamically (see [`header`]) and installs
//! each row's listing under its category path. Encoding writes rows in
//! pre-order and only emits optional columns some listing actually uses.
//! `decode(encode(tree))` reproduces the tree, including listing order.

pub mod header;
mod reader;
mod writer;

pub use reader::MarketplaceReader;
pub use writer::MarketplaceWriter;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MarketplaceResult;
use crate::marketplace::{Category, RecipeMarketplace};

/// Cell delimiter of a catalog file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Semicolon,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
            Delimiter::Semicolon => b';',
        }
    }

    /// Guess the delimiter from the first line of `content`
    ///
    /// Picks whichever of comma, tab and semicolon occurs most often in the
    /// header line; comma wins ties and header lines with none of them.
    pub fn sniff(content: &str) -> Self {
        let header = content.split(['\n', '\r']).next().unwrap_or_default();
        let count = |d: Delimiter| header.bytes().filter(|b| *b == d.as_byte()).count();

        [Delimiter::Comma, Delimiter::Tab, Delimiter::Semicolon]
            .into_iter()
            .fold((Delimiter::Comma, 0), |best, candidate| {
                let n = count(candidate);
                if n > best.1 {
                    (candidate, n)
                } else {
                    best
                }
            })
            .0
    }
}

impl FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "," => Ok(Delimiter::Comma),
            "\t" => Ok(Delimiter::Tab),
            ";" => Ok(Delimiter::Semicolon),
            other => match other.to_lowercase().as_str() {
                "comma" => Ok(Delimiter::Comma),
                "tab" | "\\t" => Ok(Delimiter::Tab),
                "semicolon" => Ok(Delimiter::Semicolon),
                _ => Err(format!(
                    "Invalid delimiter: {s}. Expected comma, tab or semicolon"
                )),
            },
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Delimiter::Comma => "comma",
            Delimiter::Tab => "tab",
            Delimiter::Semicolon => "semicolon",
        };
        f.write_str(name)
    }
}

/// Decode catalog text with plain bundle identities
pub fn decode(content: &str) -> MarketplaceResult<RecipeMarketplace> {
    MarketplaceReader::new().read_str(content)
}

/// Encode a category tree as comma-delimited text
pub fn encode(category: &Category) -> MarketplaceResult<String> {
    MarketplaceWriter::new().write_string(category)
}
