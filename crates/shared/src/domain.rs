use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Accepts either a JSON string or a JSON number and keeps its text form.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(text) => text,
            RawId::Int(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into()))
            }
        }
    };
}

id_newtype!(ProductId);
id_newtype!(CategoryId);
id_newtype!(OrderId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    None,
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// Ordering parameter value: bare field ascending, `-field` descending.
    pub fn ordering(self) -> Option<&'static str> {
        match self {
            SortKey::None => None,
            SortKey::PriceAsc => Some("price"),
            SortKey::PriceDesc => Some("-price"),
            SortKey::NameAsc => Some("name"),
            SortKey::NameDesc => Some("-name"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "Default",
            SortKey::PriceAsc => "Price: Low to High",
            SortKey::PriceDesc => "Price: High to Low",
            SortKey::NameAsc => "Name: A to Z",
            SortKey::NameDesc => "Name: Z to A",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" | "none" => Ok(SortKey::None),
            "price_asc" | "price" => Ok(SortKey::PriceAsc),
            "price_desc" | "-price" => Ok(SortKey::PriceDesc),
            "name_asc" | "name" => Ok(SortKey::NameAsc),
            "name_desc" | "-name" => Ok(SortKey::NameDesc),
            other => Err(format!("unknown sort key '{other}'")),
        }
    }
}
