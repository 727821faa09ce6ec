//! Structured Move type tags.
//!
//! Type strings such as `0x2::transfer_policy::TransferPolicy<0xabc::sword::Sword>`
//! are parsed into a tree so that comparison is structural. Addresses are
//! normalized on parse, so `0x2::package::Publisher` and the full-width form
//! compare equal. No prefix or partial matching exists anywhere.
//!
//! Type strings come from the ledger, so parsing is bounded by
//! [`MAX_TYPE_DEPTH`] levels of nesting.

use crate::{IdentifierError, PackageId};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Deepest nesting of `vector<..>` and generic parameters accepted by the
/// parser. A bare type has depth one.
pub const MAX_TYPE_DEPTH: usize = 128;

/// A Move type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
}

/// A fully-qualified struct type with generic parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StructTag {
    pub address: PackageId,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

/// Errors produced while parsing or constructing type tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeTagError {
    #[error("Empty type tag")]
    Empty,

    #[error("Unexpected end of type tag")]
    UnexpectedEnd,

    #[error("Unexpected character {found:?} at position {position}")]
    Unexpected { position: usize, found: char },

    #[error("Invalid address in type tag: {0}")]
    InvalidAddress(#[from] IdentifierError),

    #[error("Invalid Move identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Unknown primitive type: {0}")]
    UnknownPrimitive(String),

    #[error("Expected a struct type, found {0}")]
    NotAStruct(String),

    #[error("Type tag nested deeper than {max} levels")]
    TooDeep { max: usize },
}

/// Check whether `s` is a valid Move identifier.
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if s == "_" {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl StructTag {
    /// Create a struct tag, validating module and type names.
    pub fn new(
        address: PackageId,
        module: impl Into<String>,
        name: impl Into<String>,
        type_params: Vec<TypeTag>,
    ) -> Result<Self, TypeTagError> {
        let module = module.into();
        let name = name.into();
        for ident in [&module, &name] {
            if !is_valid_identifier(ident) {
                return Err(TypeTagError::InvalidIdentifier(ident.clone()));
            }
        }
        Ok(Self {
            address,
            module,
            name,
            type_params,
        })
    }

    /// Whether this is the given `address::module::name`, ignoring type parameters.
    pub fn is_named(&self, address: PackageId, module: &str, name: &str) -> bool {
        self.address == address && self.module == module && self.name == name
    }

    /// Wrap into a [`TypeTag`].
    pub fn into_type_tag(self) -> TypeTag {
        TypeTag::Struct(Box::new(self))
    }
}

impl From<StructTag> for TypeTag {
    fn from(tag: StructTag) -> Self {
        tag.into_type_tag()
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_literal(),
            self.module,
            self.name
        )?;
        if !self.type_params.is_empty() {
            write!(f, "<")?;
            for (i, param) in self.type_params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", param)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{}>", inner),
            TypeTag::Struct(tag) => write!(f, "{}", tag),
        }
    }
}

impl FromStr for TypeTag {
    type Err = TypeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser::new(s);
        parser.skip_whitespace();
        if parser.at_end() {
            return Err(TypeTagError::Empty);
        }
        let tag = parser.type_tag()?;
        parser.finish()?;
        Ok(tag)
    }
}

impl FromStr for StructTag {
    type Err = TypeTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<TypeTag>()? {
            TypeTag::Struct(tag) => Ok(*tag),
            other => Err(TypeTagError::NotAStruct(other.to_string())),
        }
    }
}

macro_rules! string_serde {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_serde!(TypeTag);
string_serde!(StructTag);

struct Parser<'a> {
    input: &'a str,
    position: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            depth: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        let trimmed = rest.trim_start();
        self.position += rest.len() - trimmed.len();
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(token) {
            self.position += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), TypeTagError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> TypeTagError {
        match self.rest().chars().next() {
            Some(found) => TypeTagError::Unexpected {
                position: self.position,
                found,
            },
            None => TypeTagError::UnexpectedEnd,
        }
    }

    /// Read a run of identifier characters (also covers `0x…` literals).
    fn word(&mut self) -> Result<&'a str, TypeTagError> {
        self.skip_whitespace();
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.unexpected());
        }
        self.position += len;
        Ok(&rest[..len])
    }

    fn identifier(&mut self) -> Result<String, TypeTagError> {
        let word = self.word()?;
        if is_valid_identifier(word) {
            Ok(word.to_string())
        } else {
            Err(TypeTagError::InvalidIdentifier(word.to_string()))
        }
    }

    fn type_tag(&mut self) -> Result<TypeTag, TypeTagError> {
        if self.depth == MAX_TYPE_DEPTH {
            return Err(TypeTagError::TooDeep {
                max: MAX_TYPE_DEPTH,
            });
        }
        self.depth += 1;
        let tag = self.type_tag_at_depth();
        self.depth -= 1;
        tag
    }

    fn type_tag_at_depth(&mut self) -> Result<TypeTag, TypeTagError> {
        let word = self.word()?;
        self.skip_whitespace();
        if self.rest().starts_with("::") {
            let address = PackageId::from_hex_literal(word)?;
            return self.struct_tail(address).map(TypeTag::from);
        }
        match word {
            "bool" => Ok(TypeTag::Bool),
            "u8" => Ok(TypeTag::U8),
            "u16" => Ok(TypeTag::U16),
            "u32" => Ok(TypeTag::U32),
            "u64" => Ok(TypeTag::U64),
            "u128" => Ok(TypeTag::U128),
            "u256" => Ok(TypeTag::U256),
            "address" => Ok(TypeTag::Address),
            "signer" => Ok(TypeTag::Signer),
            "vector" => {
                self.expect("<")?;
                let inner = self.type_tag()?;
                self.expect(">")?;
                Ok(TypeTag::Vector(Box::new(inner)))
            }
            other => Err(TypeTagError::UnknownPrimitive(other.to_string())),
        }
    }

    fn struct_tail(&mut self, address: PackageId) -> Result<StructTag, TypeTagError> {
        self.expect("::")?;
        let module = self.identifier()?;
        self.expect("::")?;
        let name = self.identifier()?;

        let mut type_params = Vec::new();
        if self.eat("<") {
            loop {
                type_params.push(self.type_tag()?);
                if self.eat(",") {
                    continue;
                }
                self.expect(">")?;
                break;
            }
        }

        Ok(StructTag {
            address,
            module,
            name,
            type_params,
        })
    }

    fn finish(&mut self) -> Result<(), TypeTagError> {
        self.skip_whitespace();
        if self.at_end() {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_framework_struct() {
        let tag: StructTag = "0x2::package::Publisher".parse().unwrap();
        assert_eq!(tag.address, PackageId::SUI_FRAMEWORK);
        assert_eq!(tag.module, "package");
        assert_eq!(tag.name, "Publisher");
        assert!(tag.type_params.is_empty());
        assert_eq!(tag.to_string(), "0x2::package::Publisher");
    }

    #[test]
    fn test_short_and_full_addresses_compare_equal() {
        let short: StructTag = "0x2::package::Publisher".parse().unwrap();
        let full: StructTag =
            "0x0000000000000000000000000000000000000000000000000000000000000002::package::Publisher"
                .parse()
                .unwrap();
        assert_eq!(short, full);
    }

    #[test]
    fn test_parse_nested_generics() {
        let tag: TypeTag =
            "0x2::dynamic_field::Field<u64, vector<0x2::coin::Coin<0x2::sui::SUI>>>"
                .parse()
                .unwrap();
        let TypeTag::Struct(field) = &tag else {
            panic!("expected struct tag");
        };
        assert_eq!(field.type_params.len(), 2);
        assert_eq!(field.type_params[0], TypeTag::U64);
        assert_eq!(
            tag.to_string(),
            "0x2::dynamic_field::Field<u64, vector<0x2::coin::Coin<0x2::sui::SUI>>>"
        );
    }

    #[test]
    fn test_whitespace_tolerated() {
        let a: StructTag = "0x2::transfer_policy::TransferPolicy< 0xabc::sword::Sword >"
            .parse()
            .unwrap();
        let b: StructTag = "0x2::transfer_policy::TransferPolicy<0xabc::sword::Sword>"
            .parse()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_modules_are_different_types() {
        let a: StructTag = "0x2::package::Publisher".parse().unwrap();
        let b: StructTag = "0x2::other::Publisher".parse().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_type_params_participate_in_equality() {
        let a: StructTag = "0x2::transfer_policy::TransferPolicy<0xa::sword::Sword>"
            .parse()
            .unwrap();
        let b: StructTag = "0x2::transfer_policy::TransferPolicy<0xb::sword::Sword>"
            .parse()
            .unwrap();
        let bare: StructTag = "0x2::transfer_policy::TransferPolicy".parse().unwrap();
        assert_ne!(a, b);
        assert_ne!(a, bare);
        assert!(a.is_named(PackageId::SUI_FRAMEWORK, "transfer_policy", "TransferPolicy"));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<TypeTag>(), Err(TypeTagError::Empty));
        assert_eq!(
            "0x2::package".parse::<TypeTag>(),
            Err(TypeTagError::UnexpectedEnd)
        );
        assert!(matches!(
            "0x2::package::Publisher<".parse::<TypeTag>(),
            Err(TypeTagError::UnexpectedEnd)
        ));
        assert!(matches!(
            "0x2::package::Publisher extra".parse::<TypeTag>(),
            Err(TypeTagError::Unexpected { .. })
        ));
        assert_eq!(
            "float".parse::<TypeTag>(),
            Err(TypeTagError::UnknownPrimitive("float".to_string()))
        );
        assert_eq!(
            "u64".parse::<StructTag>(),
            Err(TypeTagError::NotAStruct("u64".to_string()))
        );
        assert!(matches!(
            "0xgg::m::T".parse::<TypeTag>(),
            Err(TypeTagError::InvalidAddress(_))
        ));
    }

    fn nested_vectors(levels: usize) -> String {
        format!("{}u8{}", "vector<".repeat(levels), ">".repeat(levels))
    }

    #[test]
    fn test_nesting_limit() {
        let deepest = nested_vectors(MAX_TYPE_DEPTH - 1).parse::<TypeTag>().unwrap();
        assert_eq!(deepest.to_string(), nested_vectors(MAX_TYPE_DEPTH - 1));

        assert_eq!(
            nested_vectors(MAX_TYPE_DEPTH).parse::<TypeTag>(),
            Err(TypeTagError::TooDeep {
                max: MAX_TYPE_DEPTH
            })
        );
    }

    #[test]
    fn test_hostile_nesting_is_rejected() {
        assert_eq!(
            nested_vectors(200_000).parse::<TypeTag>(),
            Err(TypeTagError::TooDeep {
                max: MAX_TYPE_DEPTH
            })
        );

        let generics = format!(
            "{}u8{}",
            "0x2::m::T<".repeat(200_000),
            ">".repeat(200_000)
        );
        assert!(matches!(
            generics.parse::<StructTag>(),
            Err(TypeTagError::TooDeep { .. })
        ));
    }

    #[test]
    fn test_identifier_validation() {
        assert!(is_valid_identifier("sword"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("Sword2"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("_"));
        assert!(!is_valid_identifier("2sword"));
        assert!(!is_valid_identifier("sw-ord"));
        assert_eq!(
            StructTag::new(PackageId::SUI_FRAMEWORK, "bad module", "T", vec![]),
            Err(TypeTagError::InvalidIdentifier("bad module".to_string()))
        );
    }
}
