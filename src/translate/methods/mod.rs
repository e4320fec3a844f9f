//! The built-in scalar translators, one narrow family of methods each.

mod array;
mod byte_array;
mod convert;
mod date_time;
mod fuzzy;
mod json;
mod like;
mod math;
mod network;
mod new_guid;
mod object_to_string;
mod random;
mod regex;
mod row_value;
mod string;
mod trigrams;

pub use array::ArrayTranslator;
pub use byte_array::ByteArrayMethodTranslator;
pub use convert::ConvertTranslator;
pub use date_time::DateTimeMethodTranslator;
pub use fuzzy::FuzzyStringMatchMethodTranslator;
pub use json::JsonDbFunctionsTranslator;
pub use like::LikeTranslator;
pub use math::MathTranslator;
pub use network::NetworkTranslator;
pub use new_guid::NewGuidTranslator;
pub use object_to_string::ObjectToStringTranslator;
pub use random::RandomTranslator;
pub use regex::RegexIsMatchTranslator;
pub use row_value::RowValueTranslator;
pub use string::StringMethodTranslator;
pub use trigrams::TrigramsMethodTranslator;
