//! Structural identities for methods and constructors.
//!
//! A method is identified by its declaring type, its name and its declared
//! parameter shape. Generic method definitions keep their open generic
//! parameters in the shape, so every closed instantiation of a definition
//! shares one [`MethodSignature`]. The methods translators care about form the
//! closed [`KnownMethod`] enumeration, built into a lookup table on first use.

use std::{collections::HashMap, sync::LazyLock};

use strum::IntoEnumIterator;

use crate::ast::SourceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaringType {
    Object,
    Enumerable,
    Array,
    List,
    HashSet,
    String,
    Math,
    Convert,
    Guid,
    Regex,
    DateTime,
    DateOnly,
    DbFunctionsExtensions,
    NpgsqlDbFunctionsExtensions,
    FuzzyStringMatchDbFunctionsExtensions,
    TrigramsDbFunctionsExtensions,
    NetworkDbFunctionsExtensions,
    JsonDbFunctionsExtensions,
    LTree,
    GeometryCombiner,
    ConvexHull,
    UnaryUnionOp,
    EnvelopeCombiner,
    Other(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub declaring_type: DeclaringType,
    pub name: String,
    /// Declared parameter types, excluding the receiver of instance methods.
    /// Open generic parameters appear as [`SourceType::GenericParameter`].
    pub parameters: Vec<SourceType>,
    pub generic_arity: usize,
}

impl MethodSignature {
    pub fn new(
        declaring_type: DeclaringType,
        name: impl Into<String>,
        parameters: Vec<SourceType>,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            parameters,
            generic_arity: 0,
        }
    }

    pub fn generic(
        declaring_type: DeclaringType,
        name: impl Into<String>,
        generic_arity: usize,
        parameters: Vec<SourceType>,
    ) -> Self {
        Self {
            declaring_type,
            name: name.into(),
            parameters,
            generic_arity,
        }
    }
}

/// A method as referenced by a call node: its signature plus, for generic
/// methods, the closing generic arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub signature: MethodSignature,
    pub generic_arguments: Vec<SourceType>,
    pub return_type: SourceType,
    pub is_static: bool,
}

impl MethodInfo {
    pub fn new_static(
        declaring_type: DeclaringType,
        name: impl Into<String>,
        parameters: Vec<SourceType>,
        return_type: SourceType,
    ) -> Self {
        Self {
            signature: MethodSignature::new(declaring_type, name, parameters),
            generic_arguments: Vec::new(),
            return_type,
            is_static: true,
        }
    }

    pub fn new_instance(
        declaring_type: DeclaringType,
        name: impl Into<String>,
        parameters: Vec<SourceType>,
        return_type: SourceType,
    ) -> Self {
        Self {
            is_static: false,
            ..Self::new_static(declaring_type, name, parameters, return_type)
        }
    }

    pub fn name(&self) -> &str {
        &self.signature.name
    }

    pub fn declaring_type(&self) -> DeclaringType {
        self.signature.declaring_type
    }

    pub fn parameter_count(&self) -> usize {
        self.signature.parameters.len()
    }

    /// Parameter types with generic arguments substituted.
    pub fn parameter_types(&self) -> Vec<SourceType> {
        self.signature
            .parameters
            .iter()
            .map(|p| p.substitute(&self.generic_arguments))
            .collect()
    }

    pub fn is_generic_method(&self) -> bool {
        !self.generic_arguments.is_empty()
    }

    /// True if this is a closed instantiation of the given generic definition.
    pub fn is_closed_form_of(&self, definition: &MethodSignature) -> bool {
        definition.generic_arity > 0
            && self.generic_arguments.len() == definition.generic_arity
            && &self.signature == definition
    }

    pub fn is(&self, known: KnownMethod) -> bool {
        KnownMethod::identify(self) == Some(known)
    }
}

/// Every method some translator in this crate recognizes by signature.
///
/// Methods with many overloads (math, `Convert`, `DateTime.AddXxx`,
/// `ToString`) are recognized by declaring type and name instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumIter)]
pub enum KnownMethod {
    EnumerableContains,
    EnumerableAnyWithoutPredicate,
    EnumerableAnyWithPredicate,
    EnumerableAll,
    EnumerableFirstWithoutPredicate,
    EnumerableFirstOrDefaultWithPredicate,
    EnumerableCountWithoutPredicate,
    EnumerableElementAt,
    EnumerableSequenceEqual,
    EnumerableAppend,
    EnumerableConcat,
    ArrayIndexOf,

    StringJoin,
    StringContains,
    StringStartsWith,
    StringEndsWith,
    StringIndexOf,
    StringReplace,
    StringToLower,
    StringToUpper,
    StringSubstringFrom,
    StringSubstring,
    StringTrim,
    StringTrimStart,
    StringTrimEnd,
    StringPadLeft,
    StringPadLeftWith,
    StringPadRight,
    StringPadRightWith,
    StringIsNullOrEmpty,
    StringIsNullOrWhiteSpace,

    ObjectEquals,
    Like,
    LikeWithEscape,
    ILike,
    ILikeWithEscape,
    Random,
    RowValueGreaterThan,
    RowValueGreaterThanOrEqual,
    RowValueLessThan,
    RowValueLessThanOrEqual,
    RegexIsMatch,
    RegexIsMatchWithOptions,
    GuidNewGuid,
    DateOnlyFromDateTime,

    FuzzyStringMatchSoundex,
    FuzzyStringMatchDifference,
    FuzzyStringMatchLevenshtein,
    FuzzyStringMatchMetaphone,
    FuzzyStringMatchDoubleMetaphone,

    TrigramsShow,
    TrigramsSimilarity,
    TrigramsWordSimilarity,
    TrigramsStrictWordSimilarity,
    TrigramsAreSimilar,
    TrigramsAreWordSimilar,
    TrigramsAreStrictWordSimilar,
    TrigramsSimilarityDistance,

    JsonContains,
    JsonContained,
    JsonExists,
    JsonExistAny,
    JsonExistAll,
    JsonTypeof,

    LTreeIsAncestorOf,
    LTreeIsDescendantOf,
    LTreeMatchesLQuery,
    LTreeMatchesLTxtQuery,
    LTreeSubtree,
    LTreeSubpathFrom,
    LTreeSubpath,
    LTreeIndex,
    LTreeLongestCommonAncestor,

    NetworkContainedBy,
    NetworkContainedByOrEqual,
    NetworkContains,
    NetworkContainsOrEqual,
    NetworkContainsOrContainedBy,
    NetworkAbbreviate,
    NetworkBroadcast,
    NetworkFamily,
    NetworkHost,
    NetworkHostMask,
    NetworkMaskLength,
    NetworkNetmask,
    NetworkNetwork,
    NetworkSetMaskLength,
    NetworkText,
    NetworkSameFamily,
    NetworkMerge,
    NetworkTruncate,
    NetworkSet7BitMac8,

    GeometryCombinerCombine,
    ConvexHullCreate,
    UnaryUnionOpUnion,
    EnvelopeCombinerCombineAsGeometry,
}

struct KnownDefinition {
    signature: MethodSignature,
    return_type: SourceType,
    is_static: bool,
}

static DEFINITIONS: LazyLock<HashMap<KnownMethod, KnownDefinition>> =
    LazyLock::new(|| KnownMethod::iter().map(|k| (k, k.define())).collect());

static BY_SIGNATURE: LazyLock<HashMap<MethodSignature, KnownMethod>> = LazyLock::new(|| {
    DEFINITIONS
        .iter()
        .map(|(known, def)| (def.signature.clone(), *known))
        .collect()
});

impl KnownMethod {
    /// Identifies a method by structural comparison of its signature. Generic
    /// definitions only match closed instantiations.
    pub fn identify(method: &MethodInfo) -> Option<KnownMethod> {
        let known = *BY_SIGNATURE.get(&method.signature)?;
        (method.generic_arguments.len() == method.signature.generic_arity).then_some(known)
    }

    pub fn signature(self) -> &'static MethodSignature {
        &DEFINITIONS[&self].signature
    }

    /// A closed instantiation of this method. Non-generic methods take no
    /// generic arguments.
    pub fn instantiate(self, generic_arguments: Vec<SourceType>) -> MethodInfo {
        let def = &DEFINITIONS[&self];
        assert_eq!(
            generic_arguments.len(),
            def.signature.generic_arity,
            "wrong number of generic arguments for {self}"
        );
        MethodInfo {
            signature: def.signature.clone(),
            return_type: def.return_type.substitute(&generic_arguments),
            generic_arguments,
            is_static: def.is_static,
        }
    }

    /// The method itself, for non-generic methods.
    pub fn method(self) -> MethodInfo {
        self.instantiate(Vec::new())
    }

    fn define(self) -> KnownDefinition {
        use DeclaringType as D;
        use KnownMethod as K;
        use SourceType as T;

        let t0 = || T::GenericParameter(0);
        let seq = |t: SourceType| T::Enumerable(Box::new(t));
        let predicate = || T::Func(vec![T::GenericParameter(0), T::Bool]);
        let strings = || T::Array(Box::new(T::String));

        let def = |declaring_type, name: &str, parameters, return_type, is_static| KnownDefinition {
            signature: MethodSignature::new(declaring_type, name, parameters),
            return_type,
            is_static,
        };
        let stat = |d, name: &str, parameters, ret| def(d, name, parameters, ret, true);
        let inst = |d, name: &str, parameters, ret| def(d, name, parameters, ret, false);
        let generic = |d, name: &str, parameters, ret| KnownDefinition {
            signature: MethodSignature::generic(d, name, 1, parameters),
            return_type: ret,
            is_static: true,
        };
        // EF.Functions extension methods take the functions receiver first.
        let func = |d, name: &str, mut parameters: Vec<SourceType>, ret| {
            parameters.insert(0, T::DbFunctions);
            def(d, name, parameters, ret, true)
        };
        let geometries = |d, name: &str| {
            stat(d, name, vec![seq(T::Geometry)], T::Geometry)
        };

        match self {
            K::EnumerableContains => {
                generic(D::Enumerable, "Contains", vec![seq(t0()), t0()], T::Bool)
            }
            K::EnumerableAnyWithoutPredicate => {
                generic(D::Enumerable, "Any", vec![seq(t0())], T::Bool)
            }
            K::EnumerableAnyWithPredicate => {
                generic(D::Enumerable, "Any", vec![seq(t0()), predicate()], T::Bool)
            }
            K::EnumerableAll => generic(D::Enumerable, "All", vec![seq(t0()), predicate()], T::Bool),
            K::EnumerableFirstWithoutPredicate => {
                generic(D::Enumerable, "First", vec![seq(t0())], t0())
            }
            K::EnumerableFirstOrDefaultWithPredicate => generic(
                D::Enumerable,
                "FirstOrDefault",
                vec![seq(t0()), predicate()],
                t0(),
            ),
            K::EnumerableCountWithoutPredicate => {
                generic(D::Enumerable, "Count", vec![seq(t0())], T::Int)
            }
            K::EnumerableElementAt => {
                generic(D::Enumerable, "ElementAt", vec![seq(t0()), T::Int], t0())
            }
            K::EnumerableSequenceEqual => generic(
                D::Enumerable,
                "SequenceEqual",
                vec![seq(t0()), seq(t0())],
                T::Bool,
            ),
            K::EnumerableAppend => {
                generic(D::Enumerable, "Append", vec![seq(t0()), t0()], seq(t0()))
            }
            K::EnumerableConcat => {
                generic(D::Enumerable, "Concat", vec![seq(t0()), seq(t0())], seq(t0()))
            }
            K::ArrayIndexOf => generic(
                D::Array,
                "IndexOf",
                vec![T::Array(Box::new(t0())), t0()],
                T::Int,
            ),

            K::StringJoin => stat(D::String, "Join", vec![T::String, seq(T::String)], T::String),
            K::StringContains => inst(D::String, "Contains", vec![T::String], T::Bool),
            K::StringStartsWith => inst(D::String, "StartsWith", vec![T::String], T::Bool),
            K::StringEndsWith => inst(D::String, "EndsWith", vec![T::String], T::Bool),
            K::StringIndexOf => inst(D::String, "IndexOf", vec![T::String], T::Int),
            K::StringReplace => {
                inst(D::String, "Replace", vec![T::String, T::String], T::String)
            }
            K::StringToLower => inst(D::String, "ToLower", vec![], T::String),
            K::StringToUpper => inst(D::String, "ToUpper", vec![], T::String),
            K::StringSubstringFrom => inst(D::String, "Substring", vec![T::Int], T::String),
            K::StringSubstring => inst(D::String, "Substring", vec![T::Int, T::Int], T::String),
            K::StringTrim => inst(D::String, "Trim", vec![], T::String),
            K::StringTrimStart => inst(D::String, "TrimStart", vec![], T::String),
            K::StringTrimEnd => inst(D::String, "TrimEnd", vec![], T::String),
            K::StringPadLeft => inst(D::String, "PadLeft", vec![T::Int], T::String),
            K::StringPadLeftWith => {
                inst(D::String, "PadLeft", vec![T::Int, T::Char], T::String)
            }
            K::StringPadRight => inst(D::String, "PadRight", vec![T::Int], T::String),
            K::StringPadRightWith => {
                inst(D::String, "PadRight", vec![T::Int, T::Char], T::String)
            }
            K::StringIsNullOrEmpty => stat(D::String, "IsNullOrEmpty", vec![T::String], T::Bool),
            K::StringIsNullOrWhiteSpace => {
                stat(D::String, "IsNullOrWhiteSpace", vec![T::String], T::Bool)
            }

            K::ObjectEquals => stat(D::Object, "Equals", vec![T::Object, T::Object], T::Bool),
            K::Like => func(
                D::DbFunctionsExtensions,
                "Like",
                vec![T::String, T::String],
                T::Bool,
            ),
            K::LikeWithEscape => func(
                D::DbFunctionsExtensions,
                "Like",
                vec![T::String, T::String, T::String],
                T::Bool,
            ),
            K::ILike => func(
                D::NpgsqlDbFunctionsExtensions,
                "ILike",
                vec![T::String, T::String],
                T::Bool,
            ),
            K::ILikeWithEscape => func(
                D::NpgsqlDbFunctionsExtensions,
                "ILike",
                vec![T::String, T::String, T::String],
                T::Bool,
            ),
            K::Random => func(D::DbFunctionsExtensions, "Random", vec![], T::Double),
            K::RowValueGreaterThan => func(
                D::NpgsqlDbFunctionsExtensions,
                "GreaterThan",
                vec![T::ITuple, T::ITuple],
                T::Bool,
            ),
            K::RowValueGreaterThanOrEqual => func(
                D::NpgsqlDbFunctionsExtensions,
                "GreaterThanOrEqual",
                vec![T::ITuple, T::ITuple],
                T::Bool,
            ),
            K::RowValueLessThan => func(
                D::NpgsqlDbFunctionsExtensions,
                "LessThan",
                vec![T::ITuple, T::ITuple],
                T::Bool,
            ),
            K::RowValueLessThanOrEqual => func(
                D::NpgsqlDbFunctionsExtensions,
                "LessThanOrEqual",
                vec![T::ITuple, T::ITuple],
                T::Bool,
            ),
            K::RegexIsMatch => stat(D::Regex, "IsMatch", vec![T::String, T::String], T::Bool),
            K::RegexIsMatchWithOptions => stat(
                D::Regex,
                "IsMatch",
                vec![T::String, T::String, T::RegexOptions],
                T::Bool,
            ),
            K::GuidNewGuid => stat(D::Guid, "NewGuid", vec![], T::Guid),
            K::DateOnlyFromDateTime => {
                stat(D::DateOnly, "FromDateTime", vec![T::DateTime], T::DateOnly)
            }

            K::FuzzyStringMatchSoundex => func(
                D::FuzzyStringMatchDbFunctionsExtensions,
                "FuzzyStringMatchSoundex",
                vec![T::String],
                T::String,
            ),
            K::FuzzyStringMatchDifference => func(
                D::FuzzyStringMatchDbFunctionsExtensions,
                "FuzzyStringMatchDifference",
                vec![T::String, T::String],
                T::Int,
            ),
            K::FuzzyStringMatchLevenshtein => func(
                D::FuzzyStringMatchDbFunctionsExtensions,
                "FuzzyStringMatchLevenshtein",
                vec![T::String, T::String],
                T::Int,
            ),
            K::FuzzyStringMatchMetaphone => func(
                D::FuzzyStringMatchDbFunctionsExtensions,
                "FuzzyStringMatchMetaphone",
                vec![T::String, T::Int],
                T::String,
            ),
            K::FuzzyStringMatchDoubleMetaphone => func(
                D::FuzzyStringMatchDbFunctionsExtensions,
                "FuzzyStringMatchDoubleMetaphone",
                vec![T::String],
                T::String,
            ),

            K::TrigramsShow => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsShow",
                vec![T::String],
                strings(),
            ),
            K::TrigramsSimilarity => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsSimilarity",
                vec![T::String, T::String],
                T::Double,
            ),
            K::TrigramsWordSimilarity => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsWordSimilarity",
                vec![T::String, T::String],
                T::Double,
            ),
            K::TrigramsStrictWordSimilarity => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsStrictWordSimilarity",
                vec![T::String, T::String],
                T::Double,
            ),
            K::TrigramsAreSimilar => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsAreSimilar",
                vec![T::String, T::String],
                T::Bool,
            ),
            K::TrigramsAreWordSimilar => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsAreWordSimilar",
                vec![T::String, T::String],
                T::Bool,
            ),
            K::TrigramsAreStrictWordSimilar => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsAreStrictWordSimilar",
                vec![T::String, T::String],
                T::Bool,
            ),
            K::TrigramsSimilarityDistance => func(
                D::TrigramsDbFunctionsExtensions,
                "TrigramsSimilarityDistance",
                vec![T::String, T::String],
                T::Double,
            ),

            K::JsonContains => func(
                D::JsonDbFunctionsExtensions,
                "JsonContains",
                vec![T::Object, T::Object],
                T::Bool,
            ),
            K::JsonContained => func(
                D::JsonDbFunctionsExtensions,
                "JsonContained",
                vec![T::Object, T::Object],
                T::Bool,
            ),
            K::JsonExists => func(
                D::JsonDbFunctionsExtensions,
                "JsonExists",
                vec![T::Object, T::String],
                T::Bool,
            ),
            K::JsonExistAny => func(
                D::JsonDbFunctionsExtensions,
                "JsonExistAny",
                vec![T::Object, strings()],
                T::Bool,
            ),
            K::JsonExistAll => func(
                D::JsonDbFunctionsExtensions,
                "JsonExistAll",
                vec![T::Object, strings()],
                T::Bool,
            ),
            K::JsonTypeof => func(
                D::JsonDbFunctionsExtensions,
                "JsonTypeof",
                vec![T::Object],
                T::String,
            ),

            K::LTreeIsAncestorOf => inst(D::LTree, "IsAncestorOf", vec![T::LTree], T::Bool),
            K::LTreeIsDescendantOf => inst(D::LTree, "IsDescendantOf", vec![T::LTree], T::Bool),
            K::LTreeMatchesLQuery => inst(D::LTree, "MatchesLQuery", vec![T::LQuery], T::Bool),
            K::LTreeMatchesLTxtQuery => {
                inst(D::LTree, "MatchesLTxtQuery", vec![T::LTxtQuery], T::Bool)
            }
            K::LTreeSubtree => inst(D::LTree, "Subtree", vec![T::Int, T::Int], T::LTree),
            K::LTreeSubpathFrom => inst(D::LTree, "Subpath", vec![T::Int], T::LTree),
            K::LTreeSubpath => inst(D::LTree, "Subpath", vec![T::Int, T::Int], T::LTree),
            K::LTreeIndex => inst(D::LTree, "Index", vec![T::LTree], T::Int),
            K::LTreeLongestCommonAncestor => stat(
                D::LTree,
                "LongestCommonAncestor",
                vec![T::Array(Box::new(T::LTree))],
                T::LTree,
            ),

            K::NetworkContainedBy => network(func, "ContainedBy", 2, T::Bool),
            K::NetworkContainedByOrEqual => network(func, "ContainedByOrEqual", 2, T::Bool),
            K::NetworkContains => network(func, "Contains", 2, T::Bool),
            K::NetworkContainsOrEqual => network(func, "ContainsOrEqual", 2, T::Bool),
            K::NetworkContainsOrContainedBy => {
                network(func, "ContainsOrContainedBy", 2, T::Bool)
            }
            K::NetworkAbbreviate => network(func, "Abbreviate", 1, T::String),
            K::NetworkBroadcast => network(func, "Broadcast", 1, T::IPAddress),
            K::NetworkFamily => network(func, "Family", 1, T::Int),
            K::NetworkHost => network(func, "Host", 1, T::String),
            K::NetworkHostMask => network(func, "HostMask", 1, T::IPAddress),
            K::NetworkMaskLength => network(func, "MaskLength", 1, T::Int),
            K::NetworkNetmask => network(func, "Netmask", 1, T::IPAddress),
            K::NetworkNetwork => network(func, "Network", 1, T::IPAddress),
            K::NetworkSetMaskLength => func(
                D::NetworkDbFunctionsExtensions,
                "SetMaskLength",
                vec![T::IPAddress, T::Int],
                T::IPAddress,
            ),
            K::NetworkText => network(func, "Text", 1, T::String),
            K::NetworkSameFamily => network(func, "SameFamily", 2, T::Bool),
            K::NetworkMerge => network(func, "Merge", 2, T::IPAddress),
            K::NetworkTruncate => func(
                D::NetworkDbFunctionsExtensions,
                "Truncate",
                vec![T::PhysicalAddress],
                T::PhysicalAddress,
            ),
            K::NetworkSet7BitMac8 => func(
                D::NetworkDbFunctionsExtensions,
                "Set7BitMac8",
                vec![T::PhysicalAddress],
                T::PhysicalAddress,
            ),

            K::GeometryCombinerCombine => geometries(D::GeometryCombiner, "Combine"),
            K::ConvexHullCreate => geometries(D::ConvexHull, "Create"),
            K::UnaryUnionOpUnion => geometries(D::UnaryUnionOp, "Union"),
            K::EnvelopeCombinerCombineAsGeometry => {
                geometries(D::EnvelopeCombiner, "CombineAsGeometry")
            }
        }
    }
}

fn network(
    func: impl Fn(DeclaringType, &str, Vec<SourceType>, SourceType) -> KnownDefinition,
    name: &str,
    addresses: usize,
    return_type: SourceType,
) -> KnownDefinition {
    func(
        DeclaringType::NetworkDbFunctionsExtensions,
        name,
        vec![SourceType::IPAddress; addresses],
        return_type,
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructorInfo {
    pub declaring_type: SourceType,
    pub parameters: Vec<SourceType>,
}

impl ConstructorInfo {
    pub fn new(declaring_type: SourceType, parameters: Vec<SourceType>) -> Self {
        Self {
            declaring_type,
            parameters,
        }
    }

    /// The positional constructor of a value tuple with the given element types.
    pub fn tuple(elements: Vec<SourceType>) -> Self {
        Self::new(SourceType::Tuple(elements.clone()), elements)
    }
}

/// `new DateTime(year, month, day)`
pub static DATE_TIME_YMD: LazyLock<ConstructorInfo> =
    LazyLock::new(|| ConstructorInfo::new(SourceType::DateTime, vec![SourceType::Int; 3]));

/// `new DateTime(year, month, day, hour, minute, second)`
pub static DATE_TIME_YMDHMS: LazyLock<ConstructorInfo> =
    LazyLock::new(|| ConstructorInfo::new(SourceType::DateTime, vec![SourceType::Int; 6]));

/// `new DateTime(year, month, day, hour, minute, second, kind)`
pub static DATE_TIME_YMDHMS_KIND: LazyLock<ConstructorInfo> = LazyLock::new(|| {
    let mut parameters = vec![SourceType::Int; 6];
    parameters.push(SourceType::DateTimeKind);
    ConstructorInfo::new(SourceType::DateTime, parameters)
});

/// `new DateOnly(year, month, day)`
pub static DATE_ONLY_YMD: LazyLock<ConstructorInfo> =
    LazyLock::new(|| ConstructorInfo::new(SourceType::DateOnly, vec![SourceType::Int; 3]));
