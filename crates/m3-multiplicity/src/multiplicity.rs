//! Multiplicity values
//!
//! A multiplicity is either concrete, with a lower bound and an optional upper bound
//! (`None` meaning unbounded), or a named parameter still awaiting resolution.
//!
//! Surface forms: `[1]`, `[0..1]`, `[*]`, `[1..*]`, `[2..10]`, `[m]`.

use m3_diagnostics::SourceLocation;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::{MultiplicityError, MultiplicityResult};

/// `[1]`
pub static PURE_ONE: Multiplicity = Multiplicity::well_known(1, Some(1));
/// `[0..1]`
pub static ZERO_ONE: Multiplicity = Multiplicity::well_known(0, Some(1));
/// `[*]`
pub static ZERO_MANY: Multiplicity = Multiplicity::well_known(0, None);
/// `[1..*]`
pub static ONE_MANY: Multiplicity = Multiplicity::well_known(1, None);
/// `[0]`
pub static PURE_ZERO: Multiplicity = Multiplicity::well_known(0, Some(0));

/// Numeric bounds of a concrete multiplicity
///
/// Invariant: `lower <= upper` whenever an upper bound is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoundsRepr")]
pub struct Bounds {
    lower: u32,
    upper: Option<u32>,
}

#[derive(Deserialize)]
struct BoundsRepr {
    lower: u32,
    upper: Option<u32>,
}

impl TryFrom<BoundsRepr> for Bounds {
    type Error = MultiplicityError;

    fn try_from(repr: BoundsRepr) -> Result<Self, Self::Error> {
        Bounds::new(repr.lower, repr.upper)
    }
}

impl Bounds {
    /// Create bounds, checking `lower <= upper`
    pub fn new(lower: u32, upper: Option<u32>) -> MultiplicityResult<Self> {
        match upper {
            Some(upper) if lower > upper => Err(MultiplicityError::Invalid {
                literal: format!("{}..{}", lower, upper),
                reason: "lower bound exceeds upper bound",
                location: None,
            }),
            _ => Ok(Self { lower, upper }),
        }
    }

    /// The lower bound
    pub const fn lower(&self) -> u32 {
        self.lower
    }

    /// The upper bound, `None` when unbounded
    pub const fn upper(&self) -> Option<u32> {
        self.upper
    }

    /// Check if there is no upper bound
    pub const fn is_unbounded(&self) -> bool {
        self.upper.is_none()
    }

    /// Check if these are the bounds of `[*]`
    pub const fn is_zero_many(&self) -> bool {
        self.lower == 0 && self.upper.is_none()
    }

    /// Check if every count valid for `other` is valid for `self`
    pub fn subsumes(&self, other: &Bounds) -> bool {
        other.lower >= self.lower
            && match (self.upper, other.upper) {
                (None, _) => true,
                (Some(_), None) => false,
                (Some(upper), Some(other_upper)) => other_upper <= upper,
            }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (lower, Some(upper)) if lower == upper => write!(f, "{}", lower),
            (0, None) => write!(f, "*"),
            (lower, None) => write!(f, "{}..*", lower),
            (lower, Some(upper)) => write!(f, "{}..{}", lower, upper),
        }
    }
}

/// The shape of a multiplicity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MultiplicityKind {
    /// Numeric bounds
    Concrete(Bounds),
    /// A named multiplicity parameter, e.g. the `m` of `function f<|m>(x: T[m])`
    Parameterized { name: String },
}

/// A cardinality constraint on a property or parameter
///
/// Equality and hashing ignore the source location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Multiplicity {
    kind: MultiplicityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<SourceLocation>,
}

impl Multiplicity {
    const fn well_known(lower: u32, upper: Option<u32>) -> Self {
        Self {
            kind: MultiplicityKind::Concrete(Bounds { lower, upper }),
            location: None,
        }
    }

    // === Constructors ===

    /// Create `[n]`
    pub fn fixed(n: u32) -> Self {
        Self::from_bounds(Bounds {
            lower: n,
            upper: Some(n),
        })
    }

    /// Create `[lower..upper]`
    pub fn range(lower: u32, upper: u32) -> MultiplicityResult<Self> {
        Bounds::new(lower, Some(upper)).map(Self::from_bounds)
    }

    /// Create `[lower..*]`
    pub fn unbounded(lower: u32) -> Self {
        Self::from_bounds(Bounds { lower, upper: None })
    }

    /// Create a multiplicity from raw, possibly out-of-range, integer bounds
    pub fn new(lower: i64, upper: Option<i64>) -> MultiplicityResult<Self> {
        let invalid = |reason| MultiplicityError::Invalid {
            literal: match upper {
                Some(upper) => format!("{}..{}", lower, upper),
                None => format!("{}..*", lower),
            },
            reason,
            location: None,
        };

        if lower < 0 {
            return Err(invalid("lower bound is negative"));
        }
        let lower = u32::try_from(lower).map_err(|_| invalid("lower bound is out of range"))?;
        let upper = match upper {
            Some(upper) if upper < 0 => return Err(invalid("upper bound is negative")),
            Some(upper) => {
                Some(u32::try_from(upper).map_err(|_| invalid("upper bound is out of range"))?)
            }
            None => None,
        };
        if upper.is_some_and(|upper| lower > upper) {
            return Err(invalid("lower bound exceeds upper bound"));
        }
        Ok(Self::from_bounds(Bounds { lower, upper }))
    }

    /// Create a multiplicity bound to the parameter `name`
    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            kind: MultiplicityKind::Parameterized { name: name.into() },
            location: None,
        }
    }

    /// Create a concrete multiplicity from checked bounds
    pub fn from_bounds(bounds: Bounds) -> Self {
        Self {
            kind: MultiplicityKind::Concrete(bounds),
            location: None,
        }
    }

    /// Attach the source location of the declaration
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    // === Properties ===

    /// The shape of this multiplicity
    pub fn kind(&self) -> &MultiplicityKind {
        &self.kind
    }

    /// Source location, if the multiplicity came from a declaration
    pub fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Numeric bounds, `None` for a parameter
    pub fn bounds(&self) -> Option<Bounds> {
        match &self.kind {
            MultiplicityKind::Concrete(bounds) => Some(*bounds),
            MultiplicityKind::Parameterized { .. } => None,
        }
    }

    /// Numeric bounds, failing for a parameter
    pub fn concrete_bounds(&self) -> MultiplicityResult<Bounds> {
        self.bounds().ok_or_else(|| MultiplicityError::NonConcrete {
            multiplicity: self.print(true),
        })
    }

    /// Parameter name, `None` for a concrete multiplicity
    pub fn parameter_name(&self) -> Option<&str> {
        match &self.kind {
            MultiplicityKind::Parameterized { name } => Some(name),
            MultiplicityKind::Concrete(_) => None,
        }
    }

    /// Check if this multiplicity has numeric bounds
    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, MultiplicityKind::Concrete(_))
    }

    /// Check if this is `[1]`, or also `[0..1]` when `strict` is false
    pub fn is_to_one(&self, strict: bool) -> bool {
        match self.bounds() {
            Some(Bounds {
                lower: 1,
                upper: Some(1),
            }) => true,
            Some(Bounds {
                lower: 0,
                upper: Some(1),
            }) => !strict,
            _ => false,
        }
    }

    /// Check if more than one value is allowed
    pub fn is_to_many(&self) -> bool {
        self.bounds()
            .is_some_and(|b| b.upper.is_none_or(|upper| upper > 1))
    }

    /// Check if this is `[0]`
    pub fn is_zero(&self) -> bool {
        self.bounds() == Some(Bounds {
            lower: 0,
            upper: Some(0),
        })
    }

    /// Check if the upper bound is unbounded
    pub fn is_infinite(&self) -> bool {
        self.bounds().is_some_and(|b| b.is_unbounded())
    }

    // === Algebra ===

    /// Check if every count valid for `value` is valid for `self`
    ///
    /// Both operands must be concrete.
    pub fn subsumes(&self, value: &Multiplicity) -> MultiplicityResult<bool> {
        Ok(self.concrete_bounds()?.subsumes(&value.concrete_bounds()?))
    }

    /// Compare two multiplicities
    ///
    /// Concrete multiplicities compare by bounds. Two parameters are equal only when
    /// their names match and `strict_parameters` is set; without it no parameter is
    /// considered equal to anything, itself included.
    pub fn equals(&self, other: &Multiplicity, strict_parameters: bool) -> bool {
        match (&self.kind, &other.kind) {
            (MultiplicityKind::Concrete(a), MultiplicityKind::Concrete(b)) => a == b,
            (
                MultiplicityKind::Parameterized { name: a },
                MultiplicityKind::Parameterized { name: b },
            ) => strict_parameters && a == b,
            _ => false,
        }
    }

    /// Check if `self` is one of the shared well-known instances
    pub fn is_well_known_instance(&self) -> bool {
        [&PURE_ONE, &ZERO_ONE, &ZERO_MANY, &ONE_MANY, &PURE_ZERO]
            .into_iter()
            .any(|known| std::ptr::eq(known, self))
    }

    /// Copy this multiplicity
    ///
    /// The well-known instances are returned as they are.
    pub fn copy(&self, preserve_location: bool) -> Cow<'_, Multiplicity> {
        if self.is_well_known_instance() {
            return Cow::Borrowed(self);
        }
        Cow::Owned(Self {
            kind: self.kind.clone(),
            location: if preserve_location {
                self.location.clone()
            } else {
                None
            },
        })
    }

    // === Printing ===

    /// Canonical text, optionally wrapped in brackets
    pub fn print(&self, bracketed: bool) -> String {
        let body = match &self.kind {
            MultiplicityKind::Concrete(bounds) => bounds.to_string(),
            MultiplicityKind::Parameterized { name } => name.clone(),
        };
        if bracketed {
            format!("[{}]", body)
        } else {
            body
        }
    }

    /// Identifier-safe encoding used in function signatures
    pub fn signature_string(&self) -> String {
        match &self.kind {
            MultiplicityKind::Parameterized { name } => format!("_{}_", name),
            MultiplicityKind::Concrete(bounds) => match (bounds.lower, bounds.upper) {
                (1, Some(1)) => "_1_".to_string(),
                (0, None) => "_MANY_".to_string(),
                (lower, None) => format!("_${}_MANY$_", lower),
                (lower, Some(upper)) => format!("_${}_{}$_", lower, upper),
            },
        }
    }
}

impl PartialEq for Multiplicity {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for Multiplicity {}

impl Hash for Multiplicity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.print(false))
    }
}

impl From<Bounds> for Multiplicity {
    fn from(bounds: Bounds) -> Self {
        Self::from_bounds(bounds)
    }
}

impl FromStr for Multiplicity {
    type Err = MultiplicityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_error = || MultiplicityError::Parse {
            literal: s.to_string(),
        };

        let trimmed = s.trim();
        let body = match trimmed.strip_prefix('[') {
            Some(rest) => rest.strip_suffix(']').ok_or_else(parse_error)?,
            None => trimmed,
        }
        .trim();

        let parse_bound = |text: &str| text.trim().parse::<i64>().map_err(|_| parse_error());

        if body == "*" {
            return Ok(Self::unbounded(0));
        }
        if let Some((lower, upper)) = body.split_once("..") {
            let lower = parse_bound(lower)?;
            let upper = match upper.trim() {
                "*" => None,
                upper => Some(parse_bound(upper)?),
            };
            return Self::new(lower, upper);
        }
        if body.starts_with(|c: char| c.is_ascii_digit() || c == '-') {
            let n = parse_bound(body)?;
            return Self::new(n, Some(n));
        }

        let is_identifier = body.starts_with(|c: char| c.is_alphabetic() || c == '_')
            && body.chars().all(|c| c.is_alphanumeric() || c == '_');
        if is_identifier {
            Ok(Self::parameter(body))
        } else {
            Err(parse_error())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        assert_eq!(Multiplicity::fixed(1), PURE_ONE);
        assert_eq!(Multiplicity::range(0, 1).unwrap(), ZERO_ONE);
        assert_eq!(Multiplicity::unbounded(0), ZERO_MANY);
        assert_eq!(Multiplicity::unbounded(1), ONE_MANY);
        assert_eq!(Multiplicity::new(0, Some(0)).unwrap(), PURE_ZERO);
        assert!(Multiplicity::range(3, 1).is_err());
    }

    #[test]
    fn test_new_rejects_malformed_bounds() {
        assert!(matches!(
            Multiplicity::new(-1, Some(1)),
            Err(MultiplicityError::Invalid {
                reason: "lower bound is negative",
                ..
            })
        ));
        assert!(matches!(
            Multiplicity::new(5, Some(2)),
            Err(MultiplicityError::Invalid {
                reason: "lower bound exceeds upper bound",
                ..
            })
        ));
        assert!(Multiplicity::new(i64::from(u32::MAX) + 1, None).is_err());
        assert!(Multiplicity::new(0, Some(-3)).is_err());
    }

    #[test]
    fn test_properties() {
        let param = Multiplicity::parameter("m");
        assert!(!param.is_concrete());
        assert_eq!(param.parameter_name(), Some("m"));
        assert!(param.concrete_bounds().is_err());

        assert!(PURE_ONE.is_to_one(true));
        assert!(!ZERO_ONE.is_to_one(true));
        assert!(ZERO_ONE.is_to_one(false));
        assert!(!ONE_MANY.is_to_one(false));
        assert!(!param.is_to_one(false));

        assert!(ZERO_MANY.is_to_many());
        assert!(Multiplicity::range(0, 2).unwrap().is_to_many());
        assert!(!ZERO_ONE.is_to_many());
        assert!(PURE_ZERO.is_zero());
        assert!(ONE_MANY.is_infinite());
    }

    #[test]
    fn test_equals() {
        let a = Multiplicity::range(2, 5).unwrap();
        assert!(a.equals(&Multiplicity::range(2, 5).unwrap(), false));
        assert!(!a.equals(&ZERO_MANY, true));

        let m = Multiplicity::parameter("m");
        let n = Multiplicity::parameter("n");
        assert!(m.equals(&m.clone(), true));
        assert!(!m.equals(&m.clone(), false));
        assert!(!m.equals(&n, true));
        assert!(!m.equals(&n, false));
        assert!(!m.equals(&PURE_ONE, true));
    }

    #[test]
    fn test_equality_ignores_location() {
        let located = Multiplicity::fixed(1).with_location(SourceLocation::point("a.pure", 1, 1));
        assert_eq!(located, PURE_ONE);
    }

    #[test]
    fn test_copy_well_known_returns_same_instance() {
        for known in [&PURE_ONE, &ZERO_ONE, &ZERO_MANY, &ONE_MANY, &PURE_ZERO] {
            match known.copy(false) {
                Cow::Borrowed(copy) => assert!(std::ptr::eq(copy, known)),
                Cow::Owned(_) => panic!("{} was copied", known),
            }
        }
    }

    #[test]
    fn test_copy_location_handling() {
        let location = SourceLocation::point("a.pure", 2, 7);
        let m = Multiplicity::range(1, 4).unwrap().with_location(location.clone());

        let kept = m.copy(true);
        assert!(matches!(kept, Cow::Owned(_)));
        assert_eq!(kept.location(), Some(&location));

        let stripped = m.copy(false);
        assert_eq!(stripped.location(), None);
        assert_eq!(*stripped, m);

        // An equal but separately constructed [1] is not the shared instance
        assert!(matches!(Multiplicity::fixed(1).copy(false), Cow::Owned(_)));
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Multiplicity::range(0, 1).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "kind": { "kind": "Concrete", "lower": 0, "upper": 1 } })
        );

        let param: Multiplicity =
            serde_json::from_value(serde_json::json!({ "kind": { "kind": "Parameterized", "name": "m" } }))
                .unwrap();
        assert_eq!(param, Multiplicity::parameter("m"));

        let bad = serde_json::from_value::<Multiplicity>(
            serde_json::json!({ "kind": { "kind": "Concrete", "lower": 4, "upper": 1 } }),
        );
        assert!(bad.is_err());
    }
}
