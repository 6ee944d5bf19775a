// Parameter Table Builder
// Collects (format specifier, value) pairs into the ten positional slots read by `$N` and `?N`

use crate::printf::{self, Segment};
use crate::sink::Sink;
use crate::RenderError;

/// Number of positional parameter slots (`$0` to `$9`)
pub const MAX_PARAMS: usize = 10;

/// Numeric class of a parameter, inferred from its format specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Pointer-width integer; also covers strings and pointers
    Integer,
    Float64,
    /// C `long double`; the value itself is held in an `f64`
    Float80,
}

impl ParamKind {
    /// Classify a printf-style specifier by its final conversion character.
    ///
    /// `e E f F g G a A` are floating (`Float80` when an `L` length modifier
    /// appears anywhere in the specifier), everything else is an integer.
    pub fn classify(spec: &str) -> Self {
        let last = printf::parse(spec)
            .into_iter()
            .rev()
            .find_map(|segment| match segment {
                Segment::Conversion(conversion) => Some(conversion),
                Segment::Literal(_) => None,
            });

        match last {
            Some(conversion) if conversion.is_floating() => {
                if spec.contains('L') {
                    ParamKind::Float80
                } else {
                    ParamKind::Float64
                }
            }
            _ => ParamKind::Integer,
        }
    }
}

/// A typed parameter value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Integer(i64),
    /// String argument; `None` plays the part of a NULL pointer
    Pointer(Option<&'a str>),
    Float64(f64),
    Float80(f64),
}

impl Default for Value<'_> {
    fn default() -> Self {
        Value::Integer(0)
    }
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> ParamKind {
        match self {
            Value::Integer(_) | Value::Pointer(_) => ParamKind::Integer,
            Value::Float64(_) => ParamKind::Float64,
            Value::Float80(_) => ParamKind::Float80,
        }
    }

    /// Integer view of the value, as an integer conversion would read it
    pub fn as_i64(&self) -> i64 {
        match *self {
            Value::Integer(v) => v,
            Value::Pointer(Some(s)) => s.as_ptr() as usize as i64,
            Value::Pointer(None) => 0,
            Value::Float64(v) | Value::Float80(v) => v as i64,
        }
    }

    /// Floating view of the value, as a floating conversion would read it
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Integer(v) => v as f64,
            Value::Pointer(_) => 0.0,
            Value::Float64(v) | Value::Float80(v) => v,
        }
    }

    /// Truth value used by conditional blocks
    pub fn is_truthy(&self) -> bool {
        match *self {
            Value::Integer(v) => v != 0,
            Value::Pointer(p) => p.is_some(),
            Value::Float64(v) | Value::Float80(v) => v != 0.0,
        }
    }

    /// Convert to the representation `kind` calls for
    pub fn coerce(self, kind: ParamKind) -> Self {
        match (kind, self) {
            (ParamKind::Integer, Value::Float64(v) | Value::Float80(v)) => Value::Integer(v as i64),
            (ParamKind::Integer, value) => value,
            (ParamKind::Float64, value) => Value::Float64(value.as_f64()),
            (ParamKind::Float80, value) => Value::Float80(value.as_f64()),
        }
    }
}

macro_rules! impl_value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value<'_> {
                fn from(v: $ty) -> Self {
                    Value::Integer(v as i64)
                }
            }
        )*
    };
}

impl_value_from_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<char> for Value<'_> {
    fn from(v: char) -> Self {
        Value::Integer(i64::from(u32::from(v)))
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::Float64(f64::from(v))
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Pointer(Some(v))
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(v: &'a String) -> Self {
        Value::Pointer(Some(v.as_str()))
    }
}

impl<'a> From<Option<&'a str>> for Value<'a> {
    fn from(v: Option<&'a str>) -> Self {
        Value::Pointer(v)
    }
}

/// One positional slot: a value and the specifier used to render it
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Parameter<'a> {
    spec: Option<&'a str>,
    value: Value<'a>,
}

impl<'a> Parameter<'a> {
    pub fn new(spec: &'a str, value: Value<'a>) -> Self {
        let kind = ParamKind::classify(spec);
        Self {
            spec: Some(spec),
            value: value.coerce(kind),
        }
    }

    pub fn spec(&self) -> Option<&'a str> {
        self.spec
    }

    pub fn value(&self) -> Value<'a> {
        self.value
    }

    pub fn kind(&self) -> ParamKind {
        self.value.kind()
    }

    pub fn is_truthy(&self) -> bool {
        self.value.is_truthy()
    }

    /// Render through the stored specifier. Unset slots render nothing.
    pub fn render<S: Sink + ?Sized>(&self, sink: &mut S) -> Result<(), RenderError> {
        match self.spec {
            Some(spec) => sink.append_formatted(spec, &self.value),
            None => Ok(()),
        }
    }
}

/// The ten parameter slots of one log call
#[derive(Debug, Clone, Default)]
pub struct ParamTable<'a> {
    slots: [Parameter<'a>; MAX_PARAMS],
    len: usize,
}

impl<'a> ParamTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs in positional order; pairs past the tenth are ignored
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Value<'a>)>,
    {
        let mut table = Self::new();
        let mut ignored = 0usize;
        for (spec, value) in pairs {
            if !table.push(spec, value) {
                ignored += 1;
            }
        }
        if ignored > 0 {
            log::debug!(
                "Ignoring {} parameter(s) beyond the {} available slots",
                ignored,
                MAX_PARAMS
            );
        }
        table
    }

    /// Fill the next free slot. Returns false when all slots are taken.
    pub fn push(&mut self, spec: &'a str, value: Value<'a>) -> bool {
        match self.slots.get_mut(self.len) {
            Some(slot) => {
                *slot = Parameter::new(spec, value);
                self.len += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Parameter<'a>> {
        self.slots.get(index)
    }

    /// Number of slots filled by the caller
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter<'a>> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(ParamKind::classify("%d"), ParamKind::Integer);
        assert_eq!(ParamKind::classify("%s"), ParamKind::Integer);
        assert_eq!(ParamKind::classify("%p"), ParamKind::Integer);
        assert_eq!(ParamKind::classify("%e"), ParamKind::Float64);
        assert_eq!(ParamKind::classify("%-8.3f"), ParamKind::Float64);
        assert_eq!(ParamKind::classify("%Le"), ParamKind::Float80);
        assert_eq!(ParamKind::classify("%LG"), ParamKind::Float80);
        assert_eq!(ParamKind::classify("%lu"), ParamKind::Integer);
        assert_eq!(ParamKind::classify("no conversion"), ParamKind::Integer);
    }

    #[test]
    fn test_unused_slots_are_zero_integers() {
        let table = ParamTable::from_pairs([("%s", Value::from("file.c"))]);
        assert_eq!(table.len(), 1);

        let unused = table.get(3).unwrap();
        assert_eq!(unused.spec(), None);
        assert_eq!(unused.value(), Value::Integer(0));
        assert!(!unused.is_truthy());
    }

    #[test]
    fn test_extra_pairs_are_ignored() {
        let pairs = (0..12).map(|i| ("%d", Value::from(i)));
        let table = ParamTable::from_pairs(pairs);
        assert_eq!(table.len(), MAX_PARAMS);
        assert_eq!(table.get(9).unwrap().value(), Value::Integer(9));
        assert!(table.get(10).is_none());
    }

    #[test]
    fn test_values_follow_the_specifier() {
        let table = ParamTable::from_pairs([
            ("%e", Value::from(2)),
            ("%Lf", Value::from(1.5)),
            ("%d", Value::from(7.9)),
        ]);
        assert_eq!(table.get(0).unwrap().value(), Value::Float64(2.0));
        assert_eq!(table.get(1).unwrap().kind(), ParamKind::Float80);
        assert_eq!(table.get(2).unwrap().value(), Value::Integer(7));
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::from("x").is_truthy());
        assert!(Value::from("").is_truthy());
        assert!(!Value::Pointer(None).is_truthy());
        assert!(Value::from(-1).is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from(0.0).is_truthy());
    }
}
