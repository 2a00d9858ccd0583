use serde::{Deserialize, Serialize};

use super::assignment::can_convert;
use super::datatype::{DataType, Field};
use super::family::TypeFamily;
use super::type_name::TypeName;

/// Limits and policies used when deriving types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSystem {
    pub max_numeric_precision: u32,
    pub max_numeric_scale: u32,
    /// Unify CHAR types of different lengths to VARCHAR.
    pub ragged_char_to_varying: bool,
}

impl Default for TypeSystem {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TypeSystem {
    pub const DEFAULT: TypeSystem = TypeSystem {
        max_numeric_precision: 19,
        max_numeric_scale: 19,
        ragged_char_to_varying: true,
    };

    /// Build a DECIMAL with precision and scale capped to this type system's
    /// limits.
    pub fn capped_decimal(&self, precision: u32, scale: u32) -> DataType {
        let scale = scale.min(self.max_numeric_scale);
        let precision = precision.min(self.max_numeric_precision).max(scale);
        DataType::decimal(precision, scale)
    }

    /// Returns the least restrictive type that all `types` can be implicitly
    /// converted to.
    ///
    /// Returns `None` if there are no types or the types are incompatible.
    /// Callers should report incompatible types as a checking failure.
    pub fn least_restrictive(&self, types: &[DataType]) -> Option<DataType> {
        if types.is_empty() {
            return None;
        }

        let any_nullable = types.iter().any(|t| t.is_nullable());

        if types.iter().any(|t| t.name() == TypeName::Any) {
            return Some(DataType::any().with_nullable(any_nullable));
        }

        let non_null: Vec<&DataType> = types.iter().filter(|t| !t.is_null_type()).collect();
        let first = match non_null.first() {
            Some(first) => *first,
            None => return Some(DataType::null()),
        };

        let mut result = first.clone();
        for (idx, ty) in non_null.iter().enumerate().skip(1) {
            // Datetime plus/minus interval. The datetime wins.
            let prev = non_null[idx - 1];
            if let Some(datetime) = datetime_interval_pair(prev, ty) {
                return Some(datetime.clone().with_nullable(any_nullable));
            }

            match self.merge_pair(&result, ty) {
                Some(merged) => result = merged,
                None => return self.least_restrictive_by_cast(types),
            }
        }

        Some(result.with_nullable(any_nullable))
    }

    /// Fallback used when families mismatch: pick a type from the inputs
    /// that every other input can be assigned to.
    fn least_restrictive_by_cast(&self, types: &[DataType]) -> Option<DataType> {
        let mut result = types.iter().find(|t| !t.is_null_type())?.clone();
        let mut any_nullable = false;

        for ty in types {
            if ty.is_nullable() {
                any_nullable = true;
            }
            if ty.is_null_type() {
                continue;
            }
            if can_convert(ty, &result, false) {
                result = ty.clone();
            } else if !can_convert(&result, ty, false) {
                return None;
            }
        }

        Some(result.with_nullable(any_nullable))
    }

    /// Merge two non-null types. Nullability is handled by the caller.
    fn merge_pair(&self, a: &DataType, b: &DataType) -> Option<DataType> {
        if a.family() != b.family() {
            return None;
        }

        match a.family() {
            TypeFamily::Numeric => Some(self.merge_numeric(a, b)),
            TypeFamily::Character | TypeFamily::Binary => Some(self.merge_string(a, b)),
            TypeFamily::Date | TypeFamily::Boolean => Some(a.clone()),
            TypeFamily::Time | TypeFamily::Timestamp => {
                if a.name() != b.name() {
                    return None;
                }
                let precision = a.precision().max(b.precision());
                Some(a.clone().with_precision(precision))
            }
            TypeFamily::IntervalYearMonth | TypeFamily::IntervalDayTime => {
                let qualifier = a.interval_qualifier()?.union(&b.interval_qualifier()?);
                Some(DataType::interval(qualifier))
            }
            TypeFamily::Array | TypeFamily::Multiset => {
                let component = self.least_restrictive(&[
                    a.component()?.clone(),
                    b.component()?.clone(),
                ])?;
                if a.name() == TypeName::Multiset {
                    return Some(DataType::multiset(component));
                }
                let dimension = if a.dimension() == b.dimension() {
                    a.dimension()
                } else {
                    None
                };
                let cardinality = if a.cardinality() == b.cardinality() {
                    a.cardinality()
                } else {
                    None
                };
                Some(DataType::array_bounded(component, dimension, cardinality))
            }
            TypeFamily::Map => {
                let key = self.least_restrictive(&[a.key_type()?.clone(), b.key_type()?.clone()])?;
                let value =
                    self.least_restrictive(&[a.value_type()?.clone(), b.value_type()?.clone()])?;
                Some(DataType::map(key, value))
            }
            TypeFamily::Row => {
                if a.fields().len() != b.fields().len() {
                    return None;
                }
                let fields = a
                    .fields()
                    .iter()
                    .zip(b.fields())
                    .map(|(fa, fb)| {
                        let datatype = self
                            .least_restrictive(&[fa.datatype.clone(), fb.datatype.clone()])?;
                        Some(Field::new(fa.name.clone(), datatype))
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(DataType::row(fields))
            }
            _ => {
                if a.name() == b.name() {
                    Some(a.clone())
                } else {
                    None
                }
            }
        }
    }

    fn merge_numeric(&self, a: &DataType, b: &DataType) -> DataType {
        let (an, bn) = (a.name(), b.name());
        let involves_decimal = an == TypeName::Decimal || bn == TypeName::Decimal;

        if an.is_exact_numeric() && bn.is_exact_numeric() {
            if involves_decimal {
                // Both are exact, so digits are always available.
                let (ad, as_) = a.exact_digits().unwrap_or((0, 0));
                let (bd, bs) = b.exact_digits().unwrap_or((0, 0));
                let scale = as_.max(bs);
                let digits = ad.max(bd);
                return self.capped_decimal(digits + scale, scale);
            }
            return if an.numeric_rank() >= bn.numeric_rank() {
                a.clone()
            } else {
                b.clone()
            };
        }

        // At least one approximate.
        if involves_decimal {
            return DataType::double();
        }
        if an.numeric_rank() >= bn.numeric_rank() {
            a.clone()
        } else {
            b.clone()
        }
    }

    fn merge_string(&self, a: &DataType, b: &DataType) -> DataType {
        match (a.name() == TypeName::Json, b.name() == TypeName::Json) {
            (true, true) => return DataType::json(),
            (true, false) | (false, true) => return DataType::varchar(None),
            (false, false) => (),
        }

        // Unbounded (None) precision dominates.
        let precision = match (a.precision(), b.precision()) {
            (Some(pa), Some(pb)) => Some(pa.max(pb)),
            _ => None,
        };

        let varying = a.name().is_varying()
            || b.name().is_varying()
            || (self.ragged_char_to_varying && a.precision() != b.precision());

        let name = if varying {
            a.name().to_varying()
        } else {
            a.name()
        };

        DataType::new(name).with_precision(precision)
    }
}

/// Returns the datetime type if `a` and `b` are a datetime and an interval
/// (in either order), or a datetime followed by an integer.
fn datetime_interval_pair<'a>(a: &'a DataType, b: &'a DataType) -> Option<&'a DataType> {
    let (an, bn) = (a.name(), b.name());
    if an.is_datetime() && (bn.is_interval() || bn.is_integer()) {
        return Some(a);
    }
    if an.is_interval() && bn.is_datetime() {
        return Some(b);
    }
    None
}

/// Least restrictive type using the default type system.
pub fn least_restrictive(types: &[DataType]) -> Option<DataType> {
    TypeSystem::DEFAULT.least_restrictive(types)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::time_unit::{IntervalQualifier, TimeUnit};

    #[test]
    fn empty_has_no_type() {
        assert_eq!(None, least_restrictive(&[]));
    }

    #[test]
    fn numeric_widening() {
        assert_eq!(
            Some(DataType::bigint()),
            least_restrictive(&[DataType::integer(), DataType::bigint()])
        );
        assert_eq!(
            Some(DataType::double()),
            least_restrictive(&[DataType::real(), DataType::double(), DataType::tinyint()])
        );
        // INTEGER needs 10 integer digits, decimal contributes scale 2.
        assert_eq!(
            Some(DataType::decimal(12, 2)),
            least_restrictive(&[DataType::decimal(5, 2), DataType::integer()])
        );
        assert_eq!(
            Some(DataType::double()),
            least_restrictive(&[DataType::decimal(5, 2), DataType::real()])
        );
    }

    #[test]
    fn decimal_capped() {
        assert_eq!(
            Some(DataType::decimal(19, 4)),
            least_restrictive(&[DataType::decimal(19, 4), DataType::bigint()])
        );
    }

    #[test]
    fn char_widening() {
        assert_eq!(
            Some(DataType::char(3)),
            least_restrictive(&[DataType::char(3), DataType::char(3)])
        );
        assert_eq!(
            Some(DataType::varchar(Some(5))),
            least_restrictive(&[DataType::char(3), DataType::char(5)])
        );
        assert_eq!(
            Some(DataType::varchar(None)),
            least_restrictive(&[DataType::char(3), DataType::varchar(None)])
        );
    }

    #[test]
    fn nullability_is_or() {
        let t = least_restrictive(&[
            DataType::integer(),
            DataType::smallint().with_nullable(true),
        ])
        .unwrap();
        assert!(t.is_nullable());
        assert_eq!(TypeName::Integer, t.name());

        let t = least_restrictive(&[DataType::integer(), DataType::null()]).unwrap();
        assert_eq!(DataType::integer().with_nullable(true), t);
    }

    #[test]
    fn all_null() {
        assert_eq!(
            Some(DataType::null()),
            least_restrictive(&[DataType::null(), DataType::null()])
        );
    }

    #[test]
    fn incompatible_families() {
        assert_eq!(
            None,
            least_restrictive(&[DataType::varchar(None), DataType::date()])
        );
        assert_eq!(
            None,
            least_restrictive(&[DataType::boolean(), DataType::integer()])
        );
    }

    #[test]
    fn any_wins() {
        assert_eq!(
            Some(DataType::any().with_nullable(true)),
            least_restrictive(&[
                DataType::integer().with_nullable(true),
                DataType::any(),
                DataType::date()
            ])
        );
    }

    #[test]
    fn datetime_plus_interval() {
        let interval = DataType::interval(IntervalQualifier::single(TimeUnit::Day));
        assert_eq!(
            Some(DataType::date()),
            least_restrictive(&[DataType::date(), interval.clone()])
        );
        assert_eq!(
            Some(DataType::timestamp(0)),
            least_restrictive(&[interval, DataType::timestamp(0)])
        );
    }

    #[test]
    fn date_and_timestamp_by_cast() {
        // DATE is assignable from TIMESTAMP, not the other way around.
        assert_eq!(
            Some(DataType::date()),
            least_restrictive(&[DataType::date(), DataType::timestamp(0)])
        );
    }

    #[test]
    fn collections_unify_components() {
        let a = DataType::array(DataType::integer());
        let b = DataType::array(DataType::bigint().with_nullable(true));
        assert_eq!(
            Some(DataType::array(DataType::bigint().with_nullable(true))),
            least_restrictive(&[a.clone(), b])
        );
        assert_eq!(
            None,
            least_restrictive(&[a, DataType::multiset(DataType::integer())])
        );
    }

    #[test]
    fn rows_unify_fieldwise() {
        let a = DataType::row(vec![
            Field::new("x", DataType::integer()),
            Field::new("y", DataType::char(2)),
        ]);
        let b = DataType::row_from_types([DataType::bigint(), DataType::char(4)]);
        assert_eq!(
            Some(DataType::row(vec![
                Field::new("x", DataType::bigint()),
                Field::new("y", DataType::varchar(Some(4))),
            ])),
            least_restrictive(&[a, b])
        );
    }

    fn widenable_type() -> impl Strategy<Value = DataType> {
        let numeric = prop_oneof![
            Just(DataType::tinyint()),
            Just(DataType::smallint()),
            Just(DataType::integer()),
            Just(DataType::bigint()),
            Just(DataType::real()),
            Just(DataType::float()),
            Just(DataType::double()),
            (1u32..=9, 0u32..=4).prop_map(|(p, s)| DataType::decimal(p.max(s), s)),
        ];
        (numeric, any::<bool>()).prop_map(|(t, nullable)| t.with_nullable(nullable))
    }

    fn char_type() -> impl Strategy<Value = DataType> {
        let chars = prop_oneof![
            (1u32..20).prop_map(DataType::char),
            (1u32..20).prop_map(|n| DataType::varchar(Some(n))),
            Just(DataType::varchar(None)),
        ];
        (chars, any::<bool>()).prop_map(|(t, nullable)| t.with_nullable(nullable))
    }

    fn same_family_triple() -> impl Strategy<Value = (DataType, DataType, DataType)> {
        prop_oneof![
            (widenable_type(), widenable_type(), widenable_type()),
            (char_type(), char_type(), char_type()),
        ]
    }

    proptest! {
        #[test]
        fn least_restrictive_is_associative((a, b, c) in same_family_triple()) {
            let ab = least_restrictive(&[a.clone(), b.clone()]).unwrap();
            let bc = least_restrictive(&[b, c.clone()]).unwrap();
            let left = least_restrictive(&[ab, c]);
            let right = least_restrictive(&[a, bc]);
            prop_assert_eq!(left, right);
        }

        #[test]
        fn least_restrictive_is_symmetric((a, b, _c) in same_family_triple()) {
            let ab = least_restrictive(&[a.clone(), b.clone()]);
            let ba = least_restrictive(&[b, a]);
            prop_assert_eq!(ab, ba);
        }

        #[test]
        fn inputs_assignable_to_result((a, b, c) in same_family_triple()) {
            let result = least_restrictive(&[a.clone(), b.clone(), c.clone()]).unwrap();
            for t in [a, b, c] {
                prop_assert!(can_convert(&result, &t, true));
            }
        }
    }
}
