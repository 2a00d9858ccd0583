//! Assignment and cast rules between type kinds.
//!
//! Assignment rules describe implicit conversions (e.g. storing a SMALLINT
//! into an INTEGER column). Coercion rules extend them with everything an
//! explicit CAST is allowed to do.

use super::datatype::DataType;
use super::type_name::TypeName;

/// Returns if a value of kind `from` can be implicitly assigned to `to`.
pub const fn can_assign_from(to: TypeName, from: TypeName) -> bool {
    if matches!(to, TypeName::Null) {
        return false;
    }
    if matches!(from, TypeName::Null) {
        return true;
    }
    if to as u8 == from as u8 {
        return true;
    }

    match to {
        TypeName::SmallInt => matches!(from, TypeName::TinyInt),
        TypeName::Integer => matches!(from, TypeName::TinyInt | TypeName::SmallInt),
        TypeName::BigInt => matches!(
            from,
            TypeName::TinyInt | TypeName::SmallInt | TypeName::Integer
        ),
        TypeName::Float => matches!(
            from,
            TypeName::TinyInt
                | TypeName::SmallInt
                | TypeName::Integer
                | TypeName::BigInt
                | TypeName::Decimal
        ),
        TypeName::Real => matches!(
            from,
            TypeName::TinyInt
                | TypeName::SmallInt
                | TypeName::Integer
                | TypeName::BigInt
                | TypeName::Decimal
                | TypeName::Float
        ),
        TypeName::Double => from.is_numeric(),
        TypeName::Decimal => matches!(
            from,
            TypeName::TinyInt
                | TypeName::SmallInt
                | TypeName::Integer
                | TypeName::BigInt
                | TypeName::Real
                | TypeName::Double
        ),
        TypeName::Varchar => matches!(from, TypeName::Char),
        TypeName::Binary => matches!(from, TypeName::Varbinary),
        TypeName::Varbinary => matches!(from, TypeName::Binary),
        TypeName::File => matches!(from, TypeName::Image | TypeName::Video | TypeName::Audio),
        TypeName::Date | TypeName::Time => matches!(from, TypeName::Timestamp),
        TypeName::Any => from.is_numeric() || from.is_datetime(),
        _ => false,
    }
}

/// Returns if a value of kind `from` can be explicitly cast to `to`.
pub const fn can_cast_from(to: TypeName, from: TypeName) -> bool {
    if can_assign_from(to, from) {
        return true;
    }
    if matches!(to, TypeName::Null) {
        return false;
    }

    // Numbers are symmetrical, and castable to and from character strings.
    if (to.is_numeric() || to.is_character()) && (from.is_numeric() || from.is_character()) {
        return true;
    }

    // Exact numerics and intervals.
    if to.is_exact_numeric() && from.is_interval() {
        return true;
    }
    if to.is_interval() && (from.is_exact_numeric() || matches!(from, TypeName::Varchar)) {
        return true;
    }

    if to.is_character() {
        return matches!(from, TypeName::Boolean) || from.is_datetime() || from.is_interval();
    }
    if matches!(to, TypeName::Boolean) {
        return from.is_character();
    }

    match to {
        TypeName::Date => matches!(
            from,
            TypeName::TimestampWithLocalTimeZone | TypeName::Char | TypeName::Varchar
        ),
        TypeName::Time | TypeName::TimeWithLocalTimeZone => matches!(
            from,
            TypeName::Time
                | TypeName::TimeWithLocalTimeZone
                | TypeName::Timestamp
                | TypeName::TimestampWithLocalTimeZone
                | TypeName::Char
                | TypeName::Varchar
        ),
        TypeName::Timestamp | TypeName::TimestampWithLocalTimeZone => {
            from.is_datetime() || from.is_character()
        }
        _ => false,
    }
}

/// Returns if a value of type `from` can be converted to `to`.
///
/// Structured types are checked component wise. With `coerce` set the
/// explicit cast rules are used, otherwise only assignments are allowed.
pub fn can_convert(to: &DataType, from: &DataType, coerce: bool) -> bool {
    if to.equals_ignore_nullability(from) {
        return true;
    }
    if to.name() == TypeName::Any || from.name() == TypeName::Any {
        return true;
    }
    if from.is_null_type() {
        return to.name() != TypeName::Null;
    }

    match (to.component(), from.component()) {
        (Some(to_component), Some(from_component)) => {
            return to.name() == from.name() && can_convert(to_component, from_component, coerce);
        }
        (None, None) => (),
        _ => return false,
    }

    if to.name() == TypeName::Map || from.name() == TypeName::Map {
        return match (
            (to.key_type(), to.value_type()),
            (from.key_type(), from.value_type()),
        ) {
            ((Some(tk), Some(tv)), (Some(fk), Some(fv))) => {
                can_convert(tk, fk, coerce) && can_convert(tv, fv, coerce)
            }
            _ => false,
        };
    }

    if to.name() == TypeName::Row || from.name() == TypeName::Row {
        let (to_fields, from_fields) = (to.fields(), from.fields());
        return to.name() == from.name()
            && to_fields.len() == from_fields.len()
            && to_fields
                .iter()
                .zip(from_fields)
                .all(|(t, f)| can_convert(&t.datatype, &f.datatype, coerce));
    }

    if coerce {
        can_cast_from(to.name(), from.name())
    } else {
        can_assign_from(to.name(), from.name())
    }
}
