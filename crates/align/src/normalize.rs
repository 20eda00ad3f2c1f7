use crate::error::{AlignError, TableSide};
use crate::model::{Scalar, Table};

/// Comparable form of a key cell.
///
/// `Missing` behaves like NaN: it is unequal to everything, itself included,
/// so rows without a key never pair up. For that reason this type is
/// `PartialEq` only and has no `Eq`/`Hash`; group by [`NormalizedKey::as_str`].
#[derive(Debug, Clone)]
pub enum NormalizedKey {
    Present(String),
    Missing,
}

impl NormalizedKey {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Present(s) => Some(s),
            Self::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl PartialEq for NormalizedKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Present(a), Self::Present(b)) => a == b,
            _ => false,
        }
    }
}

/// Canonical string form of a single value. `Null` has none.
pub fn normalize_value(value: &Scalar) -> NormalizedKey {
    match value {
        Scalar::Null => NormalizedKey::Missing,
        other => NormalizedKey::Present(other.to_string()),
    }
}

/// Normalize the `key` column of `table`, one entry per row.
pub fn normalize_keys(
    table: &Table,
    key: &str,
    side: TableSide,
) -> Result<Vec<NormalizedKey>, AlignError> {
    let values = table.column_values(key).ok_or_else(|| AlignError::MissingKey {
        side,
        key: key.to_string(),
    })?;
    Ok(values.map(normalize_value).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_and_text_agree() {
        assert_eq!(normalize_value(&Scalar::Number(1.0)), normalize_value(&Scalar::text("1")));
        assert_eq!(normalize_value(&Scalar::Number(1.5)), normalize_value(&Scalar::text("1.5")));
    }

    #[test]
    fn text_is_not_trimmed() {
        assert_ne!(normalize_value(&Scalar::text(" 1")), normalize_value(&Scalar::text("1")));
        assert_ne!(normalize_value(&Scalar::text("a")), normalize_value(&Scalar::text("A")));
    }

    #[test]
    fn missing_never_equal() {
        let a = normalize_value(&Scalar::Null);
        assert!(a.is_missing());
        assert_ne!(a, normalize_value(&Scalar::Null));
        assert_ne!(a, normalize_value(&Scalar::text("")));
    }

    #[test]
    fn booleans_use_spreadsheet_casing() {
        assert_eq!(normalize_value(&Scalar::Bool(true)).as_str(), Some("TRUE"));
    }

    #[test]
    fn missing_column_is_error() {
        let table = Table::new(vec!["id".into()], vec![]).unwrap();
        let err = normalize_keys(&table, "sku", TableSide::Template).unwrap_err();
        assert_eq!(
            err,
            AlignError::MissingKey { side: TableSide::Template, key: "sku".into() }
        );
    }
}
