//! Typed attribute readers with mapper defaults

use crate::error::{Error, Result};
use crate::xml::Element;
use std::str::FromStr;

/// `true` (any case) is true, any other present value is false
pub(crate) fn bool_attr(element: &Element, name: &str, default: bool) -> bool {
    element
        .attr(name)
        .map_or(default, |value| value.eq_ignore_ascii_case("true"))
}

pub(crate) fn int_attr(element: &Element, name: &str) -> Result<Option<i32>> {
    element
        .attr(name)
        .map(|value| {
            value.trim().parse::<i32>().map_err(|e| Error::InvalidAttribute {
                element: element.name.clone(),
                attribute: name.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

pub(crate) fn enum_attr<T>(element: &Element, name: &str) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    element
        .attr(name)
        .map(|value| {
            value.parse::<T>().map_err(|reason| Error::InvalidAttribute {
                element: element.name.clone(),
                attribute: name.to_string(),
                value: value.to_string(),
                reason,
            })
        })
        .transpose()
}

/// Comma-separated list; absent or blank yields an empty list
pub(crate) fn list_attr(element: &Element, name: &str) -> Vec<String> {
    element
        .attr(name)
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_follow_true_or_else_false() {
        let element = Element::new("select")
            .with_attr("a", "TRUE")
            .with_attr("b", "yes");
        assert!(bool_attr(&element, "a", false));
        assert!(!bool_attr(&element, "b", true));
        assert!(bool_attr(&element, "missing", true));
    }

    #[test]
    fn integers_reject_garbage() {
        let element = Element::new("select")
            .with_attr("fetchSize", "-2147483648")
            .with_attr("timeout", "ten");
        assert_eq!(int_attr(&element, "fetchSize").unwrap(), Some(i32::MIN));
        assert!(int_attr(&element, "timeout").is_err());
        assert_eq!(int_attr(&element, "missing").unwrap(), None);
    }

    #[test]
    fn lists_drop_blanks() {
        let element = Element::new("insert").with_attr("keyProperty", "id, , version");
        assert_eq!(list_attr(&element, "keyProperty"), ["id", "version"]);
        assert!(list_attr(&element, "keyColumn").is_empty());
    }
}
