//! Serde helper for patch fields: `Some(Some(v))` = set, `Some(None)` = clear
//! (explicit `null`), `None` = absent, no change.
//!
//! Use with `#[serde(default, deserialize_with = "crate::nullable::deserialize")]`.

use serde::{Deserialize, Deserializer};

pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::deserialize")]
        v: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.v, None);
        let p: Patch = serde_json::from_str(r#"{"v": null}"#).unwrap();
        assert_eq!(p.v, Some(None));
        let p: Patch = serde_json::from_str(r#"{"v": "x"}"#).unwrap();
        assert_eq!(p.v, Some(Some("x".into())));
    }
}
