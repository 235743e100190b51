//! Decoding JSON onto pre-populated defaults.
//!
//! Configuration records are usually built from [`Default`] and then
//! overlaid with whatever a JSON document provides. [`decode_json_onto`]
//! does that overlay strictly: a key the record does not know is an error,
//! so typos in configuration files fail loudly instead of being ignored.

use crate::error::{CommonError, CommonResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Overlay the JSON object in `bytes` onto `target`.
///
/// Fields absent from the input keep their current value. Nested objects
/// are merged recursively; any other value replaces the current one.
///
/// # Errors
///
/// - [`CommonError::Serialization`] if `bytes` is not a JSON object or the
///   merged document no longer fits `T`
/// - [`CommonError::UnknownField`] naming the dotted path of the first key
///   `T` does not have
///
/// `target` is left untouched on error.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use svc_common::transform::decode_json_onto;
///
/// #[derive(Serialize, Deserialize)]
/// struct Settings { host: String, port: u16 }
///
/// let mut settings = Settings { host: "localhost".into(), port: 80 };
/// decode_json_onto(br#"{"port": 8080}"#, &mut settings).unwrap();
/// assert_eq!(settings.host, "localhost");
/// assert_eq!(settings.port, 8080);
/// ```
pub fn decode_json_onto<T>(bytes: &[u8], target: &mut T) -> CommonResult<()>
where
    T: Serialize + DeserializeOwned,
{
    let overlay: Map<String, Value> = serde_json::from_slice(bytes)?;

    let mut current = serde_json::to_value(&*target)?;
    let Value::Object(base) = &mut current else {
        return Err(CommonError::invalid_input("target does not serialize to an object"));
    };
    merge(base, overlay, "")?;

    *target = serde_json::from_value(current)?;
    Ok(())
}

fn merge(base: &mut Map<String, Value>, overlay: Map<String, Value>, prefix: &str) -> CommonResult<()> {
    let mut keys: Vec<&String> = overlay.keys().filter(|k| !base.contains_key(*k)).collect();
    keys.sort();
    if let Some(unknown) = keys.first() {
        return Err(CommonError::unknown_field(join_path(prefix, unknown)));
    }

    for (key, value) in overlay {
        let path = join_path(prefix, &key);
        match (base.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                merge(existing, nested, &path)?;
            }
            (Some(slot), value) => *slot = value,
            (None, _) => return Err(CommonError::unknown_field(path)),
        }
    }
    Ok(())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Inner {
        enabled: bool,
        level: String,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Settings {
        foo: String,
        bar: i32,
        cat: String,
        inner: Inner,
    }

    fn defaults() -> Settings {
        Settings {
            foo: "abc".to_string(),
            bar: 123,
            cat: String::new(),
            inner: Inner {
                enabled: false,
                level: "info".to_string(),
            },
        }
    }

    #[test]
    fn test_overlay_keeps_defaults() {
        let mut settings = defaults();
        decode_json_onto(br#"{"cat":"meow","inner":{"enabled":true}}"#, &mut settings).unwrap();

        assert_eq!(settings.foo, "abc");
        assert_eq!(settings.bar, 123);
        assert_eq!(settings.cat, "meow");
        assert!(settings.inner.enabled);
        assert_eq!(settings.inner.level, "info");
    }

    #[test]
    fn test_empty_input_is_error() {
        let mut settings = defaults();
        let err = decode_json_onto(b"", &mut settings).unwrap_err();
        assert!(matches!(err, CommonError::Serialization(_)));
        assert_eq!(settings, defaults());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let mut settings = defaults();
        let err = decode_json_onto(br#"{"foo":"x","oops":"bad","another":1}"#, &mut settings)
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown field in JSON input: another");
        assert_eq!(settings, defaults());
    }

    #[test]
    fn test_unknown_nested_key_reports_path() {
        let mut settings = defaults();
        let err = decode_json_onto(br#"{"inner":{"colour":"red"}}"#, &mut settings).unwrap_err();
        assert!(matches!(err, CommonError::UnknownField { ref path } if path == "inner.colour"));
    }

    #[test]
    fn test_malformed_json() {
        let mut settings = defaults();
        assert!(matches!(
            decode_json_onto(br#"{foo: "abc"}"#, &mut settings),
            Err(CommonError::Serialization(_))
        ));
    }

    #[test]
    fn test_type_mismatch_leaves_target() {
        let mut settings = defaults();
        assert!(decode_json_onto(br#"{"bar":"not a number"}"#, &mut settings).is_err());
        assert_eq!(settings, defaults());
    }
}
