//! Zabbix low-level discovery

use crate::macros::{Macro, MacroLabel};
use crate::records::records;
use curljson_format::{resolve_present, CurlJsonError, Result};
use serde_json::{json, Map, Value};
use tracing::debug;

/// Label used for the record key when no macros are given
pub const NAME_LABEL: &str = "{#NAME}";

/// Build a discovery document from `value`.
///
/// Without macros every record yields `{"{#NAME}": key}`. With macros every
/// record yields one entry per macro, in macro order. A macro that does not
/// resolve for some record fails the whole document.
pub fn discover(value: &Value, macros: &[Macro]) -> Result<Value> {
    let mut items = Vec::new();

    for (key, record) in records(value) {
        let mut item = Map::new();

        if macros.is_empty() {
            item.insert(NAME_LABEL.to_string(), key.to_value());
        }

        for m in macros {
            let entry = match m.label() {
                MacroLabel::Id => key.to_value(),
                MacroLabel::Named(_) => resolve_present(record, m.path())
                    .map_err(|_| CurlJsonError::PathNotFound {
                        path: m.path().to_string(),
                    })?
                    .clone(),
            };
            item.insert(m.label().to_string(), entry);
        }

        items.push(Value::Object(item));
    }

    debug!(items = items.len(), "built discovery list");

    Ok(json!({ "data": items }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use curljson_format::ErrorKind;

    fn macros(texts: &[&str]) -> Vec<Macro> {
        texts.iter().map(|t| Macro::parse(t).unwrap()).collect()
    }

    #[test]
    fn names_array_indices_without_macros() {
        let out = discover(&json!(["a", "b"]), &[]).unwrap();
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"data":[{"{#NAME}":0},{"{#NAME}":1}]}"#
        );
    }

    #[test]
    fn names_object_keys_in_order() {
        let doc: Value = serde_json::from_str(r#"{"web": {}, "db": {}}"#).unwrap();
        let out = discover(&doc, &[]).unwrap();
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"data":[{"{#NAME}":"web"},{"{#NAME}":"db"}]}"#
        );
    }

    #[test]
    fn resolves_macro_per_record() {
        let doc = json!([{"_source": {"title": "X"}}]);
        let out = discover(&doc, &macros(&["_source.title"])).unwrap();
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"data":[{"{#TITLE}":"X"}]}"#
        );
    }

    #[test]
    fn missing_macro_fails_whole_document() {
        let doc = json!([
            {"_source": {"title": "X"}},
            {"_source": {}}
        ]);
        let err = discover(&doc, &macros(&["_source.title"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathNotFound);
        assert_eq!(
            err.to_string(),
            "Can not find key path in JSON: \"_source\".\"title\""
        );
    }

    #[test]
    fn null_macro_value_is_missing() {
        let doc = json!([{"title": null}]);
        let err = discover(&doc, &macros(&["title"])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathNotFound);
    }

    #[test]
    fn id_macro_holds_record_key() {
        let doc: Value =
            serde_json::from_str(r#"{"q1": {"vhost": "/"}, "q2": {"vhost": "prod"}}"#).unwrap();
        let out = discover(&doc, &macros(&["", "vhost"])).unwrap();
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"data":[{"{#ID}":"q1","{#VHOST}":"/"},{"{#ID}":"q2","{#VHOST}":"prod"}]}"#
        );
    }

    #[test]
    fn macro_order_is_preserved() {
        let doc = json!([{"b": 1, "a": 2}]);
        let out = discover(&doc, &macros(&["b", "a"])).unwrap();
        assert_eq!(
            serde_json::to_string(&out).unwrap(),
            r#"{"data":[{"{#B}":1,"{#A}":2}]}"#
        );
    }

    #[test]
    fn scalar_is_one_record() {
        let out = discover(&json!("only"), &[]).unwrap();
        assert_eq!(out, json!({"data": [{"{#NAME}": 0}]}));
    }

    #[test]
    fn empty_collection_has_empty_data() {
        let out = discover(&json!([]), &macros(&["name"])).unwrap();
        assert_eq!(out, json!({"data": []}));
    }
}
