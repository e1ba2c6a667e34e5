use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Input document piped on stdin, if any.
///
/// JSON is tried first; anything else is parsed as YAML. An interactive
/// terminal or an empty pipe yields `None` so flag input can take over.
pub fn read_document<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw)?;
    parse_document(&raw)
}

fn parse_document<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let body = raw.trim();
    if body.is_empty() {
        return Ok(None);
    }

    let doc = if body.starts_with('{') || body.starts_with('[') {
        serde_json::from_str(body).map_err(|e| format!("Invalid JSON on stdin: {e}"))?
    } else {
        serde_yaml::from_str(body).map_err(|e| format!("Invalid YAML on stdin: {e}"))?
    };
    tracing::debug!(bytes = body.len(), "read input document from stdin");
    Ok(Some(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_blank_input_is_none() {
        assert!(parse_document::<Value>("  \n").unwrap().is_none());
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let json: Value = parse_document(r#"{"company": "TargetCo", "peers": []}"#)
            .unwrap()
            .unwrap();
        let yaml: Value = parse_document("company: TargetCo\npeers: []\n")
            .unwrap()
            .unwrap();
        assert_eq!(json, yaml);
    }

    #[test]
    fn test_malformed_json_reported() {
        let err = parse_document::<Value>("{not json").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON on stdin"));
    }
}
