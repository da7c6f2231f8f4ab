//! API definition documents and their rendered definition fragment.
//!
//! A definition fragment registers one API version with the runtime:
//!
//! ```text
//! window.AWS.Service.defineServiceApi(window.AWS.S3, "2006-03-01", {...});
//! ```

use serde_json::Value;
use sdkpack_core::error::SourceError;
use std::path::{Path, PathBuf};

/// A parsed API definition document.
#[derive(Debug, Clone)]
pub struct ApiDefinition {
    doc: Value,
    path: PathBuf,
}

impl ApiDefinition {
    pub fn parse(text: &str, path: &Path) -> Result<Self, SourceError> {
        let doc: Value = serde_json::from_str(text).map_err(|e| SourceError::InvalidDefinition {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !doc.is_object() {
            return Err(SourceError::InvalidDefinition {
                path: path.to_path_buf(),
                reason: "definition is not a JSON object".into(),
            });
        }
        Ok(Self {
            doc,
            path: path.to_path_buf(),
        })
    }

    /// File the document was read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn field(&self, name: &str) -> Option<&str> {
        self.doc
            .get(name)
            .or_else(|| self.doc.get("metadata").and_then(|m| m.get(name)))
            .and_then(Value::as_str)
    }

    /// The runtime class the definition attaches to, e.g. `S3`, `DynamoDB`.
    ///
    /// Taken from the abbreviation, else the full name, with the vendor
    /// prefix and any parenthesized suffix removed.
    pub fn class_name(&self) -> Option<String> {
        let raw = self
            .field("serviceAbbreviation")
            .or_else(|| self.field("serviceFullName"))?;

        let name = raw.strip_prefix("Amazon").unwrap_or(raw);
        let name = name.split('(').next().unwrap_or(name).replace("AWS", "");
        let name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();

        let name = match name.as_str() {
            "ElasticLoadBalancing" => "ELB".to_string(),
            "SWF" => "SimpleWorkflow".to_string(),
            _ => name,
        };
        (!name.is_empty()).then_some(name)
    }

    /// Render the definition fragment against `binding` (e.g. `window.AWS`).
    ///
    /// The document is embedded as compact JSON so the fragment is
    /// byte-stable for a given input.
    pub fn render(&self, binding: &str, version: &str) -> Result<String, SourceError> {
        let class = self
            .class_name()
            .ok_or_else(|| self.invalid("no service name in definition"))?;
        let body = serde_json::to_string(&self.doc).map_err(|e| self.invalid(e))?;
        let version = serde_json::to_string(version).map_err(|e| self.invalid(e))?;
        Ok(format!(
            "{binding}.Service.defineServiceApi({binding}.{class}, {version}, {body});"
        ))
    }

    fn invalid(&self, reason: impl ToString) -> SourceError {
        SourceError::InvalidDefinition {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ApiDefinition {
        ApiDefinition::parse(text, Path::new("apis/x.json")).unwrap()
    }

    #[test]
    fn class_name_from_abbreviation() {
        let def = parse(r#"{"metadata":{"serviceAbbreviation":"Amazon S3","serviceFullName":"Amazon Simple Storage Service"}}"#);
        assert_eq!(def.class_name().as_deref(), Some("S3"));
    }

    #[test]
    fn class_name_from_full_name() {
        let def = parse(r#"{"serviceFullName":"AWS Security Token Service (STS)"}"#);
        assert_eq!(def.class_name().as_deref(), Some("SecurityTokenService"));
    }

    #[test]
    fn class_name_renames() {
        let elb = parse(r#"{"serviceAbbreviation":"Elastic Load Balancing"}"#);
        assert_eq!(elb.class_name().as_deref(), Some("ELB"));
        let swf = parse(r#"{"serviceAbbreviation":"Amazon SWF"}"#);
        assert_eq!(swf.class_name().as_deref(), Some("SimpleWorkflow"));
    }

    #[test]
    fn render_embeds_compact_document() {
        let def = parse("{\n  \"serviceAbbreviation\": \"DynamoDB\",\n  \"operations\": {}\n}");
        let out = def
            .render("window.AWS", "2012-08-10")
            .unwrap();
        assert_eq!(
            out,
            r#"window.AWS.Service.defineServiceApi(window.AWS.DynamoDB, "2012-08-10", {"operations":{},"serviceAbbreviation":"DynamoDB"});"#
        );
    }

    #[test]
    fn render_without_name_is_invalid() {
        let def = parse(r#"{"operations":{}}"#);
        assert!(matches!(
            def.render("AWS", "2012-08-10"),
            Err(SourceError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn rejects_non_object_and_bad_json() {
        let p = Path::new("a.json");
        assert!(ApiDefinition::parse("[1,2]", p).is_err());
        assert!(ApiDefinition::parse("{nope", p).is_err());
    }
}
