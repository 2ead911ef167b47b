//! The coverage-reading collaborator.
//!
//! The playground only needs a coverage's structure: its domain type, which parameters it
//! has (in document order) and, for collections, its members. Reading full coverage data is
//! the job of the rendering layer behind [`LayerFactory`](crate::LayerFactory).

use crate::error::ReadError;
use covjson_param_sync::ParameterKey;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;

/// Top-level CoverageJSON object type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageKind {
    /// A single coverage.
    Coverage,
    /// A collection of coverages.
    CoverageCollection,
    /// A bare domain without parameters.
    Domain,
}

/// Structural view of a coverage or coverage collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    /// Object type.
    pub kind: CoverageKind,
    /// Domain type, e.g. `"Grid"`.
    pub domain_type: Option<String>,
    /// Parameter keys in document order. `None` when the object has no `parameters`.
    pub parameters: Option<Vec<ParameterKey>>,
    /// `[min, max]` of the inline range values, per parameter.
    pub value_extents: BTreeMap<ParameterKey, [f64; 2]>,
    /// Members of a collection.
    pub coverages: Option<Vec<Coverage>>,
}

impl Coverage {
    /// Returns `true` for a bare domain.
    pub fn is_domain(&self) -> bool {
        self.kind == CoverageKind::Domain
    }

    /// Wrap a bare domain into a coverage without parameters.
    pub fn from_domain(domain: Coverage) -> Coverage {
        Coverage {
            kind: CoverageKind::Coverage,
            parameters: Some(Vec::new()),
            value_extents: BTreeMap::new(),
            coverages: None,
            ..domain
        }
    }

    /// Domain type as a string slice.
    pub fn domain_type(&self) -> Option<&str> {
        self.domain_type.as_deref()
    }

    /// Parameter keys, empty when there are none.
    pub fn parameter_keys(&self) -> &[ParameterKey] {
        self.parameters.as_deref().unwrap_or(&[])
    }

    /// Returns `true` if the coverage has a parameter `key`.
    pub fn has_parameter(&self, key: &ParameterKey) -> bool {
        self.parameter_keys().contains(key)
    }
}

/// Turns a parsed CoverageJSON document into a [`Coverage`].
pub trait CoverageReader {
    /// Read `document`. Fails with a message suitable for showing to the user.
    fn read(&self, document: &Value) -> impl Future<Output = Result<Coverage, ReadError>>;
}

/// Reads coverage structure directly from the JSON document.
///
/// Remote domains and ranges are not fetched; value extents are only known for inline
/// `NdArray` ranges.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCoverageReader;

impl CoverageReader for JsonCoverageReader {
    async fn read(&self, document: &Value) -> Result<Coverage, ReadError> {
        read_object(document, None)
    }
}

/// Collection-level defaults inherited by members.
struct Inherited<'a> {
    domain_type: Option<&'a str>,
    parameters: Option<&'a [ParameterKey]>,
}

fn read_object(
    document: &Value,
    inherited: Option<&Inherited<'_>>,
) -> Result<Coverage, ReadError> {
    let object = document.as_object().ok_or(ReadError::InvalidMember {
        member: "document",
        expected: "an object",
    })?;
    let kind = match object.get("type").and_then(Value::as_str) {
        Some("Coverage") => CoverageKind::Coverage,
        Some("CoverageCollection") => CoverageKind::CoverageCollection,
        Some("Domain") => CoverageKind::Domain,
        Some(other) => return Err(ReadError::UnsupportedType(other.to_string())),
        None if inherited.is_some() => CoverageKind::Coverage,
        None => return Err(ReadError::MissingType),
    };

    let domain_type = object
        .get("domainType")
        .or_else(|| object.get("domain").and_then(|domain| domain.get("domainType")))
        .and_then(Value::as_str)
        .or(inherited.and_then(|i| i.domain_type))
        .map(str::to_string);

    let mut parameters: Option<Vec<ParameterKey>> = match object.get("parameters") {
        Some(Value::Object(map)) => Some(keys(map)),
        Some(_) => {
            return Err(ReadError::InvalidMember {
                member: "parameters",
                expected: "an object",
            });
        }
        None => None,
    };
    let ranges = object.get("ranges").and_then(Value::as_object);
    if parameters.is_none() {
        parameters = match (inherited.and_then(|i| i.parameters), ranges) {
            (_, Some(ranges)) if kind == CoverageKind::Coverage => {
                Some(keys(ranges))
            }
            (Some(keys), _) => Some(keys.to_vec()),
            _ => None,
        };
    }

    let value_extents = ranges.map(value_extents).unwrap_or_default();

    let coverages = match (kind, object.get("coverages")) {
        (CoverageKind::CoverageCollection, Some(Value::Array(members))) => {
            let defaults = Inherited {
                domain_type: domain_type.as_deref(),
                parameters: parameters.as_deref(),
            };
            Some(
                members
                    .iter()
                    .map(|member| read_object(member, Some(&defaults)))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
        (CoverageKind::CoverageCollection, _) => {
            return Err(ReadError::InvalidMember {
                member: "coverages",
                expected: "an array",
            });
        }
        _ => None,
    };

    Ok(Coverage {
        kind,
        domain_type,
        parameters,
        value_extents,
        coverages,
    })
}

fn keys(map: &Map<String, Value>) -> Vec<ParameterKey> {
    map.keys().map(|k| ParameterKey::new(k.as_str())).collect()
}

fn value_extents(ranges: &Map<String, Value>) -> BTreeMap<ParameterKey, [f64; 2]> {
    ranges
        .iter()
        .filter_map(|(key, range)| {
            let values = range.get("values")?.as_array()?;
            let mut numbers = values.iter().filter_map(Value::as_f64);
            let first = numbers.next()?;
            let extent = numbers.fold([first, first], |[min, max], v| [min.min(v), max.max(v)]);
            Some((ParameterKey::new(key.as_str()), extent))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read(document: Value) -> Result<Coverage, ReadError> {
        read_object(&document, None)
    }

    #[test]
    fn test_single_coverage() {
        let cov = read(json!({
            "type": "Coverage",
            "domain": { "type": "Domain", "domainType": "Grid", "axes": {} },
            "parameters": { "SST": {}, "ICE": {} },
            "ranges": { "SST": { "type": "NdArray", "values": [3, null, -1.5, 7] } }
        }))
        .unwrap();

        assert_eq!(cov.domain_type(), Some("Grid"));
        assert_eq!(
            cov.parameter_keys(),
            &[ParameterKey::new("SST"), ParameterKey::new("ICE")]
        );
        assert_eq!(cov.value_extents[&ParameterKey::new("SST")], [-1.5, 7.0]);
        assert!(cov.coverages.is_none());
    }

    #[test]
    fn test_collection_members_inherit() {
        let cov = read(json!({
            "type": "CoverageCollection",
            "domainType": "Point",
            "parameters": { "T": {} },
            "coverages": [
                { "type": "Coverage", "domain": {}, "ranges": { "T": { "values": [1] } } },
                { "type": "Coverage", "domain": {} }
            ]
        }))
        .unwrap();

        let members = cov.coverages.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].domain_type(), Some("Point"));
        assert!(members[1].has_parameter(&ParameterKey::new("T")));
    }

    #[test]
    fn test_generic_collection_without_parameters() {
        let cov = read(json!({
            "type": "CoverageCollection",
            "coverages": [
                { "type": "Coverage", "domain": { "domainType": "Grid" }, "parameters": { "A": {} } }
            ]
        }))
        .unwrap();
        assert!(cov.parameters.is_none());
        assert!(cov.domain_type.is_none());
    }

    #[test]
    fn test_domain_becomes_parameterless_coverage() {
        let domain = read(json!({ "type": "Domain", "domainType": "Grid", "axes": {} })).unwrap();
        assert!(domain.is_domain());
        let cov = Coverage::from_domain(domain);
        assert_eq!(cov.kind, CoverageKind::Coverage);
        assert_eq!(cov.domain_type(), Some("Grid"));
        assert!(cov.parameter_keys().is_empty());
    }

    #[test]
    fn test_rejections() {
        assert_eq!(read(json!({})), Err(ReadError::MissingType));
        assert_eq!(
            read(json!({ "type": "Feature" })),
            Err(ReadError::UnsupportedType("Feature".to_string()))
        );
        assert!(matches!(
            read(json!({ "type": "Coverage", "parameters": [] })),
            Err(ReadError::InvalidMember { member: "parameters", .. })
        ));
        assert!(matches!(
            read(json!({ "type": "CoverageCollection" })),
            Err(ReadError::InvalidMember { member: "coverages", .. })
        ));
        assert!(read(json!([1, 2])).is_err());
    }
}
