//! Structural XSD validation
//!
//! Validates a rendered document against the schema artifact registered for
//! its declared version. The validator supports the XSD subset the TISS
//! artifacts use: element declarations, sequences, occurrence bounds
//! (`minOccurs`/`maxOccurs`), and named complex types.
//!
//! Invalidity is a normal, fully-described outcome. The validator never
//! returns an error for a bad document: a missing schema registration yields a
//! single configuration-class violation, a non-well-formed document yields a
//! single syntax violation with line/column, and a structurally bad document
//! yields every violation found (no early exit).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::dom::Element;
use crate::error::WireError;
use crate::version::VersionRegistry;

/// Occurrence-bounded child element expectation
#[derive(Debug, Clone, PartialEq)]
pub struct ChildSpec {
    pub name: String,
    pub min_occurs: u32,
    /// None means unbounded
    pub max_occurs: Option<u32>,
}

/// A compiled schema: element name → expected children
///
/// Elements without a declaration are leaves; any text content is accepted.
#[derive(Debug, Clone)]
pub struct Schema {
    root: String,
    declarations: HashMap<String, Vec<ChildSpec>>,
}

impl Schema {
    /// Loads and compiles a schema artifact from disk
    pub fn load(path: &Path) -> Result<Schema, WireError> {
        let source = std::fs::read_to_string(path).map_err(|e| WireError::SchemaUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Schema::compile(&source).map_err(|e| WireError::SchemaUnreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Compiles a schema from XSD source
    pub fn compile(source: &str) -> Result<Schema, WireError> {
        let doc = Element::parse(source)?;
        if doc.name != "schema" {
            return Err(WireError::Render(format!(
                "expected xs:schema root, found {}",
                doc.name
            )));
        }

        // Named complex types first, so element type="..." references resolve
        let mut named_types: HashMap<String, Vec<ChildSpec>> = HashMap::new();
        for complex in &doc.children {
            if complex.name == "complexType" {
                if let Some(name) = complex.attr("name") {
                    named_types.insert(name.to_string(), sequence_children(complex));
                }
            }
        }

        let mut declarations = HashMap::new();
        let mut root = None;
        for child in &doc.children {
            if child.name == "element" {
                if let Some(name) = child.attr("name") {
                    if root.is_none() {
                        root = Some(name.to_string());
                    }
                }
            }
        }
        collect_declarations(&doc, &named_types, &mut declarations);

        let root = root.ok_or_else(|| {
            WireError::Render("schema declares no top-level element".to_string())
        })?;

        Ok(Schema { root, declarations })
    }

    /// The document root element the schema expects
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The declared children of an element, if it is a complex element
    pub fn declaration(&self, element: &str) -> Option<&[ChildSpec]> {
        self.declarations.get(element).map(Vec::as_slice)
    }
}

/// Registers every element declaration in the subtree
fn collect_declarations(
    node: &Element,
    named_types: &HashMap<String, Vec<ChildSpec>>,
    declarations: &mut HashMap<String, Vec<ChildSpec>>,
) {
    for child in &node.children {
        if child.name == "element" {
            if let Some(name) = child.attr("name") {
                let specs = if let Some(type_ref) = child.attr("type") {
                    named_types.get(local(type_ref)).cloned().unwrap_or_default()
                } else {
                    sequence_children(child)
                };
                if !specs.is_empty() {
                    declarations.insert(name.to_string(), specs);
                }
            }
        }
        collect_declarations(child, named_types, declarations);
    }
}

/// Child specs from the first xs:sequence found under a node
fn sequence_children(node: &Element) -> Vec<ChildSpec> {
    let Some(sequence) = node.find("sequence") else {
        return Vec::new();
    };
    sequence
        .children
        .iter()
        .filter(|c| c.name == "element")
        .filter_map(|c| {
            let name = c.attr("name").or_else(|| c.attr("ref").map(local))?;
            Some(ChildSpec {
                name: local(name).to_string(),
                min_occurs: c
                    .attr("minOccurs")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1),
                max_occurs: match c.attr("maxOccurs") {
                    Some("unbounded") => None,
                    Some(v) => v.parse().ok(),
                    None => Some(1),
                },
            })
        })
        .collect()
}

fn local(qualified: &str) -> &str {
    qualified.rsplit(':').next().unwrap_or(qualified)
}

/// Classification of a validation violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// No schema is registered for the declared version; not a document defect
    Configuration,
    /// The document is not well-formed XML
    Syntax,
    /// The document violates the schema's structure
    Structure,
}

/// One validation violation with source position where available
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub message: String,
}

/// Result of validating one document against one version's schema
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub version: String,
    pub is_valid: bool,
    pub errors: Vec<Violation>,
}

impl ValidationReport {
    fn valid(version: &str) -> Self {
        Self {
            version: version.to_string(),
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn invalid(version: &str, errors: Vec<Violation>) -> Self {
        Self {
            version: version.to_string(),
            is_valid: false,
            errors,
        }
    }

    /// True when the only errors are configuration-class (missing schema)
    pub fn is_configuration_problem(&self) -> bool {
        !self.errors.is_empty()
            && self
                .errors
                .iter()
                .all(|e| e.kind == ViolationKind::Configuration)
    }
}

/// Validates documents against the schema their version resolves to
pub struct XsdValidator {
    registry: Arc<VersionRegistry>,
}

impl XsdValidator {
    pub fn new(registry: Arc<VersionRegistry>) -> Self {
        Self { registry }
    }

    /// Validates `xml` against the schema registered for `version`
    pub fn validate(&self, xml: &str, version: &str) -> ValidationReport {
        let schema = match self.registry.schema(version) {
            Ok(Some(schema)) => schema,
            Ok(None) => {
                return ValidationReport::invalid(
                    version,
                    vec![Violation {
                        kind: ViolationKind::Configuration,
                        line: None,
                        column: None,
                        message: format!("no XSD schema registered for version {version}"),
                    }],
                );
            }
            Err(e) => {
                return ValidationReport::invalid(
                    version,
                    vec![Violation {
                        kind: ViolationKind::Configuration,
                        line: None,
                        column: None,
                        message: e.to_string(),
                    }],
                );
            }
        };

        let document = match Element::parse(xml) {
            Ok(doc) => doc,
            Err(WireError::Malformed {
                line,
                column,
                message,
            }) => {
                return ValidationReport::invalid(
                    version,
                    vec![Violation {
                        kind: ViolationKind::Syntax,
                        line: Some(line),
                        column: Some(column),
                        message: format!("XML syntax error: {message}"),
                    }],
                );
            }
            Err(e) => {
                return ValidationReport::invalid(
                    version,
                    vec![Violation {
                        kind: ViolationKind::Syntax,
                        line: None,
                        column: None,
                        message: e.to_string(),
                    }],
                );
            }
        };

        let mut violations = Vec::new();
        if document.name != schema.root() {
            violations.push(structure(
                &document,
                format!(
                    "expected root element '{}', found '{}'",
                    schema.root(),
                    document.name
                ),
            ));
        } else {
            check_element(&document, &schema, &mut violations);
        }

        tracing::debug!(
            version,
            violations = violations.len(),
            "validated document against schema"
        );

        if violations.is_empty() {
            ValidationReport::valid(version)
        } else {
            ValidationReport::invalid(version, violations)
        }
    }
}

/// Recursively checks one declared element; collects every violation found
fn check_element(element: &Element, schema: &Schema, violations: &mut Vec<Violation>) {
    let Some(specs) = schema.declaration(&element.name) else {
        return;
    };

    for spec in specs {
        let count = element
            .children
            .iter()
            .filter(|c| c.name == spec.name)
            .count() as u32;

        if count < spec.min_occurs {
            violations.push(structure(
                element,
                format!(
                    "element '{}' requires at least {} occurrence(s) of '{}', found {}",
                    element.name, spec.min_occurs, spec.name, count
                ),
            ));
        }
        if let Some(max) = spec.max_occurs {
            if count > max {
                violations.push(structure(
                    element,
                    format!(
                        "element '{}' allows at most {} occurrence(s) of '{}', found {}",
                        element.name, max, spec.name, count
                    ),
                ));
            }
        }
    }

    for child in &element.children {
        if !specs.iter().any(|s| s.name == child.name) {
            violations.push(structure(
                child,
                format!(
                    "unexpected element '{}' inside '{}'",
                    child.name, element.name
                ),
            ));
        } else {
            check_element(child, schema, violations);
        }
    }
}

fn structure(element: &Element, message: String) -> Violation {
    Violation {
        kind: ViolationKind::Structure,
        line: Some(element.line),
        column: Some(element.column),
        message,
    }
}
