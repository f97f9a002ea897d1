use std::fmt;
use std::str::FromStr;

use monitor_common::Location;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

pub const NODE_NAME_MIN: u64 = 1;
pub const NODE_NAME_MAX: u64 = 10;

fn validate_location(location: &str) -> Result<(), ValidationError> {
    match Location::from_str(location) {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("location")
            .with_message(format!("location must be one of {}", Location::codes().join("|")).into())),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NodeSaveCmd {
    #[validate(length(
        min = NODE_NAME_MIN,
        max = NODE_NAME_MAX,
        message = "node name length must be 1-10"
    ))]
    pub name: String,
    #[validate(custom(function = "validate_location"))]
    pub location: String,
    #[serde(default)]
    pub remark: String,
}

/// A registration that passed [`NodeSaveCmd::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidNodeSave {
    pub name: String,
    pub location: Location,
    pub remark: String,
}

/// Payload of a rename request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenameNodeCmd {
    pub id: i32,
    #[validate(length(
        min = NODE_NAME_MIN,
        max = NODE_NAME_MAX,
        message = "node name length must be 1-10"
    ))]
    pub node: String,
    #[validate(custom(function = "validate_location"))]
    pub location: String,
}

/// A rename request that passed [`RenameNodeCmd::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRenameNode {
    pub id: i32,
    pub node: String,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FieldViolation {
    NodeLength,
    LocationPattern,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::NodeLength => write!(
                f,
                "node length must be between {NODE_NAME_MIN} and {NODE_NAME_MAX}"
            ),
            FieldViolation::LocationPattern => {
                write!(f, "location must be one of {}", Location::codes().join("|"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeValidationError {
    violations: Vec<FieldViolation>,
}

impl NodeValidationError {
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    pub fn contains(&self, violation: FieldViolation) -> bool {
        self.violations.contains(&violation)
    }
}

impl fmt::Display for NodeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
        f.write_str(&msg.join("; "))
    }
}

impl std::error::Error for NodeValidationError {}

impl From<Vec<FieldViolation>> for NodeValidationError {
    fn from(mut violations: Vec<FieldViolation>) -> Self {
        violations.sort();
        violations.dedup();
        Self { violations }
    }
}

impl From<ValidationErrors> for NodeValidationError {
    fn from(errors: ValidationErrors) -> Self {
        errors
            .field_errors()
            .keys()
            .filter_map(|field| match &**field {
                "node" | "name" => Some(FieldViolation::NodeLength),
                "location" => Some(FieldViolation::LocationPattern),
                _ => None,
            })
            .collect::<Vec<_>>()
            .into()
    }
}

fn parse_location(location: &str) -> Result<Location, NodeValidationError> {
    Location::from_str(location)
        .map_err(|_| NodeValidationError::from(vec![FieldViolation::LocationPattern]))
}

impl NodeSaveCmd {
    /// Same field rules as [`RenameNodeCmd::check`], applied to `name`.
    pub fn check(self) -> Result<ValidNodeSave, NodeValidationError> {
        self.validate()?;
        Ok(ValidNodeSave {
            location: parse_location(&self.location)?,
            name: self.name,
            remark: self.remark,
        })
    }
}

impl RenameNodeCmd {
    pub fn new(id: i32, node: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id,
            node: node.into(),
            location: location.into(),
        }
    }

    /// Checks both field rules and reports every field that failed.
    pub fn check(self) -> Result<ValidRenameNode, NodeValidationError> {
        self.validate()?;
        Ok(ValidRenameNode {
            location: parse_location(&self.location)?,
            id: self.id,
            node: self.node,
        })
    }
}
