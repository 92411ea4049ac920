use crate::element::{
    collocation::{CentroidOffset, DEFAULT_OFFSET},
    shape_fns::{EdgePartition, VertexWeights},
    ElementError,
};
use crate::mesh::dof::{ApproxOrder, TipType};

use json::JsonValue;
use std::fs::read_to_string;
use thiserror::Error;

/// Default relative offset of collocation points toward the element centroid
pub const DEFAULT_BETA: f64 = DEFAULT_OFFSET.beta();

/// Numerical parameters of a simulation
///
/// Loaded from a JSON object where every field is optional:
/// ```text
/// {
///     "beta": 0.125,
///     "tip_type": 1,
///     "dd_local": true,
///     "approx_order": 2,
///     "vertex_weights": [1.0, 2.0, 1.5]
/// }
/// ```
/// `tip_type` is 0 (no enforcement), 1 (vertex nodes) or 2 (vertex and edge nodes), or one of the
/// strings "none", "vertex_nodes", "all_nodes". Without `vertex_weights`, edges are partitioned uniformly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumParams {
    /// validated collocation point offset
    pub beta: CentroidOffset,
    pub tip_type: TipType,
    /// whether DDs are sought in each element's local frame (otherwise in the global frame)
    ///
    /// Nothing in this crate reads it; it is carried for the kernel assembly that consumes these parameters.
    pub dd_local: bool,
    pub approx_order: ApproxOrder,
    pub vertex_weights: Option<VertexWeights>,
}

impl Default for NumParams {
    fn default() -> Self {
        Self {
            beta: DEFAULT_OFFSET,
            tip_type: TipType::default(),
            dd_local: true,
            approx_order: ApproxOrder::default(),
            vertex_weights: None,
        }
    }
}

impl NumParams {
    pub fn from_file(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let contents = read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let params_json = json::parse(contents)?;
        if !params_json.is_object() {
            return Err(ConfigError::Field {
                field: "<root>",
                expected: "an object",
            });
        }

        let defaults = Self::default();
        let params = Self {
            beta: parse_beta(&params_json["beta"])?.unwrap_or(defaults.beta),
            tip_type: parse_tip_type(&params_json["tip_type"])?.unwrap_or(defaults.tip_type),
            dd_local: parse_bool(&params_json["dd_local"], "dd_local")?.unwrap_or(defaults.dd_local),
            approx_order: parse_approx_order(&params_json["approx_order"])?
                .unwrap_or(defaults.approx_order),
            vertex_weights: parse_vertex_weights(&params_json["vertex_weights"])?,
        };

        log::debug!("Loaded numerical parameters: {:?}", params);

        Ok(params)
    }

    /// The collocation point offset
    pub fn offset(&self) -> CentroidOffset {
        self.beta
    }

    /// How the edge nodes of every element are placed
    pub fn partition(&self) -> EdgePartition {
        match self.vertex_weights {
            Some(weights) => EdgePartition::NonUniform(weights),
            None => EdgePartition::Uniform,
        }
    }
}

fn parse_beta(value: &JsonValue) -> Result<Option<CentroidOffset>, ConfigError> {
    if value.is_null() {
        return Ok(None);
    }
    let beta = value.as_f64().ok_or(ConfigError::Field {
        field: "beta",
        expected: "a number",
    })?;
    Ok(Some(CentroidOffset::new(beta)?))
}

fn parse_bool(value: &JsonValue, field: &'static str) -> Result<Option<bool>, ConfigError> {
    if value.is_null() {
        return Ok(None);
    }
    value.as_bool().map(Some).ok_or(ConfigError::Field {
        field,
        expected: "a boolean",
    })
}

fn parse_tip_type(value: &JsonValue) -> Result<Option<TipType>, ConfigError> {
    if value.is_null() {
        return Ok(None);
    }
    let tip_type = match (value.as_u8(), value.as_str()) {
        (Some(0), _) | (_, Some("none")) => TipType::None,
        (Some(1), _) | (_, Some("vertex_nodes")) => TipType::VertexNodes,
        (Some(2), _) | (_, Some("all_nodes")) => TipType::AllNodes,
        _ => {
            return Err(ConfigError::Field {
                field: "tip_type",
                expected: "0, 1, 2, \"none\", \"vertex_nodes\" or \"all_nodes\"",
            })
        }
    };
    Ok(Some(tip_type))
}

fn parse_approx_order(value: &JsonValue) -> Result<Option<ApproxOrder>, ConfigError> {
    if value.is_null() {
        return Ok(None);
    }
    value
        .as_u8()
        .and_then(ApproxOrder::from_degree)
        .map(Some)
        .ok_or(ConfigError::Field {
            field: "approx_order",
            expected: "0, 1 or 2",
        })
}

fn parse_vertex_weights(value: &JsonValue) -> Result<Option<VertexWeights>, ConfigError> {
    if value.is_null() {
        return Ok(None);
    }
    let malformed = || ConfigError::Field {
        field: "vertex_weights",
        expected: "an array of 3 numbers",
    };
    if !value.is_array() || value.len() != 3 {
        return Err(malformed());
    }

    let mut w = [0.0; 3];
    for (weight, member) in w.iter_mut().zip(value.members()) {
        *weight = member.as_f64().ok_or_else(malformed)?;
    }
    Ok(Some(VertexWeights::new(w)?))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to read parameter file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse parameters as JSON: {0}")]
    Json(#[from] json::Error),
    #[error("Parameter '{field}' must be {expected}!")]
    Field {
        field: &'static str,
        expected: &'static str,
    },
    #[error("Invalid parameter value: {0}")]
    Value(#[from] ElementError),
}
