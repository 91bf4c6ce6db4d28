use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::{Result, dtype::DType, initializer::TruncMethod};

/// The specification of an initialization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitSpec {
    Uniform {
        min: f64,
        max: f64,
    },
    Normal {
        stdv: f64,
        #[serde(default)]
        mean: f64,
    },
    KaimingUniform {
        fan_in: i64,
    },
    KaimingNormal {
        fan_in: i64,
    },
    GlorotUniform {
        fan_in: i64,
        fan_out: i64,
    },
    GlorotNormal {
        fan_in: i64,
        fan_out: i64,
    },
    TruncNormal {
        stdv: f64,
        #[serde(default)]
        mean: f64,
        min_cutoff: f64,
        max_cutoff: f64,
        #[serde(default)]
        method: TruncMethod,
    },
    Constant {
        value: f64,
    },
    Identity,
}

/// The specification of a single named parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub shape: Vec<i64>,
    #[serde(default)]
    pub dtype: DType,
    pub init: InitSpec,
    #[serde(default = "default_requires_grad")]
    pub requires_grad: bool,
}

fn default_requires_grad() -> bool {
    true
}

/// The specification of every parameter of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitConfig {
    /// When absent the generator is seeded from the operating system.
    #[serde(default)]
    pub seed: Option<u64>,
    pub params: Vec<ParamSpec>,
}

impl InitConfig {
    /// Parses a configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a configuration from a JSON reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}
