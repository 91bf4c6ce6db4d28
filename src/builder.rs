use log::debug;

use crate::{
    Result,
    backend::{ArrayBackend, Backend},
    initializer::Initializer,
    parameter::Parameter,
    shape::Shape,
    specs::{InitConfig, InitSpec, ParamSpec},
};

impl<B: Backend> Initializer<B> {
    /// Builds a parameter following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification of the parameter.
    ///
    /// # Returns
    /// A new parameter or an error if the spec is invalid.
    pub fn build(&mut self, spec: &ParamSpec) -> Result<Parameter> {
        let shape = Shape::new(&spec.shape)?;
        let dtype = spec.dtype;
        let calc_grad = spec.requires_grad;

        debug!(name = spec.name.as_str(), elements = shape.elements(); "building parameter");

        let tensor = match spec.init {
            InitSpec::Uniform { min, max } => self.uniform(shape, min, max, dtype)?,
            InitSpec::Normal { stdv, mean } => self.normal(shape, stdv, mean, dtype)?,
            InitSpec::KaimingUniform { fan_in } => self.kaiming_uniform(shape, fan_in, dtype)?,
            InitSpec::KaimingNormal { fan_in } => self.kaiming_normal(shape, fan_in, dtype)?,
            InitSpec::GlorotUniform { fan_in, fan_out } => {
                self.glorot_uniform(shape, fan_in, fan_out, dtype)?
            }
            InitSpec::GlorotNormal { fan_in, fan_out } => {
                self.glorot_normal(shape, fan_in, fan_out, dtype)?
            }
            InitSpec::TruncNormal {
                stdv,
                mean,
                min_cutoff,
                max_cutoff,
                method,
            } => self.trunc_normal_with(method, shape, stdv, mean, min_cutoff, max_cutoff, dtype)?,
            InitSpec::Constant { value } => return self.constant(value, shape, dtype, calc_grad),
            InitSpec::Identity => return self.identity(shape, dtype, calc_grad),
        };

        Ok(Parameter::new(tensor, calc_grad))
    }
}

/// Builds every parameter of a config, in order, from a single generator.
///
/// # Arguments
/// * `config` - The specification of every parameter.
///
/// # Returns
/// The named parameters or the first error encountered.
pub fn build_all(config: &InitConfig) -> Result<Vec<(String, Parameter)>> {
    let mut init = Initializer::new(ArrayBackend::from_seed_opt(config.seed));

    config
        .params
        .iter()
        .map(|spec| Ok((spec.name.clone(), init.build(spec)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DType, InitErr};

    fn spec(name: &str, shape: &[i64], init: InitSpec) -> ParamSpec {
        ParamSpec {
            name: name.to_string(),
            shape: shape.to_vec(),
            dtype: DType::F32,
            init,
            requires_grad: true,
        }
    }

    #[test]
    fn build_matches_direct_call() {
        let spec = spec("w", &[8, 4], InitSpec::GlorotNormal { fan_in: 4, fan_out: 8 });

        let built = Initializer::seeded(9).build(&spec).unwrap();
        let direct = Initializer::seeded(9)
            .glorot_normal_param(Shape::new(&[8, 4]).unwrap(), 4, 8, DType::F32, true)
            .unwrap();

        assert_eq!(built, direct);
    }

    #[test]
    fn build_all_in_order() {
        let config = InitConfig {
            seed: Some(5),
            params: vec![
                spec("fc.weight", &[3, 2], InitSpec::KaimingUniform { fan_in: 2 }),
                spec("fc.bias", &[3], InitSpec::Constant { value: 0. }),
            ],
        };

        let params = build_all(&config).unwrap();
        let names: Vec<_> = params.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(names, ["fc.weight", "fc.bias"]);
        assert_eq!(params[1].1.tensor().to_f64_vec(), [0.; 3]);
        assert_eq!(params, build_all(&config).unwrap());
    }

    #[test]
    fn build_all_stops_on_error() {
        let config = InitConfig {
            seed: Some(5),
            params: vec![
                spec("ok", &[3], InitSpec::Constant { value: 1. }),
                spec("bad", &[3, -3], InitSpec::Constant { value: 1. }),
            ],
        };

        let err = build_all(&config).unwrap_err();
        assert!(matches!(err, InitErr::InvalidShape(_)));
    }
}
