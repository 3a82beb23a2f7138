//! Cyclic module interface
//!
//! Superstructure control, trajectory control and drive control are all built from a parameter
//! file and then stepped once per control cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;

use crate::params::{self, LoadError};

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A cyclic control module.
pub trait State: Sized {
    /// Parameters the module is built from.
    type Params: DeserializeOwned;

    /// Data required for cyclic processing.
    type InputData;
    /// Data produced by cyclic processing.
    type OutputData;
    /// A report on the status of the cyclic processing.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Build a fresh module from its parameters.
    fn from_params(params: Self::Params) -> Self;

    /// Initialise the module from the parameter file at `params_path`, relative to the parameter
    /// directory.
    ///
    /// Any state the module held before is discarded.
    fn init(&mut self, params_path: &str) -> Result<(), LoadError> {
        *self = Self::from_params(params::load(params_path)?);
        Ok(())
    }

    /// Process one control cycle. Must never block.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct GainParams {
        gain: f64,
    }

    #[derive(Default)]
    struct Gain {
        gain: f64,
        calls: u32,
    }

    impl State for Gain {
        type Params = GainParams;
        type InputData = f64;
        type OutputData = f64;
        type StatusReport = u32;
        type ProcError = ();

        fn from_params(params: GainParams) -> Self {
            Self {
                gain: params.gain,
                calls: 0,
            }
        }

        fn proc(&mut self, input: &f64) -> Result<(f64, u32), ()> {
            self.calls += 1;
            Ok((self.gain * input, self.calls))
        }
    }

    #[test]
    fn test_init_missing_file_keeps_state() {
        let mut module = Gain::from_params(params::from_str("gain = 2.0").unwrap());
        assert_eq!(module.proc(&1.5), Ok((3.0, 1)));

        assert!(module.init("no_such_module_params.toml").is_err());
        assert_eq!(module.proc(&1.0), Ok((2.0, 2)));
    }
}
