// III-IV
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Typed access to configuration stored in environment variables.
//!
//! Variables are named `<prefix>_<suffix>` so that the same set of settings (say, the database
//! connection) can be read for different purposes by changing the prefix.

use std::env;

/// Result type for this module.  Errors are ready to be shown to the user.
type Result<T> = std::result::Result<T, String>;

/// Types that can be parsed from the raw value of an environment variable.
pub trait FromEnvValue: Sized {
    /// Converts the raw `value` into `Self`, describing the problem on failure.
    fn from_env_value(value: String) -> Result<Self>;
}

impl FromEnvValue for String {
    fn from_env_value(value: String) -> Result<Self> {
        Ok(value)
    }
}

/// Implements `FromEnvValue` for types that can be parsed with `str::parse`.
macro_rules! impl_from_env_value_via_parse [
    ( $( $t:ty ),+ ) => {
        $(
            impl FromEnvValue for $t {
                fn from_env_value(value: String) -> Result<Self> {
                    value.parse::<$t>().map_err(|e| {
                        format!("'{}' is not a valid {}: {}", value, stringify!($t), e)
                    })
                }
            }
        )+
    }
];

impl_from_env_value_via_parse!(u16, u32);

/// Reads the `<prefix>_<suffix>` variable as a `T`, returning `None` if it is not set.
pub fn get_optional_var<T: FromEnvValue>(prefix: &str, suffix: &str) -> Result<Option<T>> {
    let name = format!("{}_{}", prefix, suffix);
    let value = match env::var(&name) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(format!("Environment variable {} is not valid UTF-8", name))
        }
    };
    T::from_env_value(value)
        .map(Some)
        .map_err(|e| format!("Bad value in environment variable {}: {}", name, e))
}

/// Reads the `<prefix>_<suffix>` variable as a `T`, failing if it is not set.
pub fn get_required_var<T: FromEnvValue>(prefix: &str, suffix: &str) -> Result<T> {
    get_optional_var(prefix, suffix)?.ok_or_else(|| {
        format!("Required environment variable {}_{} not present", prefix, suffix)
    })
}
