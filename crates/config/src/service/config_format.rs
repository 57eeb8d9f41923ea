use std::ffi::OsStr;

use crate::BoxError;

mod json;
mod toml;
pub use self::json::Json;
pub use self::toml::Toml;

pub trait ConfigFormat {
    fn extension(&self) -> &OsStr;
    /// # Errors
    /// If `slice` is not a valid document of this format for `T`.
    fn de<T: serde::de::DeserializeOwned>(&self, slice: &[u8]) -> Result<T, BoxError>;
    /// # Errors
    /// If `t` can't be represented in this format.
    fn ser<T: serde::Serialize>(&self, t: &T) -> Result<Vec<u8>, BoxError>;
}
