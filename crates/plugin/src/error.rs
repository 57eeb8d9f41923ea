use std::{borrow::Cow, fmt::Display};

use hyper::{Response, StatusCode};
use campusgate_kernel::{CgBody, CgResponseExt};

use crate::Plugin;

/// An error raised by a plugin, answered to the client with 500 and the error message.
#[derive(Debug)]
pub struct PluginError<E> {
    plugin_code: Cow<'static, str>,
    source: E,
}

impl<E> From<PluginError<E>> for Response<CgBody>
where
    E: Display,
{
    fn from(val: PluginError<E>) -> Self {
        Response::with_code_message(StatusCode::INTERNAL_SERVER_ERROR, val.to_string())
    }
}

impl<E> PluginError<E> {
    pub fn internal_error<P: Plugin>(e: E) -> Self {
        Self {
            plugin_code: Cow::Borrowed(P::CODE),
            source: e,
        }
    }
}

impl<E> std::fmt::Display for PluginError<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Cg.Plugin.{p}] {e}", p = self.plugin_code, e = self.source)
    }
}

impl<E> std::error::Error for PluginError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
