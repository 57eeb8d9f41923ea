use std::{collections::BTreeMap, str::FromStr, time::Duration};

use campusgate_config::{CgHttpRoute, CgPathRewrite, Config};
use campusgate_kernel::{
    service::{
        registry::ServiceRegistry,
        route_table::{PathRewrite, Route, RouteTable, Target},
    },
    BoxError,
};
use hyper::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Uri,
};
use regex::Regex;

pub(crate) fn convert_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, BoxError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        map.append(HeaderName::from_str(name)?, HeaderValue::from_str(value)?);
    }
    Ok(map)
}

pub(crate) fn convert_rewrite(rewrite: &CgPathRewrite) -> Result<PathRewrite, BoxError> {
    Ok(match rewrite {
        CgPathRewrite::StripPrefix => PathRewrite::StripPrefix,
        CgPathRewrite::Regex { regex, replacement } => PathRewrite::Regex {
            regex: Regex::new(regex)?,
            replacement: replacement.clone(),
        },
        CgPathRewrite::Keep => PathRewrite::Keep,
    })
}

pub(crate) fn convert_route(route: &CgHttpRoute) -> Result<Route, BoxError> {
    let target = Target::from_str(&route.uri).map_err(|e| format!("[Cg.Config] route {}: {e}", route.name))?;
    Ok(Route::new(route.name.clone(), route.prefix.clone(), target)
        .rewrite(convert_rewrite(&route.rewrite)?)
        .request_headers(convert_headers(&route.request_headers)?)
        .response_headers(convert_headers(&route.response_headers)?)
        .timeout(route.timeout_ms.map(Duration::from_millis)))
}

/// # Errors
/// If a route has an invalid target, rewrite regex or header.
pub fn convert_routes(config: &Config) -> Result<RouteTable, BoxError> {
    let routes = config.routes.iter().map(convert_route).collect::<Result<Vec<_>, _>>()?;
    for route in &routes {
        if let Target::Balanced(service) = &route.target {
            if !config.services.contains_key(service) {
                tracing::warn!(route = %route.name, %service, "[Cg.Config] route targets an unknown service");
            }
        }
    }
    Ok(RouteTable::new(routes))
}

/// # Errors
/// If an instance url is invalid.
pub fn convert_registry(config: &Config) -> Result<ServiceRegistry, BoxError> {
    let services = config
        .services
        .iter()
        .map(|(name, instances)| {
            let instances = instances.iter().map(|uri| Uri::from_str(uri).map_err(|e| format!("[Cg.Config] service {name} instance {uri}: {e}"))).collect::<Result<Vec<_>, _>>()?;
            Ok::<_, BoxError>((name.clone(), instances))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ServiceRegistry::new(services))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_convert_route() {
        let route = CgHttpRoute {
            name: "courses".to_string(),
            prefix: "/Proiect_TW/courses".to_string(),
            uri: "lb://courses".to_string(),
            rewrite: CgPathRewrite::Regex {
                regex: "/Proiect_TW/courses/(?<segment>.*)".to_string(),
                replacement: "/${segment}".to_string(),
            },
            request_headers: BTreeMap::from([("X-Service".to_string(), "courses-service".to_string())]),
            timeout_ms: Some(1500),
            ..Default::default()
        };
        let route = convert_route(&route).expect("invalid route");
        assert_eq!(route.target, Target::Balanced("courses".to_string()));
        assert_eq!(route.rewrite_path("/Proiect_TW/courses/getAll"), "/getAll");
        assert_eq!(route.request_headers.get("x-service"), Some(&HeaderValue::from_static("courses-service")));
        assert_eq!(route.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_invalid_routes() {
        let bad_target = CgHttpRoute {
            name: "x".to_string(),
            prefix: "/x".to_string(),
            uri: "ftp://files".to_string(),
            ..Default::default()
        };
        assert!(convert_route(&bad_target).is_err());
        let bad_regex = CgHttpRoute {
            uri: "lb://x".to_string(),
            rewrite: CgPathRewrite::Regex {
                regex: "(".to_string(),
                replacement: String::new(),
            },
            ..bad_target.clone()
        };
        assert!(convert_route(&bad_regex).is_err());
        let bad_header = CgHttpRoute {
            uri: "lb://x".to_string(),
            request_headers: BTreeMap::from([("bad header".to_string(), "v".to_string())]),
            ..bad_target
        };
        assert!(convert_route(&bad_header).is_err());
    }
}
