use std::{collections::HashMap, sync::Arc};

use hyper::Uri;

use crate::{
    helper_layers::balancer::{Balancer, Random},
    CgRequest,
};

/// Static table from service name to the base urls of its instances.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: Arc<HashMap<String, Balancer<Random, Uri>>>,
}

impl ServiceRegistry {
    pub fn new(services: impl IntoIterator<Item = (String, Vec<Uri>)>) -> Self {
        let services = services
            .into_iter()
            .map(|(name, instances)| (name, Balancer::new(Random, instances)))
            .collect::<HashMap<_, _>>();
        Self { services: Arc::new(services) }
    }
    pub fn instances(&self, service: &str) -> &[Uri] {
        self.services.get(service).map(|b| b.instances.as_slice()).unwrap_or_default()
    }
    /// Pick one instance of `service`, none if the service is unknown or has no instance.
    pub fn pick(&self, service: &str, req: &CgRequest) -> Option<Uri> {
        self.services.get(service)?.pick(req).cloned()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::CgBody;

    #[test]
    fn test_pick_instance() {
        let registry = ServiceRegistry::new([
            ("courses".to_string(), vec![Uri::from_static("http://10.0.0.1:8081"), Uri::from_static("http://10.0.0.2:8081")]),
            ("students".to_string(), vec![]),
        ]);
        let req = CgRequest::new(CgBody::empty());
        for _ in 0..16 {
            let picked = registry.pick("courses", &req).expect("courses has instances");
            assert!(registry.instances("courses").contains(&picked));
        }
        assert!(registry.pick("students", &req).is_none());
        assert!(registry.pick("unknown", &req).is_none());
    }
}
