// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Startup-time module registry.
//
// Packages register their modules once, before any script call is routed.
// Lookups are by module name; calls are forwarded to `BridgeModule::invoke`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use fileuploader_core::error::{Result, UploaderError};

use crate::context::BridgeContext;
use crate::traits::{BridgeModule, Callback, ModulePackage};

/// Registry of bridge modules keyed by name.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Arc<dyn BridgeModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single module. Names must be unique.
    pub fn register(&mut self, module: Arc<dyn BridgeModule>) -> Result<()> {
        let name = module.name().to_owned();
        if self.modules.contains_key(&name) {
            warn!(module = %name, "duplicate module registration rejected");
            return Err(UploaderError::Bridge(format!(
                "module '{name}' is already registered"
            )));
        }
        info!(module = %name, methods = ?module.method_names(), "module registered");
        self.modules.insert(name, module);
        Ok(())
    }

    /// Create and register every module a package provides.
    pub fn register_package(&mut self, package: &dyn ModulePackage, ctx: &BridgeContext) -> Result<()> {
        for module in package.create_native_modules(ctx)? {
            self.register(module)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn BridgeModule>> {
        self.modules.get(name).cloned()
    }

    /// Registered module names, sorted.
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.keys().map(String::as_str).collect()
    }

    /// Route a script call to `module.method(args…, callback)`.
    pub fn invoke(&self, module: &str, method: &str, args: Vec<Value>, callback: Callback) -> Result<()> {
        let target = self
            .modules
            .get(module)
            .ok_or_else(|| UploaderError::UnknownModule(module.to_owned()))?;
        debug!(module, method, argc = args.len(), "invoking bridge method");
        target.invoke(method, args, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LogEmitter;
    use fileuploader_core::UploaderConfig;
    use serde_json::json;
    use std::sync::Mutex;

    struct Echo;

    impl BridgeModule for Echo {
        fn name(&self) -> &str {
            "Echo"
        }

        fn method_names(&self) -> &[&'static str] {
            &["echo"]
        }

        fn invoke(&self, method: &str, args: Vec<Value>, callback: Callback) -> Result<()> {
            if method != "echo" {
                return Err(UploaderError::UnknownMethod {
                    module: "Echo".into(),
                    method: method.into(),
                });
            }
            callback(None, args.into_iter().next());
            Ok(())
        }
    }

    struct EchoPackage;

    impl ModulePackage for EchoPackage {
        fn create_native_modules(&self, _ctx: &BridgeContext) -> Result<Vec<Arc<dyn BridgeModule>>> {
            Ok(vec![Arc::new(Echo)])
        }
    }

    #[tokio::test]
    async fn package_modules_are_routable() {
        let ctx = BridgeContext::current(Arc::new(LogEmitter), UploaderConfig::default()).unwrap();
        let mut registry = ModuleRegistry::new();
        registry.register_package(&EchoPackage, &ctx).unwrap();
        assert_eq!(registry.module_names(), vec!["Echo"]);

        let got = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&got);
        registry
            .invoke(
                "Echo",
                "echo",
                vec![json!("hi")],
                Box::new(move |err, res| *sink.lock().unwrap() = Some((err, res))),
            )
            .unwrap();

        assert_eq!(*got.lock().unwrap(), Some((None, Some(json!("hi")))));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(Echo)).unwrap();
        assert!(matches!(
            registry.register(Arc::new(Echo)),
            Err(UploaderError::Bridge(_))
        ));
    }

    #[test]
    fn unknown_module_and_method_are_errors() {
        let mut registry = ModuleRegistry::new();
        registry.register(Arc::new(Echo)).unwrap();

        let err = registry
            .invoke("Nope", "echo", vec![], Box::new(|_, _| {}))
            .unwrap_err();
        assert!(matches!(err, UploaderError::UnknownModule(_)));

        let err = registry
            .invoke("Echo", "shout", vec![], Box::new(|_, _| {}))
            .unwrap_err();
        assert!(matches!(err, UploaderError::UnknownMethod { .. }));
    }
}
