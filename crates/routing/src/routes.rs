use std::{collections::HashMap, fmt, sync::Arc};

use crate::{Error, Result, handler::RouteHandler};

/// Named continuation handlers. A stored conversation names its route; the
/// dispatcher resolves that name here.
#[derive(Default)]
pub struct RouteTable {
    routes: HashMap<String, Arc<dyn RouteHandler>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`. Names are unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        handler: impl RouteHandler + 'static,
    ) -> Result<()> {
        let name = name.into();
        if self.routes.contains_key(&name) {
            return Err(Error::DuplicateRoute { name });
        }
        self.routes.insert(name, Arc::new(handler));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RouteHandler>> {
        self.routes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.names())
            .finish()
    }
}
