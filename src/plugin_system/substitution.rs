//! Single-slot holder for the executor/subscriber of one operation.

use std::sync::Arc;

use super::error::PluginError;

/// Holds the implementation the operation will invoke.
///
/// The slot starts with the engine default. Each install receives the
/// implementation it replaces, so plugins can layer wrappers; the last
/// install wins. A hook may install at most once per invocation.
#[derive(Debug)]
pub struct FnSlot<F> {
    current: F,
    installed_by: Option<Arc<str>>,
    layers: usize,
    hook_owner: Option<Arc<str>>,
    installed_in_hook: bool,
}

impl<F: Clone> FnSlot<F> {
    pub(crate) fn new(default: F) -> Self {
        Self {
            current: default,
            installed_by: None,
            layers: 0,
            hook_owner: None,
            installed_in_hook: false,
        }
    }

    pub(crate) fn begin_hook(&mut self, plugin_id: &Arc<str>) {
        self.hook_owner = Some(Arc::clone(plugin_id));
        self.installed_in_hook = false;
    }

    /// Replace the current implementation with `wrap(previous)`.
    pub fn install<W>(&mut self, wrap: W) -> Result<(), PluginError>
    where
        W: FnOnce(F) -> F,
    {
        if self.installed_in_hook {
            return Err(PluginError::SubstitutionRejected(format!(
                "plugin '{}' already installed an implementation in this phase",
                self.hook_owner.as_deref().unwrap_or("<unknown>")
            )));
        }
        let previous = self.current.clone();
        self.current = wrap(previous);
        self.installed_in_hook = true;
        self.installed_by = self.hook_owner.clone();
        self.layers += 1;
        Ok(())
    }

    pub fn current(&self) -> &F {
        &self.current
    }

    /// Id of the plugin that installed the current implementation, `None`
    /// while the default is in place.
    pub fn installed_by(&self) -> Option<&str> {
        self.installed_by.as_deref()
    }

    /// Number of implementations layered over the default.
    pub fn layers(&self) -> usize {
        self.layers
    }

    pub(crate) fn into_current(self) -> F {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_wraps_previous() {
        let mut slot: FnSlot<Vec<&'static str>> = FnSlot::new(vec!["default"]);
        slot.begin_hook(&Arc::from("a"));
        slot.install(|mut prev| {
            prev.push("a");
            prev
        })
        .unwrap();
        slot.begin_hook(&Arc::from("b"));
        slot.install(|mut prev| {
            prev.push("b");
            prev
        })
        .unwrap();

        assert_eq!(slot.current(), &vec!["default", "a", "b"]);
        assert_eq!(slot.installed_by(), Some("b"));
        assert_eq!(slot.layers(), 2);
    }

    #[test]
    fn test_second_install_in_same_hook_rejected() {
        let mut slot = FnSlot::new(0u32);
        slot.begin_hook(&Arc::from("jit"));
        slot.install(|_| 1).unwrap();
        let err = slot.install(|_| 2).unwrap_err();
        assert!(matches!(err, PluginError::SubstitutionRejected(_)));
        assert!(err.to_string().contains("jit"));
        assert_eq!(*slot.current(), 1);
        assert_eq!(slot.layers(), 1);
    }

    #[test]
    fn test_default_has_no_installer() {
        let slot = FnSlot::new("default");
        assert!(slot.installed_by().is_none());
        assert_eq!(slot.into_current(), "default");
    }
}
