//! Admin gate for owner-only views.

use super::types::Identity;

/// Checks viewers against the configured contract owner.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    owner: Option<Identity>,
}

impl AdminGate {
    #[must_use]
    pub fn new(owner: Option<Identity>) -> Self {
        Self { owner }
    }

    #[must_use]
    pub fn owner(&self) -> Option<&Identity> {
        self.owner.as_ref()
    }

    /// True only when both an owner is configured and the viewer matches it.
    #[must_use]
    pub fn is_admin(&self, viewer: Option<&Identity>) -> bool {
        match (&self.owner, viewer) {
            (Some(owner), Some(viewer)) => owner.matches(viewer),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_requires_owner_and_viewer() {
        let owner = Identity::new("0xDeadBeef00000000000000000000000000000001");
        let gate = AdminGate::new(Some(owner.clone()));
        assert!(gate.is_admin(Some(&Identity::new("0xdeadbeef00000000000000000000000000000001"))));
        assert!(!gate.is_admin(Some(&Identity::new("0x0000000000000000000000000000000000000002"))));
        assert!(!gate.is_admin(None));

        let unset = AdminGate::default();
        assert!(!unset.is_admin(Some(&owner)));
        assert!(unset.owner().is_none());
    }
}
