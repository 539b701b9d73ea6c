// issuance/src/identity.rs

use launchpad_core::{Address, PersonaId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ownership/identity registry collaborator
///
/// Assigns persona ids and answers ownership queries. Transfer semantics
/// live entirely on the registry's side; the engine only reads `owner_of`
/// when authorizing metadata updates and fee-recipient routing.
pub trait IdentityRegistry {
    /// Mint a new identity for `owner` and return its persona id
    fn mint_identity(&mut self, owner: Address) -> PersonaId;

    /// Current owner of a persona, if it exists
    fn owner_of(&self, persona: PersonaId) -> Option<Address>;
}

/// In-memory identity registry with monotonic, never-reused ids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryIdentityRegistry {
    owners: HashMap<PersonaId, Address>,
    next_id: PersonaId,
}

impl InMemoryIdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer ownership (used by tests to exercise authorization)
    pub fn transfer(&mut self, persona: PersonaId, to: Address) -> bool {
        match self.owners.get_mut(&persona) {
            Some(owner) => {
                *owner = to;
                true
            }
            None => false,
        }
    }
}

impl IdentityRegistry for InMemoryIdentityRegistry {
    fn mint_identity(&mut self, owner: Address) -> PersonaId {
        self.next_id += 1;
        self.owners.insert(self.next_id, owner);
        self.next_id
    }

    fn owner_of(&self, persona: PersonaId) -> Option<Address> {
        self.owners.get(&persona).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[0] = n;
        Address::new(bytes)
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut registry = InMemoryIdentityRegistry::new();
        let a = registry.mint_identity(addr(1));
        let b = registry.mint_identity(addr(2));

        assert!(b > a);
        assert_eq!(registry.owner_of(a), Some(addr(1)));
        assert_eq!(registry.owner_of(b), Some(addr(2)));
        assert_eq!(registry.owner_of(b + 1), None);
    }

    #[test]
    fn test_transfer() {
        let mut registry = InMemoryIdentityRegistry::new();
        let id = registry.mint_identity(addr(1));

        assert!(registry.transfer(id, addr(2)));
        assert_eq!(registry.owner_of(id), Some(addr(2)));
        assert!(!registry.transfer(id + 1, addr(3)));
    }
}
