//! Tenant scope
//!
//! A scope constrains every read to one tenant and supplies the tenant id
//! stamped on every inserted copy.

use crate::sql::SqlFragment;
use probity_core::model::TenantId;

pub trait TenantScope {
    fn tenant_id(&self) -> TenantId;

    /// Predicate restricting rows of the table aliased `alias` to this tenant
    fn predicate(&self, alias: &str) -> SqlFragment {
        SqlFragment::new(format!("{alias}.tenant_id = ?")).bind(self.tenant_id().to_string())
    }
}

/// Scope of a single tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    tenant_id: TenantId,
}

impl Scope {
    pub fn new(tenant_id: TenantId) -> Self {
        Self { tenant_id }
    }
}

impl TenantScope for Scope {
    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
