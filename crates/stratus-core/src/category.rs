//! Node categories and the built-in catalog.
//!
//! A [`Category`] names the kind of architecture element a node represents and
//! determines the icon it is drawn with. Categories are written as
//! `provider.group.kind`, e.g. `azure.compute.aks` or `k8s.storage.pvc`.
//!
//! The [`catalog`] module lists the categories Stratus knows about. Any other
//! `provider.group.kind` triple is still a valid category; it simply has no
//! catalog entry and is drawn with the provider's fallback style.

use std::{
    collections::HashSet,
    fmt,
    str::FromStr,
    sync::LazyLock,
};

use thiserror::Error;

use crate::identifier::Id;

static CATALOG: LazyLock<HashSet<Category>> =
    LazyLock::new(|| catalog::all().into_iter().collect());

/// Error returned when a category string is not `provider.group.kind`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid category `{0}`: expected `provider.group.kind`")]
pub struct CategoryParseError(pub String);

/// The provider, group and kind of a node, e.g. `azure` / `compute` / `aks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Category {
    provider: Id,
    group: Id,
    kind: Id,
}

impl Category {
    /// Creates a category from its three parts. Parts are lowercased.
    ///
    /// # Examples
    ///
    /// ```
    /// use stratus_core::category::Category;
    ///
    /// let aks = Category::new("Azure", "Compute", "AKS");
    /// assert_eq!(aks.to_string(), "azure.compute.aks");
    /// ```
    pub fn new(provider: &str, group: &str, kind: &str) -> Self {
        Self {
            provider: Id::new(&provider.to_lowercase()),
            group: Id::new(&group.to_lowercase()),
            kind: Id::new(&kind.to_lowercase()),
        }
    }

    /// Returns the provider, e.g. `azure`.
    pub fn provider(&self) -> Id {
        self.provider
    }

    /// Returns the group within the provider, e.g. `compute`.
    pub fn group(&self) -> Id {
        self.group
    }

    /// Returns the element kind, e.g. `aks`.
    pub fn kind(&self) -> Id {
        self.kind
    }

    /// Returns true if this category appears in the built-in [`catalog`].
    pub fn is_cataloged(&self) -> bool {
        CATALOG.contains(self)
    }
}

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.').map(str::trim);
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(provider), Some(group), Some(kind), None)
                if !provider.is_empty() && !group.is_empty() && !kind.is_empty() =>
            {
                Ok(Self::new(provider, group, kind))
            }
            _ => Err(CategoryParseError(s.to_string())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.provider, self.group, self.kind)
    }
}

macro_rules! catalog_group {
    ($provider:literal, $group:literal => { $($name:ident => $kind:literal),+ $(,)? }) => {
        $(
            #[doc = concat!("`", $provider, ".", $group, ".", $kind, "`")]
            pub fn $name() -> Category {
                Category::new($provider, $group, $kind)
            }
        )+

        pub(crate) fn entries() -> Vec<Category> {
            vec![$($name()),+]
        }
    };
}

/// Built-in categories, grouped by provider and group.
///
/// ```
/// use stratus_core::category::catalog;
///
/// let aks = catalog::azure::compute::aks();
/// assert_eq!(aks.to_string(), "azure.compute.aks");
/// assert!(aks.is_cataloged());
/// ```
pub mod catalog {
    use super::Category;

    pub mod azure {
        pub mod compute {
            use crate::category::Category;
            catalog_group!("azure", "compute" => {
                aks => "aks",
                vm_scale_set => "vm_scale_set",
            });
        }

        pub mod network {
            use crate::category::Category;
            catalog_group!("azure", "network" => {
                application_gateway => "application_gateway",
                load_balancers => "load_balancers",
                virtual_networks => "virtual_networks",
                firewall => "firewall",
            });
        }

        pub mod web {
            use crate::category::Category;
            catalog_group!("azure", "web" => {
                front_doors => "front_doors",
            });
        }

        pub mod database {
            use crate::category::Category;
            catalog_group!("azure", "database" => {
                sql_database => "sql_database",
                cosmos_db => "cosmos_db",
            });
        }

        pub mod storage {
            use crate::category::Category;
            catalog_group!("azure", "storage" => {
                storage_accounts => "storage_accounts",
            });
        }

        pub mod security {
            use crate::category::Category;
            catalog_group!("azure", "security" => {
                key_vault => "key_vault",
            });
        }

        pub mod analytics {
            use crate::category::Category;
            catalog_group!("azure", "analytics" => {
                log_analytics_workspaces => "log_analytics_workspaces",
            });
        }

        pub mod identity {
            use crate::category::Category;
            catalog_group!("azure", "identity" => {
                active_directory => "active_directory",
            });
        }

        pub mod integration {
            use crate::category::Category;
            catalog_group!("azure", "integration" => {
                api_management => "api_management",
            });
        }
    }

    pub mod k8s {
        pub mod compute {
            use crate::category::Category;
            catalog_group!("k8s", "compute" => {
                pod => "pod",
                deployment => "deployment",
                stateful_set => "stateful_set",
            });
        }

        pub mod network {
            use crate::category::Category;
            catalog_group!("k8s", "network" => {
                service => "service",
                ingress => "ingress",
            });
        }

        pub mod storage {
            use crate::category::Category;
            catalog_group!("k8s", "storage" => {
                pv => "pv",
                pvc => "pvc",
            });
        }
    }

    pub mod onprem {
        pub mod monitoring {
            use crate::category::Category;
            catalog_group!("onprem", "monitoring" => {
                prometheus => "prometheus",
                grafana => "grafana",
            });
        }
    }

    pub mod generic {
        pub mod blank {
            use crate::category::Category;
            catalog_group!("generic", "blank" => {
                blank => "blank",
            });
        }
    }

    /// Every cataloged category, in catalog order.
    pub fn all() -> Vec<Category> {
        [
            azure::compute::entries(),
            azure::network::entries(),
            azure::web::entries(),
            azure::database::entries(),
            azure::storage::entries(),
            azure::security::entries(),
            azure::analytics::entries(),
            azure::identity::entries(),
            azure::integration::entries(),
            k8s::compute::entries(),
            k8s::network::entries(),
            k8s::storage::entries(),
            onprem::monitoring::entries(),
            generic::blank::entries(),
        ]
        .concat()
    }
}
