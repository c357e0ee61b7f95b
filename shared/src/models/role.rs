//! Roles, permissions and data scoping

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Account role. Discriminants match the ids seeded in the `roles` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin = 1,
    CustomerAdmin = 2,
    VendorAdmin = 3,
    Customer = 4,
    Vendor = 5,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Superadmin,
        Role::CustomerAdmin,
        Role::VendorAdmin,
        Role::Customer,
        Role::Vendor,
    ];

    pub fn id(&self) -> i32 {
        *self as i32
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::CustomerAdmin => "customer_admin",
            Role::VendorAdmin => "vendor_admin",
            Role::Customer => "customer",
            Role::Vendor => "vendor",
        }
    }

    pub fn from_id(id: i32) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| DomainError::UnknownRole(id.to_string()))
    }

    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == name)
            .ok_or_else(|| DomainError::UnknownRole(name.to_string()))
    }

    pub fn is_admin(&self) -> bool {
        matches!(
            self,
            Role::Superadmin | Role::CustomerAdmin | Role::VendorAdmin
        )
    }

    /// Permissions granted to the role
    pub fn permissions(&self) -> Vec<Permission> {
        use Action::*;
        use Resource::*;

        let grants: &[(Resource, &[Action])] = match self {
            Role::Superadmin => &[
                (Dashboard, &[View]),
                (User, &[View, Create, Edit]),
                (Item, &[View, Create, Edit]),
                (Invoice, &[View, Pay, Export]),
                (Profile, &[View, Edit]),
            ],
            Role::CustomerAdmin => &[
                (Dashboard, &[View]),
                (User, &[View, Create, Edit]),
                (Item, &[View]),
                (Invoice, &[View, Pay, Export]),
                (Profile, &[View, Edit]),
            ],
            Role::VendorAdmin => &[
                (Dashboard, &[View]),
                (User, &[View, Create, Edit]),
                (Item, &[View, Create, Edit]),
                (Invoice, &[View, Export]),
                (Profile, &[View, Edit]),
            ],
            Role::Vendor => &[
                (Item, &[View, Create, Edit]),
                (Invoice, &[View, Export]),
                (Profile, &[View, Edit]),
            ],
            Role::Customer => &[
                (Cart, &[View, Edit]),
                (Invoice, &[View, Pay, Export]),
                (Profile, &[View, Edit]),
            ],
        };

        grants
            .iter()
            .flat_map(|(resource, actions)| {
                actions.iter().map(move |action| Permission {
                    resource: *resource,
                    action: *action,
                })
            })
            .collect()
    }

    /// Permission strings in `resource:action` form, as carried in access tokens
    pub fn permission_strings(&self) -> Vec<String> {
        self.permissions().iter().map(Permission::to_string).collect()
    }

    pub fn can(&self, resource: Resource, action: Action) -> bool {
        self.permissions()
            .iter()
            .any(|p| p.resource == resource && p.action == action)
    }

    /// Sections shown in the navigation for this role, in display order
    pub fn navigation(&self) -> Vec<Section> {
        use Section::*;
        match self {
            Role::Superadmin | Role::CustomerAdmin | Role::VendorAdmin => vec![
                Dashboard,
                ManageUsers,
                ManageInvoices,
                ManageItems,
                ManageProfile,
            ],
            Role::Vendor => vec![ManageItems, ManageInvoices, ManageProfile],
            Role::Customer => vec![ManageCart, ManageInvoices, ManageProfile],
        }
    }

    /// Which invoices the role may see
    pub fn invoice_scope(&self, user_id: i64) -> InvoiceScope {
        match self {
            Role::Superadmin | Role::CustomerAdmin | Role::VendorAdmin => InvoiceScope::All,
            Role::Customer => InvoiceScope::Customer(user_id),
            Role::Vendor => InvoiceScope::Vendor(user_id),
        }
    }

    /// Which items the role may see
    pub fn item_scope(&self, user_id: i64) -> ItemScope {
        match self {
            Role::Vendor => ItemScope::Vendor(user_id),
            _ => ItemScope::All,
        }
    }

    /// Human-readable role label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Superadmin => "Superadmin",
            Role::CustomerAdmin => "Customer Admin",
            Role::VendorAdmin => "Vendor Admin",
            Role::Customer => "Customer",
            Role::Vendor => "Vendor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = DomainError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Role::from_name(&name)
    }
}

impl std::str::FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::from_name(s)
    }
}

/// Resources that can be accessed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Dashboard,
    User,
    Item,
    Cart,
    Invoice,
    Profile,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Dashboard => "dashboard",
            Resource::User => "user",
            Resource::Item => "item",
            Resource::Cart => "cart",
            Resource::Invoice => "invoice",
            Resource::Profile => "profile",
        }
    }
}

/// Actions that can be performed on resources
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Pay,
    Export,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Pay => "pay",
            Action::Export => "export",
        }
    }
}

/// A single grant of an action on a resource
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.resource.as_str(), self.action.as_str())
    }
}

/// Navigation sections
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Dashboard,
    ManageUsers,
    ManageInvoices,
    ManageItems,
    ManageCart,
    ManageProfile,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::Dashboard => "Dashboard",
            Section::ManageUsers => "Manage Users",
            Section::ManageInvoices => "Manage Invoices",
            Section::ManageItems => "Manage Items",
            Section::ManageCart => "Manage Cart",
            Section::ManageProfile => "Manage Profile",
        }
    }
}

/// Subset of invoices visible to a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvoiceScope {
    All,
    /// Invoices billed to this customer
    Customer(i64),
    /// Invoices containing at least one item sold by this vendor
    Vendor(i64),
}

/// Subset of items visible to a caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemScope {
    All,
    Vendor(i64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_ids_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_id(role.id()).unwrap(), role);
            assert_eq!(Role::from_name(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_id(0).is_err());
        assert!(Role::from_name("owner").is_err());
    }

    #[test]
    fn test_seeded_role_ids() {
        assert_eq!(Role::Superadmin.id(), 1);
        assert_eq!(Role::Customer.id(), 4);
        assert_eq!(Role::Vendor.id(), 5);
    }

    #[test]
    fn test_only_customers_use_cart() {
        for role in Role::ALL {
            assert_eq!(
                role.can(Resource::Cart, Action::Edit),
                role == Role::Customer
            );
        }
    }

    #[test]
    fn test_vendors_cannot_pay() {
        assert!(!Role::Vendor.can(Resource::Invoice, Action::Pay));
        assert!(!Role::VendorAdmin.can(Resource::Invoice, Action::Pay));
        assert!(Role::Customer.can(Resource::Invoice, Action::Pay));
    }

    #[test]
    fn test_permission_string_format() {
        let perms = Role::Customer.permission_strings();
        assert!(perms.contains(&"cart:view".to_string()));
        assert!(perms.contains(&"invoice:pay".to_string()));
        assert!(!perms.contains(&"user:view".to_string()));
    }

    #[test]
    fn test_navigation_matches_roles() {
        assert_eq!(
            Role::Customer.navigation(),
            vec![Section::ManageCart, Section::ManageInvoices, Section::ManageProfile]
        );
        assert_eq!(Role::Superadmin.navigation().first(), Some(&Section::Dashboard));
        assert!(!Role::Vendor.navigation().contains(&Section::ManageUsers));
    }

    #[test]
    fn test_scopes() {
        assert_eq!(Role::Customer.invoice_scope(7), InvoiceScope::Customer(7));
        assert_eq!(Role::Vendor.invoice_scope(9), InvoiceScope::Vendor(9));
        assert_eq!(Role::CustomerAdmin.invoice_scope(2), InvoiceScope::All);
        assert_eq!(Role::Vendor.item_scope(9), ItemScope::Vendor(9));
        assert_eq!(Role::CustomerAdmin.item_scope(2), ItemScope::All);
    }
}
