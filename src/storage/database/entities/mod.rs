/// Organization entity module
pub mod organization;
/// Outlet entity module
pub mod outlet;
/// Settings document entity module
pub mod settings_document;

pub use organization::Entity as Organization;
pub use outlet::Entity as Outlet;
pub use settings_document::Entity as SettingsDocument;
