pub mod forest;
pub mod site;
mod templates;

pub use site::{PublishError, Report, Site, SiteLoadError};
pub use templates::{TemplateLoadError, load_templates};
