pub mod analytics_event;
pub mod link;
pub mod subsite;
pub mod theme;

pub use analytics_event::Entity as AnalyticsEventEntity;
pub use link::Entity as LinkEntity;
pub use subsite::Entity as SubsiteEntity;
pub use theme::Entity as ThemeEntity;
