pub mod visitor_tracking;

pub use visitor_tracking::Entity as VisitorTrackingEntity;
