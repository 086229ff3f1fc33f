use sea_orm::ActiveValue::{NotSet, Set};

use crate::analytics::{NewVisit, VisitRecord};
use migration::entities::visitor_tracking;

/// 将 Sea-ORM Model 转换为 VisitRecord
pub fn model_to_visit_record(model: visitor_tracking::Model) -> VisitRecord {
    VisitRecord {
        id: model.id,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        page_visited: model.page_visited,
        referrer: model.referrer,
        session_key: model.session_key,
        country: model.country,
        city: model.city,
        device_type: model.device_type,
        browser: model.browser,
        visited_at: model.visited_at,
    }
}

/// 将待写入访问转换为 ActiveModel
pub fn new_visit_to_active_model(visit: NewVisit) -> visitor_tracking::ActiveModel {
    visitor_tracking::ActiveModel {
        id: NotSet,
        ip_address: Set(visit.ip_address),
        user_agent: Set(visit.user_agent),
        page_visited: Set(visit.page_visited),
        referrer: Set(visit.referrer),
        session_key: Set(visit.session_key),
        country: Set(visit.country),
        city: Set(visit.city),
        device_type: Set(visit.device.as_ref().to_string()),
        browser: Set(visit.browser.as_ref().to_string()),
        fingerprint: Set(visit.fingerprint),
        visited_at: Set(visit.visited_at),
    }
}
