//! User-Agent 分类
//!
//! 按顺序匹配的大小写不敏感子串规则，第一条命中的规则生效。
//! 规则顺序是对外约定：同时包含 Chrome 与 Safari 的 UA 归为 Chrome，
//! Edge 的 UA 通常带有 Chrome 标记，因此也归为 Chrome。

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 设备类型（小写存储）
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

/// 浏览器家族（按家族名存储）
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    AsRefStr,
    Display,
)]
#[strum(ascii_case_insensitive)]
pub enum BrowserFamily {
    Chrome,
    Firefox,
    Safari,
    Edge,
    Other,
}

const DEVICE_RULES: &[(&[&str], DeviceClass)] = &[
    (&["mobile", "android", "iphone"], DeviceClass::Mobile),
    (&["tablet", "ipad"], DeviceClass::Tablet),
];

const BROWSER_RULES: &[(&str, BrowserFamily)] = &[
    ("chrome", BrowserFamily::Chrome),
    ("firefox", BrowserFamily::Firefox),
    ("safari", BrowserFamily::Safari),
    ("edge", BrowserFamily::Edge),
];

/// 根据 UA 判断设备类型，缺失时为 desktop
pub fn classify_device(user_agent: Option<&str>) -> DeviceClass {
    let Some(ua) = user_agent else {
        return DeviceClass::Desktop;
    };
    let ua = ua.to_ascii_lowercase();

    DEVICE_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| ua.contains(n)))
        .map(|(_, class)| *class)
        .unwrap_or(DeviceClass::Desktop)
}

/// 根据 UA 判断浏览器家族，缺失时为 Other
pub fn classify_browser(user_agent: Option<&str>) -> BrowserFamily {
    let Some(ua) = user_agent else {
        return BrowserFamily::Other;
    };
    let ua = ua.to_ascii_lowercase();

    BROWSER_RULES
        .iter()
        .find(|(needle, _)| ua.contains(needle))
        .map(|(_, family)| *family)
        .unwrap_or(BrowserFamily::Other)
}
