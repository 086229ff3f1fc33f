//! 客户端 IP 提取
//!
//! 规则：X-Forwarded-For 的第一个非空条目优先，否则使用连接对端地址（去掉端口）。

use std::net::{IpAddr, SocketAddr};

use actix_web::http::header::HeaderMap;

/// 检查 IP 是否为私有地址或 localhost
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_loopback() || v4.is_link_local(),
        IpAddr::V6(v6) => {
            v6.is_loopback()
                || (v6.segments()[0] & 0xfe00) == 0xfc00 // fc00::/7
                || (v6.segments()[0] & 0xffc0) == 0xfe80 // fe80::/10
        }
    }
}

/// X-Forwarded-For 的第一个条目（原始客户端）
pub fn forwarded_for_first(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// 提取客户端地址
pub fn extract_client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    forwarded_for_first(headers).or_else(|| peer.map(|addr| addr.ip().to_string()))
}
