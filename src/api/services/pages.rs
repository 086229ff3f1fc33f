//! 站点页面占位
//!
//! 真实的站点内容不在本服务内，这里只为 OvenCraft 的公开路由返回简单 HTML，
//! 供访问追踪中间件包裹。

use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, web};

/// (路径, 标题)
pub const SITE_PAGES: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/about", "About Us"),
    ("/products", "Products"),
    ("/product-details", "Product Details"),
    ("/faq", "FAQ"),
    ("/privacy-policy", "Privacy Policy"),
    ("/contact", "Contact Us"),
    ("/blog", "Blog"),
    ("/gallery", "Gallery"),
];

fn page_title(path: &str) -> Option<&'static str> {
    SITE_PAGES
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, title)| *title)
}

fn render(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title} | OvenCraft</title></head>\n<body><h1>{title}</h1></body>\n</html>\n"
    )
}

pub struct PageService;

impl PageService {
    pub async fn render_page(req: HttpRequest) -> HttpResponse {
        match page_title(req.path()) {
            Some(title) => HttpResponse::Ok()
                .content_type(ContentType::html())
                .body(render(title)),
            None => Self::not_found().await,
        }
    }

    pub async fn not_found() -> HttpResponse {
        HttpResponse::NotFound()
            .content_type(ContentType::html())
            .body(render("Page Not Found"))
    }
}

/// 注册全部站点页面
pub fn page_routes(cfg: &mut web::ServiceConfig) {
    for (path, _) in SITE_PAGES {
        cfg.route(path, web::get().to(PageService::render_page))
            .route(path, web::head().to(PageService::render_page));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_title_lookup() {
        assert_eq!(page_title("/"), Some("Home"));
        assert_eq!(page_title("/privacy-policy"), Some("Privacy Policy"));
        assert_eq!(page_title("/missing"), None);
    }

    #[test]
    fn test_render_contains_title() {
        let html = render("FAQ");
        assert!(html.contains("<title>FAQ | OvenCraft</title>"));
        assert!(html.contains("<h1>FAQ</h1>"));
    }
}
