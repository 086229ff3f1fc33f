//! 访问追踪中间件
//!
//! 包裹站点页面路由。请求进入时提取客户端信息，响应生成后在独立任务中写入访问记录，
//! 不阻塞页面响应。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

use crate::analytics::{VisitRecorder, VisitRequest};
use crate::config::TrackingConfig;
use crate::utils::extract_client_ip;

#[derive(Clone)]
pub struct VisitTracking {
    recorder: Arc<VisitRecorder>,
    config: Arc<TrackingConfig>,
}

impl VisitTracking {
    pub fn new(recorder: Arc<VisitRecorder>, config: TrackingConfig) -> Self {
        Self {
            recorder,
            config: Arc::new(config),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for VisitTracking
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = VisitTrackingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(VisitTrackingService {
            service: Rc::new(service),
            recorder: self.recorder.clone(),
            config: self.config.clone(),
        }))
    }
}

pub struct VisitTrackingService<S> {
    service: Rc<S>,
    recorder: Arc<VisitRecorder>,
    config: Arc<TrackingConfig>,
}

fn header_string(req: &ServiceRequest, name: header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// 在请求被消费前提取访问信息，不需要记录时返回 `None`
fn capture_visit(req: &ServiceRequest, config: &TrackingConfig) -> Option<VisitRequest> {
    if req.method() != Method::GET || !config.should_track(req.path()) {
        return None;
    }

    let client_address = extract_client_ip(req.headers(), req.peer_addr())?;
    let session_id = req
        .cookie(&config.session_cookie)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());

    Some(VisitRequest {
        client_address,
        user_agent: header_string(req, header::USER_AGENT),
        page_path: req.path().to_string(),
        referrer: header_string(req, header::REFERER),
        session_id,
    })
}

impl<S, B> Service<ServiceRequest> for VisitTrackingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let recorder = self.recorder.clone();
        let visit = capture_visit(&req, &self.config);

        Box::pin(async move {
            let response = srv.call(req).await?;

            if let Some(visit) = visit {
                if response.status().as_u16() < 400 {
                    tokio::spawn(async move {
                        recorder.record_visit(visit).await;
                    });
                } else {
                    trace!(
                        "Skip tracking {} (status {})",
                        visit.page_path,
                        response.status()
                    );
                }
            }

            Ok(response)
        })
    }
}
