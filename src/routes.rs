//! HTTP 路由
//!
//! 持久化连接和序列化器通过路由状态显式传入处理函数，没有全局数据库句柄。

pub mod games;
pub mod newsletters;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{FromRequest, FromRequestParts, Request},
    http::{StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};
use sea_orm::DatabaseConnection;
use serde_json::Value;

use crate::database::GraphLoader;
use crate::error::AppError;
use crate::serializer::{EntityKind, Rule, Serializer};

/// 处理函数共用的上下文
#[derive(Clone)]
pub struct ApiContext {
    pub db: DatabaseConnection,
    pub serializer: Arc<Serializer>,
    pub pretty_json: bool,
}

impl ApiContext {
    pub fn new(db: DatabaseConnection, serializer: Serializer, pretty_json: bool) -> Self {
        Self {
            db,
            serializer: Arc::new(serializer),
            pretty_json,
        }
    }

    /// 序列化某类型的全部实体
    pub async fn list(&self, kind: EntityKind, extra: &[Rule]) -> Result<Response, AppError> {
        let loader = GraphLoader::new(&self.serializer);
        let (graph, ids) = loader.load_all(&self.db, kind, extra).await?;
        let items = self
            .serializer
            .serialize_many_with(&graph, kind, &ids, extra)?;
        Ok(self.render(StatusCode::OK, &Value::Array(items)))
    }

    /// 序列化单个实体，不存在时返回 404
    pub async fn one(
        &self,
        kind: EntityKind,
        id: i32,
        status: StatusCode,
    ) -> Result<Response, AppError> {
        let loader = GraphLoader::new(&self.serializer);
        let graph = loader
            .load_one(&self.db, kind, id, &[])
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{kind} #{id} 不存在")))?;
        let body = self.serializer.serialize(&graph, kind, id)?;
        Ok(self.render(status, &Value::Object(body)))
    }

    pub fn render(&self, status: StatusCode, value: &Value) -> Response {
        let body = if self.pretty_json {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };

        match body {
            Ok(body) => (status, [(CONTENT_TYPE, "application/json")], body).into_response(),
            Err(e) => {
                log::error!("JSON 编码失败: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// JSON 请求体；解析失败时以 `{"error": ...}` 返回 422
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// 表单请求体；解析失败时以 `{"error": ...}` 返回 422
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct FormBody<T>(pub T);

/// 路径参数；无法解析时返回 404
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct PathParam<T>(pub T);

/// 记录每个请求的方法、路径、状态码和耗时
pub async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    log::info!(
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
