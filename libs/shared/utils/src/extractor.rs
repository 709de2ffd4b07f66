use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use shared_models::actor::{Actor, ActorRole};
use shared_models::error::AppError;

/// Middleware deriving the acting identity from gateway headers.
///
/// Authentication is handled upstream; the gateway forwards the verified
/// identity as `X-Actor-Id` and `X-Actor-Role`. Requests missing either
/// header never reach the handlers.
pub async fn actor_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let actor = actor_from_headers(&request)?;
    request.extensions_mut().insert(actor);
    Ok(next.run(request).await)
}

fn actor_from_headers(request: &Request<Body>) -> Result<Actor, AppError> {
    let id_value = request
        .headers()
        .get("X-Actor-Id")
        .ok_or_else(|| AppError::Auth("Missing X-Actor-Id header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid X-Actor-Id header".to_string()))?;

    let id = Uuid::parse_str(id_value)
        .map_err(|_| AppError::Auth("X-Actor-Id is not a valid UUID".to_string()))?;

    let role_value = request
        .headers()
        .get("X-Actor-Role")
        .ok_or_else(|| AppError::Auth("Missing X-Actor-Role header".to_string()))?
        .to_str()
        .map_err(|_| AppError::Auth("Invalid X-Actor-Role header".to_string()))?;

    let role: ActorRole = role_value
        .parse()
        .map_err(|e: String| AppError::Auth(e))?;

    Ok(Actor { id, role })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::HeaderValue;

    fn request_with(id: Option<&str>, role: Option<&str>) -> Request<Body> {
        let mut request = Request::new(Body::empty());
        if let Some(id) = id {
            request
                .headers_mut()
                .insert("X-Actor-Id", HeaderValue::from_str(id).unwrap());
        }
        if let Some(role) = role {
            request
                .headers_mut()
                .insert("X-Actor-Role", HeaderValue::from_str(role).unwrap());
        }
        request
    }

    #[test]
    fn extracts_actor_from_headers() {
        let id = Uuid::new_v4();
        let request = request_with(Some(&id.to_string()), Some("doctor"));
        let actor = actor_from_headers(&request).unwrap();
        assert_eq!(actor.id, id);
        assert_eq!(actor.role, ActorRole::Doctor);
    }

    #[test]
    fn rejects_missing_headers() {
        let request = request_with(None, Some("admin"));
        assert!(actor_from_headers(&request).is_err());

        let request = request_with(Some(&Uuid::new_v4().to_string()), None);
        assert!(actor_from_headers(&request).is_err());
    }

    #[test]
    fn rejects_unknown_role() {
        let request = request_with(Some(&Uuid::new_v4().to_string()), Some("nurse"));
        assert!(actor_from_headers(&request).is_err());
    }
}
