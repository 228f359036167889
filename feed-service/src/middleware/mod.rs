/// Request identity extractors
///
/// Credential issuance and verification live at the gateway; by the time a
/// request reaches this service the authenticated caller, if any, arrives as
/// an `x-user-id` header. The extractors below are the only place that
/// header is read.
use actix_web::dev::Payload;
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

const IDENTITY_HEADER: &str = "x-user-id";

fn caller_from_headers(req: &HttpRequest) -> Option<Uuid> {
    req.headers()
        .get(IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| Uuid::parse_str(value).ok())
}

/// Authenticated caller; requests without a valid identity are rejected.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            caller_from_headers(req)
                .map(UserId)
                .ok_or_else(|| ErrorUnauthorized("Missing or invalid caller identity")),
        )
    }
}

/// Optional caller identity for public endpoints that personalize when a
/// caller is present (isLiked/isBookmarked flags).
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

impl FromRequest for MaybeUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(MaybeUser(caller_from_headers(req))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn missing_identity_is_unauthorized_for_user_id() {
        let req = TestRequest::default().to_http_request();
        let mut payload = Payload::None;
        assert!(UserId::from_request(&req, &mut payload).await.is_err());
    }

    #[actix_web::test]
    async fn maybe_user_tolerates_absent_and_garbage_headers() {
        let req = TestRequest::default().to_http_request();
        let mut payload = Payload::None;
        let MaybeUser(caller) = MaybeUser::from_request(&req, &mut payload).await.unwrap();
        assert!(caller.is_none());

        let req = TestRequest::default()
            .insert_header((IDENTITY_HEADER, "not-a-uuid"))
            .to_http_request();
        let MaybeUser(caller) = MaybeUser::from_request(&req, &mut payload).await.unwrap();
        assert!(caller.is_none());
    }

    #[actix_web::test]
    async fn valid_identity_round_trips() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((IDENTITY_HEADER, id.to_string()))
            .to_http_request();
        let mut payload = Payload::None;
        let UserId(caller) = UserId::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(caller, id);
    }
}
