/// HTTP handlers - the boundary where the retrieval pipeline meets actix
///
/// Handlers validate query/body shapes, resolve caller identity, delegate to
/// the services, and wrap results in the `{"status":"success","data":...}`
/// envelope the API speaks.
use actix_web::web;

pub mod posts;
pub mod search;
pub mod users;

pub use posts::{AuthorSummary, CommentResponse, PostResponse};
pub use users::UserSummary;

/// Route table, shared by `main` and the handler-level tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/posts")
                    .service(
                        web::resource("")
                            .route(web::get().to(posts::list_posts))
                            .route(web::post().to(posts::create_post)),
                    )
                    .service(
                        web::resource("/{post_id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::put().to(posts::update_post))
                            .route(web::delete().to(posts::delete_post)),
                    )
                    .route("/{post_id}/like", web::post().to(posts::toggle_like))
                    .route("/{post_id}/bookmark", web::post().to(posts::toggle_bookmark))
                    .route("/{post_id}/comment", web::post().to(posts::add_comment)),
            )
            .service(
                web::scope("/search")
                    .route("", web::get().to(search::search))
                    .route("/tags", web::get().to(search::popular_tags))
                    .route("/suggestions", web::get().to(search::suggestions)),
            )
            .service(
                web::scope("/users")
                    .route("/{user_id}", web::get().to(users::get_user))
                    .route("/{user_id}/posts", web::get().to(users::get_user_posts))
                    .route("/{user_id}/follow", web::post().to(users::toggle_follow))
                    .route("/{user_id}/followers", web::get().to(users::get_followers))
                    .route("/{user_id}/following", web::get().to(users::get_following))
                    .route("/{user_id}/liked-posts", web::get().to(users::liked_posts))
                    .route(
                        "/{user_id}/bookmarked-posts",
                        web::get().to(users::bookmarked_posts),
                    ),
            ),
    );
}
