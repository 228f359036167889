/// OpenAPI documentation for the feed service
use utoipa::OpenApi;

use crate::handlers::{posts, search, users};
use crate::services::pagination::PageMeta;
use crate::services::search::Suggestion;
use crate::services::tags::TagCount;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Feed Service API",
        version = "0.1.0",
        description = "Content feed service: published posts with pagination, sorting, tag \
                       filtering, and field-weighted search, plus per-user engagement state \
                       (likes, bookmarks, follows) and append-only comments.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    paths(
        posts::list_posts,
        posts::get_post,
        posts::create_post,
        posts::update_post,
        posts::delete_post,
        posts::toggle_like,
        posts::toggle_bookmark,
        posts::add_comment,
        users::get_user,
        users::get_user_posts,
        users::toggle_follow,
        users::get_followers,
        users::get_following,
        users::liked_posts,
        users::bookmarked_posts,
        search::search,
        search::popular_tags,
        search::suggestions,
    ),
    components(schemas(
        posts::PostResponse,
        posts::AuthorSummary,
        posts::CommentResponse,
        posts::CreatePostRequest,
        posts::UpdatePostRequest,
        posts::CreateCommentRequest,
        users::UserSummary,
        users::UserProfileResponse,
        PageMeta,
        TagCount,
        Suggestion,
    )),
    tags(
        (name = "posts", description = "Post retrieval, authoring, and engagement"),
        (name = "users", description = "Profiles and the follow graph"),
        (name = "search", description = "Field-weighted search, tags, and typeahead"),
    )
)]
pub struct ApiDoc;
